//! Decorative particle effects
//!
//! Falling petals behind every screen and a confetti burst when the
//! celebration opens. Fields are painted before the screen content, and
//! only onto blank cells, so text always ends up on top.

use rand::{rngs::SmallRng, Rng, SeedableRng};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, style::Style};

const PETAL_SYMBOLS: &[&str] = &["❀", "✿", "•", "*"];
const PETAL_COLORS: &[Color] = &[
    Color::Rgb(251, 113, 133),
    Color::Rgb(253, 164, 175),
    Color::Rgb(244, 63, 94),
];
const CONFETTI_SYMBOLS: &[&str] = &["▪", "▴", "●", "♥", "✦"];
const CONFETTI_COLORS: &[Color] = &[
    Color::Rgb(244, 63, 94),
    Color::Rgb(250, 204, 21),
    Color::Rgb(56, 189, 248),
    Color::Rgb(74, 222, 128),
    Color::Rgb(192, 132, 252),
];

/// Which effect a field animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Endless slow fall, respawning at the top
    Petals,
    /// One burst that falls out of view and is gone
    Confetti,
}

#[derive(Debug, Clone)]
struct Particle {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    symbol: &'static str,
    color: Color,
}

/// A set of particles animated per tick
#[derive(Debug)]
pub struct ParticleField {
    kind: EffectKind,
    particles: Vec<Particle>,
    rng: SmallRng,
    capacity: usize,
}

impl ParticleField {
    /// Create an empty field
    pub fn new(kind: EffectKind, capacity: usize, seed: u64) -> Self {
        Self {
            kind,
            particles: Vec::with_capacity(capacity),
            rng: SmallRng::seed_from_u64(seed),
            capacity,
        }
    }

    /// Falling petals
    pub fn petals(seed: u64) -> Self {
        Self::new(EffectKind::Petals, 24, seed)
    }

    /// A confetti burst; call [`ParticleField::burst`] to launch it
    pub fn confetti(seed: u64) -> Self {
        Self::new(EffectKind::Confetti, 60, seed)
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Check whether no particle is alive
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Launch a burst of particles from the top of `area`
    pub fn burst(&mut self, area: Rect) {
        self.particles.clear();
        for _ in 0..self.capacity {
            let particle = self.spawn(area, true);
            self.particles.push(particle);
        }
    }

    /// Advance one frame inside `area`
    pub fn tick(&mut self, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        if self.kind == EffectKind::Petals && self.particles.len() < self.capacity {
            let particle = self.spawn(area, false);
            self.particles.push(particle);
        }

        let bottom = (area.y + area.height) as f32;
        let left = area.x as f32;
        let right = (area.x + area.width) as f32;

        for particle in &mut self.particles {
            particle.x += particle.dx;
            particle.y += particle.dy;
            if particle.x < left {
                particle.x = right - 1.0;
            } else if particle.x >= right {
                particle.x = left;
            }
        }

        match self.kind {
            EffectKind::Petals => {
                for i in 0..self.particles.len() {
                    if self.particles[i].y >= bottom {
                        self.particles[i] = self.spawn(area, false);
                    }
                }
            }
            EffectKind::Confetti => self.particles.retain(|p| p.y < bottom),
        }
    }

    /// Paint particles onto blank cells of `buf`
    pub fn render(&self, buf: &mut Buffer) {
        let area = buf.area;
        for particle in &self.particles {
            if particle.x < 0.0 || particle.y < 0.0 {
                continue;
            }
            let (x, y) = (particle.x as u16, particle.y as u16);
            if x < area.x || y < area.y || x >= area.x + area.width || y >= area.y + area.height {
                continue;
            }
            let cell = buf.get_mut(x, y);
            if cell.symbol() == " " {
                cell.set_symbol(particle.symbol)
                    .set_style(Style::default().fg(particle.color));
            }
        }
    }

    fn spawn(&mut self, area: Rect, burst: bool) -> Particle {
        let (symbols, colors) = match self.kind {
            EffectKind::Petals => (PETAL_SYMBOLS, PETAL_COLORS),
            EffectKind::Confetti => (CONFETTI_SYMBOLS, CONFETTI_COLORS),
        };
        let width = area.width.max(1) as f32;
        let x = area.x as f32 + self.rng.gen_range(0.0..width);
        let y = if burst {
            area.y as f32 + self.rng.gen_range(0.0..(area.height.max(1) as f32 / 3.0))
        } else {
            area.y as f32
        };
        let (dx, dy) = match self.kind {
            EffectKind::Petals => (self.rng.gen_range(-0.3..0.3), self.rng.gen_range(0.2..0.6)),
            EffectKind::Confetti => (self.rng.gen_range(-1.0..1.0), self.rng.gen_range(0.5..1.5)),
        };
        Particle {
            x,
            y,
            dx,
            dy,
            symbol: symbols[self.rng.gen_range(0..symbols.len())],
            color: colors[self.rng.gen_range(0..colors.len())],
        }
    }
}
