//! Terminal management
//!
//! Raw mode and the alternate screen, restored on drop, plus a ticking
//! event source so animations advance while no key is pressed.

use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use std::{
    io::{self, Stdout},
    time::{Duration, Instant},
};

/// Default animation tick
pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Input or timing event for the application loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
}

/// Terminal wrapper
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
    last_tick: Instant,
    tick_rate: Duration,
}

impl Tui {
    /// Create a new TUI on stdout; the terminal is untouched until `init`
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            active: false,
            last_tick: Instant::now(),
            tick_rate: TICK_RATE,
        })
    }

    /// Use a different tick rate
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Enter raw mode and the alternate screen
    pub fn init(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.active = true;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Restore the terminal; does nothing if `init` never ran
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    pub fn size(&self) -> io::Result<Rect> {
        self.terminal.size()
    }

    /// Draw the UI using the provided render function
    pub fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Wait for the next event, at most until the next tick is due
    pub fn next_event(&mut self) -> io::Result<Option<TuiEvent>> {
        let timeout = remaining(self.tick_rate, self.last_tick.elapsed());

        if event::poll(timeout)? {
            match event::read()? {
                // Release and repeat events would double every key on Windows
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(Some(TuiEvent::Key(key)))
                }
                Event::Resize(width, height) => return Ok(Some(TuiEvent::Resize(width, height))),
                _ => {}
            }
        }

        if self.last_tick.elapsed() >= self.tick_rate {
            self.last_tick = Instant::now();
            return Ok(Some(TuiEvent::Tick));
        }

        Ok(None)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Time left until the next tick
fn remaining(tick_rate: Duration, elapsed: Duration) -> Duration {
    tick_rate.checked_sub(elapsed).unwrap_or(Duration::ZERO)
}
