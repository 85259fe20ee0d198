//! Question screen
//!
//! Asks the question with a "Yes!" and a "No" button. Focus never leaves
//! "Yes!": every attempt to move to "No" makes it jump somewhere else.

use crate::app::state::{FlowEvent, NavigationAction};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use tracing::debug;

/// The question asked
pub const QUESTION: &str = "Would you make me the happiest person by going on a date with me?";

/// Largest horizontal jump of the "No" button, in columns
pub const MAX_DODGE_COLUMNS: i16 = 9;
/// Largest vertical jump of the "No" button, in rows
pub const MAX_DODGE_ROWS: i16 = 4;

const BUTTON_WIDTH: u16 = 12;
const BUTTON_HEIGHT: u16 = 3;

/// Question screen with an evasive "No" button
#[derive(Debug)]
pub struct QuestionScreen {
    /// Offset of "No" from its resting place, in cells
    no_offset: (i16, i16),
    dodges: u32,
    rng: SmallRng,
}

impl QuestionScreen {
    /// Create the screen with a random seed
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Create the screen with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            no_offset: (0, 0),
            dodges: 0,
            rng,
        }
    }

    /// Current offset of the "No" button
    pub fn no_offset(&self) -> (i16, i16) {
        self.no_offset
    }

    /// How many times "No" has run away
    pub fn dodges(&self) -> u32 {
        self.dodges
    }

    /// Move "No" to a new random offset
    pub fn dodge(&mut self) {
        let previous = self.no_offset;
        while self.no_offset == previous {
            self.no_offset = (
                self.rng.gen_range(-MAX_DODGE_COLUMNS..=MAX_DODGE_COLUMNS),
                self.rng.gen_range(-MAX_DODGE_ROWS..=MAX_DODGE_ROWS),
            );
        }
        self.dodges += 1;
        debug!(offset = ?self.no_offset, dodges = self.dodges, "no button dodged");
    }

    /// Translate navigation into a flow event.
    ///
    /// Focus is always on "Yes!", so Select accepts. Anything that would
    /// move focus towards "No" triggers a dodge instead.
    pub fn handle_action(&mut self, action: NavigationAction) -> Option<FlowEvent> {
        match action {
            NavigationAction::Select => Some(FlowEvent::Accept),
            NavigationAction::Left
            | NavigationAction::Right
            | NavigationAction::Up
            | NavigationAction::Down
            | NavigationAction::Next
            | NavigationAction::Previous => {
                self.dodge();
                None
            }
            _ => None,
        }
    }

    /// Render the question screen
    pub fn render(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(4), // Question
                Constraint::Length(1),
                Constraint::Length(BUTTON_HEIGHT), // Buttons
                Constraint::Min(0),
                Constraint::Length(3), // Help text
            ])
            .split(size);

        let question = Paragraph::new(QUESTION)
            .style(
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .wrap(ratatui::widgets::Wrap { trim: true });
        f.render_widget(question, chunks[1]);

        let row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(BUTTON_WIDTH), // Yes
                Constraint::Length(4),
                Constraint::Length(BUTTON_WIDTH), // No, resting place
                Constraint::Min(0),
            ])
            .split(chunks[3]);

        let yes = Paragraph::new("Yes!")
            .style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::LightGreen)),
            );
        f.render_widget(yes, row[1]);

        let no_area = self.no_area(row[3], row[1], size);
        let no = Paragraph::new("No")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(Clear, no_area);
        f.render_widget(no, no_area);

        self.render_help(f, chunks[5]);
    }

    /// Where "No" lands: its resting place shifted by the offset, kept
    /// inside `bounds` and off the `yes` button
    pub fn no_area(&self, resting: Rect, yes: Rect, bounds: Rect) -> Rect {
        let width = BUTTON_WIDTH.min(bounds.width);
        let height = BUTTON_HEIGHT.min(bounds.height);
        let max_x = (bounds.x + bounds.width).saturating_sub(width);
        let max_y = (bounds.y + bounds.height).saturating_sub(height);

        let x = (resting.x as i32 + self.no_offset.0 as i32).clamp(bounds.x as i32, max_x as i32);
        let y = (resting.y as i32 + self.no_offset.1 as i32).clamp(bounds.y as i32, max_y as i32);
        let area = Rect::new(x as u16, y as u16, width, height);

        if area.intersects(yes) {
            step_aside(area, yes, bounds)
        } else {
            area
        }
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![Line::from(vec![
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Answer  "),
            Span::styled(
                "Q",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Quit"),
        ])];

        let help = Paragraph::new(help_text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        f.render_widget(help, area);
    }
}

/// Nearest spot beside `yes` (right, left, below or above) that fits in
/// `bounds`. On a screen too small for any of them `area` is kept.
fn step_aside(area: Rect, yes: Rect, bounds: Rect) -> Rect {
    let (x, y) = (area.x as i32, area.y as i32);
    let (width, height) = (area.width as i32, area.height as i32);
    let candidates = [
        (yes.right() as i32, y),
        (yes.x as i32 - width, y),
        (x, yes.bottom() as i32),
        (x, yes.y as i32 - height),
    ];

    candidates
        .into_iter()
        .filter(|&(cx, cy)| {
            cx >= bounds.x as i32
                && cy >= bounds.y as i32
                && cx + width <= bounds.right() as i32
                && cy + height <= bounds.bottom() as i32
        })
        .min_by_key(|&(cx, cy)| (cx - x).abs() + (cy - y).abs())
        .map(|(cx, cy)| Rect::new(cx as u16, cy as u16, area.width, area.height))
        .unwrap_or(area)
}

impl Default for QuestionScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_select_accepts() {
        let mut screen = QuestionScreen::with_seed(1);
        assert_eq!(
            screen.handle_action(NavigationAction::Select),
            Some(FlowEvent::Accept)
        );
    }

    #[test]
    fn test_moving_towards_no_dodges() {
        let mut screen = QuestionScreen::with_seed(2);
        for action in [
            NavigationAction::Right,
            NavigationAction::Next,
            NavigationAction::Left,
            NavigationAction::Previous,
        ] {
            let before = screen.no_offset();
            assert_eq!(screen.handle_action(action), None);
            assert_ne!(screen.no_offset(), before);
        }
        assert_eq!(screen.dodges(), 4);

        // Focus never left "Yes!"
        assert_eq!(
            screen.handle_action(NavigationAction::Select),
            Some(FlowEvent::Accept)
        );
    }

    #[test]
    fn test_dodge_stays_in_range() {
        let mut screen = QuestionScreen::with_seed(3);
        for _ in 0..500 {
            screen.dodge();
            let (dx, dy) = screen.no_offset();
            assert!((-MAX_DODGE_COLUMNS..=MAX_DODGE_COLUMNS).contains(&dx));
            assert!((-MAX_DODGE_ROWS..=MAX_DODGE_ROWS).contains(&dy));
        }
    }

    #[test]
    fn test_no_area_is_clamped() {
        let mut screen = QuestionScreen::with_seed(4);
        screen.no_offset = (-MAX_DODGE_COLUMNS, -MAX_DODGE_ROWS);
        let bounds = Rect::new(0, 0, 40, 10);
        let yes = Rect::new(20, 0, BUTTON_WIDTH, BUTTON_HEIGHT);
        let area = screen.no_area(Rect::new(2, 1, BUTTON_WIDTH, BUTTON_HEIGHT), yes, bounds);
        assert_eq!((area.x, area.y), (0, 0));

        screen.no_offset = (MAX_DODGE_COLUMNS, MAX_DODGE_ROWS);
        let area = screen.no_area(Rect::new(26, 6, BUTTON_WIDTH, BUTTON_HEIGHT), yes, bounds);
        assert_eq!((area.x + area.width, area.y + area.height), (40, 10));
    }

    #[test]
    fn test_no_never_covers_yes() {
        let mut screen = QuestionScreen::with_seed(6);
        let bounds = Rect::new(0, 0, 100, 20);
        let yes = Rect::new(36, 8, BUTTON_WIDTH, BUTTON_HEIGHT);
        let resting = Rect::new(yes.right() + 4, yes.y, BUTTON_WIDTH, BUTTON_HEIGHT);

        for dx in -MAX_DODGE_COLUMNS..=MAX_DODGE_COLUMNS {
            for dy in -MAX_DODGE_ROWS..=MAX_DODGE_ROWS {
                screen.no_offset = (dx, dy);
                let area = screen.no_area(resting, yes, bounds);
                assert!(!area.intersects(yes), "offset ({}, {}) covers yes", dx, dy);
                assert_eq!(area.intersection(bounds), area);
            }
        }
    }

    #[test]
    fn test_yes_stays_visible_while_dodging() {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        let mut screen = QuestionScreen::with_seed(7);
        for _ in 0..200 {
            screen.dodge();
            terminal.draw(|f| screen.render(f)).unwrap();
            let text: String = terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|c| c.symbol())
                .collect();
            assert!(text.contains("Yes!"));
        }
    }

    #[test]
    fn test_render_shows_both_buttons() {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        let mut screen = QuestionScreen::with_seed(5);
        terminal.draw(|f| screen.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("happiest person"));
        assert!(text.contains("Yes!"));
        assert!(text.contains("No"));
    }
}
