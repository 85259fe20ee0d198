//! Landing screen
//!
//! Greets the recipient by name with a beating heart and a single
//! continue button.

use crate::app::state::{FlowEvent, NavigationAction};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

const HEART_FRAMES: [&str; 4] = ["♥", "❤", "♥", "♡"];
/// Ticks each heart frame stays up
const TICKS_PER_FRAME: usize = 4;

/// Greeting screen with a continue button
#[derive(Debug)]
pub struct LandingScreen {
    name: String,
    ticks: usize,
}

impl LandingScreen {
    /// Create the landing screen for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticks: 0,
        }
    }

    /// Heading text
    pub fn greeting(&self) -> String {
        format!("Hey {}...", self.name)
    }

    /// Advance the heart animation
    pub fn tick(&mut self) {
        self.ticks = (self.ticks + 1) % (HEART_FRAMES.len() * TICKS_PER_FRAME);
    }

    /// Translate navigation into a flow event
    pub fn handle_action(&mut self, action: NavigationAction) -> Option<FlowEvent> {
        match action {
            NavigationAction::Select => Some(FlowEvent::Continue),
            _ => None,
        }
    }

    /// Render the landing screen
    pub fn render(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(3), // Greeting
                Constraint::Length(3), // Heart
                Constraint::Length(3), // Button
                Constraint::Min(0),
                Constraint::Length(3), // Help text
            ])
            .split(size);

        let greeting = Paragraph::new(self.greeting())
            .style(
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        f.render_widget(greeting, chunks[1]);

        let heart = Paragraph::new(HEART_FRAMES[self.ticks / TICKS_PER_FRAME])
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(heart, chunks[2]);

        self.render_button(f, chunks[3]);
        self.render_help(f, chunks[5]);
    }

    fn render_button(&self, f: &mut Frame, area: Rect) {
        let button_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(24),
                Constraint::Min(0),
            ])
            .split(area)[1];

        let button = Paragraph::new("Click to continue")
            .style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::LightMagenta)),
            );
        f.render_widget(button, button_area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![Line::from(vec![
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Continue  "),
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

impl Default for LandingScreen {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_RECIPIENT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_greeting_uses_name() {
        assert_eq!(LandingScreen::new("Sam").greeting(), "Hey Sam...");
        assert_eq!(LandingScreen::default().greeting(), "Hey Meowie...");
    }

    #[test]
    fn test_only_select_continues() {
        let mut screen = LandingScreen::default();
        assert_eq!(screen.handle_action(NavigationAction::Down), None);
        assert_eq!(screen.handle_action(NavigationAction::Back), None);
        assert_eq!(
            screen.handle_action(NavigationAction::Select),
            Some(FlowEvent::Continue)
        );
    }

    #[test]
    fn test_render_shows_greeting_and_button() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut screen = LandingScreen::new("Sam");
        terminal.draw(|f| screen.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Hey Sam..."));
        assert!(text.contains("Click to continue"));
    }
}
