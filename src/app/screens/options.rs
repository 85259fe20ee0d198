//! Options screen
//!
//! Three date cards side by side. Arrows move the highlight with
//! wrap-around, `f` marks favorites, Enter picks the highlighted date.

use crate::app::state::{FlowEvent, NavigationAction};
use crate::models::{catalog, DateOption};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use std::collections::BTreeSet;

/// Date picker screen
#[derive(Debug)]
pub struct OptionsScreen {
    options: Vec<DateOption>,
    selected_index: usize,
    favorites: BTreeSet<usize>,
}

impl OptionsScreen {
    /// Create the screen over the built-in catalog
    pub fn new() -> Self {
        Self::with_options(catalog())
    }

    /// Create the screen over custom options
    pub fn with_options(options: Vec<DateOption>) -> Self {
        Self {
            options,
            selected_index: 0,
            favorites: BTreeSet::new(),
        }
    }

    /// All options shown
    pub fn options(&self) -> &[DateOption] {
        &self.options
    }

    /// Index of the highlighted option
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// The highlighted option
    pub fn selected_option(&self) -> Option<&DateOption> {
        self.options.get(self.selected_index)
    }

    /// Check whether an option is marked as favorite
    pub fn is_favorite(&self, index: usize) -> bool {
        self.favorites.contains(&index)
    }

    /// Move highlight to the previous card
    pub fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        if self.selected_index > 0 {
            self.selected_index -= 1;
        } else {
            self.selected_index = self.options.len() - 1;
        }
    }

    /// Move highlight to the next card
    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        if self.selected_index < self.options.len() - 1 {
            self.selected_index += 1;
        } else {
            self.selected_index = 0;
        }
    }

    /// Toggle the favorite mark on the highlighted card
    pub fn toggle_favorite(&mut self) {
        if !self.favorites.remove(&self.selected_index) {
            self.favorites.insert(self.selected_index);
        }
    }

    /// Translate navigation into a flow event
    pub fn handle_action(&mut self, action: NavigationAction) -> Option<FlowEvent> {
        match action {
            NavigationAction::Left | NavigationAction::Up | NavigationAction::Previous => {
                self.select_previous()
            }
            NavigationAction::Right | NavigationAction::Down | NavigationAction::Next => {
                self.select_next()
            }
            NavigationAction::Favorite => self.toggle_favorite(),
            NavigationAction::Select => {
                return self.selected_option().cloned().map(FlowEvent::Select);
            }
            _ => {}
        }
        None
    }

    /// Render the options screen
    pub fn render(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(12),   // Cards
                Constraint::Length(3), // Help text
            ])
            .split(size);

        let title = Paragraph::new("Choose Our Perfect Date")
            .style(
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightMagenta)),
            );
        f.render_widget(title, chunks[0]);

        self.render_cards(f, chunks[1]);
        self.render_help(f, chunks[2]);
    }

    fn render_cards(&self, f: &mut Frame, area: Rect) {
        if self.options.is_empty() {
            return;
        }

        let share = 100 / self.options.len() as u16;
        let constraints: Vec<Constraint> = self
            .options
            .iter()
            .map(|_| Constraint::Percentage(share))
            .collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (index, (option, column)) in self.options.iter().zip(columns.iter()).enumerate() {
            let highlighted = index == self.selected_index;
            let accent = if highlighted { Color::LightMagenta } else { Color::Gray };
            let label = Style::default().fg(Color::Yellow);

            let mut title = format!(" {} ", index + 1);
            if self.is_favorite(index) {
                title.push_str("♥ ");
            }

            let text = vec![
                Line::from(Span::styled(
                    option.title.as_str(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(option.description.as_str()),
                Line::from(""),
                Line::from(vec![Span::styled("When: ", label), Span::raw(option.time.as_str())]),
                Line::from(vec![
                    Span::styled("Where: ", label),
                    Span::raw(option.location.as_str()),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    format!("\"{}\"", option.note),
                    Style::default().add_modifier(Modifier::ITALIC),
                )),
            ];

            let mut block = Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(accent));
            if highlighted {
                block = block.border_type(BorderType::Thick);
            }

            let card = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
            f.render_widget(card, *column);
        }
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let key = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let help_text = vec![Line::from(vec![
            Span::styled("←→", key),
            Span::raw(" Navigate  "),
            Span::styled("F", key),
            Span::raw(" Favorite  "),
            Span::styled("Enter", key),
            Span::raw(" Choose  "),
            Span::styled("Q", key),
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

impl Default for OptionsScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_options_screen_creation() {
        let screen = OptionsScreen::new();
        assert_eq!(screen.options().len(), 3);
        assert_eq!(screen.selected_index(), 0);
        assert!(!screen.is_favorite(0));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut screen = OptionsScreen::new();

        screen.select_previous();
        assert_eq!(screen.selected_index(), 2);

        screen.select_next();
        assert_eq!(screen.selected_index(), 0);

        screen.handle_action(NavigationAction::Right);
        screen.handle_action(NavigationAction::Down);
        assert_eq!(screen.selected_index(), 2);
        screen.handle_action(NavigationAction::Next);
        assert_eq!(screen.selected_index(), 0);
    }

    #[test]
    fn test_favorite_toggle() {
        let mut screen = OptionsScreen::new();
        screen.select_next();
        assert_eq!(screen.handle_action(NavigationAction::Favorite), None);
        assert!(screen.is_favorite(1));
        screen.toggle_favorite();
        assert!(!screen.is_favorite(1));
    }

    #[test]
    fn test_select_emits_highlighted_option() {
        let mut screen = OptionsScreen::new();
        screen.select_next();
        let expected = catalog().remove(1);
        assert_eq!(
            screen.handle_action(NavigationAction::Select),
            Some(FlowEvent::Select(expected))
        );
    }

    #[test]
    fn test_empty_options_never_select() {
        let mut screen = OptionsScreen::with_options(Vec::new());
        screen.select_next();
        screen.select_previous();
        assert_eq!(screen.handle_action(NavigationAction::Select), None);
    }

    #[test]
    fn test_render_lists_every_title() {
        let mut terminal = Terminal::new(TestBackend::new(150, 24)).unwrap();
        let mut screen = OptionsScreen::new();
        terminal.draw(|f| screen.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Choose Our Perfect Date"));
        for option in screen.options() {
            assert!(text.contains(&option.title), "missing {}", option.title);
        }
    }
}
