//! Ticket card widget
//!
//! The card is drawn both on the celebration screen and into the off-screen
//! buffer used for capture, so both always agree on layout.

use crate::models::DateOption;
use chrono::NaiveDate;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

/// Width of the ticket region in cells
pub const TICKET_WIDTH: u16 = 60;
/// Height of the ticket region in cells
pub const TICKET_HEIGHT: u16 = 14;

/// Card background; also the capture fill color
pub const PAPER: Color = Color::Rgb(255, 241, 242);
/// Border and accent color
pub const ROSE: Color = Color::Rgb(244, 63, 94);
/// Heading color
pub const ROSE_DARK: Color = Color::Rgb(190, 18, 60);
/// Body text color
pub const INK: Color = Color::Rgb(75, 85, 99);
/// Placeholder behind the picture
pub const PHOTO_BG: Color = Color::Rgb(254, 205, 211);

const IMAGE_COLUMNS: u16 = 20;

/// Widget drawing the date ticket for a selection
#[derive(Debug, Clone, Copy)]
pub struct TicketCard<'a> {
    option: &'a DateOption,
    issued: NaiveDate,
}

impl<'a> TicketCard<'a> {
    /// Create a card for the given selection
    pub fn new(option: &'a DateOption, issued: NaiveDate) -> Self {
        Self { option, issued }
    }

    /// The selection shown on this card
    pub fn option(&self) -> &DateOption {
        self.option
    }

    /// The full region a capture covers
    pub fn region() -> Rect {
        Rect::new(0, 0, TICKET_WIDTH, TICKET_HEIGHT)
    }

    /// Where the picture goes when the card is drawn into `area`
    pub fn image_area(area: Rect) -> Rect {
        Self::split(area).0
    }

    fn split(area: Rect) -> (Rect, Rect) {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(IMAGE_COLUMNS), // Picture
                Constraint::Length(1),             // Gutter
                Constraint::Min(10),               // Details
            ])
            .split(inner);
        (chunks[0], chunks[2])
    }

    fn details(&self) -> Vec<Line<'a>> {
        let label = Style::default().fg(ROSE).add_modifier(Modifier::BOLD);
        let body = Style::default().fg(INK);

        vec![
            Line::from(Span::styled(
                self.option.title.as_str(),
                Style::default().fg(ROSE_DARK).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("When:  ", label),
                Span::styled(self.option.time.as_str(), body),
            ]),
            Line::from(vec![
                Span::styled("Where: ", label),
                Span::styled(self.option.location.as_str(), body),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("\"{}\"", self.option.note),
                Style::default().fg(ROSE_DARK).add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Admit two ♥  ", label),
                Span::styled(format!("Issued {}", self.issued.format("%Y-%m-%d")), body),
            ]),
        ]
    }
}

impl Widget for TicketCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ROSE))
            .title(" Date Ticket ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(PAPER).fg(INK));
        block.render(area, buf);

        let (photo, text) = Self::split(area);

        let placeholder = Paragraph::new(vec![Line::from(""), Line::from("♥")])
            .alignment(Alignment::Center)
            .style(Style::default().bg(PHOTO_BG).fg(ROSE));
        placeholder.render(photo, buf);

        Paragraph::new(self.details())
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(PAPER))
            .render(text, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                text.push_str(buf.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_card_renders_selection_fields() {
        let option = catalog().remove(1);
        let issued = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        let mut buf = Buffer::empty(TicketCard::region());
        TicketCard::new(&option, issued).render(TicketCard::region(), &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Date Ticket"));
        assert!(text.contains("Evening at Tank Bund"));
        assert!(text.contains("Friday, 6:30 PM"));
        assert!(text.contains("Tank Bund, Hussain Sagar"));
        assert!(text.contains("Issued 2026-02-14"));

        // Rejoin the wrapped note from the details pane
        let (_, details) = TicketCard::split(TicketCard::region());
        let joined = (details.y..details.bottom())
            .map(|y| {
                (details.x..details.right())
                    .map(|x| buf.get(x, y).symbol())
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(" ");
        assert!(joined.contains(&format!("\"{}\"", option.note)));
    }

    #[test]
    fn test_image_area_is_inside_border() {
        let area = TicketCard::region();
        let photo = TicketCard::image_area(area);
        assert_eq!(photo.x, 1);
        assert_eq!(photo.y, 1);
        assert_eq!(photo.width, IMAGE_COLUMNS);
        assert_eq!(photo.height, TICKET_HEIGHT - 2);
    }

    #[test]
    fn test_image_area_follows_offset() {
        let area = Rect::new(10, 5, TICKET_WIDTH, TICKET_HEIGHT);
        let photo = TicketCard::image_area(area);
        assert_eq!((photo.x, photo.y), (11, 6));
    }
}
