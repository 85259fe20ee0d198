//! Celebration screen implementation
//!
//! Shows the date ticket for the chosen option with a confetti burst, and
//! offers to save the ticket as a PNG or email it. Export and delivery run
//! elsewhere; this screen only issues commands and displays their results.

use super::petals::ParticleField;
use crate::app::state::{key_to_navigation, NavigationAction};
use crate::error::{is_blocking, user_friendly_message};
use crate::mail::{validate_address, DeliveryReceipt};
use crate::models::DateOption;
use crate::ticket::{ExportOutcome, TicketCard, TICKET_HEIGHT, TICKET_WIDTH};
use crate::util::format_bytes;
use crate::{DateQuestError, Result};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::path::PathBuf;

/// Longest address the form accepts
const MAX_INPUT_LEN: usize = 254;

/// Available actions under the ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Save,
    Email,
}

impl TicketAction {
    /// Get all available actions
    pub fn all() -> Vec<Self> {
        vec![Self::Save, Self::Email]
    }

    /// Get display text for the action
    pub fn display_text(&self) -> &'static str {
        match self {
            Self::Save => "Save Ticket",
            Self::Email => "Email Ticket",
        }
    }
}

/// Work the screen asks the application to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CelebrationCommand {
    /// Capture the ticket and save it as a PNG
    Export,
    /// Email the ticket to this (already validated) address
    SendEmail(String),
}

/// Last export result shown in the status line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportStatus {
    #[default]
    Idle,
    Saving,
    Saved(PathBuf),
    Failed(String),
}

/// Email form status line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    /// Inline validation message
    Invalid(String),
    Sending,
    /// Success message
    Sent(String),
    /// Failure message; a blocking failure also raises the alert
    Failed(String),
}

/// Recipient input and submission state
#[derive(Debug, Default)]
pub struct EmailForm {
    open: bool,
    input: String,
    sending: bool,
    status: FormStatus,
    alert: Option<String>,
}

impl EmailForm {
    /// Create a closed, empty form
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    /// Message of the blocking alert, if one is shown
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the form; an in-flight send keeps going
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn push(&mut self, c: char) {
        if self.input.chars().count() < MAX_INPUT_LEN {
            self.input.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.input.pop();
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Try to submit the current input.
    ///
    /// Returns the address to send to, or `None` when a send is already in
    /// flight or the address is invalid.
    pub fn submit(&mut self) -> Option<String> {
        if self.sending {
            return None;
        }

        let recipient = self.input.trim().to_string();
        if !validate_address(&recipient) {
            self.status = FormStatus::Invalid("Please enter a valid email address".to_string());
            return None;
        }

        self.sending = true;
        self.status = FormStatus::Sending;
        Some(recipient)
    }

    /// Record the result of a submission
    pub fn complete(&mut self, result: Result<DeliveryReceipt>) {
        self.sending = false;
        match result {
            Ok(receipt) => {
                self.input.clear();
                self.status = FormStatus::Sent(match receipt.attachment_bytes {
                    Some(size) => format!(
                        "Ticket sent to {}! ({} attached)",
                        receipt.recipient,
                        format_bytes(size as u64)
                    ),
                    None => format!("Ticket sent to {}!", receipt.recipient),
                });
            }
            Err(DateQuestError::ValidationError(_)) => {
                self.status = FormStatus::Invalid("Please enter a valid email address".to_string());
            }
            Err(err) => {
                let message = user_friendly_message(&err);
                if is_blocking(&err) {
                    self.alert = Some(message.clone());
                }
                self.status = FormStatus::Failed(message);
            }
        }
    }
}

/// Celebration screen component
#[derive(Debug)]
pub struct CelebrationScreen {
    selection: Option<DateOption>,
    issued: NaiveDate,
    selected_action: TicketAction,
    export_status: ExportStatus,
    form: EmailForm,
    confetti: ParticleField,
    burst_pending: bool,
    last_area: Rect,
}

impl CelebrationScreen {
    /// Create the screen; `issued` is printed on the ticket
    pub fn new(issued: NaiveDate) -> Self {
        Self {
            selection: None,
            issued,
            selected_action: TicketAction::Save,
            export_status: ExportStatus::Idle,
            form: EmailForm::new(),
            confetti: ParticleField::confetti(rand::random()),
            burst_pending: false,
            last_area: Rect::default(),
        }
    }

    /// Show the ticket for `selection` and queue the confetti burst
    pub fn enter(&mut self, selection: DateOption) {
        self.selection = Some(selection);
        self.burst_pending = true;
    }

    pub fn selection(&self) -> Option<&DateOption> {
        self.selection.as_ref()
    }

    pub fn selected_action(&self) -> TicketAction {
        self.selected_action
    }

    pub fn export_status(&self) -> &ExportStatus {
        &self.export_status
    }

    pub fn form(&self) -> &EmailForm {
        &self.form
    }

    /// Check whether typed characters belong to the form or the alert
    pub fn captures_text(&self) -> bool {
        self.form.is_open() || self.form.alert().is_some()
    }

    /// Select next action
    pub fn select_next_action(&mut self) {
        let actions = TicketAction::all();
        let current_index = actions
            .iter()
            .position(|a| a == &self.selected_action)
            .unwrap_or(0);
        self.selected_action = actions[(current_index + 1) % actions.len()];
    }

    /// Select previous action
    pub fn select_previous_action(&mut self) {
        let actions = TicketAction::all();
        let current_index = actions
            .iter()
            .position(|a| a == &self.selected_action)
            .unwrap_or(0);
        let prev_index = if current_index == 0 {
            actions.len() - 1
        } else {
            current_index - 1
        };
        self.selected_action = actions[prev_index];
    }

    /// Record the result of an export
    pub fn complete_export(&mut self, outcome: ExportOutcome) {
        self.export_status = match outcome {
            ExportOutcome::Saved(path) => ExportStatus::Saved(path),
            ExportOutcome::Failed(reason) => ExportStatus::Failed(reason),
        };
    }

    /// Record the result of an email submission
    pub fn complete_email(&mut self, result: Result<DeliveryReceipt>) {
        self.form.complete(result);
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<CelebrationCommand> {
        if self.form.alert().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.form.dismiss_alert();
            }
            return None;
        }

        if self.form.is_open() {
            match key.code {
                KeyCode::Esc => self.form.close(),
                KeyCode::Enter => return self.form.submit().map(CelebrationCommand::SendEmail),
                KeyCode::Backspace => self.form.pop(),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.form.push(c)
                }
                _ => {}
            }
            return None;
        }

        match key_to_navigation(key) {
            NavigationAction::Left | NavigationAction::Up | NavigationAction::Previous => {
                self.select_previous_action()
            }
            NavigationAction::Right | NavigationAction::Down | NavigationAction::Next => {
                self.select_next_action()
            }
            NavigationAction::Select => match self.selected_action {
                TicketAction::Save if self.export_status != ExportStatus::Saving => {
                    self.export_status = ExportStatus::Saving;
                    return Some(CelebrationCommand::Export);
                }
                TicketAction::Save => {}
                TicketAction::Email => self.form.open(),
            },
            _ => {}
        }
        None
    }

    /// Advance the confetti
    pub fn tick(&mut self) {
        self.confetti.tick(self.last_area);
    }

    /// Render the celebration screen
    pub fn render(&mut self, f: &mut Frame) {
        let size = f.size();
        self.last_area = size;
        if self.burst_pending {
            self.confetti.burst(size);
            self.burst_pending = false;
        }
        self.confetti.render(f.buffer_mut());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Title
                Constraint::Length(TICKET_HEIGHT), // Ticket
                Constraint::Length(3),             // Actions
                Constraint::Length(1),             // Export status
                Constraint::Min(0),                // Email form
                Constraint::Length(3),             // Help text
            ])
            .split(size);

        let title = Paragraph::new("Yay! It's a Date! ♥")
            .style(
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        if let Some(selection) = &self.selection {
            let ticket_area = centered(chunks[1], TICKET_WIDTH, TICKET_HEIGHT);
            f.render_widget(Clear, ticket_area);
            f.render_widget(TicketCard::new(selection, self.issued), ticket_area);
        }

        self.render_actions(f, chunks[2]);
        self.render_export_status(f, chunks[3]);
        if self.form.is_open() {
            self.render_form(f, chunks[4]);
        }
        self.render_help(f, chunks[5]);

        if let Some(message) = self.form.alert() {
            render_alert(f, size, message);
        }
    }

    fn render_actions(&self, f: &mut Frame, area: Rect) {
        let actions_area = centered(area, 40, area.height);
        let action_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(actions_area);

        for (action, chunk) in TicketAction::all().into_iter().zip(action_chunks.iter()) {
            let selected = action == self.selected_action;
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let text = match action {
                TicketAction::Save if self.export_status == ExportStatus::Saving => "Saving...",
                TicketAction::Email if self.form.is_sending() => "Sending...",
                _ => action.display_text(),
            };

            let button = Paragraph::new(text)
                .style(style)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(if selected {
                            Style::default().fg(Color::LightMagenta)
                        } else {
                            Style::default().fg(Color::White)
                        }),
                );
            f.render_widget(button, *chunk);
        }
    }

    fn render_export_status(&self, f: &mut Frame, area: Rect) {
        let line = match &self.export_status {
            ExportStatus::Idle => return,
            ExportStatus::Saving => {
                Span::styled("Capturing ticket...", Style::default().fg(Color::Yellow))
            }
            ExportStatus::Saved(path) => Span::styled(
                format!("Ticket saved to {}", path.display()),
                Style::default().fg(Color::Green),
            ),
            ExportStatus::Failed(reason) => Span::styled(
                format!("Could not save ticket: {}", reason),
                Style::default().fg(Color::Red),
            ),
        };
        f.render_widget(Paragraph::new(Line::from(line)).alignment(Alignment::Center), area);
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let form_area = centered(area, 50, area.height.min(5));
        let status = match self.form.status() {
            FormStatus::Idle => Span::raw(""),
            FormStatus::Invalid(msg) | FormStatus::Failed(msg) => {
                Span::styled(msg.as_str(), Style::default().fg(Color::Red))
            }
            FormStatus::Sending => Span::styled("Sending...", Style::default().fg(Color::Yellow)),
            FormStatus::Sent(msg) => Span::styled(msg.as_str(), Style::default().fg(Color::Green)),
        };

        let text = vec![
            Line::from(vec![
                Span::styled("To: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.form.input()),
                Span::styled("▏", Style::default().fg(Color::LightMagenta)),
            ]),
            Line::from(status),
        ];

        let form = Paragraph::new(text).block(
            Block::default()
                .title(" Email Ticket ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::LightMagenta)),
        );
        f.render_widget(form, form_area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let key = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let spans = if self.form.is_open() {
            vec![
                Span::styled("Enter", key),
                Span::raw(" Send  "),
                Span::styled("Esc", key),
                Span::raw(" Close  "),
                Span::styled("Ctrl+C", key),
                Span::raw(" Quit"),
            ]
        } else {
            vec![
                Span::styled("←→", key),
                Span::raw(" Navigate  "),
                Span::styled("Enter", key),
                Span::raw(" Select  "),
                Span::styled("Q", key),
                Span::raw(" Quit"),
            ]
        };

        let help = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        f.render_widget(help, area);
    }
}

fn render_alert(f: &mut Frame, size: Rect, message: &str) {
    let area = centered(size, 50, 7);
    let text = vec![
        Line::from(""),
        Line::from(message),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to dismiss",
            Style::default().fg(Color::Yellow),
        )),
    ];
    let alert = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Oops ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(Clear, area);
    f.render_widget(alert, area);
}

/// A `width × height` rectangle centered in `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
