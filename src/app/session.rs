//! One run of the flow, independent of the terminal
//!
//! Owns the step controller and every screen, routes key presses to the
//! screen of the current step, and runs export and email work on spawned
//! tasks whose results come back over a channel.

use super::screens::{
    CelebrationCommand, CelebrationScreen, LandingScreen, OptionsScreen, ParticleField,
    QuestionScreen,
};
use super::state::{key_to_navigation, FlowController, NavigationAction, Step, Transition};
use crate::config::AppConfig;
use crate::mail::{DeliveryReceipt, DeliveryTransport, Emailer};
use crate::ticket::{ExportOutcome, ImageFetcher, TicketExporter};
use crate::{DateQuestError, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Result of a background task
#[derive(Debug)]
pub enum TaskResult {
    Exported(ExportOutcome),
    Emailed(Result<DeliveryReceipt>),
}

/// Flow session state
pub struct Session<F, T> {
    flow: FlowController,
    landing: LandingScreen,
    question: QuestionScreen,
    options: OptionsScreen,
    celebration: CelebrationScreen,
    petals: ParticleField,
    exporter: Arc<TicketExporter<F>>,
    emailer: Option<Arc<Emailer<T>>>,
    /// Why email is unavailable, when it is
    email_unavailable: Option<String>,
    task_tx: mpsc::Sender<TaskResult>,
    task_rx: mpsc::Receiver<TaskResult>,
    last_area: Rect,
    should_quit: bool,
}

impl<F, T> Session<F, T>
where
    F: ImageFetcher + 'static,
    T: DeliveryTransport + 'static,
{
    /// Create a session. A failed emailer only disables email; the error is
    /// shown when the user tries to send.
    pub fn new(config: &AppConfig, exporter: TicketExporter<F>, emailer: Result<Emailer<T>>) -> Self {
        let (emailer, email_unavailable) = match emailer {
            Ok(emailer) => (Some(Arc::new(emailer)), None),
            Err(err) => {
                warn!(error = %err, "email disabled");
                let reason = match err {
                    DateQuestError::ConfigError(msg) => msg,
                    other => other.to_string(),
                };
                (None, Some(reason))
            }
        };
        let (task_tx, task_rx) = mpsc::channel(16);

        Self {
            flow: FlowController::new(),
            landing: LandingScreen::new(config.recipient_name.clone()),
            question: QuestionScreen::new(),
            options: OptionsScreen::new(),
            celebration: CelebrationScreen::new(exporter.issued()),
            petals: ParticleField::petals(rand::random()),
            exporter: Arc::new(exporter),
            emailer,
            email_unavailable,
            task_tx,
            task_rx,
            last_area: Rect::default(),
            should_quit: false,
        }
    }

    pub fn step(&self) -> Step {
        self.flow.step()
    }

    pub fn flow(&self) -> &FlowController {
        &self.flow
    }

    pub fn question(&self) -> &QuestionScreen {
        &self.question
    }

    pub fn options(&self) -> &OptionsScreen {
        &self.options
    }

    pub fn celebration(&self) -> &CelebrationScreen {
        &self.celebration
    }

    /// Check whether email can be sent at all
    pub fn email_available(&self) -> bool {
        self.emailer.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = key_to_navigation(key);
        let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        let typing = self.flow.step() == Step::Celebration && self.celebration.captures_text();

        if ctrl_c || (action == NavigationAction::Quit && !typing) {
            info!(step = ?self.flow.step(), "quit requested");
            self.quit();
            return;
        }

        let event = match self.flow.step() {
            Step::Landing => self.landing.handle_action(action),
            Step::Question => self.question.handle_action(action),
            Step::Options => self.options.handle_action(action),
            Step::Celebration => {
                if let Some(command) = self.celebration.handle_key(key) {
                    self.run_command(command);
                }
                None
            }
        };

        if let Some(event) = event {
            if self.flow.dispatch(event) == Transition::Advanced(Step::Celebration) {
                if let Some(selection) = self.flow.selection() {
                    self.celebration.enter(selection.clone());
                }
            }
        }
    }

    fn run_command(&mut self, command: CelebrationCommand) {
        let Some(selection) = self.flow.selection().cloned() else {
            debug!(?command, "no selection, command dropped");
            return;
        };

        match command {
            CelebrationCommand::Export => {
                let exporter = self.exporter.clone();
                let tx = self.task_tx.clone();
                tokio::spawn(async move {
                    let outcome = exporter.export_png(&selection).await;
                    let _ = tx.send(TaskResult::Exported(outcome)).await;
                });
            }
            CelebrationCommand::SendEmail(recipient) => match &self.emailer {
                Some(emailer) => {
                    let emailer = emailer.clone();
                    let exporter = self.exporter.clone();
                    let tx = self.task_tx.clone();
                    tokio::spawn(async move {
                        let result = emailer.submit_ticket(&exporter, &recipient, &selection).await;
                        let _ = tx.send(TaskResult::Emailed(result)).await;
                    });
                }
                None => {
                    let reason = self.email_unavailable.clone().unwrap_or_default();
                    self.celebration
                        .complete_email(Err(DateQuestError::ConfigError(reason)));
                }
            },
        }
    }

    fn apply(&mut self, result: TaskResult) {
        match result {
            TaskResult::Exported(outcome) => self.celebration.complete_export(outcome),
            TaskResult::Emailed(result) => {
                if let Err(err) = &result {
                    warn!(error = %err, "ticket email failed");
                }
                self.celebration.complete_email(result);
            }
        }
    }

    /// Apply every finished task without waiting
    pub fn poll_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            self.apply(result);
        }
    }

    /// Wait for the next task to finish and apply it
    pub async fn next_task(&mut self) {
        if let Some(result) = self.task_rx.recv().await {
            self.apply(result);
        }
    }

    /// Advance animations
    pub fn tick(&mut self) {
        self.petals.tick(self.last_area);
        match self.flow.step() {
            Step::Landing => self.landing.tick(),
            Step::Celebration => self.celebration.tick(),
            _ => {}
        }
    }

    /// Draw the current step
    pub fn draw(&mut self, f: &mut Frame) {
        self.last_area = f.size();
        self.petals.render(f.buffer_mut());

        match self.flow.step() {
            Step::Landing => self.landing.render(f),
            Step::Question => self.question.render(f),
            Step::Options => self.options.render(f),
            Step::Celebration => self.celebration.render(f),
        }
    }
}
