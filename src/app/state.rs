//! Flow state management
//!
//! Holds the step controller that decides which screen is shown, and the
//! keyboard-to-navigation mapping shared by all screens.

use crate::models::DateOption;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

/// The four screens of the flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Greeting with a single continue button
    #[default]
    Landing,
    /// The proposal question
    Question,
    /// Date picker
    Options,
    /// Ticket screen, terminal
    Celebration,
}

impl Step {
    /// All steps in visiting order
    pub fn all() -> [Step; 4] {
        [Step::Landing, Step::Question, Step::Options, Step::Celebration]
    }

    /// Zero-based position in the flow
    pub fn index(&self) -> usize {
        match self {
            Step::Landing => 0,
            Step::Question => 1,
            Step::Options => 2,
            Step::Celebration => 3,
        }
    }
}

/// Events emitted by screens to request a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// Landing screen's continue button
    Continue,
    /// "Yes" on the question screen
    Accept,
    /// A date was picked on the options screen
    Select(DateOption),
}

/// Result of dispatching an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The controller moved to the given step
    Advanced(Step),
    /// The event does not apply to the current step; nothing changed
    Ignored,
}

/// Step controller, the single owner of the flow state.
///
/// The selection is present exactly when the step is `Celebration`.
#[derive(Debug, Default)]
pub struct FlowController {
    step: Step,
    selection: Option<DateOption>,
}

impl FlowController {
    /// Create a controller at the landing step
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current step
    pub fn step(&self) -> Step {
        self.step
    }

    /// Get the chosen date, if the flow reached the celebration
    pub fn selection(&self) -> Option<&DateOption> {
        self.selection.as_ref()
    }

    /// Apply an event. Out-of-turn events are ignored.
    pub fn dispatch(&mut self, event: FlowEvent) -> Transition {
        let next = match (self.step, event) {
            (Step::Landing, FlowEvent::Continue) => Step::Question,
            (Step::Question, FlowEvent::Accept) => Step::Options,
            (Step::Options, FlowEvent::Select(option)) => {
                info!(title = %option.title, "date selected");
                self.selection = Some(option);
                Step::Celebration
            }
            (step, event) => {
                debug!(?step, ?event, "ignoring out-of-turn flow event");
                return Transition::Ignored;
            }
        };

        info!(from = ?self.step, to = ?next, "flow advanced");
        self.step = next;
        Transition::Advanced(next)
    }
}

/// Navigation actions that can be triggered by keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
    /// Move selection up (arrow up, k)
    Up,
    /// Move selection down (arrow down, j)
    Down,
    /// Move selection left (arrow left, h)
    Left,
    /// Move selection right (arrow right, l)
    Right,
    /// Confirm selection (Enter, Space)
    Select,
    /// Close/cancel (Esc, Backspace)
    Back,
    /// Next item (Tab)
    Next,
    /// Previous item (Shift+Tab)
    Previous,
    /// Toggle favorite on the highlighted item (f)
    Favorite,
    /// Quit application (q, Q, Ctrl+C)
    Quit,
    /// No action
    None,
}

/// Convert keyboard event to navigation action
pub fn key_to_navigation(key: KeyEvent) -> NavigationAction {
    match key.code {
        // Quit keys
        KeyCode::Char('q') | KeyCode::Char('Q') => NavigationAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            NavigationAction::Quit
        }

        // Navigation keys
        KeyCode::Up | KeyCode::Char('k') => NavigationAction::Up,
        KeyCode::Down | KeyCode::Char('j') => NavigationAction::Down,
        KeyCode::Left | KeyCode::Char('h') => NavigationAction::Left,
        KeyCode::Right | KeyCode::Char('l') => NavigationAction::Right,

        // Selection and confirmation
        KeyCode::Enter | KeyCode::Char(' ') => NavigationAction::Select,

        // Back/cancel
        KeyCode::Esc | KeyCode::Backspace => NavigationAction::Back,

        KeyCode::Char('f') | KeyCode::Char('F') => NavigationAction::Favorite,

        // Tab navigation
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                NavigationAction::Previous
            } else {
                NavigationAction::Next
            }
        }
        KeyCode::BackTab => NavigationAction::Previous,

        _ => NavigationAction::None,
    }
}
