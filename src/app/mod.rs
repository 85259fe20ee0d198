//! TUI application module
//!
//! Contains the terminal user interface components, the flow session and
//! the step controller.

pub mod app;
pub mod screens;
pub mod session;
pub mod state;
pub mod tui;

pub use app::App;
pub use screens::{CelebrationScreen, LandingScreen, OptionsScreen, QuestionScreen, TicketAction};
pub use session::{Session, TaskResult};
pub use state::{key_to_navigation, FlowController, FlowEvent, NavigationAction, Step, Transition};
pub use tui::{Tui, TuiEvent};
