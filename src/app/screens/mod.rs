//! TUI screen components
//!
//! One screen per flow step, plus the decorative particle effects drawn
//! behind them.

pub mod celebration;
pub mod landing;
pub mod options;
pub mod petals;
pub mod question;

pub use celebration::{
    CelebrationCommand, CelebrationScreen, EmailForm, ExportStatus, FormStatus, TicketAction,
};
pub use landing::LandingScreen;
pub use options::OptionsScreen;
pub use petals::{EffectKind, ParticleField};
pub use question::QuestionScreen;
