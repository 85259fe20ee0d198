//! Date ticket module
//!
//! The ticket card widget, its off-screen capture, image fetching, and
//! PNG export.

pub mod capture;
pub mod card;
pub mod export;
pub mod fetch;
pub mod font;

pub use capture::{capture_dimensions, capture_region, EXPORT_SCALE};
pub use card::{TicketCard, TICKET_HEIGHT, TICKET_WIDTH};
pub use export::{encode_png, ExportOutcome, TicketExporter};
pub use fetch::{HttpImageFetcher, ImageFetcher};
