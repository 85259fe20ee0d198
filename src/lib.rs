//! DATEQUEST - a terminal date proposal
//!
//! A four-step TUI flow (greeting, question, date picker, celebration)
//! ending in a date ticket that can be saved as a PNG or emailed.

use std::fmt;

pub mod app;
pub mod config;
pub mod mail;
pub mod models;
pub mod ticket;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum DateQuestError {
    /// I/O operation failed
    IoError(std::io::Error),
    /// Configuration loading, validation, or missing credentials
    ConfigError(String),
    /// Ticket capture failed (image fetch, decode, raster or encode)
    CaptureError(String),
    /// Recipient address rejected before any network attempt
    ValidationError(String),
    /// The delivery collaborator reported a failure
    DeliveryError(String),
    /// A submission is already in flight
    Busy(String),
    /// TUI rendering or interaction error
    TuiError(String),
}

impl fmt::Display for DateQuestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateQuestError::IoError(err) => write!(f, "I/O error: {}", err),
            DateQuestError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DateQuestError::CaptureError(msg) => write!(f, "Capture error: {}", msg),
            DateQuestError::ValidationError(msg) => write!(f, "Invalid input: {}", msg),
            DateQuestError::DeliveryError(msg) => write!(f, "Delivery error: {}", msg),
            DateQuestError::Busy(msg) => write!(f, "Busy: {}", msg),
            DateQuestError::TuiError(msg) => write!(f, "TUI error: {}", msg),
        }
    }
}

impl std::error::Error for DateQuestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DateQuestError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DateQuestError {
    fn from(err: std::io::Error) -> Self {
        DateQuestError::IoError(err)
    }
}

impl From<image::ImageError> for DateQuestError {
    fn from(err: image::ImageError) -> Self {
        DateQuestError::CaptureError(format!("Failed to encode image: {}", err))
    }
}

/// Result type alias for DATEQUEST operations
pub type Result<T> = std::result::Result<T, DateQuestError>;

/// Error handling utilities
pub mod error {
    use super::DateQuestError;

    /// Fallback text when the delivery collaborator gives no detail
    pub const GENERIC_DELIVERY_FAILURE: &str = "Failed to send email. Please try again.";

    /// Convert error to the message shown in the alert overlay
    pub fn user_friendly_message(error: &DateQuestError) -> String {
        match error {
            DateQuestError::ConfigError(msg) => {
                format!("Email is not configured: {}", msg)
            }
            DateQuestError::ValidationError(_) => {
                "Please enter a valid email address.".to_string()
            }
            DateQuestError::DeliveryError(msg) if msg.trim().is_empty() => {
                GENERIC_DELIVERY_FAILURE.to_string()
            }
            DateQuestError::DeliveryError(msg) => msg.trim().to_string(),
            DateQuestError::Busy(_) => "An email is already being sent.".to_string(),
            DateQuestError::CaptureError(_) => {
                "Could not capture the ticket image.".to_string()
            }
            _ => error.to_string(),
        }
    }

    /// Whether the error should interrupt the user with a blocking alert
    /// rather than an inline message
    pub fn is_blocking(error: &DateQuestError) -> bool {
        matches!(
            error,
            DateQuestError::ConfigError(_) | DateQuestError::DeliveryError(_)
        )
    }
}

/// Install the file-backed tracing subscriber.
///
/// The TUI owns stdout, so events go to `<data_dir>/datequest/datequest.log`.
/// Filtering follows `RUST_LOG` and defaults to `info`.
pub fn init_logging() -> Result<std::path::PathBuf> {
    use tracing_subscriber::EnvFilter;

    let dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| DateQuestError::ConfigError(format!("Failed to install logger: {}", e)))?;

    Ok(path)
}

// Common types and constants
pub const APP_NAME: &str = "datequest";
pub const CONFIG_FILE: &str = "datequest.toml";
pub const LOG_FILE: &str = "datequest.log";
pub const TICKET_FILE: &str = "date-ticket.png";
