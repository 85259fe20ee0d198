//! Configuration management module
//!
//! Handles loading and validation of the application configuration and
//! the email delivery credentials.

use crate::{DateQuestError, Result, APP_NAME, CONFIG_FILE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding `email.public_key`
pub const ENV_PUBLIC_KEY: &str = "DATEQUEST_EMAILJS_PUBLIC_KEY";
/// Environment variable overriding `email.service_id`
pub const ENV_SERVICE_ID: &str = "DATEQUEST_EMAILJS_SERVICE_ID";
/// Environment variable overriding `email.template_id`
pub const ENV_TEMPLATE_ID: &str = "DATEQUEST_EMAILJS_TEMPLATE_ID";

/// Name greeted on the landing screen when none is configured
pub const DEFAULT_RECIPIENT_NAME: &str = "Meowie";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name shown in the landing greeting
    pub recipient_name: String,
    /// Where `date-ticket.png` is saved; `None` means the user's download dir
    pub download_dir: Option<PathBuf>,
    /// Size budget for the emailed JPEG attachment, in kilobytes
    pub max_attachment_kb: u32,
    /// Timeout for fetching the ticket image, in seconds
    pub fetch_timeout_secs: u64,
    /// Email delivery settings
    pub email: EmailSettings,
}

/// Email delivery settings as read from file and environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub public_key: Option<String>,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    /// Subject line of the outgoing email
    pub subject: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recipient_name: DEFAULT_RECIPIENT_NAME.to_string(),
            download_dir: None,
            max_attachment_kb: 30,
            fetch_timeout_secs: 10,
            email: EmailSettings::default(),
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            public_key: None,
            service_id: None,
            template_id: None,
            subject: "Our Date Ticket".to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.recipient_name.trim().is_empty() {
            return Err(DateQuestError::ConfigError(
                "Recipient name must not be empty".to_string(),
            ));
        }

        if self.max_attachment_kb == 0 {
            return Err(DateQuestError::ConfigError(
                "Attachment budget must be greater than 0".to_string(),
            ));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(DateQuestError::ConfigError(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Set the greeting name
    pub fn with_recipient_name(mut self, name: impl Into<String>) -> Self {
        self.recipient_name = name.into();
        self
    }

    /// Set the download directory
    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = Some(dir);
        self
    }

    /// Set the email settings
    pub fn with_email(mut self, email: EmailSettings) -> Self {
        self.email = email;
        self
    }

    /// Timeout for image fetches
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Resolve the directory the ticket is saved into
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration from the standard config file location, then
    /// apply environment overrides.
    /// Returns default configuration if the file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file without env overrides
    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            DateQuestError::ConfigError(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            DateQuestError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Overlay email credentials from the environment.
    ///
    /// `lookup` is `std::env::var` in production; blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = pick(ENV_PUBLIC_KEY) {
            self.email.public_key = Some(value);
        }
        if let Some(value) = pick(ENV_SERVICE_ID) {
            self.email.service_id = Some(value);
        }
        if let Some(value) = pick(ENV_TEMPLATE_ID) {
            self.email.template_id = Some(value);
        }
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/datequest/datequest.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            DateQuestError::ConfigError("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.recipient_name, "Meowie");
        assert_eq!(config.max_attachment_kb, 30);
        assert!(config.email.public_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_file() {
        let text = r#"
            recipient_name = "Sam"

            [email]
            service_id = "service_123"
        "#;
        let config: AppConfig = toml::from_str(text).expect("Failed to parse");
        assert_eq!(config.recipient_name, "Sam");
        assert_eq!(config.email.service_id.as_deref(), Some("service_123"));
        assert_eq!(config.email.subject, "Our Date Ticket");
        assert_eq!(config.max_attachment_kb, 30);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AppConfig::default();
        config.max_attachment_kb = 0;
        assert!(matches!(config.validate(), Err(DateQuestError::ConfigError(_))));

        let mut config = AppConfig::default();
        config.fetch_timeout_secs = 0;
        assert!(config.validate().is_err());

        let config = AppConfig::default().with_recipient_name("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_PUBLIC_KEY, "pk_live"),
            (ENV_SERVICE_ID, "   "),
            (ENV_TEMPLATE_ID, "template_9"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.email.service_id = Some("from_file".to_string());
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.email.public_key.as_deref(), Some("pk_live"));
        assert_eq!(config.email.service_id.as_deref(), Some("from_file"));
        assert_eq!(config.email.template_id.as_deref(), Some("template_9"));
    }

    #[test]
    fn test_load_from_missing_and_present_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());

        fs::write(&path, "recipient_name = \"Alex\"\nmax_attachment_kb = 50\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.recipient_name, "Alex");
        assert_eq!(config.max_attachment_kb, 50);

        fs::write(&path, "max_attachment_kb = 0\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_capture_scale_key_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "capture_scale = 1\n").unwrap();

        // Exports always use the fixed 2x scale; the key is not a setting
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("capture_scale"));
    }

    #[test]
    fn test_config_file_path() {
        let path = AppConfig::config_file_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("datequest.toml"));
    }

    #[test]
    fn test_resolved_download_dir_prefers_configured() {
        let config = AppConfig::default().with_download_dir(PathBuf::from("/tmp/tickets"));
        assert_eq!(config.resolved_download_dir(), PathBuf::from("/tmp/tickets"));
    }
}
