//! Application configuration structs
//!
//! Loads configuration from environment variables and config files.

use serde::Deserialize;
use std::env;
use std::time::Duration;

use gather_core::ChatId;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub reminder: ReminderConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Reminder scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    /// Chat that receives the group announcement for each claimed event
    pub announce_chat_id: i64,
    /// Base delay between scheduler cycles, in seconds
    #[serde(default = "default_base_interval_secs")]
    pub base_interval_secs: u64,
    /// Delay after a failed cycle, in seconds
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,
    /// How long before an event's date its reminder becomes due, in hours
    #[serde(default = "default_lead_hours")]
    pub lead_hours: u64,
    /// Upper bound for the random delay before each outbound send, in
    /// milliseconds
    #[serde(default = "default_send_jitter_max_ms")]
    pub send_jitter_max_ms: u64,
}

impl ReminderConfig {
    /// Scheduler configuration for the given announcement chat, with
    /// default timings
    pub fn for_chat(announce_chat_id: i64) -> Self {
        Self {
            announce_chat_id,
            base_interval_secs: default_base_interval_secs(),
            error_backoff_secs: default_error_backoff_secs(),
            lead_hours: default_lead_hours(),
            send_jitter_max_ms: default_send_jitter_max_ms(),
        }
    }

    pub fn announce_chat(&self) -> ChatId {
        ChatId::new(self.announce_chat_id)
    }

    pub fn base_interval(&self) -> Duration {
        Duration::from_secs(self.base_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn lead(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lead_hours as i64)
    }

    pub fn send_jitter_max(&self) -> Duration {
        Duration::from_millis(self.send_jitter_max_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "gather".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_base_interval_secs() -> u64 {
    900 // 15 minutes
}

fn default_error_backoff_secs() -> u64 {
    3600 // 1 hour
}

fn default_lead_hours() -> u64 {
    24
}

fn default_send_jitter_max_ms() -> u64 {
    30_000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
            },
            reminder: ReminderConfig {
                announce_chat_id: env::var("ANNOUNCE_CHAT_ID")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("ANNOUNCE_CHAT_ID"))?,
                base_interval_secs: env::var("REMINDER_BASE_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_base_interval_secs),
                error_backoff_secs: env::var("REMINDER_ERROR_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_error_backoff_secs),
                lead_hours: env::var("REMINDER_LEAD_HOURS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_lead_hours),
                send_jitter_max_ms: env::var("REMINDER_SEND_JITTER_MAX_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_send_jitter_max_ms),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
