use std::path::PathBuf;

use quiz_core::model::QUESTION_DURATION_SECS;
use thiserror::Error;

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {raw:?}")]
    InvalidSeconds { var: &'static str, raw: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Settings read from the environment (and `.env`). CLI flags override these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON catalog to load instead of the built-in one.
    pub content_path: Option<PathBuf>,
    pub question_secs: u32,
    /// Topic to start without prompting.
    pub topic: Option<String>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_path: None,
            question_secs: QUESTION_DURATION_SECS,
            topic: None,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read `QUIZ_*` and `RUST_LOG`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("QUIZ_CONTENT_PATH") {
            if raw.trim().is_empty() {
                return Err(ConfigError::Empty {
                    var: "QUIZ_CONTENT_PATH",
                });
            }
            config.content_path = Some(PathBuf::from(raw.trim()));
        }

        if let Some(raw) = lookup("QUIZ_QUESTION_SECONDS") {
            config.question_secs = parse_seconds(&raw).ok_or(ConfigError::InvalidSeconds {
                var: "QUIZ_QUESTION_SECONDS",
                raw,
            })?;
        }

        config.topic = lookup("QUIZ_TOPIC")
            .map(|raw| raw.trim().to_owned())
            .filter(|topic| !topic.is_empty());

        if let Some(filter) = lookup("RUST_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

/// Parse a strictly positive second count.
pub fn parse_seconds(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|secs| *secs > 0)
}
