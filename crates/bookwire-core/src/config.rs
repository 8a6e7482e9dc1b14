use std::time::Duration;

use thiserror::Error;

/// Upstream connection settings, loaded once at process start and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL of the booking platform, without a trailing slash.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Rate-limit quota shared by every outbound call in the process.
    pub quota_window: Duration,
    pub quota_limit: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable '{name}' is required")]
    Missing { name: &'static str },
    #[error("environment variable '{name}' has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            quota_window: Duration::from_secs(1),
            quota_limit: 10,
        }
    }

    /// Reads `BOOKWIRE_BASE_URL` (required) and the optional
    /// `BOOKWIRE_CONNECT_TIMEOUT_MS`, `BOOKWIRE_READ_TIMEOUT_MS`,
    /// `BOOKWIRE_QUOTA_WINDOW_MS`, `BOOKWIRE_QUOTA_LIMIT` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("BOOKWIRE_BASE_URL").map_err(|_| ConfigError::Missing {
            name: "BOOKWIRE_BASE_URL",
        })?;

        let mut config = Self::new(base_url);
        if let Some(ms) = env_u64("BOOKWIRE_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("BOOKWIRE_READ_TIMEOUT_MS")? {
            config.read_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("BOOKWIRE_QUOTA_WINDOW_MS")? {
            config.quota_window = Duration::from_millis(ms);
        }
        if let Some(limit) = env_u64("BOOKWIRE_QUOTA_LIMIT")? {
            config.quota_limit = limit.min(u64::from(u32::MAX)) as u32;
        }
        Ok(config)
    }
}

fn env_u64(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
