//! Client configuration for reaching the coach endpoint.
//!
//! The streaming endpoint needs a base URL and a publishable client key.
//! Both can be supplied explicitly or read from the environment; a missing
//! value is a startup-time configuration error, not something the streaming
//! path recovers from.

use std::env;
use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Environment variable holding the backend base URL.
pub const BASE_URL_VAR: &str = "LEVELUP_BASE_URL";

/// Environment variable holding the publishable client key.
pub const PUBLISHABLE_KEY_VAR: &str = "LEVELUP_PUBLISHABLE_KEY";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a [`CoachClient`](crate::CoachClient).
#[derive(Debug, Clone)]
pub struct CoachConfig {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl CoachConfig {
    /// Creates a configuration from an explicit base URL and key.
    ///
    /// The base URL is validated and normalized to end with a trailing
    /// slash so endpoint paths can be appended directly.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let mut base_url = base_url.into();
        let api_key = api_key.into();

        if base_url.is_empty() {
            return Err(Error::config(
                "base URL must not be empty",
                Some("base_url".to_string()),
            ));
        }
        if api_key.is_empty() {
            return Err(Error::config(
                "publishable key must not be empty",
                Some("api_key".to_string()),
            ));
        }
        Url::parse(&base_url).map_err(|e| {
            Error::config(
                format!("invalid base URL: {e}"),
                Some("base_url".to_string()),
            )
        })?;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            base_url,
            api_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Creates a configuration from `LEVELUP_BASE_URL` and
    /// `LEVELUP_PUBLISHABLE_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(BASE_URL_VAR).map_err(|_| {
            Error::config(
                format!("{BASE_URL_VAR} environment variable not set"),
                Some("base_url".to_string()),
            )
        })?;
        let api_key = env::var(PUBLISHABLE_KEY_VAR).map_err(|_| {
            Error::config(
                format!("{PUBLISHABLE_KEY_VAR} environment variable not set"),
                Some("api_key".to_string()),
            )
        })?;
        Self::new(base_url, api_key)
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The normalized base URL, always ending with a slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The publishable client key sent as a bearer token.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slash() {
        let config = CoachConfig::new("https://backend.example.com", "pk_test").unwrap();
        assert_eq!(config.base_url(), "https://backend.example.com/");

        let config = CoachConfig::new("https://backend.example.com/", "pk_test").unwrap();
        assert_eq!(config.base_url(), "https://backend.example.com/");
    }

    #[test]
    fn rejects_missing_values() {
        let err = CoachConfig::new("", "pk_test").unwrap_err();
        assert!(err.is_config());

        let err = CoachConfig::new("https://backend.example.com", "").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn rejects_invalid_url() {
        let err = CoachConfig::new("not a url", "pk_test").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn timeout_defaults_and_overrides() {
        let config = CoachConfig::new("https://backend.example.com", "pk_test").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(60));

        let config = config.with_timeout(Duration::from_secs(30));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
