//! Client configuration.
//!
//! Resolves the backend base URL and request timeout shared by every request
//! the client makes. Auth state lives in cookies and never in configuration.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "QUILL_API_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_base_url: String,
    /// Upper bound for a single HTTP exchange.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Build a config for an explicit base URL.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url.into())?,
            ..Self::default()
        })
    }

    /// Resolve the base URL from, in order: an explicit value, the
    /// [`API_URL_ENV`] value passed in, a stored profile value, and the local
    /// default.
    pub fn resolve_from(
        explicit: Option<String>,
        env_value: Option<String>,
        profile: Option<String>,
    ) -> Result<Self> {
        let chosen = normalize_text_option(explicit)
            .or_else(|| normalize_text_option(env_value))
            .or_else(|| normalize_text_option(profile));

        match chosen {
            Some(url) => Self::new(url),
            None => Ok(Self::default()),
        }
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Trim and validate a base URL, dropping trailing slashes.
pub fn normalize_base_url(raw: String) -> Result<String> {
    let Some(value) = normalize_text_option(Some(raw)) else {
        return Err(Error::Config("API base URL must not be empty".to_string()));
    };
    if !is_http_url(&value) {
        return Err(Error::Config(format!(
            "API base URL must include http:// or https:// (got '{value}')"
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}
