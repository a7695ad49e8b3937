//! Error types for quill-core

use thiserror::Error;

/// Result type alias using quill-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quill-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Backend answered with a non-2xx status once retry logic was exhausted
    #[error("{message}")]
    Request { status: u16, message: String },

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client-side validation failure, raised before any request is sent
    #[error("{0}")]
    Validation(String),

    /// Session probe failed for an operation that needs a signed-in user
    #[error("Not signed in")]
    Unauthenticated,

    /// Endpoint answered 2xx without the JSON entity it should return
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session cookie persistence error
    #[error("Session storage error: {0}")]
    SessionStorage(String),
}

impl Error {
    /// HTTP status of a backend failure, if this is one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 401 the refresh flow could not resolve.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Request { status: 401, .. })
    }

    /// Message suitable for showing next to a form.
    ///
    /// Backend field-error maps (or bare lists) arrive serialized as the error
    /// message; for those the first entry's first message is shown instead of
    /// raw JSON.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        let parsed = serde_json::from_str::<serde_json::Value>(&message).ok();
        let first = match &parsed {
            Some(serde_json::Value::Object(fields)) => fields.values().next(),
            Some(serde_json::Value::Array(items)) => items.first(),
            _ => None,
        };
        match first {
            Some(serde_json::Value::Array(items)) => {
                if let Some(first) = items.first().filter(|item| is_truthy(item)) {
                    return match first {
                        serde_json::Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                }
            }
            Some(serde_json::Value::String(text)) => return text.clone(),
            _ => {}
        }
        message
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::String(text) => !text.is_empty(),
        serde_json::Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    }
}
