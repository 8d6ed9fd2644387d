//! Error types for Bunkhouse.

use thiserror::Error;

/// Primary error type for all Bunkhouse operations.
#[derive(Error, Debug)]
pub enum BunkhouseError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: serde_json::Value },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The session is no longer valid: the access token was rejected and
    /// could not be refreshed. The token store has been cleared and the
    /// force-logout hook (if any) has fired.
    #[error("Session expired")]
    AuthExpired,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token store error: {0}")]
    Store(String),
}

impl BunkhouseError {
    /// Create an HTTP error from a status code and response body.
    pub fn http(status: u16, body: serde_json::Value) -> Self {
        Self::Http { status, body }
    }

    /// Whether this error means the session is gone and the user must log
    /// in again.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    /// Whether this error carries the given HTTP status.
    pub fn has_status(&self, status: u16) -> bool {
        matches!(self, Self::Http { status: s, .. } if *s == status)
    }
}

impl From<toml::de::Error> for BunkhouseError {
    fn from(error: toml::de::Error) -> Self {
        Self::Store(error.to_string())
    }
}

impl From<toml::ser::Error> for BunkhouseError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Store(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BunkhouseError>;
