//! Client configuration (explicit values layered over environment).

use std::time::Duration;

use crate::error::{BunkhouseError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("bunkhouse/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`ApiClient`](crate::client::ApiClient).
///
/// The base URL is the prefix every request path is appended to, e.g.
/// `https://hostel.example.edu/api`. A trailing slash is trimmed so paths
/// can always start with `/`.
#[derive(Debug, Clone)]
pub struct BunkhouseConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl BunkhouseConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Load from environment variables (`BUNKHOUSE_BASE_URL`,
    /// `BUNKHOUSE_TIMEOUT_SECS`), reading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base_url = std::env::var("BUNKHOUSE_BASE_URL").map_err(|_| {
            BunkhouseError::Configuration("BUNKHOUSE_BASE_URL is not set".to_string())
        })?;
        let mut config = Self::new(base_url);
        if let Ok(raw) = std::env::var("BUNKHOUSE_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                BunkhouseError::Configuration(format!(
                    "BUNKHOUSE_TIMEOUT_SECS is not a number: {raw}"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
