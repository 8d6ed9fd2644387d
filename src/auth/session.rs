//! Session token payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access/refresh token pair stored in a token store.
///
/// A session without a refresh token can still authenticate requests, but
/// an authorization failure is then terminal: there is nothing to exchange
/// for a new access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub obtained_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            obtained_at: Some(Utc::now()),
        }
    }
}
