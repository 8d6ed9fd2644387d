//! Single-flight token refresh with FIFO replay of queued requests.

use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::session::Session;
use super::store::TokenStore;
use crate::error::{BunkhouseError, Result};

/// Hook invoked when the session is invalidated (refresh token missing or
/// rejected). Fires once per failed refresh, not once per affected request.
pub type ForceLogoutHook = Arc<dyn Fn() + Send + Sync>;

/// Requests that hit an authorization failure while a refresh is already in
/// flight park here. Each waiter is resolved with the new access token or
/// rejected, exactly once.
type Waiter = oneshot::Sender<Option<String>>;

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// Coordinates token refresh for an [`ApiClient`](crate::client::ApiClient).
///
/// However many requests fail with an authorization error at once, at most
/// one refresh exchange is in flight: the first failure becomes the owner
/// and performs `POST <refresh_url>`; the rest queue in arrival order and
/// share the outcome. On success every queued caller receives the new
/// access token and replays its own request; on failure the store is
/// cleared, the force-logout hook fires once, and every caller gets
/// [`BunkhouseError::AuthExpired`].
///
/// Constructed once per client and shared by `Arc`; the state mutex is
/// never held across an await point.
pub struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: String,
    store: Arc<dyn TokenStore>,
    state: Mutex<RefreshState>,
    logout_hook: RwLock<Option<ForceLogoutHook>>,
}

impl RefreshCoordinator {
    pub fn new(http: reqwest::Client, refresh_url: String, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            refresh_url,
            store,
            state: Mutex::new(RefreshState::Idle),
            logout_hook: RwLock::new(None),
        }
    }

    /// Register the hook fired when the session is forcibly invalidated.
    pub fn set_force_logout(&self, hook: ForceLogoutHook) {
        *self
            .logout_hook
            .write()
            .expect("logout hook lock poisoned") = Some(hook);
    }

    /// Handle an authorization failure for a request that has not been
    /// replayed yet. Returns the access token to replay with, or
    /// [`BunkhouseError::AuthExpired`] if the session cannot be recovered.
    pub async fn handle_auth_failure(&self) -> Result<String> {
        let refresh_token = match self.store.load()? {
            Some(Session {
                refresh_token: Some(token),
                ..
            }) => token,
            _ => return Err(self.expire_session()),
        };

        // Join an in-flight exchange if one exists, otherwise own it. The
        // lock is released before any await.
        let waiter = {
            let mut state = self.state.lock().expect("refresh state lock poisoned");
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing {
                        waiters: Vec::new(),
                    };
                    None
                }
            }
        };

        if let Some(receiver) = waiter {
            return match receiver.await {
                Ok(Some(access)) => Ok(access),
                _ => Err(BunkhouseError::AuthExpired),
            };
        }

        let exchanged = self.exchange(&refresh_token).await;

        let waiters = {
            let mut state = self.state.lock().expect("refresh state lock poisoned");
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        match exchanged {
            Ok(access) => {
                tracing::debug!(waiters = waiters.len(), "token refresh succeeded");
                for waiter in waiters {
                    let _ = waiter.send(Some(access.clone()));
                }
                Ok(access)
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    waiters = waiters.len(),
                    "token refresh failed, expiring session"
                );
                let expired = self.expire_session();
                for waiter in waiters {
                    let _ = waiter.send(None);
                }
                Err(expired)
            }
        }
    }

    /// Invalidate the session: clear the store, fire the force-logout hook,
    /// and hand back the error to reject with.
    pub fn expire_session(&self) -> BunkhouseError {
        if let Err(error) = self.store.clear() {
            tracing::warn!(error = %error, "failed to clear token store");
        }
        let hook = self
            .logout_hook
            .read()
            .expect("logout hook lock poisoned")
            .clone();
        if let Some(hook) = hook {
            hook();
        }
        BunkhouseError::AuthExpired
    }

    /// Perform the refresh exchange. Any error here is internal: callers
    /// map it to [`BunkhouseError::AuthExpired`] after logging.
    async fn exchange(&self, refresh_token: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BunkhouseError::http(
                status.as_u16(),
                serde_json::Value::String(body),
            ));
        }
        let payload: RefreshResponse = response.json().await?;
        // Rotation is optional: keep the old refresh token unless the
        // server handed out a new one.
        let session = Session::new(
            payload.access.clone(),
            payload
                .refresh
                .or_else(|| Some(refresh_token.to_string())),
        );
        self.store.save(&session)?;
        Ok(payload.access)
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    refresh: Option<String>,
}
