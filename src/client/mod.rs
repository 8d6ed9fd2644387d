//! Authenticated API client facade.

pub mod http;

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{RefreshCoordinator, Session, TokenStore};
use crate::config::BunkhouseConfig;
use crate::error::{BunkhouseError, Result};

const TOKEN_PATH: &str = "/token/";
const TOKEN_REFRESH_PATH: &str = "/token/refresh/";
const AUTH_FAILURE: u16 = 401;

/// Response envelope: HTTP status plus the JSON payload.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    /// Deserialize the payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// API client with transparent token refresh.
///
/// Every request carries `Authorization: Bearer <access>` when a session is
/// stored. An authorization failure triggers one refresh exchange (shared
/// across concurrent failures) and one replay; any other non-2xx status
/// surfaces as [`BunkhouseError::Http`] without touching the session.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use bunkhouse::auth::FileTokenStore;
/// use bunkhouse::client::ApiClient;
/// use bunkhouse::config::BunkhouseConfig;
///
/// # async fn example() -> bunkhouse::error::Result<()> {
/// let config = BunkhouseConfig::new("http://localhost:8000/api");
/// let client = ApiClient::new(config, Arc::new(FileTokenStore::new_default()))?
///     .with_force_logout(|| eprintln!("session expired, log in again"));
/// client.login("amrita", "hunter2").await?;
/// let rooms = client.get("/v1/rooms/").await?;
/// println!("{}", rooms.data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    refresh: Arc<RefreshCoordinator>,
}

impl ApiClient {
    pub fn new(config: BunkhouseConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let refresh = Arc::new(RefreshCoordinator::new(
            http.clone(),
            format!("{}{TOKEN_REFRESH_PATH}", config.base_url),
            store.clone(),
        ));
        Ok(Self {
            http,
            base_url: config.base_url,
            store,
            refresh,
        })
    }

    /// Register a hook fired whenever the session is forcibly invalidated
    /// (refresh token missing or rejected). Fires once per failed refresh
    /// regardless of how many requests were affected.
    pub fn with_force_logout(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.refresh.set_force_logout(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(Method::GET, path, None, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.execute(Method::POST, path, Some(serde_json::to_value(body)?), None)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.execute(Method::PUT, path, Some(serde_json::to_value(body)?), None)
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.execute(Method::PATCH, path, Some(serde_json::to_value(body)?), None)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(Method::DELETE, path, None, None).await
    }

    /// Issue a request through the authenticated pipeline. The verb methods
    /// delegate here; use it directly when extra headers are needed.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse> {
        let access = self.store.load()?.map(|session| session.access_token);
        let (status, data) = self
            .send(
                method.clone(),
                path,
                body.as_ref(),
                headers.as_ref(),
                access.as_deref(),
            )
            .await?;
        if status != AUTH_FAILURE {
            return Self::finish(status, data);
        }

        let access = self.refresh.handle_auth_failure().await?;
        tracing::debug!(path, "replaying request with refreshed access token");
        let (status, data) = self
            .send(method, path, body.as_ref(), headers.as_ref(), Some(&access))
            .await?;
        if status == AUTH_FAILURE {
            // The replayed token was rejected too; do not loop.
            return Err(self.refresh.expire_session());
        }
        Self::finish(status, data)
    }

    /// Log in with a username/password pair and persist the issued tokens.
    ///
    /// Talks to the token endpoint directly, outside the refresh pipeline:
    /// an invalid credential surfaces as `Http { status: 401 }`, not as a
    /// session expiry.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}{TOKEN_PATH}", self.base_url))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let (status, data) = http::json_body(response).await?;
        if !(200..300).contains(&status) {
            return Err(BunkhouseError::http(status, data));
        }
        let pair: TokenPair = serde_json::from_value(data)?;
        let session = Session::new(pair.access, Some(pair.refresh));
        self.store.save(&session)?;
        Ok(session)
    }

    /// Drop the stored session. Does not fire the force-logout hook; that
    /// hook reports involuntary invalidation only.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()
    }

    /// Read-only view of the stored session.
    pub fn session(&self) -> Result<Option<Session>> {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.load()?.is_some())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: Option<&HeaderMap>,
        access: Option<&str>,
    ) -> Result<(u16, Value)> {
        let url = format!("{}{}", self.base_url, path);
        let mut request_headers = http::bearer_headers(access);
        if let Some(extra) = headers {
            request_headers.extend(extra.clone());
        }
        let mut request = self.http.request(method, url).headers(request_headers);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        http::json_body(response).await
    }

    fn finish(status: u16, data: Value) -> Result<ApiResponse> {
        if (200..300).contains(&status) {
            Ok(ApiResponse { status, data })
        } else {
            Err(BunkhouseError::http(status, data))
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}
