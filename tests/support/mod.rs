#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bunkhouse::auth::{Session, TokenStore};
use bunkhouse::client::ApiClient;
use bunkhouse::config::BunkhouseConfig;
use bunkhouse::error::Result;
use wiremock::MockServer;

#[derive(Default)]
pub struct InMemoryTokenStore {
    session: Mutex<Option<Session>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, session: Session) {
        *self.session.lock().expect("store lock poisoned") = Some(session);
    }

    pub fn get(&self) -> Option<Session> {
        self.session.lock().expect("store lock poisoned").clone()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.get())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().expect("store lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

pub fn session(access: &str, refresh: Option<&str>) -> Session {
    Session::new(access, refresh.map(str::to_string))
}

/// Counts force-logout invocations.
#[derive(Clone, Default)]
pub struct LogoutProbe {
    count: Arc<AtomicUsize>,
}

impl LogoutProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hook(&self) -> impl Fn() + Send + Sync + 'static {
        let count = self.count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

pub fn client(server: &MockServer, store: Arc<InMemoryTokenStore>) -> ApiClient {
    ApiClient::new(BunkhouseConfig::new(server.uri()), store).expect("build client")
}

pub fn client_with_probe(
    server: &MockServer,
    store: Arc<InMemoryTokenStore>,
    probe: &LogoutProbe,
) -> ApiClient {
    client(server, store).with_force_logout(probe.hook())
}

/// Matches requests that carry no Authorization header.
pub struct NoAuthorization;

impl wiremock::Match for NoAuthorization {
    fn matches(&self, request: &wiremock::Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}
