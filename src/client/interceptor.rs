use std::sync::{Arc, Mutex};

use reqwest::{RequestBuilder, StatusCode, Url};

use super::session::SessionExpiry;
use super::store::CredentialStore;

pub const LOGIN_PATH: &str = "/login";

/// Where the front end currently is, and how to move it.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// Navigator for front ends without a router: remembers the path and every jump.
pub struct HeadlessNavigator {
    path: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl HeadlessNavigator {
    pub fn new(start: &str) -> Self {
        Self {
            path: Mutex::new(start.to_string()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every path passed to `navigate`, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for HeadlessNavigator {
    fn current_path(&self) -> String {
        self.path
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn navigate(&self, path: &str) {
        *self.path.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = path.to_string();
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}

/// Attaches the bearer token to outgoing requests and reacts to 401 answers
/// from the tracked API origin by dropping the session.
pub struct AuthInterceptor {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    session: Option<SessionExpiry>,
    origin: Option<Url>,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            session: None,
            origin: None,
        }
    }

    pub fn with_session(mut self, session: SessionExpiry) -> Self {
        self.session = Some(session);
        self
    }

    /// Set by `ApiClient::new` from its base URL.
    pub(crate) fn track_origin(&mut self, base: &Url) {
        self.origin = Some(base.clone());
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn tracks(&self, url: &Url) -> bool {
        match &self.origin {
            Some(origin) => {
                origin.scheme() == url.scheme()
                    && origin.host_str() == url.host_str()
                    && origin.port_or_known_default() == url.port_or_known_default()
            }
            None => url.path().starts_with("/api"),
        }
    }

    /// Returns true when the response ended the session.
    pub fn inspect(&self, status: StatusCode, url: &Url) -> bool {
        if status != StatusCode::UNAUTHORIZED || !self.tracks(url) {
            return false;
        }

        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear stored credentials: {e}");
        }
        if let Some(session) = &self.session {
            session.expire();
        }

        if !self.navigator.current_path().contains(LOGIN_PATH) {
            self.navigator.navigate(LOGIN_PATH);
        }

        tracing::info!(url = %url, "Received 401, session cleared");
        true
    }
}
