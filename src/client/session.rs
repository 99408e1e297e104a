use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use super::api::ApiClient;
use super::auth::AuthApi;
use super::error::ClientError;
use super::interceptor::Navigator;
use super::store::CredentialStore;
use crate::models::User;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// A stored token is being checked against the profile endpoint.
    Loading,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

/// Handle the interceptor uses to end the session when the server answers 401.
#[derive(Clone)]
pub struct SessionExpiry {
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionExpiry {
    pub fn expire(&self) {
        self.state.send_replace(SessionState::Unauthenticated);
    }
}

/// Current user and the loading flag, with login/logout.
pub struct AuthSession {
    state: Arc<watch::Sender<SessionState>>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Loading);
        Self {
            state: Arc::new(tx),
            store,
            navigator,
        }
    }

    pub fn expiry(&self) -> SessionExpiry {
        SessionExpiry {
            state: self.state.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().user().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    fn set(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn drop_credentials(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear stored credentials: {e}");
        }
    }

    /// Resolves the initial `Loading` state from whatever token is stored.
    pub async fn init(&self, api: &ApiClient) -> SessionState {
        self.set(SessionState::Loading);

        if self.store.token().is_none() {
            self.set(SessionState::Unauthenticated);
            return self.state();
        }

        match AuthApi::new(api).profile().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "Stored session is valid");
                if let Err(e) = self.store.save_user(&user) {
                    tracing::warn!("Failed to refresh stored user: {e}");
                }
                self.set(SessionState::Authenticated(user));
            }
            Err(e) => {
                tracing::info!("Stored session rejected: {e}");
                self.drop_credentials();
                self.set(SessionState::Unauthenticated);
            }
        }

        self.state()
    }

    pub async fn login(&self, api: &ApiClient, email: &str, senha: &str) -> Result<User, ClientError> {
        self.set(SessionState::Loading);

        let result = match AuthApi::new(api).login(email, senha).await {
            Ok(auth) => self
                .store
                .save(&auth.token, &auth.user)
                .map(|_| auth.user),
            Err(ClientError::SessionExpired(_)) => Err(ClientError::InvalidCredentials),
            Err(ClientError::Api { status, .. }) if status == reqwest::StatusCode::FORBIDDEN => {
                Err(ClientError::EmailNotVerified)
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(user) => self.set(SessionState::Authenticated(user.clone())),
            Err(_) => {
                // No token survives a failed login
                self.drop_credentials();
                self.set(SessionState::Unauthenticated);
            }
        }
        result
    }

    /// Verifying the email logs the user in with the token it returns.
    pub fn complete_verification(&self, token: &str, user: User) -> Result<(), ClientError> {
        self.store.save(token, &user)?;
        self.set(SessionState::Authenticated(user));
        Ok(())
    }

    pub fn logout(&self) {
        if let Some(user) = self.user() {
            tracing::info!(user_id = %user.id, "Logging out");
        }
        self.drop_credentials();
        self.set(SessionState::Unauthenticated);
        self.navigator.navigate("/");
    }

    pub fn permissions(&self) -> Permissions {
        Permissions { user: self.user() }
    }
}

/// Role checks for the current user.
#[derive(Debug, Clone)]
pub struct Permissions {
    user: Option<User>,
}

impl Permissions {
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn can_edit_dashboard(&self, created_by: Option<Uuid>) -> bool {
        match &self.user {
            Some(user) => user.is_admin() || created_by == Some(user.id),
            None => false,
        }
    }

    pub fn can_delete_dashboard(&self, created_by: Option<Uuid>) -> bool {
        self.can_edit_dashboard(created_by)
    }
}
