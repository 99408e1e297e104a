//! Session-aware client for the intranet API.
//!
//! The pieces fit together explicitly, there is no global state:
//!
//! ```no_run
//! # async fn demo() -> Result<(), intranet::client::ClientError> {
//! use std::sync::Arc;
//! use intranet::config::ClientConfig;
//! use intranet::client::{
//!     ApiClient, AuthInterceptor, AuthSession, FileStore, HeadlessNavigator,
//! };
//!
//! let store = Arc::new(FileStore::open("credentials.json")?);
//! let navigator = Arc::new(HeadlessNavigator::new("/"));
//! let session = AuthSession::new(store.clone(), navigator.clone());
//! let interceptor = AuthInterceptor::new(store, navigator).with_session(session.expiry());
//! let api = ApiClient::from_config(&ClientConfig::from_env(), interceptor)?;
//!
//! session.init(&api).await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod dashboards;
pub mod error;
pub mod interceptor;
pub mod organograma;
pub mod route_guard;
pub mod session;
pub mod store;

pub use api::{ApiClient, AuthMode};
pub use dashboards::{DashboardForm, DashboardService};
pub use error::ClientError;
pub use interceptor::{AuthInterceptor, HeadlessNavigator, Navigator, LOGIN_PATH};
pub use route_guard::GuardDecision;
pub use session::{AuthSession, Permissions, SessionExpiry, SessionState};
pub use store::{CredentialStore, Credentials, FileStore, MemoryStore};
