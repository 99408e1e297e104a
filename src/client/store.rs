use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::error::ClientError;
use crate::models::User;

/// The persisted pair: bearer token and the last known user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Synchronous key-value storage for the session credentials.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Credentials;
    fn store(&self, credentials: Credentials) -> Result<(), ClientError>;

    fn token(&self) -> Option<String> {
        self.load().auth_token
    }

    fn user(&self) -> Option<User> {
        self.load().user
    }

    fn save(&self, token: &str, user: &User) -> Result<(), ClientError> {
        self.store(Credentials {
            auth_token: Some(token.to_string()),
            user: Some(user.clone()),
        })
    }

    /// Replaces the cached user, keeping the token.
    fn save_user(&self, user: &User) -> Result<(), ClientError> {
        let mut current = self.load();
        current.user = Some(user.clone());
        self.store(current)
    }

    /// Removes both the token and the user.
    fn clear(&self) -> Result<(), ClientError> {
        self.store(Credentials::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Credentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Credentials {
        lock(&self.inner).clone()
    }

    fn store(&self, credentials: Credentials) -> Result<(), ClientError> {
        *lock(&self.inner) = credentials;
        Ok(())
    }
}

/// JSON file on disk, cached in memory. Writes go through a temp file and a rename.
pub struct FileStore {
    path: PathBuf,
    cache: Mutex<Credentials>,
}

impl FileStore {
    /// A missing file starts an empty store; an unreadable one is discarded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();

        let credentials = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable credentials file {}: {e}", path.display());
                Credentials::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Credentials::default(),
            Err(e) => {
                return Err(ClientError::Storage(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path,
            cache: Mutex::new(credentials),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec_pretty(credentials)
            .map_err(|e| ClientError::Storage(format!("encode: {e}")))?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| ClientError::Storage(format!("write {}: {e}", self.path.display())))
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Credentials {
        lock(&self.cache).clone()
    }

    fn store(&self, credentials: Credentials) -> Result<(), ClientError> {
        let mut cache = lock(&self.cache);
        self.persist(&credentials)?;
        *cache = credentials;
        Ok(())
    }
}
