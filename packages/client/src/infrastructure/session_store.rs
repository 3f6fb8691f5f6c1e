//! Durable session identity storage.
//!
//! The active identity is cached in a JSON file keyed by a fixed name and
//! rehydrated on load: absence means "logged out", presence means "resume
//! session". Components never read this store directly; the CLI boundary
//! loads it once on startup and hands `Identity` values down.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Identity;

/// File name used under the state directory, the `currentUser` key.
pub const SESSION_FILE_NAME: &str = "current_user.json";

/// Persisted session payload
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    email: String,
}

/// Session store errors
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file corrupt: {0}")]
    Corrupt(String),
}

/// File-backed store for the active identity.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at the given state directory.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(SESSION_FILE_NAME),
        }
    }

    /// Read the cached identity. `None` means logged out.
    pub fn load(&self) -> Result<Option<Identity>, SessionStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: StoredSession =
            serde_json::from_str(&raw).map_err(|e| SessionStoreError::Corrupt(e.to_string()))?;
        let identity = Identity::new(session.email)
            .map_err(|e| SessionStoreError::Corrupt(e.to_string()))?;
        Ok(Some(identity))
    }

    /// Cache the identity (login).
    pub fn save(&self, identity: &Identity) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let session = StoredSession {
            email: identity.as_str().to_string(),
        };
        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| SessionStoreError::Corrupt(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("Session saved for '{}'", identity);
        Ok(())
    }

    /// Forget the cached identity (logout). Idempotent.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
