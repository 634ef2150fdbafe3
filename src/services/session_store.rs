use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::session::StoredSession;

/// Durable key-value storage for the active session.
///
/// `session_id` and `encrypted_credentials` are written and cleared together.
/// No expiry is enforced here; a stale session is only discovered when the
/// backend answers 401.
pub trait SessionStore: Send + Sync {
    fn put(&self, session_id: &str, encrypted_credentials: &str) -> Result<(), StoreError>;

    fn get(&self) -> Result<Option<StoredSession>, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk document layout. Either key missing means no session.
#[derive(Serialize, Deserialize)]
struct SessionDocument {
    session_id: Option<String>,
    encrypted_credentials: Option<String>,
}

/// Session store backed by a small JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn put(&self, session_id: &str, encrypted_credentials: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let doc = SessionDocument {
            session_id: Some(session_id.to_string()),
            encrypted_credentials: Some(encrypted_credentials.to_string()),
        };
        let json = serde_json::to_string_pretty(&doc)?;

        // Replace atomically via rename.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn get(&self) -> Result<Option<StoredSession>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let doc: SessionDocument = serde_json::from_str(&raw)?;
        Ok(match (doc.session_id, doc.encrypted_credentials) {
            (Some(session_id), Some(encrypted_credentials)) => Some(StoredSession {
                session_id,
                encrypted_credentials,
            }),
            _ => None,
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-lifetime store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session_id: &str, encrypted_credentials: &str) -> Self {
        Self {
            inner: Mutex::new(Some(StoredSession {
                session_id: session_id.to_string(),
                encrypted_credentials: encrypted_credentials.to_string(),
            })),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, session_id: &str, encrypted_credentials: &str) -> Result<(), StoreError> {
        *self.inner.lock() = Some(StoredSession {
            session_id: session_id.to_string(),
            encrypted_credentials: encrypted_credentials.to_string(),
        });
        Ok(())
    }

    fn get(&self) -> Result<Option<StoredSession>, StoreError> {
        Ok(self.inner.lock().clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.inner.lock() = None;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session store document is malformed: {0}")]
    Serialize(#[from] serde_json::Error),
}
