use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::session::Session;
use crate::services::session_store::{SessionStore, StoreError};

/// The client's single active session id, mirrored to the local store.
///
/// Shared by reference with the HTTP layer: the outbound interceptor reads it,
/// the inbound interceptor clears it on 401.
pub struct SessionState {
    store: Arc<dyn SessionStore>,
    session_id: RwLock<Option<String>>,
}

impl SessionState {
    /// Initialise from whatever the store holds. An unreadable store starts
    /// the client logged out.
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let session_id = match store.get() {
            Ok(Some(stored)) => {
                tracing::debug!("Restored persisted session");
                Some(stored.session_id)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted session, starting logged out");
                None
            }
        };
        Self {
            store,
            session_id: RwLock::new(session_id),
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_id.read().is_some()
    }

    /// Persist and adopt a freshly started session, replacing any previous one.
    pub fn establish(&self, session: &Session) -> Result<(), StoreError> {
        self.store
            .put(&session.session_id, &session.encrypted_credentials)?;
        *self.session_id.write() = Some(session.session_id.clone());
        Ok(())
    }

    /// Drop the in-memory id and clear the store. Never fails; a store error
    /// is logged and the client is logged out regardless.
    pub fn invalidate(&self) {
        self.session_id.write().take();
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear persisted session");
        }
    }
}
