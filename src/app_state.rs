use garde::Validate;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::dashboard::{Dashboard, Notification};
use crate::services::{
    api::AutomationApi,
    encryption::{CredentialCipher, EncryptionError},
    http::{HttpClient, HttpError},
    session_state::SessionState,
    session_store::{FileSessionStore, SessionStore},
};

/// Shared client state: one session, one transport, one API.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionState>,
    pub api: Arc<AutomationApi>,
}

impl AppState {
    /// Wire the client against an explicit session store.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, InitError> {
        config.validate()?;
        let session = Arc::new(SessionState::restore(store));

        let http = HttpClient::new(
            &config.api_base_url,
            config.request_timeout(),
            session.clone(),
        )?;

        let cipher = match config.credentials_key.as_deref() {
            Some(key) => Some(CredentialCipher::new(key)?),
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            session,
            api: Arc::new(AutomationApi::new(http, cipher)),
        })
    }

    /// Wire the client with the on-disk session store from the config.
    pub fn from_config(config: ClientConfig) -> Result<Self, InitError> {
        let store = Arc::new(FileSessionStore::new(&config.session_store_path));
        Self::new(config, store)
    }

    pub fn dashboard(&self) -> (Dashboard, mpsc::UnboundedReceiver<Notification>) {
        Dashboard::new(self.api.clone(), self.config.poll_interval())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] garde::Report),

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] HttpError),

    #[error("Credential cipher setup failed: {0}")]
    Encryption(#[from] EncryptionError),
}
