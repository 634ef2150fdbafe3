use garde::Validate;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Backend address compiled into the client; `API_BASE_URL` overrides it.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientConfig {
    /// Automation backend base URL (e.g., "https://pins.example.com")
    #[serde(default = "default_api_base_url")]
    #[garde(length(min = 1))]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    #[garde(range(min = 1))]
    pub request_timeout_secs: u64,

    /// Dashboard job-list refresh period in seconds
    #[serde(default = "default_poll_interval_secs")]
    #[garde(range(min = 1))]
    pub poll_interval_secs: u64,

    /// Location of the persisted session document
    #[serde(default = "default_session_store_path")]
    #[garde(skip)]
    pub session_store_path: PathBuf,

    /// AES-256-GCM key for local credential encryption (base64-encoded, 32 bytes).
    /// Only needed when the backend does not return an encrypted credentials blob.
    #[serde(default)]
    #[garde(skip)]
    pub credentials_key: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_session_store_path() -> PathBuf {
    PathBuf::from(".pin-automation/session.json")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            session_store_path: default_session_store_path(),
            credentials_key: None,
        }
    }
}

impl ClientConfig {
    /// Load from the environment (and `.env` if present), then check ranges.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}
