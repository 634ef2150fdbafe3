use serde::{Deserialize, Serialize};

/// A Pinterest board the automation may pin to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinterestBoard {
    pub id: String,
    pub name: String,
}

/// Server-issued session: bearer token plus cached board list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub encrypted_credentials: String,
    #[serde(default)]
    pub pinterest_boards: Vec<PinterestBoard>,
}

/// Reply to `POST /api/start-session`. The credentials blob is optional on the
/// wire; the client encrypts locally when the backend omits it.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub encrypted_credentials: Option<String>,
    #[serde(default)]
    pub pinterest_boards: Vec<PinterestBoard>,
}

/// What the local session store persists. Both keys travel together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub session_id: String,
    pub encrypted_credentials: String,
}
