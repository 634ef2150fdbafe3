use garde::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum length of the password that protects the stored credentials blob.
pub const MIN_SESSION_PASSWORD_LEN: usize = 8;

/// Pinterest and Amazon credentials entered on the landing form.
///
/// Sent once to start a session; never persisted in cleartext.
#[derive(Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Credentials {
    #[garde(length(min = 1))]
    pub pinterest_token: String,

    #[garde(length(min = 1))]
    pub amazon_tag: String,

    #[garde(length(chars, min = 8))]
    pub session_password: String,
}

impl Credentials {
    pub fn new(
        pinterest_token: impl Into<String>,
        amazon_tag: impl Into<String>,
        session_password: impl Into<String>,
    ) -> Self {
        Self {
            pinterest_token: pinterest_token.into(),
            amazon_tag: amazon_tag.into(),
            session_password: session_password.into(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("pinterest_token", &"<redacted>")
            .field("amazon_tag", &self.amazon_tag)
            .field("session_password", &"<redacted>")
            .finish()
    }
}
