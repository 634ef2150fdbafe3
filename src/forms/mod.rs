//! Landing form: credentials plus automation settings, validated before any
//! request leaves the client.

use tracing::info;

use crate::models::automation::{AutomationConfig, AutomationStarted, Category};
use crate::models::credentials::{Credentials, MIN_SESSION_PASSWORD_LEN};
use crate::models::session::Session;
use crate::models::validation::FieldErrors;
use crate::services::api::{ApiError, AutomationApi};

#[derive(Debug, Clone, Default)]
pub struct LandingForm {
    pub pinterest_token: String,
    pub amazon_tag: String,
    pub session_password: String,
    pub config: AutomationConfig,
}

/// Result of a successful submit: the new session and the queued job.
#[derive(Debug, Clone)]
pub struct Submission {
    pub session: Session,
    pub job: AutomationStarted,
}

impl LandingForm {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.pinterest_token.trim(),
            self.amazon_tag.trim(),
            self.session_password.clone(),
        )
    }

    /// Flip a category checkbox.
    pub fn toggle_category(&mut self, category: Category) {
        if !self.config.categories.remove(&category) {
            self.config.categories.insert(category);
        }
    }

    /// Inline, per-field errors. No network access.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.pinterest_token.trim().is_empty() {
            errors.insert("pinterest_token", "Pinterest access token is required");
        }
        if self.amazon_tag.trim().is_empty() {
            errors.insert("amazon_tag", "Amazon associate tag is required");
        }
        if self.session_password.chars().count() < MIN_SESSION_PASSWORD_LEN {
            errors.insert(
                "session_password",
                format!("Password must be at least {MIN_SESSION_PASSWORD_LEN} characters"),
            );
        }
        if self.config.categories.is_empty() {
            errors.insert("categories", "Select at least one category");
        }
        if let Err(config_errors) = self.config.check() {
            for (field, message) in config_errors.iter() {
                errors.insert(field, message);
            }
        }

        errors.into_result()
    }

    /// Validate, start a session, then start the automation job.
    pub async fn submit(&self, api: &AutomationApi) -> Result<Submission, ApiError> {
        self.validate().map_err(ApiError::validation)?;

        let credentials = self.credentials();
        let session = api.start_session(&credentials).await?;
        let job = api.start_automation(&credentials, &self.config).await?;

        info!(job_id = %job.job_id, "Landing form submitted");
        Ok(Submission { session, job })
    }
}
