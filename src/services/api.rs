use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::automation::{AutomationConfig, AutomationStarted, StartAutomationRequest};
use crate::models::credentials::Credentials;
use crate::models::job::{JobList, JobStatus};
use crate::models::session::{Session, StartSessionResponse};
use crate::models::validation::FieldErrors;
use crate::services::encryption::CredentialCipher;
use crate::services::http::{HttpClient, HttpError};

const START_SESSION_FAILED: &str = "Failed to start session";
const START_AUTOMATION_FAILED: &str = "Failed to start automation";
const JOB_STATUS_FAILED: &str = "Failed to get job status";
const LIST_JOBS_FAILED: &str = "Failed to get jobs";
const CANCEL_JOB_FAILED: &str = "Failed to cancel job";
const PRIVACY_POLICY_FAILED: &str = "Failed to load privacy policy";
const HEALTH_CHECK_FAILED: &str = "Health check failed";

#[derive(Deserialize)]
struct PrivacyPolicyResponse {
    privacy_policy: String,
}

/// Typed operations against the automation backend.
///
/// Every operation is one request/response exchange and either returns the
/// typed result or a single [`ApiError`] with a human-readable message.
pub struct AutomationApi {
    http: HttpClient,
    cipher: Option<CredentialCipher>,
}

impl AutomationApi {
    pub fn new(http: HttpClient, cipher: Option<CredentialCipher>) -> Self {
        Self { http, cipher }
    }

    /// Advisory only: whether a session id is currently held. The backend
    /// still validates the bearer token on every call.
    pub fn is_authenticated(&self) -> bool {
        self.http.session().is_authenticated()
    }

    /// POST /api/start-session: exchange credentials for a session and
    /// adopt it locally.
    pub async fn start_session(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        if let Err(report) = garde::Validate::validate(credentials) {
            return Err(ApiError::validation(FieldErrors::from_report(&report)));
        }

        let response = self
            .http
            .send_json(Method::POST, &["api", "start-session"], credentials)
            .await
            .map_err(|e| ApiError::from_http(e, START_SESSION_FAILED))?;
        let body: StartSessionResponse = decode(response, START_SESSION_FAILED).await?;

        let encrypted_credentials = match (body.encrypted_credentials, &self.cipher) {
            (Some(blob), _) => blob,
            (None, Some(cipher)) => cipher.seal_credentials(credentials).map_err(|e| {
                ApiError::new(ErrorKind::Decode, START_SESSION_FAILED).with_source(e)
            })?,
            (None, None) => {
                return Err(ApiError::new(
                    ErrorKind::Decode,
                    "Backend did not return encrypted credentials and no local key is configured",
                ))
            }
        };

        let session = Session {
            session_id: body.session_id,
            encrypted_credentials,
            pinterest_boards: body.pinterest_boards,
        };
        self.http
            .session()
            .establish(&session)
            .map_err(|e| ApiError::new(ErrorKind::Storage, START_SESSION_FAILED).with_source(e))?;

        info!(
            boards = session.pinterest_boards.len(),
            "Automation session started"
        );
        Ok(session)
    }

    /// DELETE /api/session: best-effort logout. Local state is always
    /// cleared; a failed server notification is only logged.
    pub async fn end_session(&self) {
        if self.is_authenticated() {
            if let Err(e) = self.http.send(Method::DELETE, &["api", "session"]).await {
                warn!(error = %e, "Failed to end session on backend");
            }
        } else {
            debug!("No session held, skipping backend logout");
        }
        self.http.session().invalidate();
        info!("Automation session ended");
    }

    /// POST /api/start-automation: queue a new automation job.
    pub async fn start_automation(
        &self,
        credentials: &Credentials,
        config: &AutomationConfig,
    ) -> Result<AutomationStarted, ApiError> {
        let mut errors = FieldErrors::new();
        if let Err(report) = garde::Validate::validate(credentials) {
            errors.extend_report(&report);
        }
        if let Err(config_errors) = config.check() {
            for (field, message) in config_errors.iter() {
                errors.insert(field, message);
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let request = StartAutomationRequest {
            credentials,
            config,
        };
        let response = self
            .http
            .send_json(Method::POST, &["api", "start-automation"], &request)
            .await
            .map_err(|e| ApiError::from_http(e, START_AUTOMATION_FAILED))?;
        let started: AutomationStarted = decode(response, START_AUTOMATION_FAILED).await?;

        info!(
            job_id = %started.job_id,
            categories = config.categories.len(),
            "Automation job started"
        );
        Ok(started)
    }

    /// GET /api/job-status/{job_id}
    pub async fn get_job_status(&self, job_id: &str) -> Result<JobStatus, ApiError> {
        let response = self
            .http
            .send(Method::GET, &["api", "job-status", job_id])
            .await
            .map_err(|e| ApiError::from_http(e, JOB_STATUS_FAILED))?;
        decode(response, JOB_STATUS_FAILED).await
    }

    /// GET /api/jobs: all jobs for the current session, in backend order.
    pub async fn get_user_jobs(&self) -> Result<Vec<JobStatus>, ApiError> {
        let response = self
            .http
            .send(Method::GET, &["api", "jobs"])
            .await
            .map_err(|e| ApiError::from_http(e, LIST_JOBS_FAILED))?;
        let list: JobList = decode(response, LIST_JOBS_FAILED).await?;
        Ok(list.jobs)
    }

    /// DELETE /api/job/{job_id}
    pub async fn cancel_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.http
            .send(Method::DELETE, &["api", "job", job_id])
            .await
            .map_err(|e| ApiError::from_http(e, CANCEL_JOB_FAILED))?;
        info!(job_id = %job_id, "Job cancelled");
        Ok(())
    }

    /// GET /api/privacy-policy: raw policy text (markdown).
    pub async fn get_privacy_policy(&self) -> Result<String, ApiError> {
        let response = self
            .http
            .send(Method::GET, &["api", "privacy-policy"])
            .await
            .map_err(|e| ApiError::from_http(e, PRIVACY_POLICY_FAILED))?;
        let body: PrivacyPolicyResponse = decode(response, PRIVACY_POLICY_FAILED).await?;
        Ok(body.privacy_policy)
    }

    /// GET /api/health: opaque diagnostic payload.
    pub async fn health_check(&self) -> Result<serde_json::Value, ApiError> {
        let response = self
            .http
            .send(Method::GET, &["api", "health"])
            .await
            .map_err(|e| ApiError::from_http(e, HEALTH_CHECK_FAILED))?;
        decode(response, HEALTH_CHECK_FAILED).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::new(ErrorKind::Decode, fallback).with_source(e))
}

/// Pull a human-readable message out of an error body: `detail`, then
/// `error`, then `message`.
pub fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"].iter().find_map(|key| match value.get(*key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // Validation details arrive as a list of {msg, ...}.
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_string),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network unreachable, timeout, or an unusable request.
    Transport,
    /// 401 from the backend; the local session has been cleared.
    Unauthorized,
    /// Any other non-success status.
    Server,
    /// Rejected client-side before any request was sent.
    Validation,
    /// Response body did not match the expected shape.
    Decode,
    /// The local session store could not be written.
    Storage,
}

/// The one error type surfaced by [`AutomationApi`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    field_errors: FieldErrors,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            field_errors: FieldErrors::new(),
            source: None,
        }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        let mut err = Self::new(ErrorKind::Validation, errors.to_string());
        err.field_errors = errors;
        err
    }

    /// Normalize a transport-layer failure. The server's message is used
    /// verbatim when present, otherwise `fallback`.
    pub fn from_http(err: HttpError, fallback: &str) -> Self {
        match err {
            HttpError::Status { status, ref body } => {
                let kind = if status == StatusCode::UNAUTHORIZED {
                    ErrorKind::Unauthorized
                } else {
                    ErrorKind::Server
                };
                let message = server_message(body).unwrap_or_else(|| fallback.to_string());
                let mut api_err = Self::new(kind, message);
                api_err.status = Some(status);
                api_err.with_source(err)
            }
            other => Self::new(ErrorKind::Transport, fallback).with_source(other),
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Per-field messages for validation failures; empty otherwise.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}
