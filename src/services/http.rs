use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::services::session_state::SessionState;

/// The one configured transport to the automation backend.
///
/// Every request passes through two interceptors:
/// - outbound: attach `Authorization: Bearer <session_id>` when a session is held
/// - inbound: on 401, drop the session (memory and store) before returning the error
///
/// Each call is a single attempt; there is no retry or queueing.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionState>,
}

impl HttpClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionState>,
    ) -> Result<Self, HttpError> {
        let base_url =
            Url::parse(base_url).map_err(|e| HttpError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(HttpError::Transport)?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Send a request without a body.
    pub async fn send(&self, method: Method, segments: &[&str]) -> Result<Response, HttpError> {
        self.dispatch(method, segments, None).await
    }

    /// Send a request with a JSON body.
    pub async fn send_json<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Response, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.dispatch(method, segments, Some(body)).await
    }

    /// Resolve path segments against the base URL. Each segment is
    /// percent-encoded, so opaque ids cannot escape their position.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn dispatch(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<Response, HttpError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();

        let mut request = self.http.request(method.clone(), url);
        if let Some(session_id) = self.session.session_id() {
            request = request.bearer_auth(session_id);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::counter!("api_transport_errors_total", "method" => method.to_string())
                    .increment(1);
                warn!(method = %method, path = %path, error = %e, "Request to backend failed");
                return Err(HttpError::Transport(e));
            }
        };

        let status = response.status();
        metrics::counter!(
            "api_requests_total",
            "method" => method.to_string(),
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        metrics::histogram!("api_request_duration_seconds").record(start.elapsed().as_secs_f64());
        debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Backend response received"
        );

        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
            metrics::counter!("api_auth_failures_total").increment(1);
            warn!(path = %path, "Backend rejected session, local session cleared");
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status { status, body });
        }

        Ok(response)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HttpError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HttpError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session_store::MemorySessionStore;

    fn client(base: &str) -> HttpClient {
        let session = Arc::new(SessionState::restore(Arc::new(MemorySessionStore::new())));
        HttpClient::new(base, Duration::from_secs(30), session).unwrap()
    }

    #[test]
    fn endpoint_joins_segments() {
        let c = client("http://localhost:8000");
        let url = c.endpoint(&["api", "jobs"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/jobs");
    }

    #[test]
    fn endpoint_keeps_base_prefix() {
        let c = client("https://pins.example.com/backend/");
        let url = c.endpoint(&["api", "health"]).unwrap();
        assert_eq!(url.as_str(), "https://pins.example.com/backend/api/health");
    }

    #[test]
    fn job_id_is_encoded_as_one_segment() {
        let c = client("http://localhost:8000");
        let url = c.endpoint(&["api", "job", "../session"]).unwrap();
        assert_eq!(url.path(), "/api/job/..%2Fsession");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let session = Arc::new(SessionState::restore(Arc::new(MemorySessionStore::new())));
        assert!(matches!(
            HttpClient::new("mailto:ops@example.com", Duration::from_secs(1), session.clone()),
            Err(HttpError::InvalidUrl(_))
        ));
        assert!(HttpClient::new("not a url", Duration::from_secs(1), session).is_err());
    }

    #[test]
    fn unauthorized_detection() {
        let err = HttpError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert!(err.is_unauthorized());
        let err = HttpError::Status {
            status: StatusCode::FORBIDDEN,
            body: String::new(),
        };
        assert!(!err.is_unauthorized());
    }
}
