use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use strum::Display;

/// Lifecycle state of an automation job on the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// Human-readable badge text.
    pub fn label(self) -> &'static str {
        match self {
            JobState::Queued => "Queued",
            JobState::Running => "Running",
            JobState::Completed => "Completed",
            JobState::Failed => "Failed",
            JobState::Cancelled => "Cancelled",
        }
    }

    /// Jobs that can still be cancelled.
    pub fn is_active(self) -> bool {
        match self {
            JobState::Queued | JobState::Running => true,
            JobState::Completed | JobState::Failed | JobState::Cancelled => false,
        }
    }
}

/// Per-category progress of a running job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JobProgress {
    #[serde(default)]
    pub current_category: Option<String>,
    #[serde(default)]
    pub completed_categories: u32,
    #[serde(default)]
    pub total_categories: u32,
    /// Percentage, 0–100.
    #[serde(default)]
    pub overall_progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JobResults {
    #[serde(default)]
    pub total_products_found: u64,
    #[serde(default)]
    pub total_pins_created: u64,
    #[serde(default)]
    pub total_errors: u64,
    #[serde(default)]
    pub category_results: BTreeMap<String, serde_json::Value>,
}

/// Backend view of one automation job. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatus {
    pub job_id: String,
    pub status: JobState,
    #[serde(default)]
    pub progress: Option<JobProgress>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub results: Option<JobResults>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply to `GET /api/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobList {
    #[serde(default)]
    pub jobs: Vec<JobStatus>,
}

/// Order jobs newest first. Stable, so equal timestamps keep backend order.
pub fn sort_newest_first(jobs: &mut [JobStatus]) {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Accepts RFC 3339 or a naive ISO-8601 timestamp (taken as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
}
