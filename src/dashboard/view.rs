use strum::Display;

use crate::models::job::{JobState, JobStatus};

/// Badge colour for a job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BadgeColor {
    Gray,
    Blue,
    Green,
    Red,
    Yellow,
}

impl BadgeColor {
    pub fn for_state(state: JobState) -> Self {
        match state {
            JobState::Queued => BadgeColor::Yellow,
            JobState::Running => BadgeColor::Blue,
            JobState::Completed => BadgeColor::Green,
            JobState::Failed => BadgeColor::Red,
            JobState::Cancelled => BadgeColor::Gray,
        }
    }
}

/// Display model for one row of the job dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct JobCard {
    pub job_id: String,
    pub label: &'static str,
    pub color: BadgeColor,
    /// Progress bar fill, 0–100.
    pub progress_percent: f64,
    pub current_category: Option<String>,
    pub categories_done: Option<(u32, u32)>,
    pub summary: Option<String>,
    pub error: Option<String>,
    pub cancellable: bool,
}

impl JobCard {
    /// CSS width for the progress bar fill, e.g. `"42%"`.
    pub fn progress_width(&self) -> String {
        format!("{}%", self.progress_percent.round() as u32)
    }
}

impl From<&JobStatus> for JobCard {
    fn from(job: &JobStatus) -> Self {
        let progress_percent = match (&job.progress, job.status) {
            (_, JobState::Completed) => 100.0,
            (Some(progress), _) if progress.overall_progress.is_finite() => {
                progress.overall_progress.clamp(0.0, 100.0)
            }
            _ => 0.0,
        };

        let summary = job.results.as_ref().map(|r| {
            format!(
                "{} products found, {} pins created, {} errors",
                r.total_products_found, r.total_pins_created, r.total_errors
            )
        });

        Self {
            job_id: job.job_id.clone(),
            label: job.status.label(),
            color: BadgeColor::for_state(job.status),
            progress_percent,
            current_category: job
                .progress
                .as_ref()
                .and_then(|p| p.current_category.clone()),
            categories_done: job
                .progress
                .as_ref()
                .map(|p| (p.completed_categories, p.total_categories)),
            summary,
            error: job.error.clone(),
            cancellable: job.status.is_active(),
        }
    }
}

impl std::fmt::Display for JobCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} {}", self.label, self.job_id, self.progress_width())?;
        if let Some(category) = &self.current_category {
            write!(f, " ({category})")?;
        }
        if let Some(summary) = &self.summary {
            write!(f, " | {summary}")?;
        }
        if let Some(error) = &self.error {
            write!(f, " error: {error}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{parse_timestamp, JobProgress, JobResults};

    fn job(status: JobState, progress: Option<f64>) -> JobStatus {
        let ts = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
        JobStatus {
            job_id: "abc123".to_string(),
            status,
            progress: progress.map(|p| JobProgress {
                current_category: Some("electronics".to_string()),
                completed_categories: 1,
                total_categories: 4,
                overall_progress: p,
            }),
            created_at: ts,
            updated_at: ts,
            results: None,
            error: None,
        }
    }

    #[test]
    fn running_job_renders_progress_and_label() {
        let card = JobCard::from(&job(JobState::Running, Some(42.0)));
        assert_eq!(card.label, "Running");
        assert_eq!(card.color, BadgeColor::Blue);
        assert_eq!(card.progress_width(), "42%");
        assert_eq!(card.categories_done, Some((1, 4)));
        assert!(card.cancellable);
    }

    #[test]
    fn every_state_has_distinct_badge() {
        let states = [
            JobState::Queued,
            JobState::Running,
            JobState::Completed,
            JobState::Failed,
            JobState::Cancelled,
        ];
        let colors: std::collections::HashSet<BadgeColor> =
            states.iter().map(|s| BadgeColor::for_state(*s)).collect();
        assert_eq!(colors.len(), states.len());
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(JobCard::from(&job(JobState::Running, Some(130.0))).progress_width(), "100%");
        assert_eq!(JobCard::from(&job(JobState::Running, Some(-5.0))).progress_width(), "0%");
        assert_eq!(JobCard::from(&job(JobState::Queued, None)).progress_width(), "0%");
    }

    #[test]
    fn completed_job_shows_summary_and_full_bar() {
        let mut completed = job(JobState::Completed, Some(97.0));
        completed.results = Some(JobResults {
            total_products_found: 20,
            total_pins_created: 18,
            total_errors: 2,
            ..JobResults::default()
        });
        let card = JobCard::from(&completed);
        assert_eq!(card.progress_width(), "100%");
        assert_eq!(
            card.summary.as_deref(),
            Some("20 products found, 18 pins created, 2 errors")
        );
        assert!(!card.cancellable);
        assert_eq!(card.color.to_string(), "green");
    }
}
