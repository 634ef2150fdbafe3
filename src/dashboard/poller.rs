//! Periodic job-list polling for the dashboard.
//!
//! Mounting starts a task that fetches the job list immediately and then on a
//! fixed period until unmount. Each successful fetch replaces the displayed
//! list wholesale, newest first. Manual refreshes run alongside the timer and
//! the last response to resolve wins.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dashboard::view::JobCard;
use crate::models::job::{sort_newest_first, JobStatus};
use crate::services::api::{ApiError, AutomationApi};

/// Transient message for the user (toast).
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MountError {
    /// No session is held; send the user back to the landing form.
    #[error("Not authenticated, redirect to the landing form")]
    Unauthenticated,

    #[error("Poll period must be non-zero")]
    ZeroPeriod,
}

#[derive(Default)]
struct ViewState {
    mounted: bool,
    jobs: Vec<JobStatus>,
    last_updated: Option<DateTime<Utc>>,
}

/// Dashboard page: owns the poll period and the notification channel.
pub struct Dashboard {
    api: Arc<AutomationApi>,
    period: Duration,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl Dashboard {
    pub fn new(
        api: Arc<AutomationApi>,
        period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                period,
                notifications: tx,
            },
            rx,
        )
    }

    /// Enter the polling state. Must be called inside a tokio runtime.
    pub fn mount(&self) -> Result<PollerHandle, MountError> {
        if !self.api.is_authenticated() {
            debug!("Dashboard mount refused, no session held");
            return Err(MountError::Unauthenticated);
        }
        if self.period.is_zero() {
            return Err(MountError::ZeroPeriod);
        }

        let view = Arc::new(Mutex::new(ViewState {
            mounted: true,
            ..ViewState::default()
        }));
        let fetcher = Fetcher {
            api: self.api.clone(),
            view: view.clone(),
            notifications: self.notifications.clone(),
        };
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(fetcher.clone(), self.period, cancel.clone()));

        debug!(period_ms = self.period.as_millis() as u64, "Dashboard polling started");
        Ok(PollerHandle {
            fetcher,
            cancel,
            task: Some(task),
        })
    }
}

async fn poll_loop(fetcher: Fetcher, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            // First tick completes immediately.
            _ = ticker.tick() => fetcher.fetch().await,
        }
    }
    debug!("Dashboard polling stopped");
}

#[derive(Clone)]
struct Fetcher {
    api: Arc<AutomationApi>,
    view: Arc<Mutex<ViewState>>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl Fetcher {
    fn is_mounted(&self) -> bool {
        self.view.lock().mounted
    }

    fn notify(&self, notification: Notification) {
        if self.is_mounted() {
            // Receiver gone means nobody is showing toasts.
            let _ = self.notifications.send(notification);
        }
    }

    async fn fetch(&self) {
        if !self.is_mounted() {
            debug!("Skipping job fetch, dashboard unmounted");
            return;
        }
        match self.api.get_user_jobs().await {
            Ok(mut jobs) => {
                sort_newest_first(&mut jobs);
                let mut view = self.view.lock();
                if !view.mounted {
                    debug!("Discarding job list that resolved after unmount");
                    return;
                }
                view.jobs = jobs;
                view.last_updated = Some(Utc::now());
            }
            // The HTTP layer already dropped the session.
            Err(e) if e.is_unauthorized() => {
                debug!("Job poll unauthorized, session cleared");
            }
            Err(e) => {
                warn!(error = %e, "Job poll failed");
                self.notify(Notification::Error(e.message().to_string()));
            }
        }
    }
}

/// A mounted dashboard. Dropping it unmounts.
pub struct PollerHandle {
    fetcher: Fetcher,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn state(&self) -> PollerState {
        if self.fetcher.is_mounted() {
            PollerState::Polling
        } else {
            PollerState::Idle
        }
    }

    /// Snapshot of the displayed job list, newest first.
    pub fn jobs(&self) -> Vec<JobStatus> {
        self.fetcher.view.lock().jobs.clone()
    }

    pub fn cards(&self) -> Vec<JobCard> {
        self.fetcher.view.lock().jobs.iter().map(JobCard::from).collect()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.fetcher.view.lock().last_updated
    }

    /// One out-of-band fetch; the periodic timer is unaffected. A no-op once
    /// unmounted.
    pub fn refresh(&self) -> JoinHandle<()> {
        let fetcher = self.fetcher.clone();
        tokio::spawn(async move { fetcher.fetch().await })
    }

    /// User-initiated cancel. Unlike background polling, every failure is
    /// surfaced, including authorization failures.
    pub async fn cancel_job(&self, job_id: &str) -> Result<(), ApiError> {
        match self.fetcher.api.cancel_job(job_id).await {
            Ok(()) => {
                self.fetcher
                    .notify(Notification::Info("Job cancelled".to_string()));
                self.fetcher.fetch().await;
                Ok(())
            }
            Err(e) => {
                self.fetcher
                    .notify(Notification::Error(e.message().to_string()));
                Err(e)
            }
        }
    }

    /// Stop issuing ticks. An in-flight fetch completes but its result is dropped.
    pub fn unmount(&mut self) {
        self.fetcher.view.lock().mounted = false;
        self.cancel.cancel();
        self.task.take();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}
