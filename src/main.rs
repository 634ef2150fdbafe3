use tracing_subscriber::EnvFilter;

use pin_automation_client::{
    app_state::AppState,
    config::ClientConfig,
    dashboard::{MountError, Notification},
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = ClientConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!(backend = %config.api_base_url, "Initializing automation dashboard");

    let state = AppState::from_config(config).expect("Failed to initialize client");

    match state.api.health_check().await {
        Ok(payload) => tracing::info!(health = %payload, "Backend reachable"),
        Err(e) => tracing::warn!(error = %e, "Backend health check failed"),
    }

    let (dashboard, mut notifications) = state.dashboard();
    let mut poller = match dashboard.mount() {
        Ok(poller) => poller,
        Err(MountError::Unauthenticated) => {
            tracing::error!(
                store = %state.config.session_store_path.display(),
                "No active session; start one from the landing form"
            );
            return;
        }
        Err(e @ MountError::ZeroPeriod) => {
            tracing::error!(error = %e, "Dashboard not started");
            return;
        }
    };

    let mut render = tokio::time::interval(state.config.poll_interval());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down dashboard");
                break;
            }
            Some(notification) = notifications.recv() => match notification {
                Notification::Info(message) => tracing::info!(%message, "Notification"),
                Notification::Error(message) => tracing::warn!(%message, "Notification"),
            },
            _ = render.tick() => {
                if !state.api.is_authenticated() {
                    tracing::warn!("Session expired; start a new one from the landing form");
                    break;
                }
                for card in poller.cards() {
                    tracing::info!(
                        job_id = %card.job_id,
                        status = card.label,
                        progress = %card.progress_width(),
                        "{card}"
                    );
                }
            }
        }
    }

    poller.unmount();
}
