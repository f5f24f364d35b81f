use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, Instrument};
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically drops expired sessions and stale rate-limit windows.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background sweeper...");

    loop {
        sleep(SWEEP_INTERVAL).await;
        sweep_once(&state)
            .instrument(info_span!("background_sweep"))
            .await;
    }
}

pub async fn sweep_once(state: &AppState) {
    match state.session_store.prune().await {
        Ok(0) => {}
        Ok(n) => debug!(removed = n, "Pruned expired sessions"),
        Err(e) => error!("Session prune failed: {:?}", e),
    }

    match state.rate_limiter.prune().await {
        Ok(0) => {}
        Ok(n) => debug!(removed = n, "Pruned rate limit windows"),
        Err(e) => error!("Rate limit prune failed: {:?}", e),
    }
}
