use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, Instrument};
use crate::domain::services::store::AppointmentStore;

/// Checks connectivity and drains the retry queue every `interval`.
pub async fn start_sync_worker(store: Arc<AppointmentStore>, interval: std::time::Duration) {
    if !store.remote_configured() {
        info!("No remote service configured; sync worker not started");
        return;
    }
    info!("Starting sync worker (every {:?})...", interval);

    let mut round: u64 = 0;
    loop {
        round += 1;
        let span = info_span!("sync_round", round = round);

        async {
            match store.sync_tick().await {
                Ok(report) if report.synced + report.retried + report.dropped > 0 => {
                    info!(
                        synced = report.synced,
                        retried = report.retried,
                        deferred = report.deferred,
                        dropped = report.dropped,
                        "Sync round finished"
                    );
                }
                Ok(_) => debug!("Nothing to sync"),
                Err(e) => error!("Sync round failed: {}", e),
            }
        }
        .instrument(span)
        .await;

        sleep(interval).await;
    }
}
