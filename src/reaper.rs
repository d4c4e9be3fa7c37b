//! Background removal of expired notes.
//!
//! The reaper wakes up at a fixed interval and deletes every note whose
//! `expire_at` has passed. Nothing is reported to users; failures are logged
//! and the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::clock::Clock;
use crate::db::Database;

pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(60);

/// One sweep. Returns how many notes were removed.
pub fn sweep(db: &Database, clock: &dyn Clock) -> anyhow::Result<usize> {
    let removed = db.delete_expired_notes(clock.now())?;
    if removed > 0 {
        tracing::info!(removed, "Reaped expired notes");
    } else {
        tracing::trace!("Reaper sweep found nothing to remove");
    }
    Ok(removed)
}

/// Sweep every `period` until `shutdown_rx` turns true.
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = tokio::spawn(reaper::run(db, clock, Duration::from_secs(60), shutdown_rx));
/// // ...
/// let _ = shutdown_tx.send(true);
/// handle.await?;
/// ```
pub async fn run(
    db: Database,
    clock: Arc<dyn Clock>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(interval_secs = period.as_secs(), "Reaper started");

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let db = db.clone();
                let clock = clock.clone();
                let result = tokio::task::spawn_blocking(move || sweep(&db, clock.as_ref())).await;
                match result {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::error!("Reaper sweep failed: {:#}", e),
                    Err(e) => tracing::error!("Reaper sweep panicked: {}", e),
                }
            }
        }
    }

    tracing::info!("Reaper stopped");
}
