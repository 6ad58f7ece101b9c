//! Retention-cleanup loop: events past the one-year window are deleted.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Months, Utc};
use tokio_util::sync::CancellationToken;

use calendar_core::store::EventStore;

/// How far back an event's end date may lie before it is purged.
const RETENTION_MONTHS: u32 = 12;

/// Run the cleanup loop until `cancel` is triggered. As with the notifier,
/// the first sweep runs immediately.
pub async fn run(store: Arc<dyn EventStore>, period: Duration, cancel: CancellationToken) {
    tracing::info!(period_secs = period.as_secs(), "Cleanup loop started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cleanup loop stopping");
                break;
            }
            _ = interval.tick() => {
                run_cleanup_sweep(store.as_ref(), Utc::now()).await;
            }
        }
    }
}

/// One best-effort cleanup sweep relative to `now`.
///
/// Retention is an end-date contract: only events whose `end_date` precedes
/// the cutoff are deleted. The range query returns anything overlapping the
/// look-back window, which includes long events that started before the
/// cutoff but are still current — those must survive.
pub async fn run_cleanup_sweep(store: &dyn EventStore, now: DateTime<Utc>) {
    let cutoff = match now.checked_sub_months(Months::new(RETENTION_MONTHS)) {
        Some(cutoff) => cutoff,
        None => {
            tracing::error!("Cleanup sweep: cannot compute retention cutoff");
            return;
        }
    };

    let stale = match store.list_by_date_range(None, Some(cutoff)).await {
        Ok(stale) => stale,
        Err(e) => {
            tracing::error!(error = %e, "Cleanup sweep: failed to read stale events");
            return;
        }
    };

    tracing::info!(count = stale.len(), %cutoff, "Cleanup sweep: fetched candidates");

    for event in stale.into_iter().filter(|e| e.end_date < cutoff) {
        match store.delete(&event.id).await {
            Ok(()) => tracing::info!(event_id = %event.id, "Cleanup sweep: deleted stale event"),
            Err(e) => tracing::error!(
                event_id = %event.id,
                error = %e,
                "Cleanup sweep: failed to delete stale event"
            ),
        }
    }
}
