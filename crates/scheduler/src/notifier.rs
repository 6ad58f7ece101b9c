//! Notify-check loop: due events are handed to the queue producer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use calendar_core::event::EventPatch;
use calendar_core::store::EventStore;
use calendar_queue::EventPublisher;

/// Run the notify-check loop until `cancel` is triggered.
///
/// The first sweep runs immediately (tokio's interval ticks once at start),
/// so a freshly started scheduler does not wait a full period. In-flight
/// sweeps are not cancelled mid-way; they are short relative to the period.
pub async fn run(
    store: Arc<dyn EventStore>,
    publisher: Arc<dyn EventPublisher>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(period_secs = period.as_secs(), "Notify-check loop started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Notify-check loop stopping");
                break;
            }
            _ = interval.tick() => {
                run_notify_sweep(store.as_ref(), publisher.as_ref(), Utc::now().date_naive()).await;
            }
        }
    }
}

/// One notify sweep for the given day.
///
/// The due query is notified-agnostic, so events already handed off are
/// skipped here — otherwise every tick until midnight would re-publish
/// them. A publish failure leaves the event un-notified for the next tick
/// (at-least-once: the consumer tolerates the duplicate that occurs when a
/// publish succeeds but marking fails).
pub async fn run_notify_sweep(
    store: &dyn EventStore,
    publisher: &dyn EventPublisher,
    day: NaiveDate,
) {
    let events = match store.list_due_for_notification(day).await {
        Ok(events) => events,
        Err(e) => {
            tracing::error!(error = %e, "Notify sweep: failed to read due events");
            return;
        }
    };

    tracing::info!(count = events.len(), %day, "Notify sweep: fetched due events");

    for event in events {
        if event.notified {
            tracing::debug!(event_id = %event.id, "Notify sweep: already handed off, skipping");
            continue;
        }

        if let Err(e) = publisher.publish(&event).await {
            tracing::error!(
                event_id = %event.id,
                error = %e,
                "Notify sweep: publish failed, will retry next tick"
            );
            continue;
        }

        let mut patch = EventPatch::from_event(&event);
        patch.notified = true;
        match store.update(&event.id, patch).await {
            Ok(()) => tracing::info!(event_id = %event.id, "Notify sweep: event handed off"),
            Err(e) => tracing::error!(
                event_id = %event.id,
                error = %e,
                "Notify sweep: failed to mark event notified"
            ),
        }
    }
}
