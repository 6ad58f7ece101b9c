//! Sweep-logic tests: notification hand-off, duplicate suppression,
//! retry-on-failure, and the retention boundary — driven against the
//! in-memory store and a stub publisher with pinned dates.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;

use calendar_core::event::Event;
use calendar_core::store::EventStore;
use calendar_db::MemoryStore;
use calendar_queue::{EventPublisher, TransportError};
use calendar_scheduler::{cleaner, notifier};

// ---------------------------------------------------------------------------
// Stub publisher
// ---------------------------------------------------------------------------

/// Records published event ids; can be switched into a failing mode to
/// simulate a broker outage.
#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    fn published(&self) -> Vec<String> {
        self.published.lock().clone()
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &Event) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        self.published.lock().push(event.id.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>, notify_before: Duration) -> Event {
    Event {
        id: id.to_string(),
        title: format!("event {id}"),
        description: String::new(),
        start_date: start,
        end_date: end,
        creator_id: 1,
        notify_before,
        notified: false,
    }
}

// ---------------------------------------------------------------------------
// Notify sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sweep_publishes_due_events_and_marks_them_notified() {
    let store = MemoryStore::new();
    let publisher = RecordingPublisher::default();

    // Due on the 9th (end on the 10th, 24h ahead).
    store
        .create(event("E1", ts(2024, 6, 1), ts(2024, 6, 10), Duration::hours(24)))
        .await
        .unwrap();
    // Due on a different day; must not be touched.
    store
        .create(event("E2", ts(2024, 6, 1), ts(2024, 6, 20), Duration::hours(24)))
        .await
        .unwrap();

    notifier::run_notify_sweep(&store, &publisher, day(2024, 6, 9)).await;

    assert_eq!(publisher.published(), vec!["E1"]);
    assert!(store.get("E1").await.unwrap().notified);
    assert!(!store.get("E2").await.unwrap().notified);
}

#[tokio::test]
async fn second_sweep_does_not_republish() {
    let store = MemoryStore::new();
    let publisher = RecordingPublisher::default();

    store
        .create(event("E1", ts(2024, 6, 1), ts(2024, 6, 10), Duration::hours(24)))
        .await
        .unwrap();

    notifier::run_notify_sweep(&store, &publisher, day(2024, 6, 9)).await;
    notifier::run_notify_sweep(&store, &publisher, day(2024, 6, 9)).await;

    // The due query still returns E1, but the sweep skips notified events.
    assert_eq!(publisher.published(), vec!["E1"]);
}

#[tokio::test]
async fn failed_publish_leaves_event_unnotified_and_is_retried() {
    let store = MemoryStore::new();
    let publisher = RecordingPublisher::default();

    store
        .create(event("E1", ts(2024, 6, 1), ts(2024, 6, 10), Duration::hours(24)))
        .await
        .unwrap();

    publisher.set_failing(true);
    notifier::run_notify_sweep(&store, &publisher, day(2024, 6, 9)).await;

    assert!(publisher.published().is_empty());
    assert!(
        !store.get("E1").await.unwrap().notified,
        "a failed publish must not mark the event notified"
    );

    // Broker back: the next tick picks the event up again.
    publisher.set_failing(false);
    notifier::run_notify_sweep(&store, &publisher, day(2024, 6, 9)).await;

    assert_eq!(publisher.published(), vec!["E1"]);
    assert!(store.get("E1").await.unwrap().notified);
}

#[tokio::test]
async fn one_bad_event_does_not_abort_the_sweep() {
    let store = MemoryStore::new();
    let publisher = RecordingPublisher::default();

    // Two events due the same day; both must be attempted even though the
    // store's iteration order is unspecified.
    store
        .create(event("A", ts(2024, 6, 1), ts(2024, 6, 10), Duration::hours(24)))
        .await
        .unwrap();
    store
        .create(event("B", ts(2024, 6, 2), ts(2024, 6, 10), Duration::hours(24)))
        .await
        .unwrap();

    notifier::run_notify_sweep(&store, &publisher, day(2024, 6, 9)).await;

    let mut published = publisher.published();
    published.sort();
    assert_eq!(published, vec!["A", "B"]);
}

// ---------------------------------------------------------------------------
// Cleanup sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cleanup_deletes_events_past_the_retention_window() {
    let store = MemoryStore::new();
    let now = ts(2024, 6, 15);

    // Ended well over a year before `now`.
    store
        .create(event("stale", ts(2023, 1, 1), ts(2023, 2, 1), Duration::zero()))
        .await
        .unwrap();
    // Ended one year minus a day before `now`: inside the window, survives.
    store
        .create(event("fresh", ts(2023, 6, 10), ts(2023, 6, 16), Duration::zero()))
        .await
        .unwrap();

    cleaner::run_cleanup_sweep(&store, now).await;

    assert!(store.get("stale").await.is_err());
    assert!(store.get("fresh").await.is_ok());
}

#[tokio::test]
async fn cleanup_spares_long_events_that_are_still_current() {
    let store = MemoryStore::new();
    let now = ts(2024, 6, 15);

    // Started two years ago but still running: overlaps the look-back
    // window, yet its end date is current — must survive.
    store
        .create(event("ongoing", ts(2022, 6, 1), ts(2024, 7, 1), Duration::zero()))
        .await
        .unwrap();

    cleaner::run_cleanup_sweep(&store, now).await;

    assert!(store.get("ongoing").await.is_ok());
}
