//! Domain-service behaviour over the memory backend: actor stamping,
//! invariant validation, and the notified-reset rule.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use calendar_core::error::CoreError;
use calendar_core::event::{EventDraft, EventPatch};
use calendar_core::store::EventStore;
use calendar_core::CalendarService;
use calendar_db::MemoryStore;

fn draft() -> EventDraft {
    EventDraft {
        title: "planning".to_string(),
        description: "quarterly planning".to_string(),
        start_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        notify_before: Duration::hours(2),
    }
}

#[tokio::test]
async fn create_stamps_the_acting_user() {
    let store = Arc::new(MemoryStore::new());
    let service = CalendarService::new(store, 42);

    service.create_event("E1", draft()).await.unwrap();

    let event = service.get_event("E1").await.unwrap();
    assert_eq!(event.creator_id, 42);
    assert!(!event.notified);
}

#[tokio::test]
async fn negative_notify_before_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let service = CalendarService::new(store, 1);

    let mut bad = draft();
    bad.notify_before = Duration::hours(-1);

    let err = service.create_event("E1", bad).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidEvent(_)));
}

#[tokio::test]
async fn explicit_update_resets_the_notified_flag() {
    let store = Arc::new(MemoryStore::new());
    let service = CalendarService::new(store.clone(), 1);

    service.create_event("E1", draft()).await.unwrap();

    // The scheduler marks the event notified through the store.
    let event = store.get("E1").await.unwrap();
    let mut patch = EventPatch::from_event(&event);
    patch.notified = true;
    store.update("E1", patch).await.unwrap();
    assert!(store.get("E1").await.unwrap().notified);

    // An explicit caller update is the sanctioned reset path.
    service.update_event("E1", draft()).await.unwrap();
    assert!(!store.get("E1").await.unwrap().notified);
}

#[tokio::test]
async fn service_passthroughs_surface_store_errors() {
    let store = Arc::new(MemoryStore::new());
    let service = CalendarService::new(store, 1);

    assert!(matches!(
        service.get_event("ghost").await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
    assert!(matches!(
        service.update_event("ghost", draft()).await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
    // Delete stays idempotent through the service too.
    service.delete_event("ghost").await.unwrap();
}
