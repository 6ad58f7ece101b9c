//! Domain service: caller intents translated into store calls.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::CoreError;
use crate::event::{Event, EventDraft, EventPatch};
use crate::store::EventStore;

/// Thin orchestration layer over an [`EventStore`].
///
/// Owns no state beyond the acting user's id, which is stamped onto every
/// create and update. A service-level update writes `notified = false`:
/// an explicit update through this service is the one sanctioned way to
/// reset the flag (the scheduler only ever sets it to true, via the store).
pub struct CalendarService {
    store: Arc<dyn EventStore>,
    creator_id: i64,
}

impl CalendarService {
    pub fn new(store: Arc<dyn EventStore>, creator_id: i64) -> Self {
        Self { store, creator_id }
    }

    pub async fn create_event(&self, id: &str, draft: EventDraft) -> Result<(), CoreError> {
        validate(&draft)?;
        tracing::debug!(event_id = %id, "Creating event");
        self.store
            .create(Event {
                id: id.to_string(),
                title: draft.title,
                description: draft.description,
                start_date: draft.start_date,
                end_date: draft.end_date,
                creator_id: self.creator_id,
                notify_before: draft.notify_before,
                notified: false,
            })
            .await
    }

    pub async fn update_event(&self, id: &str, draft: EventDraft) -> Result<(), CoreError> {
        validate(&draft)?;
        tracing::debug!(event_id = %id, "Updating event");
        self.store
            .update(
                id,
                EventPatch {
                    title: draft.title,
                    description: draft.description,
                    start_date: draft.start_date,
                    end_date: draft.end_date,
                    creator_id: self.creator_id,
                    notify_before: draft.notify_before,
                    notified: false,
                },
            )
            .await
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), CoreError> {
        tracing::debug!(event_id = %id, "Deleting event");
        self.store.delete(id).await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, CoreError> {
        self.store.get(id).await
    }

    pub async fn list_events_by_date_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, CoreError> {
        self.store.list_by_date_range(from, to).await
    }

    pub async fn list_events_for_notification(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<Event>, CoreError> {
        self.store.list_due_for_notification(day).await
    }

    pub async fn list_events_on_date(&self, day: NaiveDate) -> Result<Vec<Event>, CoreError> {
        self.store.list_on_date(day).await
    }

    pub async fn list_events_on_week(
        &self,
        week_start: NaiveDate,
    ) -> Result<Vec<Event>, CoreError> {
        self.store.list_on_week(week_start).await
    }

    pub async fn list_events_on_month(
        &self,
        month_start: NaiveDate,
    ) -> Result<Vec<Event>, CoreError> {
        self.store.list_on_month(month_start).await
    }
}

fn validate(draft: &EventDraft) -> Result<(), CoreError> {
    if draft.notify_before < Duration::zero() {
        return Err(CoreError::InvalidEvent(
            "notifyBefore must not be negative".to_string(),
        ));
    }
    Ok(())
}
