//! In-memory event store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use parking_lot::RwLock;

use calendar_core::error::CoreError;
use calendar_core::event::{Event, EventPatch};
use calendar_core::store::EventStore;

/// A map keyed by event id behind a reader/writer lock.
///
/// Range queries are O(n) scans, which is fine at the scale this backend is
/// meant for (single process, bounded by memory). Reads proceed concurrently
/// under the read lock; writes are exclusive.
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<String, Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, event: Event) -> Result<(), CoreError> {
        let mut events = self.events.write();
        if events.contains_key(&event.id) {
            return Err(CoreError::AlreadyExists {
                id: event.id.clone(),
            });
        }
        events.insert(event.id.clone(), event);
        Ok(())
    }

    async fn update(&self, id: &str, patch: EventPatch) -> Result<(), CoreError> {
        let mut events = self.events.write();
        match events.get_mut(id) {
            Some(event) => {
                event.apply(patch);
                Ok(())
            }
            None => Err(CoreError::NotFound { id: id.to_string() }),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.events.write().remove(id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Event, CoreError> {
        self.events
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })
    }

    async fn list_by_date_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, CoreError> {
        Ok(self
            .events
            .read()
            .values()
            .filter(|event| {
                if let Some(from) = from {
                    if event.end_date < from {
                        return false;
                    }
                }
                if let Some(to) = to {
                    if event.start_date > to {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect())
    }

    async fn list_due_for_notification(&self, day: NaiveDate) -> Result<Vec<Event>, CoreError> {
        Ok(self
            .events
            .read()
            .values()
            .filter(|event| event.notification_day() == day)
            .cloned()
            .collect())
    }

    async fn list_on_date(&self, day: NaiveDate) -> Result<Vec<Event>, CoreError> {
        Ok(self
            .events
            .read()
            .values()
            .filter(|event| event.start_date.date_naive() == day)
            .cloned()
            .collect())
    }

    async fn list_on_week(&self, week_start: NaiveDate) -> Result<Vec<Event>, CoreError> {
        let week_end = week_start + Days::new(6);
        Ok(self
            .events
            .read()
            .values()
            .filter(|event| {
                event.start_date.date_naive() >= week_start
                    && event.end_date.date_naive() <= week_end
            })
            .cloned()
            .collect())
    }

    async fn list_on_month(&self, month_start: NaiveDate) -> Result<Vec<Event>, CoreError> {
        let month_end = month_start + Months::new(1) - Days::new(1);
        Ok(self
            .events
            .read()
            .values()
            .filter(|event| {
                event.start_date.date_naive() >= month_start
                    && event.end_date.date_naive() <= month_end
            })
            .cloned()
            .collect())
    }
}
