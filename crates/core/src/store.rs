//! The storage capability implemented by every event-store backend.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CoreError;
use crate::event::{Event, EventPatch};

/// Persistence contract for calendar events.
///
/// Both backends (in-memory map, Postgres) implement identical query
/// semantics; the backend is chosen once at process start from
/// configuration. Result ordering of the list operations is unspecified and
/// differs between backends — callers must sort if they need an order.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event. Fails with [`CoreError::AlreadyExists`] if the
    /// id is already present.
    async fn create(&self, event: Event) -> Result<(), CoreError>;

    /// Replace all mutable fields of an existing event. Fails with
    /// [`CoreError::NotFound`] if the id is absent.
    async fn update(&self, id: &str, patch: EventPatch) -> Result<(), CoreError>;

    /// Delete an event. Idempotent: deleting an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<(), CoreError>;

    /// Fetch one event. Fails with [`CoreError::NotFound`] if absent.
    async fn get(&self, id: &str) -> Result<Event, CoreError>;

    /// Events whose interval overlaps `[from, to]`: an event matches unless
    /// its end precedes `from` or its start follows `to`. Either bound may
    /// be omitted to mean unbounded.
    async fn list_by_date_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, CoreError>;

    /// Events whose notification day (see [`Event::notification_day`])
    /// equals `day`. Deliberately notified-agnostic: the scheduler is
    /// responsible for skipping events it has already handed off.
    async fn list_due_for_notification(&self, day: NaiveDate) -> Result<Vec<Event>, CoreError>;

    /// Events starting on the given calendar day.
    async fn list_on_date(&self, day: NaiveDate) -> Result<Vec<Event>, CoreError>;

    /// Events fully contained in the 7-day window starting at `week_start`
    /// (inclusive on both ends, day granularity).
    async fn list_on_week(&self, week_start: NaiveDate) -> Result<Vec<Event>, CoreError>;

    /// Events fully contained in the one-calendar-month window starting at
    /// `month_start` (inclusive on both ends, day granularity).
    async fn list_on_month(&self, month_start: NaiveDate) -> Result<Vec<Event>, CoreError>;
}
