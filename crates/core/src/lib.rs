//! Calendar domain model and storage contract.
//!
//! This crate holds everything the process binaries share:
//!
//! - [`Event`] — the persisted calendar event and its JSON wire encoding.
//! - [`EventStore`] — the storage capability implemented by both the
//!   in-memory and the Postgres backend in `calendar-db`.
//! - [`CalendarService`] — thin domain orchestration over a store, stamping
//!   the acting user onto writes.
//! - [`CoreError`] — the typed error taxonomy callers match on.

pub mod error;
pub mod event;
pub mod service;
pub mod store;

pub use error::CoreError;
pub use event::{Event, EventDraft, EventPatch};
pub use service::CalendarService;
pub use store::EventStore;
