//! Periodic background loops for the calendar service.
//!
//! Two independent loops, each a task selecting between a fixed-period timer
//! and a shared cancellation token:
//!
//! - [`notifier`] — finds events due for notification today and hands them
//!   to the queue producer, marking them notified on success.
//! - [`cleaner`] — deletes events whose end date fell out of the one-year
//!   retention window.
//!
//! Per-item failures are logged and skipped; a loop only ever exits on the
//! shutdown signal.

pub mod cleaner;
pub mod config;
pub mod notifier;
