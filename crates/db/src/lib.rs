//! Event-store backends.
//!
//! Two implementations of `calendar_core::EventStore` with identical query
//! semantics:
//!
//! - [`MemoryStore`] — a reader/writer-locked map, for single-process use
//!   and tests.
//! - [`PgStore`] — Postgres via sqlx, with an explicit `connect`/`close`
//!   lifecycle.

use std::str::FromStr;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which store backend a process uses, selected once at startup from
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => Err(format!(
                "unknown storage backend '{other}' (expected 'memory' or 'postgres')"
            )),
        }
    }
}
