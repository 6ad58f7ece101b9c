/// Domain-level error taxonomy.
///
/// Storage backends translate driver errors into these variants so callers
/// can distinguish "nothing to do" (`NotFound` on a stale read) from genuine
/// faults without matching on message strings.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Create was called with an id that is already present.
    #[error("event {id} already exists")]
    AlreadyExists { id: String },

    /// The target of a read or update is absent. Delete never raises this;
    /// deleting an absent id is a no-op.
    #[error("event {id} not found")]
    NotFound { id: String },

    /// An operation was attempted on a store before `connect`.
    #[error("store is not connected")]
    NotConnected,

    /// The event violates a domain invariant (e.g. negative notify-before).
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// A backend fault, carrying the driver message.
    #[error("storage error: {0}")]
    Storage(String),
}
