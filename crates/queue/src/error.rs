/// Queue transport failures.
///
/// Producer-side errors are always recoverable by retrying on the next
/// scheduler tick; consumer-side errors leave the delivery unacknowledged
/// so the broker redelivers it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An operation was attempted before `connect` (or after `disconnect`).
    #[error("not connected to the message broker")]
    NotConnected,

    /// Dial, channel, or declaration failure while connecting.
    #[error("broker connection failed: {0}")]
    Connect(#[source] lapin::Error),

    /// Publishing a message failed.
    #[error("publish failed: {0}")]
    Publish(#[source] lapin::Error),

    /// Opening the delivery stream failed.
    #[error("consume failed: {0}")]
    Consume(#[source] lapin::Error),

    /// The event could not be encoded to its wire representation.
    #[error("event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
