//! AMQP transport for event notifications.
//!
//! The producer publishes wire-encoded events to a durable exchange; the
//! consumer binds a durable queue to that exchange and reads deliveries
//! under manual acknowledgment. Neither side auto-reconnects — a dropped
//! connection is the supervisor's problem, by design.

pub mod consumer;
pub mod error;
pub mod producer;

pub use consumer::RabbitConsumer;
pub use error::TransportError;
pub use producer::{EventPublisher, RabbitProducer};
