//! Publisher side of the notification pipeline.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use parking_lot::Mutex;

use calendar_core::event::Event;

use crate::error::TransportError;

/// The scheduler's hand-off seam: anything that can take an event for
/// asynchronous delivery. Implemented by [`RabbitProducer`] in production
/// and by recording stubs in tests.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &Event) -> Result<(), TransportError>;
}

struct ProducerState {
    connection: Connection,
    channel: Channel,
}

/// AMQP producer publishing events to a durable direct exchange.
///
/// Messages are sent with the transient delivery mode: losing queued
/// notifications on a broker crash is an accepted trade-off for fan-out
/// data, and the scheduler's at-least-once retry covers publish failures.
pub struct RabbitProducer {
    uri: String,
    exchange: String,
    state: Mutex<Option<ProducerState>>,
}

impl RabbitProducer {
    pub fn new(uri: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            exchange: exchange.into(),
            state: Mutex::new(None),
        }
    }

    /// Dial the broker, open a channel, and declare the exchange
    /// (durable, non-auto-delete, non-internal).
    pub async fn connect(&self) -> Result<(), TransportError> {
        let connection = Connection::connect(&self.uri, ConnectionProperties::default())
            .await
            .map_err(TransportError::Connect)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(TransportError::Connect)?;

        channel
            .exchange_declare(
                &self.exchange,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(TransportError::Connect)?;

        *self.state.lock() = Some(ProducerState {
            connection,
            channel,
        });
        tracing::debug!(exchange = %self.exchange, "Producer connected");
        Ok(())
    }

    /// Close the broker connection. A no-op when not connected.
    pub async fn disconnect(&self) {
        let state = self.state.lock().take();
        if let Some(state) = state {
            if let Err(e) = state.connection.close(200, "bye").await {
                tracing::debug!(error = %e, "Producer connection close failed");
            }
        }
    }

    fn channel(&self) -> Result<Channel, TransportError> {
        self.state
            .lock()
            .as_ref()
            .map(|s| s.channel.clone())
            .ok_or(TransportError::NotConnected)
    }
}

#[async_trait]
impl EventPublisher for RabbitProducer {
    /// Serialize the event to its wire JSON and publish it to the exchange
    /// with no routing key (fan-out to all bound queues).
    async fn publish(&self, event: &Event) -> Result<(), TransportError> {
        let channel = self.channel()?;
        let body = serde_json::to_vec(event)?;

        channel
            .basic_publish(
                &self.exchange,
                "",
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    // 1 = transient (not persisted by the broker).
                    .with_delivery_mode(1),
            )
            .await
            .map_err(TransportError::Publish)?;

        tracing::debug!(event_id = %event.id, "Published event");
        Ok(())
    }
}
