//! Consumer side of the notification pipeline.

use lapin::options::{
    BasicConsumeOptions, ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use parking_lot::Mutex;

use crate::error::TransportError;

struct ConsumerState {
    connection: Connection,
    channel: Channel,
}

/// AMQP consumer reading event notifications from a durable queue bound to
/// the producer's exchange.
///
/// Deliveries are manually acknowledged: the handling loop acks only after
/// it has processed a delivery, so anything unacked is redelivered by the
/// broker after a connection loss (at-least-once on the consumer side too).
pub struct RabbitConsumer {
    uri: String,
    exchange: String,
    queue: String,
    state: Mutex<Option<ConsumerState>>,
}

impl RabbitConsumer {
    pub fn new(
        uri: impl Into<String>,
        exchange: impl Into<String>,
        queue: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            exchange: exchange.into(),
            queue: queue.into(),
            state: Mutex::new(None),
        }
    }

    /// Dial the broker, declare the exchange and the durable queue, and
    /// bind the queue to the exchange.
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

        channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(TransportError::Connect)?;

        channel
            .queue_bind(
                &self.queue,
                &self.exchange,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(TransportError::Connect)?;

        *self.state.lock() = Some(ConsumerState {
            connection,
            channel,
        });
        tracing::debug!(exchange = %self.exchange, queue = %self.queue, "Consumer connected");
        Ok(())
    }

    /// Open the manual-acknowledgment delivery stream.
    pub async fn consume(&self, consumer_tag: &str) -> Result<Consumer, TransportError> {
        let channel = self
            .state
            .lock()
            .as_ref()
            .map(|s| s.channel.clone())
            .ok_or(TransportError::NotConnected)?;

        channel
            .basic_consume(
                &self.queue,
                consumer_tag,
                BasicConsumeOptions {
                    no_ack: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(TransportError::Consume)
    }

    /// Close the broker connection. A no-op when not connected.
    pub async fn disconnect(&self) {
        let state = self.state.lock().take();
        if let Some(state) = state {
            if let Err(e) = state.connection.close(200, "bye").await {
                tracing::debug!(error = %e, "Consumer connection close failed");
            }
        }
    }
}
