//! `calendar-sender` — notification delivery worker.
//!
//! Consumes wire-encoded events from the durable notification queue and
//! "delivers" them (here: a structured log line — the fan-out target is a
//! deployment concern). Each delivery is acknowledged only after it has
//! been processed, so unprocessed deliveries survive a crash and are
//! redelivered by the broker.

mod config;

use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::BasicAckOptions;

use anyhow::Context;
use calendar_core::event::Event;
use calendar_queue::RabbitConsumer;
use config::SenderConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_sender=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SenderConfig::from_env();

    let consumer = RabbitConsumer::new(&config.amqp_url, &config.amqp_exchange, &config.amqp_queue);
    consumer.connect().await.context("connecting to broker")?;
    tracing::info!(queue = %config.amqp_queue, "Connected to broker");

    let deliveries = consumer
        .consume("calendar-sender")
        .await
        .context("opening delivery stream")?;

    let handle = tokio::spawn(handle_deliveries(deliveries));

    shutdown_signal().await;

    // Closing the connection ends the delivery stream; the handler loop
    // drains and exits.
    consumer.disconnect().await;
    let _ = handle.await;

    tracing::info!("Sender stopped");
    Ok(())
}

/// Drive the delivery stream until it closes.
async fn handle_deliveries(mut deliveries: lapin::Consumer) {
    while let Some(delivery) = deliveries.next().await {
        match delivery {
            Ok(delivery) => handle_delivery(delivery).await,
            Err(e) => {
                tracing::error!(error = %e, "Delivery stream error");
                break;
            }
        }
    }
    tracing::debug!("Delivery stream closed");
}

/// Process one delivery, then acknowledge it.
async fn handle_delivery(delivery: Delivery) {
    match serde_json::from_slice::<Event>(&delivery.data) {
        Ok(event) => {
            tracing::info!(
                event_id = %event.id,
                title = %event.title,
                end_dt = %event.end_date,
                "Delivering notification"
            );
        }
        Err(e) => {
            // Malformed payloads are logged and acked: redelivery would
            // loop on the same bytes forever.
            tracing::warn!(
                error = %e,
                bytes = delivery.data.len(),
                "Received malformed notification payload"
            );
        }
    }

    if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
        tracing::error!(error = %e, "Failed to ack delivery");
    }
}

/// Wait for a termination signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
