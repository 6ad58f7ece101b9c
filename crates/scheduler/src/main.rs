//! `calendar-scheduler` — periodic notification and retention daemon.
//!
//! Runs two independent loops against the shared Postgres store: one hands
//! due events to the AMQP producer, one purges events past the retention
//! window. Both stop on SIGINT/SIGTERM and are joined before exit.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calendar_core::store::EventStore;
use calendar_db::{PgStore, StorageBackend};
use calendar_queue::{EventPublisher, RabbitProducer};
use calendar_scheduler::config::SchedulerConfig;
use calendar_scheduler::{cleaner, notifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_scheduler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SchedulerConfig::from_env();

    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("the scheduler requires the postgres backend; the in-memory store is process-local");
    }

    let pg = Arc::new(PgStore::new(&config.database_url));
    pg.connect().await.context("connecting to database")?;
    let store: Arc<dyn EventStore> = pg.clone();
    tracing::info!("Connected to database");

    let producer = Arc::new(RabbitProducer::new(&config.amqp_url, &config.amqp_exchange));
    producer.connect().await.context("connecting to broker")?;
    let publisher: Arc<dyn EventPublisher> = producer.clone();
    tracing::info!(exchange = %config.amqp_exchange, "Connected to broker");

    let cancel = CancellationToken::new();

    let notify_handle = tokio::spawn(notifier::run(
        store.clone(),
        publisher,
        config.notify_check_period,
        cancel.clone(),
    ));
    let cleanup_handle = tokio::spawn(cleaner::run(
        store,
        config.cleanup_period,
        cancel.clone(),
    ));

    shutdown_signal().await;
    cancel.cancel();

    // Both loops finish their current iteration before we tear down the
    // producer and the pool.
    let _ = notify_handle.await;
    let _ = cleanup_handle.await;

    producer.disconnect().await;
    pg.close().await;

    tracing::info!("Scheduler stopped");
    Ok(())
}

/// Wait for a termination signal.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the daemon stops
/// cleanly whether interrupted interactively or by a process manager.
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
