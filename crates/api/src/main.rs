//! `calendar-api` — HTTP surface over the calendar domain service.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calendar_api::config::ApiConfig;
use calendar_api::{router, state::AppState};
use calendar_core::store::EventStore;
use calendar_core::CalendarService;
use calendar_db::{MemoryStore, PgStore, StorageBackend};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ApiConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage backend ---
    let store: Arc<dyn EventStore> = match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory event store");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Postgres => {
            let dsn = config
                .database_url
                .clone()
                .expect("DATABASE_URL must be set for the postgres backend");
            let store = PgStore::new(dsn);
            store.connect().await.expect("Failed to connect to database");
            store
                .run_migrations()
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Connected to Postgres event store");
            Arc::new(store)
        }
    };

    // --- Domain service ---
    let service = Arc::new(CalendarService::new(store, config.creator_id));

    // --- Router ---
    let app = router::build_app_router(AppState { service }, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
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
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
