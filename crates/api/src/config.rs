use calendar_db::StorageBackend;

/// API server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `DATABASE_URL`, which is only required for the postgres backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Store backend (`memory` for a single-process dev setup, `postgres`
    /// for anything shared with the scheduler).
    pub storage_backend: StorageBackend,
    /// Postgres connection string; required when the backend is `postgres`.
    pub database_url: Option<String>,
    /// Actor id stamped onto created and updated events.
    pub creator_id: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default      |
    /// |------------------------|--------------|
    /// | `HOST`                 | `0.0.0.0`    |
    /// | `PORT`                 | `3000`       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`         |
    /// | `STORAGE_BACKEND`      | `memory`     |
    /// | `DATABASE_URL`         | — (optional) |
    /// | `CREATOR_ID`           | `1`          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage_backend: StorageBackend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".into())
            .parse()
            .expect("STORAGE_BACKEND must be 'memory' or 'postgres'");

        let database_url = std::env::var("DATABASE_URL").ok();

        let creator_id: i64 = std::env::var("CREATOR_ID")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("CREATOR_ID must be a valid i64");

        Self {
            host,
            port,
            request_timeout_secs,
            storage_backend,
            database_url,
            creator_id,
        }
    }
}
