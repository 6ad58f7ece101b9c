//! Postgres event store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::RwLock;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use calendar_core::error::CoreError;
use calendar_core::event::{Event, EventPatch};
use calendar_core::store::EventStore;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Column list for `events` queries.
const COLUMNS: &str = "id, title, description, start_dt, end_dt, creator_id, notify_before, notified";

/// A single `events` table; every operation is one autocommit statement, so
/// concurrency control is the database's native isolation. Cross-call
/// atomicity (read due events, then mark notified) is deliberately not
/// transactional — the notification pipeline is at-least-once.
///
/// The connection lifecycle is explicit: operations invoked before
/// [`PgStore::connect`] fail with `CoreError::NotConnected`.
pub struct PgStore {
    dsn: String,
    pool: RwLock<Option<PgPool>>,
}

impl PgStore {
    /// A store that will connect to `dsn` on [`PgStore::connect`].
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            pool: RwLock::new(None),
        }
    }

    /// Wrap an already-connected pool (tests, or callers that manage their
    /// own pool lifecycle).
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            dsn: String::new(),
            pool: RwLock::new(Some(pool)),
        }
    }

    /// Open the connection pool and verify the database is reachable.
    /// A no-op when already connected.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if self.pool.read().is_some() {
            return Ok(());
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&self.dsn)
            .await
            .map_err(storage_error)?;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(storage_error)?;

        *self.pool.write() = Some(pool);
        tracing::debug!("Event store connected");
        Ok(())
    }

    /// Apply pending schema migrations.
    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        let pool = self.pool()?;
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))
    }

    /// Close the pool. A no-op when not connected.
    pub async fn close(&self) {
        let pool = self.pool.write().take();
        if let Some(pool) = pool {
            pool.close().await;
        }
    }

    fn pool(&self) -> Result<PgPool, CoreError> {
        self.pool.read().clone().ok_or(CoreError::NotConnected)
    }
}

/// Row mapping for the `events` table. `notify_before` is stored as integer
/// nanoseconds, mirroring the wire encoding.
#[derive(Debug, FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    start_dt: DateTime<Utc>,
    end_dt: DateTime<Utc>,
    creator_id: i64,
    notify_before: i64,
    notified: bool,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            start_date: row.start_dt,
            end_date: row.end_dt,
            creator_id: row.creator_id,
            notify_before: Duration::nanoseconds(row.notify_before),
            notified: row.notified,
        }
    }
}

fn storage_error(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

fn nanos(duration: Duration) -> i64 {
    duration.num_nanoseconds().unwrap_or(i64::MAX)
}

#[async_trait]
impl EventStore for PgStore {
    async fn create(&self, event: Event) -> Result<(), CoreError> {
        let pool = self.pool()?;
        let result = sqlx::query(
            "INSERT INTO events (id, title, description, start_dt, end_dt, creator_id, notify_before, notified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.creator_id)
        .bind(nanos(event.notify_before))
        .bind(event.notified)
        .execute(&pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                // PostgreSQL unique constraint violation: error code 23505.
                if let sqlx::Error::Database(db_err) = &err {
                    if db_err.code().as_deref() == Some("23505") {
                        return Err(CoreError::AlreadyExists { id: event.id });
                    }
                }
                Err(storage_error(err))
            }
        }
    }

    async fn update(&self, id: &str, patch: EventPatch) -> Result<(), CoreError> {
        let pool = self.pool()?;
        let result = sqlx::query(
            "UPDATE events SET \
             title = $1, description = $2, start_dt = $3, end_dt = $4, \
             creator_id = $5, notify_before = $6, notified = $7 \
             WHERE id = $8",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.creator_id)
        .bind(nanos(patch.notify_before))
        .bind(patch.notified)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let pool = self.pool()?;
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Event, CoreError> {
        let pool = self.pool()?;
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(storage_error)?;

        row.map(Event::from)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })
    }

    async fn list_by_date_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, CoreError> {
        let pool = self.pool()?;
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE ($1::timestamptz IS NULL OR end_dt >= $1) \
               AND ($2::timestamptz IS NULL OR start_dt <= $2)"
        );
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(&pool)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_due_for_notification(&self, day: NaiveDate) -> Result<Vec<Event>, CoreError> {
        let pool = self.pool()?;
        // The notification day is computed in SQL so the table is never
        // scanned client-side. notify_before is nanoseconds; interval
        // arithmetic works at microsecond precision.
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE (end_dt - (notify_before / 1000) * interval '1 microsecond')::date = $1"
        );
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(day)
            .fetch_all(&pool)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_on_date(&self, day: NaiveDate) -> Result<Vec<Event>, CoreError> {
        let pool = self.pool()?;
        let query = format!("SELECT {COLUMNS} FROM events WHERE start_dt::date = $1");
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(day)
            .fetch_all(&pool)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_on_week(&self, week_start: NaiveDate) -> Result<Vec<Event>, CoreError> {
        let pool = self.pool()?;
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE start_dt::date >= $1 AND end_dt::date <= $1 + 6"
        );
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(week_start)
            .fetch_all(&pool)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_on_month(&self, month_start: NaiveDate) -> Result<Vec<Event>, CoreError> {
        let pool = self.pool()?;
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE start_dt::date >= $1 \
               AND end_dt::date <= ($1::date + interval '1 month' - interval '1 day')::date"
        );
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(month_start)
            .fetch_all(&pool)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Event::from).collect())
    }
}
