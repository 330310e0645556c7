use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::domain::{DailyPoints, Points, PointsRecord};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying points records.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Connect to a process-local in-memory database.
    /// The pool is capped at a single never-expiring connection: SQLite gives
    /// every new `:memory:` connection its own empty database, so the pool
    /// must hold exactly one for all queries to see the same ledger.
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Idempotent, safe to call on every startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Insert a new immutable record, assigning `id` and `created_at`.
    /// The insert runs inside a transaction; any failure rolls it back so no
    /// partial row is ever visible.
    pub async fn insert_record(
        &self,
        user: &str,
        points: Points,
        description: Option<&str>,
    ) -> Result<PointsRecord> {
        let created_at = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            INSERT INTO points_records (user, points, description, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user)
        .bind(points)
        .bind(description)
        .bind(created_at.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert points record")?;

        tx.commit()
            .await
            .context("Failed to commit points record")?;

        Ok(PointsRecord {
            id: row.get("id"),
            user: user.to_string(),
            points,
            description: description.map(str::to_string),
            created_at,
        })
    }

    /// List all records for a user, newest first.
    pub async fn list_records(&self, user: &str) -> Result<Vec<PointsRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user, points, description, created_at
            FROM points_records
            WHERE user = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list points records")?;

        rows.iter().map(Self::row_to_record).collect()
    }

    /// Compute a user's balance using SQL aggregation.
    /// The balance is always derived from the deltas, never stored.
    pub async fn sum_points(&self, user: &str) -> Result<Points> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(points), 0) as total
            FROM points_records
            WHERE user = ?
            "#,
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum points")?;

        Ok(row.get("total"))
    }

    /// Sum a user's deltas per calendar date within `[from, to]`, ordered by
    /// date. Dates with no records are omitted, never zero-filled.
    pub async fn daily_sums(
        &self,
        user: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyPoints>> {
        let rows = sqlx::query(
            r#"
            SELECT date(created_at) as day, SUM(points) as points
            FROM points_records
            WHERE user = ? AND created_at >= ? AND created_at <= ?
            GROUP BY date(created_at)
            ORDER BY day
            "#,
        )
        .bind(user)
        .bind(from.to_rfc3339())
        .bind(to.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate daily points")?;

        rows.iter()
            .map(|row| {
                let day: String = row.get("day");
                Ok(DailyPoints {
                    date: day.parse::<NaiveDate>().context("Invalid date bucket")?,
                    points: row.get("points"),
                })
            })
            .collect()
    }

    /// All user identifiers appearing in any record, in no guaranteed order.
    pub async fn distinct_users(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT user FROM points_records")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")?;

        Ok(rows.iter().map(|row| row.get("user")).collect())
    }

    /// Total number of records in the ledger.
    pub async fn count_records(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM points_records")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count records")?;

        Ok(row.get("count"))
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<PointsRecord> {
        let created_at_str: String = row.get("created_at");

        Ok(PointsRecord {
            id: row.get("id"),
            user: row.get("user"),
            points: row.get("points"),
            description: row.get("description"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
