use chrono::{Duration, Utc};

use crate::domain::{DEFAULT_USER, DEMO_USER, DailyPoints, Points, PointsRecord};
use crate::storage::Repository;

use super::AppError;

/// Points credited to each demo user when seeding an empty ledger.
const SEED_POINTS: Points = 10;

/// Application service providing high-level operations for the points ledger.
/// This is the primary interface for any client (HTTP API, tests, etc.).
pub struct LedgerService {
    repo: Repository,
}

/// A user's derived balance together with their full record history.
pub struct PointsSummary {
    pub total_points: Points,
    pub records: Vec<PointsRecord>,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a file-backed database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Initialize a process-local in-memory database.
    /// The ledger only lives as long as the process; there is no durability.
    pub async fn init_in_memory() -> Result<Self, AppError> {
        let repo = Repository::connect_in_memory().await?;
        repo.migrate().await?;
        Ok(Self::new(repo))
    }

    /// Insert one starter record per demo user when the ledger is empty.
    /// A ledger that already has records is left untouched.
    pub async fn seed_demo_data(&self) -> Result<(), AppError> {
        if self.repo.count_records().await? > 0 {
            return Ok(());
        }

        for user in [DEFAULT_USER, DEMO_USER] {
            self.repo
                .insert_record(user, SEED_POINTS, Some("initial points"))
                .await?;
        }

        Ok(())
    }

    /// Derived balance plus full history for a user, newest record first.
    /// A user with no records gets a zero balance and an empty history.
    pub async fn points_summary(&self, user: &str) -> Result<PointsSummary, AppError> {
        let total_points = self.repo.sum_points(user).await?;
        let records = self.repo.list_records(user).await?;

        Ok(PointsSummary {
            total_points,
            records,
        })
    }

    /// Record a points gain for a user.
    pub async fn add_points(
        &self,
        user: &str,
        points: Points,
        description: Option<String>,
    ) -> Result<PointsRecord, AppError> {
        if points <= 0 {
            return Err(AppError::NonPositivePoints);
        }

        let description = description.unwrap_or_else(|| "points added".to_string());
        Ok(self.repo.insert_record(user, points, Some(&description)).await?)
    }

    /// Record a points reduction for a user. Callers submit the magnitude;
    /// the stored delta is negated.
    pub async fn reduce_points(
        &self,
        user: &str,
        points: Points,
        description: Option<String>,
    ) -> Result<PointsRecord, AppError> {
        if points <= 0 {
            return Err(AppError::NonPositivePoints);
        }

        let description = description.unwrap_or_else(|| "points reduced".to_string());
        Ok(self
            .repo
            .insert_record(user, -points, Some(&description))
            .await?)
    }

    /// Daily points buckets for the trailing `days`-day window ending now.
    /// A window that holds no records yields an empty sequence, as does any
    /// `days` value too extreme to express as a duration.
    pub async fn daily_history(
        &self,
        user: &str,
        days: i64,
    ) -> Result<Vec<DailyPoints>, AppError> {
        let to = Utc::now();
        let from = to - Duration::try_days(days).unwrap_or_else(Duration::zero);
        Ok(self.repo.daily_sums(user, from, to).await?)
    }

    /// All user identifiers appearing in the ledger.
    pub async fn list_users(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.distinct_users().await?)
    }
}
