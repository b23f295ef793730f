//! SQLite storage backend.
//!
//! One row per learner in `progression_stats`. Achievement ids are kept as a
//! JSON array in a text column. Rows are decoded field by field, like the
//! JSON backend, so a bad column value falls back to its default.

use async_trait::async_trait;
use chrono::NaiveDate;
use fluency_core::{LevelCurve, ProgressionStats, UserId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use super::trait_::{Storage, Result};

/// SQLite storage implementation.
#[derive(Clone)]
pub struct SqliteStorage {
    /// Database connection pool
    pool: sqlx::SqlitePool,
    curve: LevelCurve,
}

impl SqliteStorage {
    /// Open (creating if needed) a database file.
    pub async fn new_from_path(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Create an in-memory SQLite storage for testing.
    pub async fn in_memory() -> Result<Self> {
        // Every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: sqlx::SqlitePool) -> Result<Self> {
        let storage = Self {
            pool,
            curve: LevelCurve::default(),
        };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Level curve used to re-derive levels of loaded rows.
    pub fn with_curve(mut self, curve: LevelCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Initialize the database schema.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS progression_stats (
                user_id TEXT PRIMARY KEY,
                experience_points INTEGER NOT NULL DEFAULT 0,
                current_streak_days INTEGER NOT NULL DEFAULT 0,
                longest_streak_days INTEGER NOT NULL DEFAULT 0,
                last_activity_date TEXT,
                achievements TEXT NOT NULL DEFAULT '[]',
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Simple connectivity probe.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    fn decode_row(&self, row: &SqliteRow) -> ProgressionStats {
        let int = |column: &str| row.try_get::<i64, _>(column).unwrap_or(0).max(0);

        let last_activity_date = row
            .try_get::<Option<String>, _>("last_activity_date")
            .ok()
            .flatten()
            .and_then(|s| match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    warn!(value = %s, "unreadable last_activity_date column");
                    None
                }
            });

        let unlocked_achievement_ids = row
            .try_get::<String, _>("achievements")
            .ok()
            .and_then(|s| serde_json::from_str::<Vec<serde_json::Value>>(&s).ok())
            .map(|items| {
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect::<BTreeSet<_>>()
            })
            .unwrap_or_default();

        ProgressionStats {
            experience_points: int("experience_points") as u64,
            level: 1,
            current_streak_days: u32::try_from(int("current_streak_days")).unwrap_or(u32::MAX),
            longest_streak_days: u32::try_from(int("longest_streak_days")).unwrap_or(u32::MAX),
            last_activity_date,
            unlocked_achievement_ids,
        }
        .normalized(&self.curve)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn load_stats(&self, user: &UserId) -> Result<Option<ProgressionStats>> {
        let row = sqlx::query("SELECT * FROM progression_stats WHERE user_id = ?")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| {
            debug!(%user, "loaded stats row");
            self.decode_row(&row)
        }))
    }

    async fn save_stats(&mut self, user: &UserId, stats: &ProgressionStats) -> Result<()> {
        let achievements = serde_json::to_string(&stats.unlocked_achievement_ids)?;

        sqlx::query(
            "INSERT OR REPLACE INTO progression_stats
                (user_id, experience_points, current_streak_days, longest_streak_days,
                 last_activity_date, achievements, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.as_str())
        .bind(i64::try_from(stats.experience_points).unwrap_or(i64::MAX))
        .bind(i64::from(stats.current_streak_days))
        .bind(i64::from(stats.longest_streak_days))
        .bind(stats.last_activity_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(achievements)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(%user, "saved stats row");
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserId>> {
        let rows = sqlx::query("SELECT user_id FROM progression_stats ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("user_id").ok())
            .filter_map(|id| UserId::new(id).ok())
            .collect())
    }
}
