//! Storage trait abstraction.

use async_trait::async_trait;
use fluency_core::{ProgressionStats, UserId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database error
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Persistence for per-learner progression stats.
///
/// A missing record is `Ok(None)`, not an error; callers treat it as fresh
/// default stats. Any `Err` means the backing store itself is unreachable
/// or corrupt.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load a learner's stats.
    async fn load_stats(&self, user: &UserId) -> Result<Option<ProgressionStats>>;

    /// Save a learner's stats (create or replace).
    async fn save_stats(&mut self, user: &UserId, stats: &ProgressionStats) -> Result<()>;

    /// List every learner with stored stats.
    async fn list_users(&self) -> Result<Vec<UserId>>;
}
