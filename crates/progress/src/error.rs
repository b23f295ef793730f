//! Service errors.

use fluency_core::{ProgressionStats, UserId};
use fluency_storage::StorageError;

/// Result type for progression service calls.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors surfaced by [`crate::ProgressionService`].
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// The store could not be read or written.
    ///
    /// `fallback` carries the stats the caller should show instead: defaults
    /// when a read failed, the already computed new stats when a write failed.
    #[error("progress storage unavailable for {user}: {source}")]
    Unavailable {
        /// Learner whose stats were being accessed
        user: UserId,
        /// Underlying storage failure
        #[source]
        source: StorageError,
        /// Stats to display in place of the stored ones
        fallback: Box<ProgressionStats>,
    },

    /// Achievement id is not in the catalog
    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),
}

impl ProgressError {
    /// Whether this is the "storage unavailable" condition.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// In-memory stats to fall back to, if storage was the problem.
    pub fn fallback(&self) -> Option<&ProgressionStats> {
        match self {
            Self::Unavailable { fallback, .. } => Some(fallback.as_ref()),
            Self::UnknownAchievement(_) => None,
        }
    }
}
