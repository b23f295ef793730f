//! Fluency core progression model.
//!
//! This crate defines the learner stats record and the pure functions that
//! turn experience into levels, track daily streaks and grant achievements.

#![warn(missing_docs)]

// Identities and errors
mod id;
mod error;

// Stats and the operations over them
mod stats;
mod level;
mod progression;
mod achievement;
mod record;

// Re-exports
pub use id::{UserId, MAX_USER_ID_LEN};
pub use error::CoreError;

pub use stats::ProgressionStats;
pub use level::{
    LevelCurve, CurveParams, LevelProgress,
    level_for_xp, xp_required_for_level, cumulative_xp_for_level,
};
pub use progression::{
    StreakChange, add_experience, record_activity, apply_activity, unlock_achievement,
};
pub use achievement::{Achievement, AchievementCatalog, AchievementCriterion};
