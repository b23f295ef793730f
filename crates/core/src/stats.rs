//! Progression stats - the per-learner record.

use std::collections::BTreeSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::level::LevelCurve;

/// Experience, level, streak and achievements of one learner.
///
/// `level` is derived from `experience_points`. Every progression operation
/// recomputes it, and records read back from storage are normalized with
/// [`ProgressionStats::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionStats {
    /// Cumulative experience
    pub experience_points: u64,

    /// Level derived from `experience_points`
    pub level: u32,

    /// Consecutive calendar days with at least one activity
    pub current_streak_days: u32,

    /// Best streak ever reached
    pub longest_streak_days: u32,

    /// Local calendar date of the most recent activity
    pub last_activity_date: Option<NaiveDate>,

    /// Achievements already granted
    pub unlocked_achievement_ids: BTreeSet<String>,
}

impl ProgressionStats {
    /// Fresh stats for a learner with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `achievement_id` has been granted.
    pub fn has_achievement(&self, achievement_id: &str) -> bool {
        self.unlocked_achievement_ids.contains(achievement_id)
    }

    /// Re-derive the level with `curve` and repair the streak bookkeeping.
    pub fn normalized(mut self, curve: &LevelCurve) -> Self {
        self.level = curve.level_for_xp(self.experience_points);
        self.longest_streak_days = self.longest_streak_days.max(self.current_streak_days);
        self
    }
}

impl Default for ProgressionStats {
    fn default() -> Self {
        Self {
            experience_points: 0,
            level: 1,
            current_streak_days: 0,
            longest_streak_days: 0,
            last_activity_date: None,
            unlocked_achievement_ids: BTreeSet::new(),
        }
    }
}
