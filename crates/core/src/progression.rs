//! Pure progression operations.
//!
//! Each operation takes the current stats by value and returns the next
//! stats. None of them touch storage; the caller persists the result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::level::LevelCurve;
use crate::stats::ProgressionStats;

/// How a recorded activity affected the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreakChange {
    /// First activity ever; streak is now 1
    Started,
    /// Activity already recorded today; nothing changed
    SameDay,
    /// Activity on the day after the last one
    Extended {
        /// Streak after the extension
        streak: u32,
    },
    /// Gap of more than one day; streak restarted at 1
    Reset {
        /// Streak that was broken
        previous: u32,
    },
    /// Date earlier than the last activity; ignored
    OutOfOrder {
        /// Last recorded activity date
        last: NaiveDate,
    },
}

impl StreakChange {
    /// Whether the stats were modified.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Started | Self::Extended { .. } | Self::Reset { .. })
    }
}

impl LevelCurve {
    /// Add `amount` experience and re-derive the level.
    pub fn add_experience(&self, mut stats: ProgressionStats, amount: u64) -> ProgressionStats {
        stats.experience_points = stats.experience_points.saturating_add(amount);
        stats.level = self.level_for_xp(stats.experience_points);
        stats
    }

    /// Grant `achievement_id` and its reward, unless it was already granted.
    pub fn unlock_achievement(
        &self,
        mut stats: ProgressionStats,
        achievement_id: &str,
        xp_reward: u64,
    ) -> ProgressionStats {
        if stats.has_achievement(achievement_id) {
            return stats;
        }
        stats.unlocked_achievement_ids.insert(achievement_id.to_string());
        self.add_experience(stats, xp_reward)
    }
}

/// Add experience on the default curve.
pub fn add_experience(stats: ProgressionStats, amount: u64) -> ProgressionStats {
    LevelCurve::default().add_experience(stats, amount)
}

/// Grant an achievement on the default curve.
pub fn unlock_achievement(
    stats: ProgressionStats,
    achievement_id: &str,
    xp_reward: u64,
) -> ProgressionStats {
    LevelCurve::default().unlock_achievement(stats, achievement_id, xp_reward)
}

/// Record an activity on `today` and update the daily streak.
pub fn record_activity(stats: ProgressionStats, today: NaiveDate) -> ProgressionStats {
    apply_activity(stats, today).0
}

/// Like [`record_activity`], also reporting what happened to the streak.
pub fn apply_activity(
    mut stats: ProgressionStats,
    today: NaiveDate,
) -> (ProgressionStats, StreakChange) {
    let change = match stats.last_activity_date {
        None => {
            stats.current_streak_days = 1;
            StreakChange::Started
        }
        Some(last) if today == last => return (stats, StreakChange::SameDay),
        Some(last) if today < last => {
            warn!(%today, %last, "activity dated before the last recorded activity, ignoring");
            return (stats, StreakChange::OutOfOrder { last });
        }
        Some(last) if last.succ_opt() == Some(today) => {
            stats.current_streak_days = stats.current_streak_days.saturating_add(1);
            StreakChange::Extended {
                streak: stats.current_streak_days,
            }
        }
        Some(_) => {
            let previous = stats.current_streak_days;
            stats.current_streak_days = 1;
            StreakChange::Reset { previous }
        }
    };

    stats.last_activity_date = Some(today);
    stats.longest_streak_days = stats.longest_streak_days.max(stats.current_streak_days);
    (stats, change)
}
