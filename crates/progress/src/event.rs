//! What changed as the result of a service call.

use fluency_core::{ProgressionStats, StreakChange};
use serde::{Deserialize, Serialize};

/// A single observable change to a learner's progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Experience was added directly
    ExperienceGained {
        /// Amount added
        amount: u64,
    },
    /// The level increased
    LeveledUp {
        /// Level before the call
        from: u32,
        /// Level after the call
        to: u32,
    },
    /// An activity was recorded
    Streak {
        /// Effect on the streak
        change: StreakChange,
    },
    /// An achievement was granted
    AchievementUnlocked {
        /// Achievement id
        id: String,
        /// Experience it granted
        xp_reward: u64,
    },
}

/// Stats after a service call, with the events that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Stats as persisted
    pub stats: ProgressionStats,

    /// Events in the order they happened
    pub events: Vec<ProgressEvent>,
}

impl ProgressUpdate {
    /// Level transition, if the call leveled the learner up.
    pub fn leveled_up(&self) -> Option<(u32, u32)> {
        self.events.iter().find_map(|e| match e {
            ProgressEvent::LeveledUp { from, to } => Some((*from, *to)),
            _ => None,
        })
    }

    /// Ids of achievements granted by the call.
    pub fn unlocked(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::AchievementUnlocked { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}
