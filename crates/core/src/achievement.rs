//! Achievement catalog.
//!
//! Achievements are one-time flags that grant a fixed experience bonus.
//! Manual achievements are granted on request (e.g. when the learner saves
//! their first word); the others are granted automatically by
//! [`AchievementCatalog::evaluate`] once the stats cross a threshold.

use serde::{Deserialize, Serialize};
use crate::level::LevelCurve;
use crate::stats::ProgressionStats;

/// Condition under which an achievement is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "snake_case")]
pub enum AchievementCriterion {
    /// Only granted by an explicit unlock
    Manual,
    /// Current streak reaches the given number of days
    StreakAtLeast(u32),
    /// Level reaches the given value
    LevelAtLeast(u32),
    /// Cumulative experience reaches the given total
    ExperienceAtLeast(u64),
}

impl AchievementCriterion {
    /// Whether the criterion holds for `stats`. Manual criteria never hold.
    pub fn is_met(&self, stats: &ProgressionStats) -> bool {
        match *self {
            Self::Manual => false,
            Self::StreakAtLeast(days) => stats.current_streak_days >= days,
            Self::LevelAtLeast(level) => stats.level >= level,
            Self::ExperienceAtLeast(xp) => stats.experience_points >= xp,
        }
    }
}

/// A grantable achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Stable identifier stored in the learner's stats
    pub id: String,

    /// Short display title
    pub title: String,

    /// What the learner did to earn it
    pub description: String,

    /// Experience granted on unlock
    pub xp_reward: u64,

    /// How it is granted
    pub criterion: AchievementCriterion,
}

impl Achievement {
    /// Create an achievement.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        xp_reward: u64,
        criterion: AchievementCriterion,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            xp_reward,
            criterion,
        }
    }
}

/// The set of achievements a learner can earn, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementCatalog {
    achievements: Vec<Achievement>,
}

impl AchievementCatalog {
    /// Build a catalog. Later duplicates of an id are dropped.
    pub fn new(achievements: impl IntoIterator<Item = Achievement>) -> Self {
        let mut unique: Vec<Achievement> = Vec::new();
        for achievement in achievements {
            if !unique.iter().any(|a| a.id == achievement.id) {
                unique.push(achievement);
            }
        }
        Self { achievements: unique }
    }

    /// Look up an achievement by id.
    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    /// All achievements in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter()
    }

    /// Number of achievements.
    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    /// Grant every automatic achievement whose criterion holds.
    ///
    /// Rewards can lift the level past another threshold, so this repeats
    /// until nothing new qualifies. Returns the updated stats and the newly
    /// granted achievements.
    pub fn evaluate(
        &self,
        curve: &LevelCurve,
        mut stats: ProgressionStats,
    ) -> (ProgressionStats, Vec<Achievement>) {
        let mut granted = Vec::new();
        loop {
            let next = self.achievements.iter().find(|a| {
                !stats.has_achievement(&a.id) && a.criterion.is_met(&stats)
            });
            let Some(achievement) = next else {
                break;
            };
            stats = curve.unlock_achievement(stats, &achievement.id, achievement.xp_reward);
            granted.push(achievement.clone());
        }
        (stats, granted)
    }
}

impl Default for AchievementCatalog {
    fn default() -> Self {
        use AchievementCriterion::*;
        Self::new([
            Achievement::new("first_word", "First Word", "Saved your first word", 10, Manual),
            Achievement::new("first_lesson", "First Lesson", "Finished your first lesson", 20, Manual),
            Achievement::new("streak_3", "Warming Up", "Practiced 3 days in a row", 30, StreakAtLeast(3)),
            Achievement::new("streak_7", "Week Streak", "Practiced 7 days in a row", 70, StreakAtLeast(7)),
            Achievement::new("streak_30", "Habit Formed", "Practiced 30 days in a row", 300, StreakAtLeast(30)),
            Achievement::new("level_5", "Rising Star", "Reached level 5", 50, LevelAtLeast(5)),
            Achievement::new("level_10", "Polyglot in Training", "Reached level 10", 100, LevelAtLeast(10)),
            Achievement::new("xp_1000", "Thousand Club", "Earned 1000 experience", 100, ExperienceAtLeast(1000)),
        ])
    }
}

impl<'a> IntoIterator for &'a AchievementCatalog {
    type Item = &'a Achievement;
    type IntoIter = std::slice::Iter<'a, Achievement>;

    fn into_iter(self) -> Self::IntoIter {
        self.achievements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_lookup() {
        let catalog = AchievementCatalog::default();
        assert_eq!(catalog.len(), 8);
        let first = catalog.get("first_word").unwrap();
        assert_eq!(first.xp_reward, 10);
        assert_eq!(first.criterion, AchievementCriterion::Manual);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = AchievementCatalog::new([
            Achievement::new("a", "A", "", 1, AchievementCriterion::Manual),
            Achievement::new("a", "A again", "", 99, AchievementCriterion::Manual),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a").unwrap().xp_reward, 1);
    }

    #[test]
    fn test_manual_never_auto_granted() {
        let catalog = AchievementCatalog::default();
        let (stats, granted) = catalog.evaluate(&LevelCurve::default(), ProgressionStats::new());
        assert!(granted.is_empty());
        assert_eq!(stats, ProgressionStats::new());
    }

    #[test]
    fn test_streak_achievement_granted_once() {
        let catalog = AchievementCatalog::default();
        let curve = LevelCurve::default();
        let stats = ProgressionStats {
            current_streak_days: 3,
            ..Default::default()
        };

        let (stats, granted) = catalog.evaluate(&curve, stats);
        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].id, "streak_3");
        assert_eq!(stats.experience_points, 30);

        let (again, granted) = catalog.evaluate(&curve, stats.clone());
        assert!(granted.is_empty());
        assert_eq!(again, stats);
    }

    #[test]
    fn test_rewards_cascade_into_level_achievements() {
        let catalog = AchievementCatalog::default();
        let curve = LevelCurve::default();
        // Level 5 starts at 812; the streak reward pushes 800 over it
        let stats = ProgressionStats {
            current_streak_days: 3,
            ..curve.add_experience(ProgressionStats::new(), 800)
        };
        assert_eq!(stats.level, 4);

        let (stats, granted) = catalog.evaluate(&curve, stats);
        let ids: Vec<_> = granted.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["streak_3", "level_5"]);
        assert_eq!(stats.experience_points, 880);
        assert_eq!(stats.level, 5);
    }
}
