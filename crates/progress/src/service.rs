//! Progression service.
//!
//! Loads a learner's stats, applies one operation, grants any achievements
//! that became due and persists the result. Every call is a full
//! load → apply → save cycle; the service holds no per-learner state.

use chrono::NaiveDate;
use fluency_core::{
    apply_activity, Achievement, AchievementCatalog, LevelCurve, LevelProgress,
    ProgressionStats, UserId,
};
use fluency_storage::Storage;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ProgressError, Result};
use crate::event::{ProgressEvent, ProgressUpdate};

/// Everything a progress screen needs for one learner.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    /// Learner
    pub user: UserId,

    /// Current stats
    pub stats: ProgressionStats,

    /// Position inside the current level
    pub progress: LevelProgress,

    /// Catalog entries with their unlock state, in display order
    pub achievements: Vec<AchievementStatus>,
}

/// An achievement and whether the learner has it.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    /// Catalog entry
    pub achievement: Achievement,

    /// Whether it has been granted
    pub unlocked: bool,
}

/// Progression service over a [`Storage`] backend.
pub struct ProgressionService<S: Storage> {
    storage: S,
    curve: LevelCurve,
    catalog: AchievementCatalog,
}

impl<S: Storage> ProgressionService<S> {
    /// Create a service with the default curve and catalog.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            curve: LevelCurve::default(),
            catalog: AchievementCatalog::default(),
        }
    }

    /// Set the level curve.
    pub fn with_curve(mut self, curve: LevelCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Set the achievement catalog.
    pub fn with_catalog(mut self, catalog: AchievementCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Level curve in use.
    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    /// Achievement catalog in use.
    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// Borrow the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Unwrap the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Load a learner's stats; an unknown learner gets fresh defaults.
    pub async fn load(&self, user: &UserId) -> Result<ProgressionStats> {
        match self.storage.load_stats(user).await {
            Ok(Some(stats)) => Ok(stats.normalized(&self.curve)),
            Ok(None) => {
                debug!(%user, "no stored stats, starting fresh");
                Ok(ProgressionStats::default())
            }
            Err(source) => Err(ProgressError::Unavailable {
                user: user.clone(),
                source,
                fallback: Box::default(),
            }),
        }
    }

    /// Add experience to a learner.
    pub async fn add_experience(&mut self, user: &UserId, amount: u64) -> Result<ProgressUpdate> {
        let before = self.load(user).await?;
        let after = self.curve.add_experience(before.clone(), amount);
        let events = if amount > 0 {
            vec![ProgressEvent::ExperienceGained { amount }]
        } else {
            Vec::new()
        };
        self.commit(user, before, after, events).await
    }

    /// Record a learning activity on `today` (the learner's local date).
    pub async fn record_activity(&mut self, user: &UserId, today: NaiveDate) -> Result<ProgressUpdate> {
        let before = self.load(user).await?;
        let (after, change) = apply_activity(before.clone(), today);
        debug!(%user, %today, ?change, "recorded activity");
        self.commit(user, before, after, vec![ProgressEvent::Streak { change }]).await
    }

    /// Grant a catalog achievement. Granting it again changes nothing.
    pub async fn unlock_achievement(&mut self, user: &UserId, achievement_id: &str) -> Result<ProgressUpdate> {
        let achievement = self
            .catalog
            .get(achievement_id)
            .cloned()
            .ok_or_else(|| ProgressError::UnknownAchievement(achievement_id.to_string()))?;

        let before = self.load(user).await?;
        let mut events = Vec::new();
        if !before.has_achievement(&achievement.id) {
            events.push(ProgressEvent::AchievementUnlocked {
                id: achievement.id.clone(),
                xp_reward: achievement.xp_reward,
            });
        }
        let after = self
            .curve
            .unlock_achievement(before.clone(), &achievement.id, achievement.xp_reward);
        self.commit(user, before, after, events).await
    }

    /// Stats, level progress and achievement states for display.
    pub async fn summary(&self, user: &UserId) -> Result<ProgressSummary> {
        let stats = self.load(user).await?;
        Ok(self.summarize(user, stats))
    }

    /// Build a summary from stats the caller already holds, e.g. a fallback.
    pub fn summarize(&self, user: &UserId, stats: ProgressionStats) -> ProgressSummary {
        let progress = self.curve.progress(stats.experience_points);
        let achievements = self
            .catalog
            .iter()
            .map(|a| AchievementStatus {
                unlocked: stats.has_achievement(&a.id),
                achievement: a.clone(),
            })
            .collect();

        ProgressSummary {
            user: user.clone(),
            stats,
            progress,
            achievements,
        }
    }

    /// Grant due achievements, derive events and persist if anything changed.
    async fn commit(
        &mut self,
        user: &UserId,
        before: ProgressionStats,
        after: ProgressionStats,
        mut events: Vec<ProgressEvent>,
    ) -> Result<ProgressUpdate> {
        let (after, granted) = self.catalog.evaluate(&self.curve, after);
        for achievement in granted {
            info!(%user, achievement = %achievement.id, xp = achievement.xp_reward, "achievement unlocked");
            events.push(ProgressEvent::AchievementUnlocked {
                id: achievement.id,
                xp_reward: achievement.xp_reward,
            });
        }

        if after.level > before.level {
            info!(%user, from = before.level, to = after.level, "level up");
            events.push(ProgressEvent::LeveledUp {
                from: before.level,
                to: after.level,
            });
        }

        if after == before {
            debug!(%user, "stats unchanged, skipping write");
        } else if let Err(source) = self.storage.save_stats(user, &after).await {
            return Err(ProgressError::Unavailable {
                user: user.clone(),
                source,
                fallback: Box::new(after),
            });
        }

        Ok(ProgressUpdate { stats: after, events })
    }
}
