//! Plain-text rendering of progression data.

use fluency_core::StreakChange;
use fluency_progress::{ProgressEvent, ProgressSummary};

const BAR_WIDTH: usize = 20;

/// Fixed-width progress bar for a fraction in `[0, 1]`.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).floor() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Multi-line summary of a learner's progression.
pub fn summary(summary: &ProgressSummary) -> String {
    let stats = &summary.stats;
    let progress = &summary.progress;
    let mut out = String::new();

    out.push_str(&format!("Learner: {}\n", summary.user));
    out.push_str(&format!(
        "  Level {}  {} {}/{} XP\n",
        progress.level,
        progress_bar(progress.fraction, BAR_WIDTH),
        progress.xp_into_level,
        progress.xp_for_level,
    ));
    out.push_str(&format!("  Total XP: {}\n", stats.experience_points));
    out.push_str(&format!(
        "  Streak: {} day(s) (best {})\n",
        stats.current_streak_days, stats.longest_streak_days
    ));
    match stats.last_activity_date {
        Some(date) => out.push_str(&format!("  Last activity: {}\n", date)),
        None => out.push_str("  Last activity: never\n"),
    }

    let unlocked = summary.achievements.iter().filter(|a| a.unlocked).count();
    out.push_str(&format!("  Achievements: {}/{}\n", unlocked, summary.achievements.len()));
    for status in summary.achievements.iter().filter(|a| a.unlocked) {
        out.push_str(&format!("    * {}\n", status.achievement.title));
    }
    out
}

/// One line describing an event.
pub fn event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::ExperienceGained { amount } => format!("+{} XP", amount),
        ProgressEvent::LeveledUp { from, to } => format!("Level up! {} -> {}", from, to),
        ProgressEvent::AchievementUnlocked { id, xp_reward } => {
            format!("Achievement unlocked: {} (+{} XP)", id, xp_reward)
        }
        ProgressEvent::Streak { change } => match change {
            StreakChange::Started => "Streak started: day 1".to_string(),
            StreakChange::SameDay => "Already practiced today".to_string(),
            StreakChange::Extended { streak } => format!("Streak extended: day {}", streak),
            StreakChange::Reset { previous } => {
                format!("Streak of {} day(s) broken, starting over at day 1", previous)
            }
            StreakChange::OutOfOrder { last } => {
                format!("Ignored: date is before last activity ({})", last)
            }
        },
    }
}
