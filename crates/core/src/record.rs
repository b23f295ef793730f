//! Lenient decoding of stored stats records.
//!
//! Records written by older clients use camelCase keys, sometimes store
//! timestamps instead of dates, and may be missing fields entirely. Each
//! field is read on its own and falls back to its default, so one bad field
//! never discards the rest of a learner's progress.

use std::collections::BTreeSet;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tracing::warn;
use crate::level::LevelCurve;
use crate::stats::ProgressionStats;

impl ProgressionStats {
    /// Decode a stored record, defaulting missing or malformed fields.
    ///
    /// The stored level is ignored and re-derived with `curve`.
    pub fn from_record(record: &Value, curve: &LevelCurve) -> Self {
        let Some(object) = record.as_object() else {
            warn!("stats record is not an object, using defaults");
            return Self::default().normalized(curve);
        };

        let field = |snake: &str, camel: &str| object.get(snake).or_else(|| object.get(camel));

        let stats = Self {
            experience_points: field("experience_points", "experiencePoints")
                .and_then(read_u64)
                .unwrap_or(0),
            level: 1,
            current_streak_days: field("current_streak_days", "currentStreakDays")
                .and_then(read_u32)
                .unwrap_or(0),
            longest_streak_days: field("longest_streak_days", "longestStreakDays")
                .and_then(read_u32)
                .unwrap_or(0),
            last_activity_date: field("last_activity_date", "lastActivityDate")
                .and_then(read_date),
            unlocked_achievement_ids: field("unlocked_achievement_ids", "unlockedAchievementIds")
                .map(read_ids)
                .unwrap_or_default(),
        };
        stats.normalized(curve)
    }
}

fn read_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_u32(value: &Value) -> Option<u32> {
    read_u64(value).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn read_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    match DateTime::parse_from_rfc3339(s) {
        Ok(timestamp) => Some(timestamp.date_naive()),
        Err(_) => {
            warn!(value = s, "unreadable last activity date, treating as absent");
            None
        }
    }
}

fn read_ids(value: &Value) -> BTreeSet<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> ProgressionStats {
        ProgressionStats::from_record(&value, &LevelCurve::default())
    }

    #[test]
    fn test_round_trips_own_format() {
        let mut stats = ProgressionStats::new();
        stats.experience_points = 260;
        stats.level = 3;
        stats.current_streak_days = 2;
        stats.longest_streak_days = 6;
        stats.last_activity_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        stats.unlocked_achievement_ids.insert("first_word".to_string());

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(decode(value), stats);
    }

    #[test]
    fn test_reads_legacy_camel_case() {
        let stats = decode(json!({
            "experiencePoints": 120,
            "level": 9,
            "currentStreakDays": 4,
            "lastActivityDate": "2024-05-01T21:15:00+02:00",
            "unlockedAchievementIds": ["first_word", 7, null, "streak_3"]
        }));
        assert_eq!(stats.experience_points, 120);
        assert_eq!(stats.level, 2);
        assert_eq!(stats.current_streak_days, 4);
        assert_eq!(stats.longest_streak_days, 4);
        assert_eq!(stats.last_activity_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(stats.unlocked_achievement_ids.len(), 2);
    }

    #[test]
    fn test_malformed_fields_default() {
        let stats = decode(json!({
            "experience_points": -5,
            "current_streak_days": "three",
            "last_activity_date": "yesterday",
            "unlocked_achievement_ids": "first_word"
        }));
        assert_eq!(stats, ProgressionStats::new());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let stats = decode(json!({ "experience_points": "250" }));
        assert_eq!(stats.experience_points, 250);
        assert_eq!(stats.level, 3);
    }

    #[test]
    fn test_non_object_defaults() {
        assert_eq!(decode(json!([1, 2, 3])), ProgressionStats::new());
        assert_eq!(decode(Value::Null), ProgressionStats::new());
    }
}
