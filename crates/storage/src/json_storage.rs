//! JSON file storage implementation.
//!
//! Stores one JSON file per learner in a `stats/` directory and keeps a small
//! per-learner meta marker (version + updated_at) next to it. Records are
//! decoded leniently, so files written by older clients still load.

use std::path::{Path, PathBuf};
use fluency_core::{LevelCurve, ProgressionStats, UserId};
use super::{Storage, Result};
use tokio::fs;
use tracing::debug;

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    curve: LevelCurve,
}

impl JsonStorage {
    /// Create storage. This will create the `stats/` and `meta/` subdirectories
    /// under `root` if they do not exist.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("stats")).await?;
        fs::create_dir_all(root.join("meta").join("stats")).await?;

        Ok(Self {
            root,
            curve: LevelCurve::default(),
        })
    }

    /// Level curve used to re-derive levels of loaded records.
    pub fn with_curve(mut self, curve: LevelCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn stats_path(&self, user: &UserId) -> PathBuf {
        self.root.join("stats").join(format!("{}.json", user))
    }

    fn meta_path(&self, user: &UserId) -> PathBuf {
        self.root.join("meta").join("stats").join(format!("{}.meta.json", user))
    }

    /// Current version of a learner's record (0 if never written).
    pub async fn version(&self, user: &UserId) -> Result<u64> {
        match fs::read_to_string(self.meta_path(user)).await {
            Ok(s) => Ok(serde_json::from_str::<serde_json::Value>(&s)
                .ok()
                .and_then(|json| json.get("version").and_then(|v| v.as_u64()))
                .unwrap_or(0)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and increment the per-learner version, return the new version.
    async fn bump_version(&self, user: &UserId) -> Result<u64> {
        let version = self.version(user).await? + 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        write_atomic(&self.meta_path(user), serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn load_stats(&self, user: &UserId) -> Result<Option<ProgressionStats>> {
        let path = self.stats_path(user);
        match fs::read_to_string(&path).await {
            Ok(json) => {
                let value: serde_json::Value = serde_json::from_str(&json)?;
                debug!(%user, path = %path.display(), "loaded stats");
                Ok(Some(ProgressionStats::from_record(&value, &self.curve)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_stats(&mut self, user: &UserId, stats: &ProgressionStats) -> Result<()> {
        let json = serde_json::to_string_pretty(stats)?;
        write_atomic(&self.stats_path(user), json.as_bytes()).await?;

        let version = self.bump_version(user).await?;
        debug!(%user, version, "saved stats");
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserId>> {
        let mut users = Vec::new();
        let mut rd = fs::read_dir(self.root.join("stats")).await?;
        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(user) = UserId::new(stem) {
                users.push(user);
            }
        }
        users.sort();
        Ok(users)
    }
}

/// Write to a sibling temp file, then rename it over `path`.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        assert!(storage.load_stats(&user("nobody")).await.unwrap().is_none());
        assert_eq!(storage.version(&user("nobody")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let mut stats = ProgressionStats::new();
        stats.experience_points = 300;
        stats.level = 3;
        stats.current_streak_days = 2;
        stats.longest_streak_days = 2;
        stats.last_activity_date = NaiveDate::from_ymd_opt(2024, 6, 2);
        stats.unlocked_achievement_ids.insert("first_word".to_string());

        storage.save_stats(&user("ana"), &stats).await.unwrap();
        let loaded = storage.load_stats(&user("ana")).await.unwrap().unwrap();
        assert_eq!(loaded, stats);
        assert_eq!(storage.version(&user("ana")).await.unwrap(), 1);

        storage.save_stats(&user("ana"), &stats).await.unwrap();
        assert_eq!(storage.version(&user("ana")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_loads_legacy_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        std::fs::write(
            dir.path().join("stats").join("legacy.json"),
            r#"{"experiencePoints": 150, "level": 7, "currentStreakDays": 1}"#,
        )
        .unwrap();

        let loaded = storage.load_stats(&user("legacy")).await.unwrap().unwrap();
        assert_eq!(loaded.experience_points, 150);
        assert_eq!(loaded.level, 2);
        assert_eq!(loaded.current_streak_days, 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("stats").join("broken.json"), "{not json").unwrap();

        assert!(storage.load_stats(&user("broken")).await.is_err());
    }

    #[tokio::test]
    async fn test_list_users() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        storage.save_stats(&user("zoe"), &ProgressionStats::new()).await.unwrap();
        storage.save_stats(&user("ana"), &ProgressionStats::new()).await.unwrap();
        std::fs::write(dir.path().join("stats").join("notes.txt"), "ignored").unwrap();

        let users = storage.list_users().await.unwrap();
        assert_eq!(users, vec![user("ana"), user("zoe")]);
    }
}
