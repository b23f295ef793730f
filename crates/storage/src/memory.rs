//! In-memory storage, for tests and throwaway sessions.

use std::collections::HashMap;
use fluency_core::{ProgressionStats, UserId};
use super::{Storage, Result};

/// `HashMap`-backed storage. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: HashMap<UserId, ProgressionStats>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn load_stats(&self, user: &UserId) -> Result<Option<ProgressionStats>> {
        Ok(self.records.get(user).cloned())
    }

    async fn save_stats(&mut self, user: &UserId, stats: &ProgressionStats) -> Result<()> {
        self.records.insert(user.clone(), stats.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserId>> {
        let mut users: Vec<_> = self.records.keys().cloned().collect();
        users.sort();
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        let user = UserId::new("ana").unwrap();
        assert!(storage.load_stats(&user).await.unwrap().is_none());

        let mut stats = ProgressionStats::new();
        stats.experience_points = 5;
        storage.save_stats(&user, &stats).await.unwrap();

        assert_eq!(storage.load_stats(&user).await.unwrap(), Some(stats));
        assert_eq!(storage.list_users().await.unwrap(), vec![user]);
        assert_eq!(storage.len(), 1);
    }
}
