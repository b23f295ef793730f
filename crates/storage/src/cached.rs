//! Read-through cache in front of a durable store.
//!
//! The cache is a plain value owned by whoever owns the store; there is no
//! process-wide state. Writes reach the inner store before the cache, so a
//! failed write never leaves the cache ahead of durable storage.

use std::collections::HashMap;
use fluency_core::{ProgressionStats, UserId};
use tokio::sync::RwLock;
use tracing::debug;
use super::{Storage, Result};

/// Caching wrapper around another [`Storage`].
pub struct CachedStorage<S: Storage> {
    inner: S,
    cache: RwLock<HashMap<UserId, Option<ProgressionStats>>>,
}

impl<S: Storage> CachedStorage<S> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Borrow the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the cached entry for `user`, forcing the next load to hit the store.
    pub async fn invalidate(&self, user: &UserId) {
        self.cache.write().await.remove(user);
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// Unwrap, discarding the cache.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait::async_trait]
impl<S: Storage> Storage for CachedStorage<S> {
    async fn load_stats(&self, user: &UserId) -> Result<Option<ProgressionStats>> {
        if let Some(hit) = self.cache.read().await.get(user) {
            debug!(%user, "stats cache hit");
            return Ok(hit.clone());
        }

        let loaded = self.inner.load_stats(user).await?;
        self.cache.write().await.insert(user.clone(), loaded.clone());
        Ok(loaded)
    }

    async fn save_stats(&mut self, user: &UserId, stats: &ProgressionStats) -> Result<()> {
        self.inner.save_stats(user, stats).await?;
        self.cache.get_mut().insert(user.clone(), Some(stats.clone()));
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserId>> {
        self.inner.list_users().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStorage, StorageError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts loads and can be told to fail writes.
    #[derive(Default)]
    struct ProbeStorage {
        inner: MemoryStorage,
        loads: Arc<AtomicUsize>,
        fail_writes: bool,
    }

    #[async_trait::async_trait]
    impl Storage for ProbeStorage {
        async fn load_stats(&self, user: &UserId) -> Result<Option<ProgressionStats>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_stats(user).await
        }

        async fn save_stats(&mut self, user: &UserId, stats: &ProgressionStats) -> Result<()> {
            if self.fail_writes {
                return Err(StorageError::Other("disk full".to_string()));
            }
            self.inner.save_stats(user, stats).await
        }

        async fn list_users(&self) -> Result<Vec<UserId>> {
            self.inner.list_users().await
        }
    }

    #[tokio::test]
    async fn test_loads_are_cached() {
        let probe = ProbeStorage::default();
        let loads = probe.loads.clone();
        let storage = CachedStorage::new(probe);
        let user = UserId::new("ana").unwrap();

        assert!(storage.load_stats(&user).await.unwrap().is_none());
        assert!(storage.load_stats(&user).await.unwrap().is_none());
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        storage.invalidate(&user).await;
        storage.load_stats(&user).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_save_updates_cache() {
        let probe = ProbeStorage::default();
        let loads = probe.loads.clone();
        let mut storage = CachedStorage::new(probe);
        let user = UserId::new("ana").unwrap();

        let mut stats = ProgressionStats::new();
        stats.experience_points = 42;
        storage.save_stats(&user, &stats).await.unwrap();

        assert_eq!(storage.load_stats(&user).await.unwrap(), Some(stats));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_untouched() {
        let probe = ProbeStorage {
            fail_writes: true,
            ..Default::default()
        };
        let mut storage = CachedStorage::new(probe);
        let user = UserId::new("ana").unwrap();

        let mut stats = ProgressionStats::new();
        stats.experience_points = 42;
        assert!(storage.save_stats(&user, &stats).await.is_err());
        assert!(storage.load_stats(&user).await.unwrap().is_none());
    }
}
