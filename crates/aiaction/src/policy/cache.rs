use aiaction_core::UserId;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::Result;

/// Cache of policy acceptance keyed by user id
#[async_trait]
pub trait PolicyCache: Send + Sync {
    /// Cached value, `None` on a miss
    async fn get(&self, user_id: UserId) -> Result<Option<bool>>;

    /// Store a value
    async fn set(&self, user_id: UserId, accepted: bool) -> Result<()>;

    /// Evict a user's entry
    async fn delete(&self, user_id: UserId) -> Result<()>;
}

/// In-process PolicyCache backed by moka
///
/// Expired entries are dropped by moka's housekeeping, and `max_capacity`
/// bounds the number of users held at once.
#[derive(Clone)]
pub struct InMemoryPolicyCache {
    entries: moka::future::Cache<UserId, bool>,
}

impl std::fmt::Debug for InMemoryPolicyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPolicyCache")
            .field("max_capacity", &self.entries.policy().max_capacity())
            .field("time_to_live", &self.entries.policy().time_to_live())
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

impl Default for InMemoryPolicyCache {
    fn default() -> Self {
        Self::with_settings(None, None)
    }
}

impl InMemoryPolicyCache {
    /// Create an unbounded cache whose entries never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries expire `ttl` after being stored
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_settings(None, Some(ttl))
    }

    /// Create a cache with an optional capacity and time to live
    pub fn with_settings(max_capacity: Option<u64>, ttl: Option<Duration>) -> Self {
        let mut builder = moka::future::Cache::<UserId, bool>::builder();
        if let Some(capacity) = max_capacity {
            builder = builder.max_capacity(capacity);
        }
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        debug!(
            max_capacity = ?max_capacity,
            ttl = ?ttl,
            "Policy cache created"
        );

        Self {
            entries: builder.build(),
        }
    }

    /// Number of entries held, including ones not yet swept
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply pending evictions and expirations now
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }
}

#[async_trait]
impl PolicyCache for InMemoryPolicyCache {
    async fn get(&self, user_id: UserId) -> Result<Option<bool>> {
        Ok(self.entries.get(&user_id).await)
    }

    async fn set(&self, user_id: UserId, accepted: bool) -> Result<()> {
        self.entries.insert(user_id, accepted).await;
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> Result<()> {
        self.entries.invalidate(&user_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryPolicyCache::new();
        assert_eq!(cache.get(UserId::new(1)).await.unwrap(), None);

        cache.set(UserId::new(1), true).await.unwrap();
        assert_eq!(cache.get(UserId::new(1)).await.unwrap(), Some(true));
        assert_eq!(cache.get(UserId::new(2)).await.unwrap(), None);

        cache.delete(UserId::new(1)).await.unwrap();
        assert_eq!(cache.get(UserId::new(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_released() {
        let cache = InMemoryPolicyCache::with_ttl(Duration::from_millis(50));
        for id in 1..=1000 {
            cache.set(UserId::new(id), true).await.unwrap();
        }
        assert_eq!(cache.get(UserId::new(1)).await.unwrap(), Some(true));

        tokio::time::sleep(Duration::from_millis(200)).await;

        for id in 1..=1000 {
            assert_eq!(cache.get(UserId::new(id)).await.unwrap(), None);
        }
        cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_capacity_bounds_entries() {
        let cache = InMemoryPolicyCache::with_settings(Some(10), None);
        for id in 1..=100 {
            cache.set(UserId::new(id), true).await.unwrap();
        }

        cache.run_pending_tasks().await;
        assert!(cache.entry_count() <= 10);
    }
}
