use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::JobStore;
use crate::error::{Result, SlipError};

struct Entry {
    value: String,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process job store.
///
/// Bounded by capacity with least-recently-used eviction; expired entries
/// are dropped when read or purged.
#[derive(Clone)]
pub struct MemoryJobStore {
    cache: Arc<Mutex<LruCache<String, Entry>>>,
}

impl MemoryJobStore {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, Entry>>> {
        self.cache
            .lock()
            .map_err(|_| SlipError::JobStore("job cache lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut cache = self.lock()?;
        cache.put(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut cache = self.lock()?;
        let expired = match cache.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                return Ok(Some(entry.value.clone()))
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            cache.pop(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.pop(key).is_some())
    }

    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let mut cache = self.lock()?;
        let now = Instant::now();
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            cache.pop(key);
        }
        Ok(expired.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_get_after_set() {
        let store = MemoryJobStore::new(10);
        store.set("ocr:result:1", "{}", HOUR).await.unwrap();

        assert_eq!(
            store.get("ocr:result:1").await.unwrap().as_deref(),
            Some("{}")
        );
        assert!(store.exists("ocr:result:1").await.unwrap());
        assert!(store.get("ocr:result:2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryJobStore::new(10);
        store.set("k", "pending", HOUR).await.unwrap();
        store.set("k", "completed", HOUR).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("completed"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_absent() {
        let store = MemoryJobStore::new(10);
        store
            .set("k", "v", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty(), "expired entry should be evicted on read");
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let store = MemoryJobStore::new(2);
        store.set("a", "1", HOUR).await.unwrap();
        store.set("b", "2", HOUR).await.unwrap();
        store.get("a").await.unwrap();
        store.set("c", "3", HOUR).await.unwrap();

        assert!(store.exists("a").await.unwrap());
        assert!(!store.exists("b").await.unwrap());
        assert!(store.exists("c").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_purge() {
        let store = MemoryJobStore::new(10);
        store.set("keep", "v", HOUR).await.unwrap();
        store.set("drop", "v", HOUR).await.unwrap();
        store.set("old", "v", Duration::ZERO).await.unwrap();

        assert!(store.delete("drop").await.unwrap());
        assert!(!store.delete("drop").await.unwrap());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let store = MemoryJobStore::new(10);
        store.set("k", "v", Duration::MAX).await.unwrap();
        store
            .set("big", "v", Duration::from_secs(u64::MAX / 2))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.purge_expired().await.unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_usable() {
        let store = MemoryJobStore::new(0);
        assert!(store.is_empty());
    }
}
