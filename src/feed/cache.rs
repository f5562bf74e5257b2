//! Read-through TTL cache

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::types::FeedError;
use super::SnapshotSource;
use crate::market::MarketSnapshot;

/// Values expire `ttl` after insertion
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The cached value if it is younger than the TTL
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, v)| v.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, (Instant::now(), value));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Snapshot source that serves repeated requests from a [`TtlCache`]
pub struct CachedSource<S> {
    inner: S,
    cache: TtlCache<usize, MarketSnapshot>,
}

impl<S: SnapshotSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }
}

#[async_trait]
impl<S: SnapshotSource> SnapshotSource for CachedSource<S> {
    async fn fetch_snapshot(&self, limit: usize) -> Result<MarketSnapshot, FeedError> {
        if let Some(snapshot) = self.cache.get(&limit).await {
            tracing::trace!(limit, "Snapshot served from cache");
            return Ok(snapshot);
        }
        let snapshot = self.inner.fetch_snapshot(limit).await?;
        self.cache.insert(limit, snapshot.clone()).await;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotSource for CountingSource {
        async fn fetch_snapshot(&self, _limit: usize) -> Result<MarketSnapshot, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MarketSnapshot::new(Utc::now(), Vec::new()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("AAA", 1).await;
        assert_eq!(cache.get(&"AAA").await, Some(1));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get(&"AAA").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_through() {
        let source = CachedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(60),
        );
        source.fetch_snapshot(50).await.unwrap();
        source.fetch_snapshot(50).await.unwrap();
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);

        // different limit is a different key
        source.fetch_snapshot(10).await.unwrap();
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        source.fetch_snapshot(50).await.unwrap();
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 3);
    }
}
