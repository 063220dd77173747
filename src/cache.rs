//! Short-lived caching of served snapshots, keyed per exchange.

use crate::models::record::Exchange;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache key for the encoded CSV artifact of an exchange
pub fn csv_key(exchange: Exchange) -> String {
    format!("{}/csv", exchange.code())
}

/// Cache key for the resolved update time of an exchange
pub fn as_of_key(exchange: Exchange) -> String {
    format!("{}/as_of", exchange.code())
}

/// Result cache consulted in served mode before a pipeline run
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Looks up a stored value; absent or expired entries yield None
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores a value for at most `ttl`
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process `SnapshotCache` backing the served mode
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_entries_are_returned() {
        let cache = MemoryCache::new();
        cache
            .set("dse/csv", b"a,b,c".to_vec(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("dse/csv").await, Some(b"a,b,c".to_vec()));
    }

    #[tokio::test]
    async fn expired_entries_are_absent() {
        let cache = MemoryCache::new();
        cache
            .set("cse/csv", b"x".to_vec(), Duration::from_millis(1))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("cse/csv").await, None);
    }

    #[tokio::test]
    async fn unknown_keys_are_absent() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("dse/csv").await, None);
    }

    #[test]
    fn keys_are_namespaced_per_exchange() {
        assert_eq!(csv_key(Exchange::Dse), "dse/csv");
        assert_eq!(as_of_key(Exchange::Dse), "dse/as_of");
        assert_eq!(csv_key(Exchange::Cse), "cse/csv");
        assert_ne!(csv_key(Exchange::Dse), csv_key(Exchange::Cse));
    }
}
