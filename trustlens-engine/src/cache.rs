//! Read-through TTL cache
//!
//! Generic key-value store with per-entry expiry:
//! - live hits return a clone without running the fetch
//! - failures are never cached, so the next call retries immediately
//! - eviction is lazy (on access past expiry), with an optional
//!   capacity sweep for long-running deployments
//!
//! Two callers racing on the same expired key may both fetch; fetches
//! are idempotent reads, and last-write-wins on insert. The hit path
//! never awaits.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use crate::clock::Clock;

/// One cached value with its expiry instant
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Concurrent key-value cache with per-entry TTL
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    entries: DashMap<K, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Return the live value for `key`, if any. Removes an expired
    /// entry on the way (lazy eviction); never returns a stale value.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Read-through: return the live value or run `fetch` for a fresh
    /// one. A successful fetch is stored with `expires_at = now + ttl`;
    /// a failed fetch stores nothing and the error goes to this caller
    /// only.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: K, ttl: Duration, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = fetch().await?;
        let entry = CacheEntry {
            value: value.clone(),
            expires_at: self.clock.now() + ttl,
        };
        // Last-write-wins; a racing fetch's snapshot is just as valid
        self.entries.insert(key, entry);
        Ok(value)
    }

    /// Number of entries, live or not yet lazily evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity bound for long-running processes: drop oldest-expiring
    /// entries until at most `max_entries` remain. Returns evicted count.
    pub fn sweep(&self, max_entries: usize) -> usize {
        let excess = self.entries.len().saturating_sub(max_entries);
        if excess == 0 {
            return 0;
        }

        let mut by_expiry: Vec<(K, DateTime<Utc>)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().expires_at))
            .collect();
        by_expiry.sort_by_key(|(_, expires_at)| *expires_at);

        let mut evicted = 0;
        for (key, _) in by_expiry.into_iter().take(excess) {
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }
        evicted
    }
}
