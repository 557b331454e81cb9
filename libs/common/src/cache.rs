//! Response cache for the API client
//!
//! This module keeps decoded read responses in memory so that several views
//! asking for the same resource do not trigger redundant requests. Entries
//! expire after a TTL and are invalidated whenever the same resource is
//! mutated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Bumped on every invalidation of a resource
    epochs: HashMap<String, u64>,
}

/// Shared in-memory cache keyed by request path and query
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    inner: Arc<RwLock<CacheState>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value with optional TTL
    pub async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.inner
            .write()
            .await
            .entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Current invalidation epoch of a resource
    pub async fn epoch(&self, resource: &str) -> u64 {
        let resource = resource.trim_matches('/');
        self.inner
            .read()
            .await
            .epochs
            .get(resource)
            .copied()
            .unwrap_or_default()
    }

    /// Set a value only if `resource` was not invalidated since `epoch`
    ///
    /// Returns whether the value was stored.
    pub async fn set_if_current(
        &self,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
        resource: &str,
        epoch: u64,
    ) -> bool {
        let resource = resource.trim_matches('/');
        let mut state = self.inner.write().await;
        if state.epochs.get(resource).copied().unwrap_or_default() != epoch {
            debug!(key, resource, "Skipping cache write for invalidated resource");
            return false;
        }
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        state
            .entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
        true
    }

    /// Get a value by key, dropping it if it has expired
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let state = self.inner.read().await;
            match state.entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.inner.write().await.entries.remove(key);
        None
    }

    /// Delete a single key
    pub async fn delete(&self, key: &str) {
        self.inner.write().await.entries.remove(key);
    }

    /// Drop every entry belonging to a resource and bump its epoch
    ///
    /// Keys are request paths, so `menu` matches `menu/data?..` and
    /// `menu/options` but not `menu-group/data`.
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let resource = resource.trim_matches('/');
        let mut state = self.inner.write().await;
        *state.epochs.entry(resource.to_string()).or_default() += 1;

        let entries = &mut state.entries;
        let before = entries.len();
        entries.retain(|key, _| {
            let key = key.trim_start_matches('/');
            !(key == resource
                || key
                    .strip_prefix(resource)
                    .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?')))
        });
        let removed = before - entries.len();
        if removed > 0 {
            debug!(resource, removed, "Invalidated cached responses");
        }
        removed
    }

    pub async fn clear(&self) {
        self.inner.write().await.entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}
