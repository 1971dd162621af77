//! # In-Memory State Store
//!
//! Process-local [`StateStore`] backend. Suitable for tests and for a single
//! engine instance; nothing is shared across processes.
//!
//! Expiry is measured on the tokio clock, so tests running with a paused
//! runtime can advance past TTLs deterministically. Expired entries are
//! purged lazily whenever they are touched.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{StateError, StateResult};
use crate::store::StateStore;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    /// `None` for counters, which never expire.
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-local TTL key-value store.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every entry, counters included.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> StateResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StateResult<()> {
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + ttl),
        };
        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StateResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn increment(&self, key: &str) -> StateResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        // Redis INCR semantics: a missing or expired key starts from 0 and an
        // existing TTL is preserved.
        let (current, expires_at) = match entries.get(key) {
            Some(entry) if entry.is_live(now) => {
                let current = entry
                    .value
                    .parse::<i64>()
                    .map_err(|_| StateError::NotAnInteger(key.to_string()))?;
                (current, entry.expires_at)
            }
            _ => (0, None),
        };

        let next = current + 1;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StateResult<Vec<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.is_live(now));

        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
