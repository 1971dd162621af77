//! # Event Journal
//!
//! Operational record of what the engine did: one [`SyncLogEntry`] per
//! applied reconciliation, one [`ErrorLogEntry`] per handled failure or
//! unenrolled counterpart, and a monotonic counter for syncs and failures.
//! Unenrolled counterparts are logged but never counted as errors.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  log:sync:1718000000123:000042-<uuid>    → SyncLogEntry   (7 days)     │
//! │  log:error:1718000000456:000043-<uuid>   → ErrorLogEntry  (7 days)     │
//! │  sync:count:total                        → u64            (no expiry)  │
//! │  error:count:total                       → u64            (no expiry)  │
//! │                                                                         │
//! │  recent(n) = list prefix → sort descending → take n → fetch            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The per-journal sequence number in the key suffix keeps entries written
//! in the same millisecond in write order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use stockbridge_core::{ErrorLogEntry, StoreKey, SyncLogEntry, SyncStats};
use stockbridge_state::{keys, StateClient};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone)]
pub struct EventJournal {
    state: StateClient,
    ttl: Duration,
    sequence: Arc<AtomicU64>,
}

impl EventJournal {
    pub fn new(state: StateClient, ttl: Duration) -> Self {
        EventJournal {
            state,
            ttl,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Appends a sync entry and bumps the sync counter.
    pub async fn record_sync(&self, entry: &SyncLogEntry) -> SyncResult<()> {
        let key = self.next_key(keys::SYNC_LOG_PREFIX, entry.timestamp.timestamp_millis());
        self.state.set_json(&key, entry, self.ttl).await?;
        let total = self.state.increment(keys::SYNC_COUNTER).await?;

        info!(
            source = %entry.source,
            target = %entry.target,
            identifier = %entry.identifier,
            kind = %entry.kind,
            value = entry.value,
            total,
            "Sync applied"
        );
        Ok(())
    }

    /// Appends an error entry and bumps the error counter.
    pub async fn record_error(
        &self,
        message: impl Into<String>,
        context: serde_json::Value,
    ) -> SyncResult<ErrorLogEntry> {
        let entry = self.append_error(message.into(), context).await?;
        let total = self.state.increment(keys::ERROR_COUNTER).await?;

        debug!(total, "Error recorded");
        Ok(entry)
    }

    /// Records that `identifier` has no tagged counterpart in the store
    /// opposite `source`. Lands in the error log, leaves the error counter
    /// alone.
    pub async fn record_not_enrolled(
        &self,
        source: StoreKey,
        identifier: &str,
        observed: i64,
    ) -> SyncResult<ErrorLogEntry> {
        let target = source.other();
        let message = SyncError::NotEnrolled {
            store: target,
            identifier: identifier.to_string(),
        }
        .to_string();
        let context = json!({
            "kind": "not_enrolled",
            "stage": "reconcile",
            "source": source,
            "target": target,
            "identifier": identifier,
            "observed": observed,
        });

        let entry = self.append_error(message, context).await?;
        debug!(source = %source, identifier, "Not-enrolled outcome recorded");
        Ok(entry)
    }

    async fn append_error(&self, message: String, context: serde_json::Value) -> SyncResult<ErrorLogEntry> {
        let entry = ErrorLogEntry {
            message,
            context,
            timestamp: Utc::now(),
        };

        let key = self.next_key(keys::ERROR_LOG_PREFIX, entry.timestamp.timestamp_millis());
        self.state.set_json(&key, &entry, self.ttl).await?;
        Ok(entry)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn stats(&self) -> SyncResult<SyncStats> {
        Ok(SyncStats {
            total_syncs: self.state.counter(keys::SYNC_COUNTER).await?,
            total_errors: self.state.counter(keys::ERROR_COUNTER).await?,
        })
    }

    /// Most recent sync entries, newest first.
    pub async fn recent_syncs(&self, limit: usize) -> SyncResult<Vec<SyncLogEntry>> {
        self.recent(keys::SYNC_LOG_PREFIX, limit).await
    }

    /// Most recent error entries, newest first.
    pub async fn recent_errors(&self, limit: usize) -> SyncResult<Vec<ErrorLogEntry>> {
        self.recent(keys::ERROR_LOG_PREFIX, limit).await
    }

    async fn recent<T: DeserializeOwned>(
        &self,
        prefix: &str,
        limit: usize,
    ) -> SyncResult<Vec<T>> {
        let mut log_keys = self.state.keys_with_prefix(prefix).await?;
        log_keys.sort_unstable_by(|a, b| b.cmp(a));

        let mut entries = Vec::with_capacity(limit.min(log_keys.len()));
        for key in log_keys.into_iter().take(limit) {
            // An entry can expire between listing and fetching.
            if let Some(entry) = self.state.get_json::<T>(&key).await? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn next_key(&self, prefix: &str, timestamp_millis: i64) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        keys::log_entry(
            prefix,
            timestamp_millis,
            &format!("{:06}-{}", seq % 1_000_000, Uuid::new_v4().simple()),
        )
    }
}
