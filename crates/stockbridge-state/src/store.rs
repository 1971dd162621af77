//! # State Store Trait
//!
//! The minimal TTL key-value contract the engine needs from its shared
//! state substrate.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get(key)                    → Option<String>  (expired = absent)      │
//! │  set_with_ttl(key, v, ttl)   → unconditional last-writer-wins SET      │
//! │  delete(key)                 → idempotent                               │
//! │  increment(key)              → new value, counter keys never expire    │
//! │  keys_with_prefix(prefix)    → linear scan, only used for log listing  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No compare-and-set and no cross-key transactions: every caller must
//! tolerate a concurrent writer overwriting its value.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StateResult;

/// Shared TTL key-value store.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Reads a value. Expired keys read as `None`.
    async fn get(&self, key: &str) -> StateResult<Option<String>>;

    /// Writes a value that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StateResult<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> StateResult<()>;

    /// Atomically increments an integer counter, creating it at 1.
    async fn increment(&self, key: &str) -> StateResult<i64>;

    /// Lists live keys starting with `prefix`, in no particular order.
    async fn keys_with_prefix(&self, prefix: &str) -> StateResult<Vec<String>>;

    /// Cheap liveness probe.
    async fn ping(&self) -> StateResult<()> {
        Ok(())
    }
}
