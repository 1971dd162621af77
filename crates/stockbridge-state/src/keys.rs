//! # Key Naming Scheme
//!
//! Every key the engine writes, in one place.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  catalog:{store}:{tag}                 tagged catalog snapshot (JSON)  │
//! │  inventory:{store}:{cross_store_id}    last known quantity             │
//! │  lock:{store}:{inventory_item_id}      echo-lock flag                  │
//! │  log:sync:{millis:013}:{uuid}          SyncLogEntry (JSON)             │
//! │  log:error:{millis:013}:{uuid}         ErrorLogEntry (JSON)            │
//! │  sync:count:total                      monotonic counter               │
//! │  error:count:total                     monotonic counter               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Log keys embed a zero-padded millisecond timestamp so a lexicographic sort
//! of the keys is also a chronological sort.

use stockbridge_core::StoreKey;

pub const SYNC_LOG_PREFIX: &str = "log:sync:";
pub const ERROR_LOG_PREFIX: &str = "log:error:";
pub const SYNC_COUNTER: &str = "sync:count:total";
pub const ERROR_COUNTER: &str = "error:count:total";

pub fn catalog(store: StoreKey, tag: &str) -> String {
    format!("catalog:{}:{}", store, tag.trim().to_lowercase())
}

pub fn inventory(store: StoreKey, cross_store_id: &str) -> String {
    format!("inventory:{}:{}", store, cross_store_id)
}

pub fn lock(store: StoreKey, inventory_item_id: i64) -> String {
    format!("lock:{}:{}", store, inventory_item_id)
}

/// Builds an ascending-sortable log key under `prefix`.
pub fn log_entry(prefix: &str, timestamp_millis: i64, unique: &str) -> String {
    format!("{}{:013}:{}", prefix, timestamp_millis.max(0), unique)
}
