//! # Echo-Lock Manager
//!
//! A store cannot tell us whether an inventory notification came from a
//! human edit or from our own write. Right before the engine writes to a
//! store it sets a short-lived flag on `(store, inventory_item_id)`; any
//! notification for that key while the flag lives is dropped as an echo.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  t=0    acquire(Secondary, 9001)      lock:secondary:9001 = 1  (25s)   │
//! │  t=0    set_inventory_level(9001, …)  → Secondary                      │
//! │  t=1.2  Secondary notifies 9001       is_locked → true → dropped       │
//! │  t=25   lock expires                  genuine edits flow again         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check and the write are separate round trips to the state store, so
//! a notification racing the lock can still slip through.

use std::time::Duration;

use stockbridge_core::StoreKey;
use stockbridge_state::{keys, StateClient};
use tracing::debug;

use crate::error::SyncResult;

#[derive(Debug, Clone)]
pub struct EchoLockManager {
    state: StateClient,
}

impl EchoLockManager {
    pub fn new(state: StateClient) -> Self {
        EchoLockManager { state }
    }

    /// Sets (or refreshes) the lock. Idempotent.
    pub async fn acquire(&self, store: StoreKey, inventory_item_id: i64, ttl: Duration) -> SyncResult<()> {
        debug!(store = %store, inventory_item_id, ttl_secs = ttl.as_secs(), "Acquiring echo lock");
        self.state
            .set_with_ttl(&keys::lock(store, inventory_item_id), "1", ttl)
            .await?;
        Ok(())
    }

    pub async fn is_locked(&self, store: StoreKey, inventory_item_id: i64) -> SyncResult<bool> {
        Ok(self
            .state
            .get(&keys::lock(store, inventory_item_id))
            .await?
            .is_some())
    }

    /// Drops the lock before its TTL.
    pub async fn release(&self, store: StoreKey, inventory_item_id: i64) -> SyncResult<()> {
        self.state.delete(&keys::lock(store, inventory_item_id)).await?;
        Ok(())
    }
}
