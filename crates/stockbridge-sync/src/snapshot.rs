//! # Inventory Snapshot Cache
//!
//! Last observed available quantity per `(store, cross_store_id)`.
//!
//! The source snapshot is the baseline the decision table diffs against; the
//! target snapshot is the engine's prediction of what it just wrote, so the
//! counterpart's next genuine event is diffed against the right number.
//! Entries live for the configured inventory TTL (24 h by default) and are
//! only deleted by operator invalidation.

use std::time::Duration;

use stockbridge_core::StoreKey;
use stockbridge_state::{keys, StateClient};
use tracing::debug;

use crate::error::SyncResult;

#[derive(Debug, Clone)]
pub struct InventorySnapshotCache {
    state: StateClient,
    ttl: Duration,
}

impl InventorySnapshotCache {
    pub fn new(state: StateClient, ttl: Duration) -> Self {
        InventorySnapshotCache { state, ttl }
    }

    pub async fn get(&self, store: StoreKey, cross_store_id: &str) -> SyncResult<Option<i64>> {
        Ok(self
            .state
            .get_json::<i64>(&keys::inventory(store, cross_store_id))
            .await?)
    }

    /// Overwrites the snapshot and restarts its TTL.
    pub async fn put(&self, store: StoreKey, cross_store_id: &str, quantity: i64) -> SyncResult<()> {
        debug!(store = %store, identifier = cross_store_id, quantity, "Updating inventory snapshot");
        self.state
            .set_json(&keys::inventory(store, cross_store_id), &quantity, self.ttl)
            .await?;
        Ok(())
    }

    /// Forgets the snapshot so the next event for it triggers a full sync.
    pub async fn invalidate(&self, store: StoreKey, cross_store_id: &str) -> SyncResult<()> {
        self.state.delete(&keys::inventory(store, cross_store_id)).await?;
        Ok(())
    }
}
