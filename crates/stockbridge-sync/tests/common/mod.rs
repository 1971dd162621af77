//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stockbridge_core::{InventoryEvent, StoreKey};
use stockbridge_state::{MemoryStateStore, StateClient, StateError, StateResult, StateStore};
use stockbridge_sync::{StoreAdapter, StoreApiError, StoreApiResult, SyncConfig, SyncEngine};

#[path = "../../src/test_support.rs"]
mod test_support;

pub use test_support::{product, AdapterCall, RecordingAdapter, TAG};

pub const LOC_A: i64 = 61_234;
pub const LOC_B: i64 = 78_901;

/// Two stores sharing barcode 0123 (A item 111, B item 9001). A also carries
/// an untagged product (item 222) and a product with no counterpart in B
/// (item 112, barcode 0777).
pub struct World {
    pub engine: SyncEngine,
    pub state: StateClient,
    pub a: Arc<RecordingAdapter>,
    pub b: Arc<RecordingAdapter>,
}

impl World {
    pub fn new() -> Self {
        Self::with_state(StateClient::in_memory())
    }

    pub fn with_state(state: StateClient) -> Self {
        let a = Arc::new(RecordingAdapter::with_products(vec![
            product("a-shirt", &[TAG], 111, Some("0123")),
            product("a-hat", &[TAG], 112, Some("0777")),
            product("a-mug", &["clearance"], 222, Some("0555")),
        ]));
        let b = Arc::new(RecordingAdapter::with_products(vec![
            product("b-shirt", &[TAG, "wholesale"], 9001, Some("0123")),
            product("b-mug", &[TAG], 9002, Some("0555")),
        ]));

        let engine = SyncEngine::new(
            SyncConfig::for_locations(LOC_A, LOC_B),
            a.clone(),
            b.clone(),
            state.clone(),
        )
        .expect("valid config");

        World { engine, state, a, b }
    }
}

/// In-memory state store whose `increment` fails for one key.
pub struct BrokenCounter {
    inner: MemoryStateStore,
    key: &'static str,
}

impl BrokenCounter {
    pub fn client(key: &'static str) -> StateClient {
        StateClient::new(Arc::new(BrokenCounter {
            inner: MemoryStateStore::new(),
            key,
        }))
    }
}

#[async_trait]
impl StateStore for BrokenCounter {
    async fn get(&self, key: &str) -> StateResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StateResult<()> {
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> StateResult<()> {
        self.inner.delete(key).await
    }

    async fn increment(&self, key: &str) -> StateResult<i64> {
        if key == self.key {
            return Err(StateError::Backend(format!("INCR {} refused", key)));
        }
        self.inner.increment(key).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StateResult<Vec<String>> {
        self.inner.keys_with_prefix(prefix).await
    }
}

pub fn event(source: StoreKey, item: i64, available: i64) -> InventoryEvent {
    let location_id = match source {
        StoreKey::Primary => LOC_A,
        StoreKey::Secondary => LOC_B,
    };
    InventoryEvent {
        source,
        inventory_item_id: item,
        location_id,
        available,
    }
}

/// Sleeps past the default 2000 ms debounce window.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(2_050)).await;
}
