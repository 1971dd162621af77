//! Test doubles shared by unit tests and the `tests/` integration suite.
//!
//! Compiled into both, so it names the adapter API through its parent
//! module rather than through a crate path.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stockbridge_core::{CatalogMatch, ProductRecord, VariantRecord};

use super::{StoreAdapter, StoreApiError, StoreApiResult};

pub const TAG: &str = "inventory-sync";

/// Builds a single-variant product.
pub fn product(id: &str, tags: &[&str], inventory_item_id: i64, cross_store_id: Option<&str>) -> ProductRecord {
    ProductRecord {
        product_id: id.to_string(),
        title: format!("Product {}", id),
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        variants: vec![VariantRecord {
            variant_id: format!("{}-v1", id),
            sku: None,
            cross_store_id: cross_store_id.map(str::to_string),
            inventory_item_id,
        }],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterCall {
    Set { item: i64, location: i64, value: i64 },
    Adjust { item: i64, location: i64, delta: i64 },
}

/// Adapter that keeps inventory in memory and records every write.
#[derive(Default)]
pub struct RecordingAdapter {
    products: Mutex<Vec<ProductRecord>>,
    levels: Mutex<HashMap<(i64, i64), i64>>,
    writes: Mutex<Vec<AdapterCall>>,
    catalog_fetches: AtomicUsize,
    fail_catalog: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingAdapter {
    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        let adapter = RecordingAdapter::default();
        adapter.set_products(products);
        adapter
    }

    pub fn set_products(&self, products: Vec<ProductRecord>) {
        *self.products.lock().unwrap() = products;
    }

    pub fn set_level(&self, item: i64, location: i64, value: i64) {
        self.levels.lock().unwrap().insert((item, location), value);
    }

    pub fn level(&self, item: i64, location: i64) -> Option<i64> {
        self.levels.lock().unwrap().get(&(item, location)).copied()
    }

    pub fn fail_catalog(&self, fail: bool) {
        self.fail_catalog.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<AdapterCall> {
        self.writes.lock().unwrap().clone()
    }

    fn check_writable(&self, operation: &str) -> StoreApiResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreApiError::new(operation, "HTTP 503 Service Unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for RecordingAdapter {
    async fn get_tagged_catalog(&self, tag: &str) -> StoreApiResult<Vec<ProductRecord>> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_catalog.load(Ordering::SeqCst) {
            return Err(StoreApiError::new("get_tagged_catalog", "HTTP 500 on page 2"));
        }
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.has_tag(tag))
            .cloned()
            .collect())
    }

    async fn resolve_by_cross_store_id(&self, cross_store_id: &str) -> StoreApiResult<Option<CatalogMatch>> {
        Ok(CatalogMatch::find_by_cross_store_id(
            &self.products.lock().unwrap(),
            cross_store_id,
        ))
    }

    async fn get_inventory_level(&self, item: i64, location: i64) -> StoreApiResult<i64> {
        self.level(item, location)
            .ok_or_else(|| StoreApiError::new("get_inventory_level", "inventory level not found"))
    }

    async fn set_inventory_level(&self, item: i64, location: i64, value: i64) -> StoreApiResult<()> {
        self.check_writable("set_inventory_level")?;
        self.writes.lock().unwrap().push(AdapterCall::Set { item, location, value });
        self.set_level(item, location, value);
        Ok(())
    }

    async fn adjust_inventory_level(&self, item: i64, location: i64, delta: i64) -> StoreApiResult<()> {
        self.check_writable("adjust_inventory_level")?;
        self.writes.lock().unwrap().push(AdapterCall::Adjust { item, location, delta });
        *self.levels.lock().unwrap().entry((item, location)).or_insert(0) += delta;
        Ok(())
    }
}
