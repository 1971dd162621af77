//! # Product Lookup Cache
//!
//! Answers "is this item part of the synchronized catalog, and what is its
//! cross-store identifier?" without calling the store API on every event.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Lookup                                  │
//! │                                                                         │
//! │  lookup_by_inventory_item(store, id) / lookup_by_identifier(store, x)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog:{store}:{tag} in state store?                                 │
//! │       │                                                                 │
//! │       ├── HIT  → search the cached snapshot in memory                  │
//! │       │                                                                 │
//! │       └── MISS → adapter.get_tagged_catalog(tag)  (all pages)          │
//! │                  store snapshot with catalog TTL                        │
//! │                  search in memory                                       │
//! │                                                                         │
//! │  Refresh is all-or-nothing: an adapter failure writes nothing.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Membership is never staler than the catalog TTL, but it is not strongly
//! consistent with the live store. Counterpart resolution therefore falls
//! back to a direct adapter lookup when the cached snapshot has no match.

use std::time::Duration;

use stockbridge_core::{CatalogMatch, ProductRecord, StoreKey};
use stockbridge_state::{keys, StateClient, StateError};
use tracing::{debug, info, warn};

use crate::adapter::StorePair;
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone)]
pub struct ProductLookupCache {
    state: StateClient,
    stores: StorePair,
    tag: String,
    ttl: Duration,
}

impl ProductLookupCache {
    pub fn new(state: StateClient, stores: StorePair, tag: impl Into<String>, ttl: Duration) -> Self {
        ProductLookupCache {
            state,
            stores,
            tag: tag.into(),
            ttl,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Finds the tagged product owning a store-local inventory item.
    pub async fn lookup_by_inventory_item(
        &self,
        store: StoreKey,
        inventory_item_id: i64,
    ) -> SyncResult<Option<CatalogMatch>> {
        let catalog = self.snapshot(store).await?;
        Ok(CatalogMatch::find_by_inventory_item(&catalog, inventory_item_id))
    }

    /// Finds the tagged product carrying a cross-store identifier.
    pub async fn lookup_by_identifier(
        &self,
        store: StoreKey,
        cross_store_id: &str,
    ) -> SyncResult<Option<CatalogMatch>> {
        let catalog = self.snapshot(store).await?;
        Ok(CatalogMatch::find_by_cross_store_id(&catalog, cross_store_id))
    }

    /// Resolves the counterpart of `cross_store_id` in `store`.
    ///
    /// Searches the cached catalog first, then asks the adapter directly so a
    /// product tagged after the last refresh is still found. A direct hit
    /// only counts if the product carries the sync tag.
    pub async fn resolve_counterpart(
        &self,
        store: StoreKey,
        cross_store_id: &str,
    ) -> SyncResult<Option<CatalogMatch>> {
        if let Some(found) = self.lookup_by_identifier(store, cross_store_id).await? {
            return Ok(Some(found));
        }

        let direct = self
            .stores
            .adapter(store)
            .resolve_by_cross_store_id(cross_store_id)
            .await?;

        match direct {
            Some(found) if found.product.has_tag(&self.tag) => {
                debug!(store = %store, identifier = cross_store_id, "Counterpart found outside cached catalog");
                Ok(Some(found))
            }
            Some(found) => {
                debug!(
                    store = %store,
                    identifier = cross_store_id,
                    product_id = %found.product.product_id,
                    "Counterpart exists but lacks the sync tag"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Drops the cached snapshot; the next lookup refetches it.
    pub async fn invalidate(&self, store: StoreKey) -> SyncResult<()> {
        Self::invalidate_cached(&self.state, store, &self.tag).await
    }

    /// Drops the cached catalog of `store` for `tag` without needing the
    /// store adapters. Used by operator tooling.
    pub async fn invalidate_cached(state: &StateClient, store: StoreKey, tag: &str) -> SyncResult<()> {
        state.delete(&keys::catalog(store, tag)).await?;
        info!(store = %store, tag = %tag, "Catalog cache invalidated");
        Ok(())
    }

    // =========================================================================
    // Snapshot Handling
    // =========================================================================

    async fn snapshot(&self, store: StoreKey) -> SyncResult<Vec<ProductRecord>> {
        let key = keys::catalog(store, &self.tag);

        match self.state.get_json::<Vec<ProductRecord>>(&key).await {
            Ok(Some(catalog)) => return Ok(catalog),
            Ok(None) => {}
            Err(StateError::Serialization { message, .. }) => {
                warn!(store = %store, error = %message, "Discarding unreadable catalog cache");
            }
            Err(e) => return Err(SyncError::State(e)),
        }

        self.refresh(store, &key).await
    }

    async fn refresh(&self, store: StoreKey, key: &str) -> SyncResult<Vec<ProductRecord>> {
        let catalog = self
            .stores
            .adapter(store)
            .get_tagged_catalog(&self.tag)
            .await?;

        self.state.set_json(key, &catalog, self.ttl).await?;

        info!(
            store = %store,
            tag = %self.tag,
            products = catalog.len(),
            ttl_secs = self.ttl.as_secs(),
            "Catalog cache refreshed"
        );
        Ok(catalog)
    }
}
