//! # Store Adapter Seam
//!
//! The engine never talks to a store's API directly. Each side of the pair is
//! reached through a [`StoreAdapter`], which owns pagination, HTTP framing,
//! authentication and its own timeout/retry behavior.
//!
//! ## Adapter Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StoreAdapter                                    │
//! │                                                                         │
//! │  get_tagged_catalog(tag)          → Vec<ProductRecord>  (all pages)    │
//! │  resolve_by_cross_store_id(id)    → Option<CatalogMatch>               │
//! │  get_inventory_level(item, loc)   → i64                                │
//! │  set_inventory_level(item, loc, v)                                     │
//! │  adjust_inventory_level(item, loc, d)                                  │
//! │                                                                         │
//! │  Every call fails with StoreApiError { operation, message }.           │
//! │  The engine never retries.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use stockbridge_core::{CatalogMatch, ProductRecord, StoreIdentity, StoreKey};
use thiserror::Error;

// =============================================================================
// Store API Error
// =============================================================================

/// A failed adapter call, carrying the underlying cause as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Store API call {operation} failed: {message}")]
pub struct StoreApiError {
    /// Adapter operation name, e.g. `set_inventory_level`.
    pub operation: String,
    pub message: String,
}

impl StoreApiError {
    pub fn new(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        StoreApiError {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

pub type StoreApiResult<T> = Result<T, StoreApiError>;

// =============================================================================
// Store Adapter Trait
// =============================================================================

/// Per-store API client consumed by the engine.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Returns every product carrying `tag`. Implementations must follow
    /// pagination to the end; a partial catalog is an error.
    async fn get_tagged_catalog(&self, tag: &str) -> StoreApiResult<Vec<ProductRecord>>;

    /// Looks up a single variant by cross-store identifier, tagged or not.
    async fn resolve_by_cross_store_id(
        &self,
        cross_store_id: &str,
    ) -> StoreApiResult<Option<CatalogMatch>>;

    async fn get_inventory_level(
        &self,
        inventory_item_id: i64,
        location_id: i64,
    ) -> StoreApiResult<i64>;

    /// Writes an absolute available quantity.
    async fn set_inventory_level(
        &self,
        inventory_item_id: i64,
        location_id: i64,
        value: i64,
    ) -> StoreApiResult<()>;

    /// Applies a signed adjustment to the available quantity.
    async fn adjust_inventory_level(
        &self,
        inventory_item_id: i64,
        location_id: i64,
        delta: i64,
    ) -> StoreApiResult<()>;
}

// =============================================================================
// Store Pair
// =============================================================================

/// One side of the pair: who it is and how to reach it.
#[derive(Clone)]
pub struct StoreBinding {
    pub identity: StoreIdentity,
    pub adapter: Arc<dyn StoreAdapter>,
}

impl fmt::Debug for StoreBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreBinding")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Both stores, addressed by [`StoreKey`].
#[derive(Debug, Clone)]
pub struct StorePair {
    primary: StoreBinding,
    secondary: StoreBinding,
}

impl StorePair {
    /// Pairs two adapters. Identities must carry the key of the slot they
    /// are placed in.
    pub fn new(
        primary: StoreIdentity,
        primary_adapter: Arc<dyn StoreAdapter>,
        secondary: StoreIdentity,
        secondary_adapter: Arc<dyn StoreAdapter>,
    ) -> Self {
        debug_assert_eq!(primary.key, StoreKey::Primary);
        debug_assert_eq!(secondary.key, StoreKey::Secondary);

        StorePair {
            primary: StoreBinding {
                identity: primary,
                adapter: primary_adapter,
            },
            secondary: StoreBinding {
                identity: secondary,
                adapter: secondary_adapter,
            },
        }
    }

    #[inline]
    pub fn get(&self, key: StoreKey) -> &StoreBinding {
        match key {
            StoreKey::Primary => &self.primary,
            StoreKey::Secondary => &self.secondary,
        }
    }

    #[inline]
    pub fn adapter(&self, key: StoreKey) -> &Arc<dyn StoreAdapter> {
        &self.get(key).adapter
    }

    #[inline]
    pub fn identity(&self, key: StoreKey) -> &StoreIdentity {
        &self.get(key).identity
    }

    /// Configured sync location of a store.
    #[inline]
    pub fn location_id(&self, key: StoreKey) -> i64 {
        self.get(key).identity.location_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullAdapter;

    #[async_trait]
    impl StoreAdapter for NullAdapter {
        async fn get_tagged_catalog(&self, _tag: &str) -> StoreApiResult<Vec<ProductRecord>> {
            Ok(Vec::new())
        }

        async fn resolve_by_cross_store_id(&self, _id: &str) -> StoreApiResult<Option<CatalogMatch>> {
            Ok(None)
        }

        async fn get_inventory_level(&self, _item: i64, _loc: i64) -> StoreApiResult<i64> {
            Err(StoreApiError::new("get_inventory_level", "unavailable"))
        }

        async fn set_inventory_level(&self, _item: i64, _loc: i64, _v: i64) -> StoreApiResult<()> {
            Ok(())
        }

        async fn adjust_inventory_level(&self, _item: i64, _loc: i64, _d: i64) -> StoreApiResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pair_addressing() {
        let pair = StorePair::new(
            StoreIdentity::new(StoreKey::Primary, 11, "Retail"),
            Arc::new(NullAdapter),
            StoreIdentity::new(StoreKey::Secondary, 22, "Wholesale"),
            Arc::new(NullAdapter),
        );

        assert_eq!(pair.location_id(StoreKey::Primary), 11);
        assert_eq!(pair.location_id(StoreKey::Secondary), 22);
        assert_eq!(pair.identity(StoreKey::Primary.other()).name, "Wholesale");
    }

    #[tokio::test]
    async fn test_error_carries_operation() {
        let err = NullAdapter.get_inventory_level(1, 2).await.unwrap_err();
        assert_eq!(err.operation, "get_inventory_level");
        assert!(err.to_string().contains("unavailable"));
    }
}
