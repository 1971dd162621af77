//! # Domain Types
//!
//! Core domain types shared by the state layer and the sync engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    StoreKey     │   │  ProductRecord  │   │  VariantRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Primary        │   │  product_id     │   │  variant_id     │       │
//! │  │  Secondary      │   │  title, tags    │   │  cross_store_id │       │
//! │  │  other()        │   │  variants[]     │   │  inventory_item │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryEvent  │   │  SyncLogEntry   │   │  ErrorLogEntry  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  source         │   │  source/target  │   │  message        │       │
//! │  │  item, location │   │  value, kind    │   │  context (JSON) │       │
//! │  │  available      │   │  timestamp      │   │  timestamp      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Join Key
//! Variants are matched across the two stores by their cross-store
//! identifier (typically a barcode). Inventory item ids are store-local.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Store Key
// =============================================================================

/// One of the two synchronized stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKey {
    Primary,
    Secondary,
}

impl StoreKey {
    /// Both stores, in a fixed order.
    pub const ALL: [StoreKey; 2] = [StoreKey::Primary, StoreKey::Secondary];

    /// Returns the counterpart store.
    #[inline]
    pub const fn other(self) -> StoreKey {
        match self {
            StoreKey::Primary => StoreKey::Secondary,
            StoreKey::Secondary => StoreKey::Primary,
        }
    }

    /// Stable lowercase name used in state-store keys and logs.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreKey::Primary => "primary",
            StoreKey::Secondary => "secondary",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "a" => Ok(StoreKey::Primary),
            "secondary" | "b" => Ok(StoreKey::Secondary),
            other => Err(CoreError::UnknownStore(other.to_string())),
        }
    }
}

// =============================================================================
// Store Identity
// =============================================================================

/// Immutable identity of one store, set at engine construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIdentity {
    /// Which side of the pair this store is.
    pub key: StoreKey,

    /// Location whose inventory is synchronized. Events for any other
    /// location of this store are ignored.
    pub location_id: i64,

    /// Human-readable name used in logs.
    pub name: String,
}

impl StoreIdentity {
    pub fn new(key: StoreKey, location_id: i64, name: impl Into<String>) -> Self {
        StoreIdentity {
            key,
            location_id,
            name: name.into(),
        }
    }
}

// =============================================================================
// Catalog Records
// =============================================================================

/// One sellable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Store-local variant id.
    pub variant_id: String,

    /// Stock keeping unit, informational only.
    #[serde(default)]
    pub sku: Option<String>,

    /// Join key across stores (barcode). `None` puts the variant out of scope.
    #[serde(default)]
    pub cross_store_id: Option<String>,

    /// Store-local inventory item id. Unique within a store.
    pub inventory_item_id: i64,
}

impl VariantRecord {
    /// Returns the cross-store identifier if it is present and non-blank.
    pub fn cross_store_id(&self) -> Option<&str> {
        self.cross_store_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A product as returned by a store's tagged catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
}

impl ProductRecord {
    /// Checks catalog membership for the given sync tag (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag))
    }

    /// Finds the variant owning a store-local inventory item.
    pub fn variant_by_inventory_item(&self, inventory_item_id: i64) -> Option<&VariantRecord> {
        self.variants
            .iter()
            .find(|v| v.inventory_item_id == inventory_item_id)
    }

    /// Finds the variant carrying a cross-store identifier.
    pub fn variant_by_cross_store_id(&self, cross_store_id: &str) -> Option<&VariantRecord> {
        let wanted = cross_store_id.trim();
        self.variants
            .iter()
            .find(|v| v.cross_store_id() == Some(wanted))
    }
}

/// A product together with the variant a lookup resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMatch {
    pub product: ProductRecord,
    pub variant: VariantRecord,
}

impl CatalogMatch {
    /// Searches a catalog snapshot by inventory item id.
    pub fn find_by_inventory_item(catalog: &[ProductRecord], inventory_item_id: i64) -> Option<Self> {
        catalog.iter().find_map(|product| {
            product
                .variant_by_inventory_item(inventory_item_id)
                .map(|variant| CatalogMatch {
                    product: product.clone(),
                    variant: variant.clone(),
                })
        })
    }

    /// Searches a catalog snapshot by cross-store identifier.
    pub fn find_by_cross_store_id(catalog: &[ProductRecord], cross_store_id: &str) -> Option<Self> {
        catalog.iter().find_map(|product| {
            product
                .variant_by_cross_store_id(cross_store_id)
                .map(|variant| CatalogMatch {
                    product: product.clone(),
                    variant: variant.clone(),
                })
        })
    }

    #[inline]
    pub fn inventory_item_id(&self) -> i64 {
        self.variant.inventory_item_id
    }

    #[inline]
    pub fn cross_store_id(&self) -> Option<&str> {
        self.variant.cross_store_id()
    }
}

// =============================================================================
// Inbound Event
// =============================================================================

/// A normalized inventory-change notification from one store.
///
/// The transport layer authenticates and normalizes the notification; the
/// engine trusts it once delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEvent {
    pub source: StoreKey,
    pub inventory_item_id: i64,
    pub location_id: i64,
    /// Available quantity reported by the store after the change.
    pub available: i64,
}

// =============================================================================
// Log Entries
// =============================================================================

/// How a reconciliation was applied to the target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    /// Signed adjustment of the target quantity.
    Delta,
    /// Absolute quantity written to the target.
    Full,
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncKind::Delta => write!(f, "delta"),
            SyncKind::Full => write!(f, "full"),
        }
    }
}

/// Record of one applied reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub source: StoreKey,
    pub target: StoreKey,
    /// Cross-store identifier of the reconciled variant.
    pub identifier: String,
    /// Signed delta for [`SyncKind::Delta`], absolute quantity for [`SyncKind::Full`].
    pub value: i64,
    pub kind: SyncKind,
    pub timestamp: DateTime<Utc>,
}

/// Record of one handled failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub message: String,
    /// Free-form structured context (store, identifier, operation, ...).
    #[serde(default)]
    pub context: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate counters exposed to operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub total_syncs: u64,
    pub total_errors: u64,
}

// =============================================================================
// Unit Tests
// =============================================================================
