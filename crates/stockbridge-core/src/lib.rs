//! # stockbridge-core: Pure Domain Logic for Stockbridge
//!
//! This crate holds the domain vocabulary of the two-store inventory sync
//! engine as pure functions and plain data, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbridge Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Transport (webhooks, signature checks)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ InventoryEvent                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbridge-sync (engine)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ stockbridge-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │ decision  │  │ validation│                  │   │
//! │  │   │ StoreKey  │  │ SyncAction│  │identifiers│                  │   │
//! │  │   │ Product   │  │ predict   │  │ tags, ttl │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STATE STORE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StoreKey, ProductRecord, log entries, etc.)
//! - [`decision`] - Delta-vs-full decision table and snapshot prediction
//! - [`error`] - Domain error types
//! - [`validation`] - Identifier and configuration value validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbridge_core::decision::{decide, SyncAction};
//!
//! // No baseline yet: copy the absolute value.
//! assert_eq!(decide(None, 5), SyncAction::Full { value: 5 });
//!
//! // Baseline of 5, store now reports 3: push the signed change.
//! assert_eq!(decide(Some(5), 3), SyncAction::Delta { delta: -2 });
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod decision;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use decision::{decide, predict_target_snapshot, SyncAction};
pub use error::{CoreError, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default catalog-membership tag for products that participate in sync.
pub const DEFAULT_SYNC_TAG: &str = "inventory-sync";

/// Lower bound for the echo-lock TTL in seconds.
///
/// Shorter locks risk expiring before the counterpart store delivers the
/// notification for our own write.
pub const MIN_LOCK_TTL_SECS: u64 = 20;

/// Upper bound for the echo-lock TTL in seconds.
pub const MAX_LOCK_TTL_SECS: u64 = 30;
