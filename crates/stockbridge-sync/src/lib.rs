//! # stockbridge-sync: Synchronization Engine for Stockbridge
//!
//! Keeps the available quantity of a tagged catalog consistent between two
//! independently owned stores, reacting to inventory notifications without
//! feeding our own writes back into the loop.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Engine Architecture                         │
//! │                                                                         │
//! │  Transport (webhooks, out of scope)                                    │
//! │       │ InventoryEvent                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  InboundHandler ──► SyncEngine::handle_event                    │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ EchoLock       │  │ ProductLookup  │  │  DebounceScheduler     │    │
//! │  │ Manager        │  │ Cache          │  │                        │    │
//! │  │                │  │                │  │ One pending action per │    │
//! │  │ Drops our own  │  │ Tagged catalog │  │ (store, identifier),   │    │
//! │  │ writes echoed  │  │ snapshot, TTL  │  │ last event wins        │    │
//! │  │ back to us     │  │ bounded        │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └───────────┬────────────┘    │
//! │                                                      │ window elapses  │
//! │                                                      ▼                  │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Reconciliation: snapshot diff → full / delta / no-op           │   │
//! │  │  lock target → StoreAdapter write → snapshots → EventJournal    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  All caches, locks, logs and counters live in stockbridge-state.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `SyncEngine`: filtering, decisions, writes, operator surface
//! - [`adapter`] - `StoreAdapter` trait implemented per store API
//! - [`catalog`] - Tagged catalog cache and counterpart resolution
//! - [`snapshot`] - Last known quantities per store and identifier
//! - [`echo_lock`] - Short-TTL suppression of self-inflicted events
//! - [`debounce`] - Keyed, cancellable deferred actions
//! - [`journal`] - Sync/error log entries and counters
//! - [`inbound`] - Channel-based event pump for the transport layer
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbridge_sync::{InboundHandler, SyncConfig, SyncEngine};
//!
//! let config = SyncConfig::load(None)?;
//! let engine = SyncEngine::connect(config, retail_adapter, wholesale_adapter).await?;
//!
//! let (handler, inbound) = InboundHandler::new(engine.clone());
//! tokio::spawn(handler.run());
//!
//! // From the webhook route:
//! let ack = inbound.deliver(event).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod echo_lock;
pub mod engine;
pub mod error;
pub mod inbound;
pub mod journal;
pub mod snapshot;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use adapter::{StoreAdapter, StoreApiError, StoreApiResult, StoreBinding, StorePair};
pub use catalog::ProductLookupCache;
pub use config::{EchoResponse, StateSettings, StoreSettings, SyncConfig, SyncSettings};
pub use debounce::DebounceScheduler;
pub use echo_lock::EchoLockManager;
pub use engine::{
    Acknowledgement, DebounceKey, EventDisposition, ReconcileOutcome, SkipReason, SyncEngine,
};
pub use error::{SyncError, SyncResult};
pub use inbound::{InboundHandler, InboundHandlerHandle};
pub use journal::EventJournal;
pub use snapshot::InventorySnapshotCache;
