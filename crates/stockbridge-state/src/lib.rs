//! # stockbridge-state: Shared State Store for Stockbridge
//!
//! This crate provides the TTL key-value substrate behind every cache, lock,
//! counter and log entry the sync engine keeps.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbridge State Flow                           │
//! │                                                                         │
//! │  SyncEngine (catalog cache, snapshots, echo locks, journal)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbridge-state (THIS CRATE)                 │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  StateClient  │    │  StateStore   │    │    keys      │  │   │
//! │  │   │  (pool.rs)    │    │  (store.rs)   │    │  (keys.rs)   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ JSON helpers  │───►│ MemoryState   │    │ catalog:..   │  │   │
//! │  │   │ backend select│    │ RedisState    │    │ lock:..      │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             process memory  /  Redis (shared)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `StateStore` trait
//! - [`memory`] - Process-local backend
//! - [`redis_store`] - Redis backend
//! - [`pool`] - Backend selection and the typed `StateClient`
//! - [`keys`] - Key naming scheme
//! - [`error`] - State error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbridge_state::{StateClient, StateConfig};
//!
//! let state = StateClient::connect(StateConfig::new("redis://127.0.0.1/0")).await?;
//! state.set_json("inventory:primary:0123", &5, Duration::from_secs(86_400)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod keys;
pub mod memory;
pub mod pool;
pub mod redis_store;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StateError, StateResult};
pub use memory::MemoryStateStore;
pub use pool::{StateClient, StateConfig};
pub use redis_store::RedisStateStore;
pub use store::StateStore;
