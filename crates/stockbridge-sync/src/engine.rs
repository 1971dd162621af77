//! # Reconciliation Engine
//!
//! Turns inventory notifications from either store into writes against the
//! other one.
//!
//! ## Event Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per-(store, identifier) Lifecycle                    │
//! │                                                                         │
//! │  InventoryEvent                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. location == configured location?        no → Skipped (debug)       │
//! │  2. echo lock on (source, item)?            yes → Skipped (debug)      │
//! │  3. item in tagged catalog, tag present,                               │
//! │     cross-store id present?                 no → Skipped (debug)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  IDLE ──► DEBOUNCING ──(window elapses)──► RECONCILING ──► IDLE        │
//! │            ▲      │                                                     │
//! │            └──────┘ new event: timer re-armed, newest value kept       │
//! │                                                                         │
//! │  RECONCILING                                                           │
//! │  ───────────                                                           │
//! │  P = source snapshot, V = settled value                                │
//! │  P absent → FULL (write V)   V − P = 0 → NO-OP   else → DELTA (V − P)  │
//! │  counterpart absent → NotEnrolled (warn + uncounted ErrorLogEntry)     │
//! │  lock (target, item) → write → snapshots → SyncLogEntry + counter      │
//! │  write fails → ErrorLogEntry + counter, snapshots untouched            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The diff happens when the timer fires, against the source snapshot as it
//! stood before the burst began, so a burst of events collapses into one
//! write reflecting only the last value.
//!
//! A new burst can start debouncing while an earlier reconciliation for the
//! same key is still in flight; only the echo lock separates them.

use std::sync::Arc;

use chrono::Utc;
use futures_util::FutureExt;
use serde_json::json;
use tracing::{debug, error, info, warn};

use stockbridge_core::validation::validate_cross_store_id;
use stockbridge_core::{
    decide, predict_target_snapshot, CatalogMatch, ErrorLogEntry, InventoryEvent, StoreKey,
    SyncAction, SyncKind, SyncLogEntry, SyncStats,
};
use stockbridge_state::StateClient;

use crate::adapter::{StoreAdapter, StorePair};
use crate::catalog::ProductLookupCache;
use crate::config::{EchoResponse, SyncConfig};
use crate::debounce::DebounceScheduler;
use crate::echo_lock::EchoLockManager;
use crate::error::{SyncError, SyncResult};
use crate::journal::EventJournal;
use crate::snapshot::InventorySnapshotCache;

// =============================================================================
// Event Disposition
// =============================================================================

/// Why an inbound event was dropped before debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Event location is not the store's sync location.
    WrongLocation,
    /// An echo lock is active for the item: this is our own write coming back.
    EchoLocked,
    /// The item is not part of the tagged catalog.
    NotInCatalog,
    /// The product was returned without the sync tag.
    MissingTag,
    /// The variant has no cross-store identifier.
    MissingIdentifier,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::WrongLocation => write!(f, "wrong_location"),
            SkipReason::EchoLocked => write!(f, "echo_locked"),
            SkipReason::NotInCatalog => write!(f, "not_in_catalog"),
            SkipReason::MissingTag => write!(f, "missing_tag"),
            SkipReason::MissingIdentifier => write!(f, "missing_identifier"),
        }
    }
}

/// What the engine did with an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// Qualified; a reconciliation is pending for the identifier.
    Scheduled { identifier: String },
    /// Out of scope. No state was changed.
    Skipped(SkipReason),
    /// Admission failed (catalog fetch or state store); already journaled.
    Failed { message: String },
}

/// Reply the transport sends back to the notifying store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Accepted,
    Rejected,
}

impl EventDisposition {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, EventDisposition::Scheduled { .. })
    }

    /// Maps the disposition to a transport reply. Only dropped echoes can be
    /// rejected, and only when configured to.
    pub fn acknowledgement(&self, policy: EchoResponse) -> Acknowledgement {
        match (self, policy) {
            (EventDisposition::Skipped(SkipReason::EchoLocked), EchoResponse::Reject) => {
                Acknowledgement::Rejected
            }
            _ => Acknowledgement::Accepted,
        }
    }
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied(SyncLogEntry),
    /// Settled value equals the snapshot.
    Unchanged,
    /// The counterpart store has no tagged product for the identifier.
    NotEnrolled,
}

/// Debounce key: one pending reconciliation per source store and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DebounceKey {
    pub source: StoreKey,
    pub identifier: String,
}

enum Admission {
    Qualified(String),
    Skipped(SkipReason),
}

/// A write the decision table asked for.
#[derive(Debug, Clone, Copy)]
struct PlannedWrite {
    action: SyncAction,
    kind: SyncKind,
    /// Delta for `Delta`, absolute quantity for `Full`.
    value: i64,
    /// Settled source quantity.
    observed: i64,
}

impl PlannedWrite {
    /// `None` for a no-op.
    fn plan(action: SyncAction, observed: i64) -> Option<Self> {
        Some(PlannedWrite {
            action,
            kind: action.kind()?,
            value: action.logged_value()?,
            observed,
        })
    }
}

// =============================================================================
// Sync Engine
// =============================================================================

struct EngineInner {
    config: SyncConfig,
    stores: StorePair,
    catalog: ProductLookupCache,
    snapshots: InventorySnapshotCache,
    locks: EchoLockManager,
    journal: EventJournal,
    debouncer: DebounceScheduler<DebounceKey>,
}

/// The synchronization engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("primary", self.inner.stores.identity(StoreKey::Primary))
            .field("secondary", self.inner.stores.identity(StoreKey::Secondary))
            .field("tag", &self.inner.config.tag())
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Builds an engine over an existing state client.
    pub fn new(
        config: SyncConfig,
        primary: Arc<dyn StoreAdapter>,
        secondary: Arc<dyn StoreAdapter>,
        state: StateClient,
    ) -> SyncResult<Self> {
        config.validate()?;

        let stores = StorePair::new(
            config.identity(StoreKey::Primary),
            primary,
            config.identity(StoreKey::Secondary),
            secondary,
        );

        let catalog = ProductLookupCache::new(
            state.clone(),
            stores.clone(),
            config.tag(),
            config.catalog_ttl(),
        );
        let snapshots = InventorySnapshotCache::new(state.clone(), config.inventory_ttl());
        let locks = EchoLockManager::new(state.clone());
        let journal = EventJournal::new(state, config.log_ttl());
        let debouncer = DebounceScheduler::new(config.debounce_window());

        info!(
            primary = %config.primary.name,
            primary_location = config.primary.location_id,
            secondary = %config.secondary.name,
            secondary_location = config.secondary.location_id,
            tag = %config.tag(),
            debounce_ms = config.sync.debounce_ms,
            "Sync engine ready"
        );

        Ok(SyncEngine {
            inner: Arc::new(EngineInner {
                config,
                stores,
                catalog,
                snapshots,
                locks,
                journal,
                debouncer,
            }),
        })
    }

    /// Connects to the configured state store and builds the engine.
    pub async fn connect(
        config: SyncConfig,
        primary: Arc<dyn StoreAdapter>,
        secondary: Arc<dyn StoreAdapter>,
    ) -> SyncResult<Self> {
        config.validate()?;
        let state = StateClient::connect(config.state_config()).await?;
        Self::new(config, primary, secondary, state)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    // =========================================================================
    // Inbound Events
    // =========================================================================

    /// Filters an event and, if it qualifies, (re)arms its debounce timer.
    ///
    /// Never returns an error: admission failures are journaled and reported
    /// as [`EventDisposition::Failed`] so one bad event cannot stall the
    /// caller.
    pub async fn handle_event(&self, event: InventoryEvent) -> EventDisposition {
        match self.admit(&event).await {
            Ok(Admission::Qualified(identifier)) => {
                let key = DebounceKey {
                    source: event.source,
                    identifier: identifier.clone(),
                };
                let engine = self.clone();
                let settled_identifier = identifier.clone();
                let action = async move {
                    engine
                        .settle(event.source, settled_identifier, event.available)
                        .await;
                }
                .boxed();

                let superseded = self.inner.debouncer.schedule(key, action).await;
                debug!(
                    source = %event.source,
                    identifier = %identifier,
                    available = event.available,
                    superseded,
                    "Event scheduled"
                );
                EventDisposition::Scheduled { identifier }
            }
            Ok(Admission::Skipped(reason)) => {
                debug!(
                    source = %event.source,
                    inventory_item_id = event.inventory_item_id,
                    location_id = event.location_id,
                    reason = %reason,
                    "Event skipped"
                );
                EventDisposition::Skipped(reason)
            }
            Err(err) => {
                let context = json!({
                    "stage": "admission",
                    "source": event.source,
                    "inventory_item_id": event.inventory_item_id,
                    "location_id": event.location_id,
                    "available": event.available,
                });
                self.journal_failure(&err, context).await;
                EventDisposition::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Transport reply for a disposition under the configured echo policy.
    pub fn acknowledge(&self, disposition: &EventDisposition) -> Acknowledgement {
        disposition.acknowledgement(self.inner.config.sync.echo_response)
    }

    async fn admit(&self, event: &InventoryEvent) -> SyncResult<Admission> {
        let source = event.source;

        if event.location_id != self.inner.stores.location_id(source) {
            return Ok(Admission::Skipped(SkipReason::WrongLocation));
        }

        if self
            .inner
            .locks
            .is_locked(source, event.inventory_item_id)
            .await?
        {
            return Ok(Admission::Skipped(SkipReason::EchoLocked));
        }

        let found = match self
            .inner
            .catalog
            .lookup_by_inventory_item(source, event.inventory_item_id)
            .await?
        {
            Some(found) => found,
            None => return Ok(Admission::Skipped(SkipReason::NotInCatalog)),
        };

        if !found.product.has_tag(self.inner.catalog.tag()) {
            return Ok(Admission::Skipped(SkipReason::MissingTag));
        }

        match found.cross_store_id() {
            Some(identifier) => Ok(Admission::Qualified(identifier.to_string())),
            None => Ok(Admission::Skipped(SkipReason::MissingIdentifier)),
        }
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Debounced entry point. Swallows and journals every failure.
    async fn settle(&self, source: StoreKey, identifier: String, observed: i64) {
        match self.reconcile(source, &identifier, observed).await {
            Ok(ReconcileOutcome::Applied(_)) | Ok(ReconcileOutcome::Unchanged) => {}
            Ok(ReconcileOutcome::NotEnrolled) => {
                warn!(
                    source = %source,
                    target = %source.other(),
                    identifier = %identifier,
                    "Counterpart not enrolled, nothing written"
                );
                if let Err(err) = self
                    .inner
                    .journal
                    .record_not_enrolled(source, &identifier, observed)
                    .await
                {
                    error!(error = %err, identifier = %identifier, "Failed to journal not-enrolled outcome");
                }
            }
            Err(err) => {
                let context = json!({
                    "stage": "reconcile",
                    "source": source,
                    "target": source.other(),
                    "identifier": identifier,
                    "observed": observed,
                });
                self.journal_failure(&err, context).await;
            }
        }
    }

    /// Applies the decision table to a settled observation.
    pub async fn reconcile(
        &self,
        source: StoreKey,
        identifier: &str,
        observed: i64,
    ) -> SyncResult<ReconcileOutcome> {
        let target = source.other();
        let previous = self.inner.snapshots.get(source, identifier).await?;
        let Some(write) = PlannedWrite::plan(decide(previous, observed), observed) else {
            debug!(source = %source, identifier, observed, "No change against snapshot");
            return Ok(ReconcileOutcome::Unchanged);
        };

        let counterpart = match self.inner.catalog.resolve_counterpart(target, identifier).await? {
            Some(found) => found,
            None => return Ok(ReconcileOutcome::NotEnrolled),
        };

        let entry = self.apply(source, identifier, write, &counterpart).await?;
        Ok(ReconcileOutcome::Applied(entry))
    }

    /// Locks the target item, writes, then updates both snapshots and the log.
    /// Journaling after a successful write is best-effort.
    async fn apply(
        &self,
        source: StoreKey,
        identifier: &str,
        write: PlannedWrite,
        counterpart: &CatalogMatch,
    ) -> SyncResult<SyncLogEntry> {
        let target = source.other();
        let target_item = counterpart.inventory_item_id();
        let target_location = self.inner.stores.location_id(target);
        let prior_target = self.inner.snapshots.get(target, identifier).await?;

        self.inner
            .locks
            .acquire(target, target_item, self.inner.config.lock_ttl())
            .await?;

        let adapter = self.inner.stores.adapter(target);
        match write.kind {
            SyncKind::Full => {
                adapter
                    .set_inventory_level(target_item, target_location, write.value)
                    .await?
            }
            SyncKind::Delta => {
                adapter
                    .adjust_inventory_level(target_item, target_location, write.value)
                    .await?
            }
        }

        if let Some(predicted) = predict_target_snapshot(write.action, prior_target, write.observed) {
            self.inner.snapshots.put(target, identifier, predicted).await?;
        }
        self.inner.snapshots.put(source, identifier, write.observed).await?;

        let entry = SyncLogEntry {
            source,
            target,
            identifier: identifier.to_string(),
            value: write.value,
            kind: write.kind,
            timestamp: Utc::now(),
        };
        // Past the store write, journaling is best-effort.
        if let Err(err) = self.inner.journal.record_sync(&entry).await {
            error!(
                error = %err,
                source = %source,
                target = %target,
                identifier,
                "Failed to journal applied sync"
            );
        }

        Ok(entry)
    }

    async fn journal_failure(&self, err: &SyncError, mut context: serde_json::Value) {
        if let (SyncError::StoreApi(api), Some(map)) = (err, context.as_object_mut()) {
            map.insert("operation".into(), json!(api.operation));
        }

        error!(error = %err, context = %context, "Sync failure");

        if let Err(journal_err) = self.inner.journal.record_error(err.to_string(), context).await {
            error!(error = %journal_err, "Failed to journal sync failure");
        }
    }

    // =========================================================================
    // Operator Surface
    // =========================================================================

    /// Manual full reconciliation of `identifier` from `source` to the other
    /// store. Reads the live source level and writes it as an absolute value.
    ///
    /// Unlike event handling, failures are returned to the caller. Store API
    /// failures are journaled as well.
    pub async fn sync_identifier(&self, identifier: &str, source: StoreKey) -> SyncResult<SyncLogEntry> {
        let identifier = validate_cross_store_id(identifier)
            .map_err(|e| SyncError::InvalidIdentifier(e.to_string()))?;

        info!(source = %source, identifier = %identifier, "Manual sync requested");

        let result = self.manual_full_sync(&identifier, source).await;
        if let Err(err @ SyncError::StoreApi(_)) = &result {
            let context = json!({
                "stage": "manual",
                "source": source,
                "target": source.other(),
                "identifier": identifier,
            });
            self.journal_failure(err, context).await;
        }
        result
    }

    async fn manual_full_sync(&self, identifier: &str, source: StoreKey) -> SyncResult<SyncLogEntry> {
        let target = source.other();

        let source_match = self
            .inner
            .catalog
            .lookup_by_identifier(source, identifier)
            .await?
            .ok_or_else(|| SyncError::NotInCatalog {
                store: source,
                identifier: identifier.to_string(),
            })?;

        let observed = self
            .inner
            .stores
            .adapter(source)
            .get_inventory_level(source_match.inventory_item_id(), self.inner.stores.location_id(source))
            .await?;

        let counterpart = self
            .inner
            .catalog
            .resolve_counterpart(target, identifier)
            .await?
            .ok_or_else(|| SyncError::NotEnrolled {
                store: target,
                identifier: identifier.to_string(),
            })?;

        let write = PlannedWrite {
            action: SyncAction::Full { value: observed },
            kind: SyncKind::Full,
            value: observed,
            observed,
        };
        self.apply(source, identifier, write, &counterpart).await
    }

    /// Forgets the snapshot of `identifier` in `store`; the next event for it
    /// triggers a full sync.
    pub async fn invalidate_item(&self, identifier: &str, store: StoreKey) -> SyncResult<()> {
        self.inner.snapshots.invalidate(store, identifier.trim()).await?;
        info!(store = %store, identifier = identifier.trim(), "Inventory snapshot invalidated");
        Ok(())
    }

    /// Drops the cached tagged catalog of `store`.
    pub async fn invalidate_catalog(&self, store: StoreKey) -> SyncResult<()> {
        self.inner.catalog.invalidate(store).await
    }

    pub async fn stats(&self) -> SyncResult<SyncStats> {
        self.inner.journal.stats().await
    }

    pub async fn recent_syncs(&self, limit: usize) -> SyncResult<Vec<SyncLogEntry>> {
        self.inner.journal.recent_syncs(limit).await
    }

    pub async fn recent_errors(&self, limit: usize) -> SyncResult<Vec<ErrorLogEntry>> {
        self.inner.journal.recent_errors(limit).await
    }

    /// Reconciliations still waiting for their debounce window.
    pub async fn pending_reconciliations(&self) -> usize {
        self.inner.debouncer.pending().await
    }

    /// Last known quantity of `identifier` in `store`.
    pub async fn snapshot(&self, store: StoreKey, identifier: &str) -> SyncResult<Option<i64>> {
        self.inner.snapshots.get(store, identifier).await
    }

    /// Whether events for `(store, inventory_item_id)` are currently dropped
    /// as echoes.
    pub async fn is_locked(&self, store: StoreKey, inventory_item_id: i64) -> SyncResult<bool> {
        self.inner.locks.is_locked(store, inventory_item_id).await
    }

    /// Releases an echo lock early.
    pub async fn release_lock(&self, store: StoreKey, inventory_item_id: i64) -> SyncResult<()> {
        self.inner.locks.release(store, inventory_item_id).await
    }

    /// Cancels all pending reconciliations. In-flight ones finish.
    pub async fn shutdown(&self) {
        let cancelled = self.inner.debouncer.shutdown().await;
        info!(cancelled, "Sync engine stopped");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
