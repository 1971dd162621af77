//! Command dispatch. Every command works on the shared state store only.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use serde_json::json;
use tracing::{debug, info};

use stockbridge_core::{StoreKey, SyncLogEntry};
use stockbridge_state::StateClient;
use stockbridge_sync::{
    EchoLockManager, EventJournal, InventorySnapshotCache, ProductLookupCache, SyncConfig,
};

use crate::cli::Command;

/// State-store handles the admin commands share.
pub struct Admin {
    config: SyncConfig,
    state: StateClient,
    journal: EventJournal,
    snapshots: InventorySnapshotCache,
    locks: EchoLockManager,
}

impl Admin {
    pub fn new(config: SyncConfig, state: StateClient) -> Self {
        let journal = EventJournal::new(state.clone(), config.log_ttl());
        let snapshots = InventorySnapshotCache::new(state.clone(), config.inventory_ttl());
        let locks = EchoLockManager::new(state.clone());
        Admin {
            config,
            state,
            journal,
            snapshots,
            locks,
        }
    }

    pub async fn connect(config: SyncConfig) -> anyhow::Result<Self> {
        let state = StateClient::connect(config.state_config())
            .await
            .context("connecting to the state store")?;
        Ok(Self::new(config, state))
    }

    pub async fn run(&self, command: Command, as_json: bool, out: &mut impl Write) -> anyhow::Result<()> {
        debug!(?command, "Running admin command");

        match command {
            Command::Stats => {
                let stats = self.journal.stats().await?;
                if as_json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
                } else {
                    writeln!(out, "syncs:  {}", stats.total_syncs)?;
                    writeln!(out, "errors: {}", stats.total_errors)?;
                }
            }

            Command::Logs { limit } => {
                let entries = self.journal.recent_syncs(limit).await?;
                if as_json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
                } else if entries.is_empty() {
                    writeln!(out, "no sync log entries")?;
                } else {
                    for entry in &entries {
                        writeln!(out, "{}", format_sync(entry))?;
                    }
                }
            }

            Command::Errors { limit } => {
                let entries = self.journal.recent_errors(limit).await?;
                if as_json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
                } else if entries.is_empty() {
                    writeln!(out, "no error log entries")?;
                } else {
                    for entry in &entries {
                        writeln!(
                            out,
                            "{}  {}  {}",
                            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            entry.message,
                            entry.context
                        )?;
                    }
                }
            }

            Command::Snapshot { identifier } => {
                let identifier = identifier.trim();
                let primary = self.snapshots.get(StoreKey::Primary, identifier).await?;
                let secondary = self.snapshots.get(StoreKey::Secondary, identifier).await?;
                if as_json {
                    let body = json!({
                        "identifier": identifier,
                        "primary": primary,
                        "secondary": secondary,
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
                } else {
                    writeln!(out, "primary:   {}", format_quantity(primary))?;
                    writeln!(out, "secondary: {}", format_quantity(secondary))?;
                }
            }

            Command::InvalidateItem { identifier, store } => {
                self.snapshots.invalidate(store, identifier.trim()).await?;
                info!(store = %store, identifier = identifier.trim(), "Snapshot invalidated");
                writeln!(out, "invalidated {} snapshot of {}", store, identifier.trim())?;
            }

            Command::InvalidateCatalog { store } => {
                ProductLookupCache::invalidate_cached(&self.state, store, self.config.tag()).await?;
                writeln!(out, "invalidated {} catalog for tag {}", store, self.config.tag())?;
            }

            Command::Lock {
                store,
                inventory_item_id,
                release,
            } => {
                if release {
                    self.locks.release(store, inventory_item_id).await?;
                    writeln!(out, "released lock on {} item {}", store, inventory_item_id)?;
                } else {
                    let locked = self.locks.is_locked(store, inventory_item_id).await?;
                    let status = if locked { "locked" } else { "unlocked" };
                    writeln!(out, "{} item {}: {}", store, inventory_item_id, status)?;
                }
            }

            Command::CheckConfig => {
                self.state
                    .health_check()
                    .await
                    .context("state store health check")?;
                for key in StoreKey::ALL {
                    let store = self.config.store(key);
                    writeln!(out, "{}: {} (location {})", key, store.name, store.location_id)?;
                }
                writeln!(out, "tag: {}", self.config.tag())?;
                writeln!(out, "debounce: {} ms", self.config.sync.debounce_ms)?;
                writeln!(out, "state store: ok")?;
            }

            Command::InitConfig { .. } => bail!("init-config does not need a state store"),
        }

        Ok(())
    }
}

/// Writes a validated starter config. Refuses to overwrite unless `force`.
pub fn init_config(
    path: Option<PathBuf>,
    primary_location: i64,
    secondary_location: i64,
    force: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let path = path
        .or_else(SyncConfig::default_config_path)
        .context("no config path available on this platform")?;

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = SyncConfig::for_locations(primary_location, secondary_location);
    config.validate()?;
    config.save(Some(path.clone()))?;

    writeln!(out, "wrote {}", path.display())?;
    Ok(())
}

fn format_sync(entry: &SyncLogEntry) -> String {
    format!(
        "{}  {} -> {}  {}  {} {:+}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.source,
        entry.target,
        entry.identifier,
        entry.kind,
        entry.value
    )
}

fn format_quantity(quantity: Option<i64>) -> String {
    quantity.map_or_else(|| "-".to_string(), |q| q.to_string())
}
