//! # Sync Configuration
//!
//! Configuration management for the sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKBRIDGE_PRIMARY_LOCATION_ID=61234                              │
//! │     STOCKBRIDGE_STATE_URL=redis://127.0.0.1/0                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockbridge/sync.toml (Linux)                            │
//! │     ~/Library/Application Support/dev.stockbridge.stockbridge/...      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     tag "inventory-sync", 2000 ms debounce, 25 s locks                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [primary]
//! name = "Retail"
//! location_id = 61234
//!
//! [secondary]
//! name = "Wholesale"
//! location_id = 78901
//!
//! [sync]
//! tag = "inventory-sync"
//! debounce_ms = 2000
//! lock_ttl_secs = 25
//! catalog_ttl_secs = 1800
//! echo_response = "accept"
//!
//! [state]
//! url = "redis://127.0.0.1:6379/0"
//! key_prefix = "stockbridge:"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use stockbridge_core::validation::{
    validate_location_id, validate_lock_ttl, validate_positive, validate_tag,
};
use stockbridge_core::{StoreIdentity, StoreKey, DEFAULT_SYNC_TAG};
use stockbridge_state::StateConfig;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Echo Response
// =============================================================================

/// How the transport should answer a notification the engine dropped as an
/// echo of its own write.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ACCEPT (Default)                   │  REJECT                          │
/// │  ────────────────                   │  ──────                          │
/// │  • Reply with success               │  • Reply with an auth failure    │
/// │  • Store stops redelivering         │  • Store may redeliver; the      │
/// │                                     │    lock drops it again until     │
/// │                                     │    the TTL expires               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoResponse {
    #[default]
    Accept,
    Reject,
}

impl std::fmt::Display for EchoResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EchoResponse::Accept => write!(f, "accept"),
            EchoResponse::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for EchoResponse {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accept" | "ok" | "success" => Ok(EchoResponse::Accept),
            "reject" | "unauthorized" => Ok(EchoResponse::Reject),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown echo response: '{}'. Valid options: accept, reject",
                other
            ))),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Configuration for one side of the store pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Human-readable store name, used in logs only.
    #[serde(default)]
    pub name: String,

    /// The one location whose inventory is synchronized.
    /// Events for any other location are ignored.
    #[serde(default)]
    pub location_id: i64,
}

impl StoreSettings {
    fn named(name: &str) -> Self {
        StoreSettings {
            name: name.to_string(),
            location_id: 0,
        }
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Engine tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Catalog membership tag.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Quiescence window after the latest event (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Echo-lock lifetime (seconds, 20-30).
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_secs: u64,

    /// Tagged catalog cache lifetime (seconds).
    #[serde(default = "default_catalog_ttl")]
    pub catalog_ttl_secs: u64,

    /// Inventory snapshot lifetime (seconds).
    #[serde(default = "default_inventory_ttl")]
    pub inventory_ttl_secs: u64,

    /// Sync/error log retention (seconds).
    #[serde(default = "default_log_ttl")]
    pub log_ttl_secs: u64,

    /// Transport reply for dropped echoes.
    #[serde(default)]
    pub echo_response: EchoResponse,
}

fn default_tag() -> String {
    DEFAULT_SYNC_TAG.to_string()
}
fn default_debounce_ms() -> u64 {
    2_000
}
fn default_lock_ttl() -> u64 {
    25
}
fn default_catalog_ttl() -> u64 {
    1_800
}
fn default_inventory_ttl() -> u64 {
    86_400
}
fn default_log_ttl() -> u64 {
    7 * 86_400
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            tag: default_tag(),
            debounce_ms: default_debounce_ms(),
            lock_ttl_secs: default_lock_ttl(),
            catalog_ttl_secs: default_catalog_ttl(),
            inventory_ttl_secs: default_inventory_ttl(),
            log_ttl_secs: default_log_ttl(),
            echo_response: EchoResponse::default(),
        }
    }
}

// =============================================================================
// State Settings
// =============================================================================

/// Where caches, locks and logs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSettings {
    /// `memory://` or `redis://host:port/db`.
    #[serde(default = "default_state_url")]
    pub url: String,

    /// Namespace prepended to every Redis key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,
}

fn default_state_url() -> String {
    "memory://".to_string()
}

impl Default for StateSettings {
    fn default() -> Self {
        StateSettings {
            url: default_state_url(),
            key_prefix: None,
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_primary")]
    pub primary: StoreSettings,

    #[serde(default = "default_secondary")]
    pub secondary: StoreSettings,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub state: StateSettings,
}

fn default_primary() -> StoreSettings {
    StoreSettings::named("Primary Store")
}

fn default_secondary() -> StoreSettings {
    StoreSettings::named("Secondary Store")
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            primary: default_primary(),
            secondary: default_secondary(),
            sync: SyncSettings::default(),
            state: StateSettings::default(),
        }
    }
}

impl SyncConfig {
    /// Creates a config with defaults and the two sync locations set.
    pub fn for_locations(primary_location: i64, secondary_location: i64) -> Self {
        let mut config = Self::default();
        config.primary.location_id = primary_location;
        config.secondary.location_id = secondary_location;
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        validate_location_id("primary.location_id", self.primary.location_id)?;
        validate_location_id("secondary.location_id", self.secondary.location_id)?;

        validate_tag(&self.sync.tag)?;
        validate_lock_ttl(self.sync.lock_ttl_secs)?;
        validate_positive("debounce_ms", self.sync.debounce_ms)?;
        validate_positive("catalog_ttl_secs", self.sync.catalog_ttl_secs)?;
        validate_positive("inventory_ttl_secs", self.sync.inventory_ttl_secs)?;
        validate_positive("log_ttl_secs", self.sync.log_ttl_secs)?;

        let url = self.state.url.as_str();
        if !(url.starts_with("memory://")
            || url.starts_with("redis://")
            || url.starts_with("rediss://"))
        {
            return Err(SyncError::InvalidConfig(format!(
                "State URL must start with memory://, redis:// or rediss://, got: {}",
                url
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        for key in StoreKey::ALL {
            let upper = key.as_str().to_uppercase();
            let store = self.store_mut(key);

            if let Ok(name) = std::env::var(format!("STOCKBRIDGE_{}_NAME", upper)) {
                store.name = name;
            }

            if let Ok(location) = std::env::var(format!("STOCKBRIDGE_{}_LOCATION_ID", upper)) {
                match location.parse::<i64>() {
                    Ok(id) => {
                        debug!(store = %key, location_id = id, "Overriding location from environment");
                        store.location_id = id;
                    }
                    Err(_) => warn!(store = %key, value = %location, "Ignoring non-numeric location id"),
                }
            }
        }

        if let Ok(tag) = std::env::var("STOCKBRIDGE_SYNC_TAG") {
            self.sync.tag = tag;
        }

        if let Ok(ms) = std::env::var("STOCKBRIDGE_DEBOUNCE_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                self.sync.debounce_ms = ms;
            }
        }

        if let Ok(secs) = std::env::var("STOCKBRIDGE_LOCK_TTL_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                self.sync.lock_ttl_secs = secs;
            }
        }

        if let Ok(secs) = std::env::var("STOCKBRIDGE_CATALOG_TTL_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                self.sync.catalog_ttl_secs = secs;
            }
        }

        if let Ok(mode) = std::env::var("STOCKBRIDGE_ECHO_RESPONSE") {
            match mode.parse() {
                Ok(parsed) => self.sync.echo_response = parsed,
                Err(_) => warn!(mode = %mode, "Unknown echo response in environment"),
            }
        }

        if let Ok(url) = std::env::var("STOCKBRIDGE_STATE_URL") {
            debug!("Overriding state URL from environment");
            self.state.url = url;
        }

        if let Ok(prefix) = std::env::var("STOCKBRIDGE_STATE_PREFIX") {
            self.state.key_prefix = Some(prefix);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "stockbridge", "stockbridge")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn store(&self, key: StoreKey) -> &StoreSettings {
        match key {
            StoreKey::Primary => &self.primary,
            StoreKey::Secondary => &self.secondary,
        }
    }

    fn store_mut(&mut self, key: StoreKey) -> &mut StoreSettings {
        match key {
            StoreKey::Primary => &mut self.primary,
            StoreKey::Secondary => &mut self.secondary,
        }
    }

    /// Builds the immutable identity of one store.
    pub fn identity(&self, key: StoreKey) -> StoreIdentity {
        let store = self.store(key);
        StoreIdentity::new(key, store.location_id, store.name.clone())
    }

    pub fn tag(&self) -> &str {
        self.sync.tag.trim()
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.sync.debounce_ms)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.sync.lock_ttl_secs)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.sync.catalog_ttl_secs)
    }

    pub fn inventory_ttl(&self) -> Duration {
        Duration::from_secs(self.sync.inventory_ttl_secs)
    }

    pub fn log_ttl(&self) -> Duration {
        Duration::from_secs(self.sync.log_ttl_secs)
    }

    /// State store connection settings.
    pub fn state_config(&self) -> StateConfig {
        let config = StateConfig::new(self.state.url.clone());
        match &self.state.key_prefix {
            Some(prefix) => config.key_prefix(prefix.clone()),
            None => config,
        }
    }
}
