//! Clap definitions for `stockbridge-admin`. Dispatch lives in `commands`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stockbridge_core::StoreKey;

#[derive(Parser, Debug)]
#[clap(
    name = "stockbridge-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and maintain the shared state of a Stockbridge deployment"
)]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[clap(long, global = true)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show total sync and error counters
    Stats,
    /// Show the most recent sync log entries, newest first
    Logs {
        #[clap(default_value_t = 20)]
        limit: usize,
    },
    /// Show the most recent error log entries, newest first
    Errors {
        #[clap(default_value_t = 20)]
        limit: usize,
    },
    /// Show the last known quantity of an identifier in both stores
    Snapshot {
        /// Cross-store identifier (barcode)
        identifier: String,
    },
    /// Forget the snapshot of an identifier so its next event is a full sync
    InvalidateItem {
        /// Cross-store identifier (barcode)
        identifier: String,
        /// Store whose snapshot to drop: primary (a) or secondary (b)
        #[clap(long)]
        store: StoreKey,
    },
    /// Drop the cached tagged catalog of a store
    InvalidateCatalog {
        #[clap(long)]
        store: StoreKey,
    },
    /// Inspect or release the echo lock on an inventory item
    Lock {
        #[clap(long)]
        store: StoreKey,
        inventory_item_id: i64,
        /// Release the lock instead of reporting it
        #[clap(long)]
        release: bool,
    },
    /// Validate the configuration and ping the state store
    CheckConfig,
    /// Write a starter config file for the two sync locations
    InitConfig {
        #[clap(long)]
        primary_location: i64,
        #[clap(long)]
        secondary_location: i64,
        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_invalidate_item() {
        let cli = Cli::parse_from(["stockbridge-admin", "invalidate-item", "0123", "--store", "b"]);
        match cli.command {
            Command::InvalidateItem { identifier, store } => {
                assert_eq!(identifier, "0123");
                assert_eq!(store, StoreKey::Secondary);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_logs_limit_defaults() {
        let cli = Cli::parse_from(["stockbridge-admin", "--json", "logs"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Logs { limit: 20 }));
    }

    #[test]
    fn test_rejects_unknown_store() {
        let result = Cli::try_parse_from(["stockbridge-admin", "invalidate-catalog", "--store", "c"]);
        assert!(result.is_err());
    }
}
