//! # Redis State Store
//!
//! [`StateStore`] backend shared by every engine instance pointed at the same
//! Redis. Uses a `ConnectionManager`, which reconnects transparently after a
//! dropped connection.
//!
//! ## Command Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get               → GET key                                           │
//! │  set_with_ttl      → SET key value EX ttl                              │
//! │  delete            → DEL key                                           │
//! │  increment         → INCR key                                          │
//! │  keys_with_prefix  → SCAN cursor MATCH prefix* COUNT 500 (until 0)     │
//! │  ping              → PING                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use crate::error::{StateError, StateResult};
use crate::store::StateStore;

/// Keys fetched per SCAN round trip.
const SCAN_BATCH: usize = 500;

pub struct RedisStateStore {
    connection: ConnectionManager,
    /// Optional namespace prepended to every key (e.g. "stockbridge:").
    prefix: String,
}

impl RedisStateStore {
    /// Connects without a key prefix.
    pub async fn new(url: &str) -> StateResult<Self> {
        Self::with_prefix(url, None).await
    }

    /// Connects with an optional key prefix, so several deployments can share
    /// one Redis.
    pub async fn with_prefix(url: &str, prefix: Option<&str>) -> StateResult<Self> {
        let client = Client::open(url).map_err(|e| StateError::UnsupportedUrl(e.to_string()))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| StateError::ConnectionFailed(e.to_string()))?;

        info!(prefix = prefix.unwrap_or(""), "Connected to Redis state store");

        Ok(RedisStateStore {
            connection,
            prefix: prefix.unwrap_or("").to_string(),
        })
    }

    #[inline]
    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    #[inline]
    fn strip_prefix<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }
}

/// Escapes glob metacharacters so a literal prefix can be used in MATCH.
/// INCR against a non-numeric value replies `ERR value is not an integer or
/// out of range`. Other ERR replies are real backend failures.
fn is_not_an_integer(e: &redis::RedisError) -> bool {
    e.kind() == redis::ErrorKind::TypeError
        || (e.code() == Some("ERR") && e.detail().is_some_and(|d| d.contains("not an integer")))
}

fn escape_glob(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn get(&self, key: &str) -> StateResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(self.prefixed_key(key)).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StateResult<()> {
        let mut conn = self.connection.clone();
        // EX 0 is rejected by Redis; round sub-second TTLs up.
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(self.prefixed_key(key), value, secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StateResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(self.prefixed_key(key)).await?;
        Ok(())
    }

    async fn increment(&self, key: &str) -> StateResult<i64> {
        let mut conn = self.connection.clone();
        let full_key = self.prefixed_key(key);
        conn.incr(&full_key, 1i64).await.map_err(|e: redis::RedisError| {
            if is_not_an_integer(&e) {
                StateError::NotAnInteger(key.to_string())
            } else {
                e.into()
            }
        })
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StateResult<Vec<String>> {
        let mut conn = self.connection.clone();
        let pattern = format!("{}*", escape_glob(&self.prefixed_key(prefix)));

        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch.iter().map(|k| self.strip_prefix(k).to_string()));

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(prefix, count = keys.len(), "Scanned keys");
        Ok(keys)
    }

    async fn ping(&self) -> StateResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_non_integer_replies_map_to_not_an_integer() {
        let not_integer = redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            "An error was signalled by the server",
            "value is not an integer or out of range".to_string(),
        ));
        assert!(is_not_an_integer(&not_integer));

        let max_clients = redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            "An error was signalled by the server",
            "max number of clients reached".to_string(),
        ));
        assert!(!is_not_an_integer(&max_clients));

        let io = redis::RedisError::from((redis::ErrorKind::IoError, "connection reset"));
        assert!(!is_not_an_integer(&io));
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("log:sync:"), "log:sync:");
        assert_eq!(escape_glob("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }
}
