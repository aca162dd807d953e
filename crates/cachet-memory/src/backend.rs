use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use cachet_core::glob::glob_match;
use cachet_core::{Backend, CachetError, Command, Reply, Result, TTL_MISSING, TTL_PERSISTENT};
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Thread-safe in-memory key-value backend with per-key expiry.
///
/// Time is measured with [`tokio::time::Instant`], so tests running on a
/// paused runtime can advance past TTLs without sleeping.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "purged expired entries");
        }
        removed
    }

    fn deadline(now: Instant, seconds: u64, command: &str) -> Result<Instant> {
        now.checked_add(Duration::from_secs(seconds)).ok_or_else(|| {
            CachetError::Backend(format!("invalid expire time in '{command}' command"))
        })
    }

    async fn get(&self, key: &str) -> Reply {
        let now = Instant::now();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Reply::Bulk(entry.value.clone()),
            _ => Reply::Nil,
        }
    }

    async fn set(&self, key: String, value: String, ttl: Option<u64>) -> Result<Reply> {
        let now = Instant::now();
        let expires_at = match ttl {
            Some(0) => {
                return Err(CachetError::Backend(
                    "invalid expire time in 'set' command".to_string(),
                ))
            }
            Some(secs) => Some(Self::deadline(now, secs, "set")?),
            None => None,
        };
        self.entries
            .write()
            .await
            .insert(key, Entry { value, expires_at });
        Ok(Reply::Ok)
    }

    async fn del(&self, keys: &[String]) -> Reply {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let removed = keys
            .iter()
            .filter_map(|k| entries.remove(k))
            .filter(|e| e.is_live(now))
            .count();
        Reply::Integer(removed as i64)
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<Reply> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let live = entries.get(key).is_some_and(|e| e.is_live(now));
        if !live {
            entries.remove(key);
            return Ok(Reply::Integer(0));
        }
        if seconds == 0 {
            // A non-positive expiry deletes the key right away.
            entries.remove(key);
        } else if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(Self::deadline(now, seconds, "expire")?);
        }
        Ok(Reply::Integer(1))
    }

    async fn ttl(&self, key: &str) -> Reply {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let remaining = match entries.get(key) {
            Some(entry) if entry.is_live(now) => entry.expires_at,
            _ => return Reply::Integer(TTL_MISSING),
        };
        match remaining {
            None => Reply::Integer(TTL_PERSISTENT),
            Some(at) => {
                // Round to the nearest second.
                let millis = at.saturating_duration_since(now).as_millis();
                Reply::Integer(((millis + 500) / 1000) as i64)
            }
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn command(&self, cmd: Command) -> Result<Reply> {
        tracing::trace!(command = cmd.name(), "memory backend command");
        match cmd {
            Command::Get { key } => Ok(self.get(&key).await),
            Command::Set { key, value, ttl } => self.set(key, value, ttl).await,
            Command::Del { keys } => Ok(self.del(&keys).await),
            Command::Expire { key, seconds } => self.expire(&key, seconds).await,
            Command::Ttl { key } => Ok(self.ttl(&key).await),
        }
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(k, e)| e.is_live(now) && glob_match(pattern, k))
            .map(|(k, _)| k.clone())
            .collect())
    }
}
