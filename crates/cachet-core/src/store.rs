use std::fmt;
use std::sync::Arc;

use crate::{Backend, CachetError, Command, Outcome, Reply, Result, Ttl, TTL_MISSING, TTL_PERSISTENT};

/// Pattern used by [`Store::keys`] and [`Store::delete_all`] when none is given.
const MATCH_ALL: &str = "*";

/// Named key-value store facade over a [`Backend`].
///
/// Translates the backend's raw replies into a value-or-miss contract:
/// absent and expired keys come back as `None` / [`Outcome::Missing`], while
/// `Err` is reserved for backend failures.
///
/// Cloning is cheap; clones share the same backend connection.
///
/// ```rust,ignore
/// let store = Store::new("sessions", backend);
/// store.set("user:1", "alice", Some(60)).await?;
/// assert_eq!(store.get("user:1").await?, Some("alice".to_string()));
/// ```
#[derive(Clone)]
pub struct Store {
    name: String,
    backend: Arc<dyn Backend>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Store {
    /// Create a store named `name` that takes ownership of `backend`.
    pub fn new(name: impl Into<String>, backend: impl Backend + 'static) -> Self {
        Self::from_arc(name, Arc::new(backend))
    }

    /// Create a store on top of an already shared backend.
    pub fn from_arc(name: impl Into<String>, backend: Arc<dyn Backend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    /// The configured store name. Not used to partition keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command interface this store runs on.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Get the value stored under `key`, or `None` if it is absent or expired.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        tracing::debug!(store = %self.name, key, "get");
        match self.exec(Command::Get { key: key.to_string() }).await? {
            Reply::Bulk(value) => Ok(Some(value)),
            Reply::Nil => Ok(None),
            other => Err(self.unexpected("GET", other)),
        }
    }

    /// Write `value` under `key`.
    ///
    /// With `ttl` of `Some(secs)` and `secs > 0` the entry expires `secs`
    /// seconds from now. `None` (or zero) stores it without expiry, dropping
    /// any TTL the key had before. Always returns `true` on success.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<bool> {
        let ttl = ttl.filter(|secs| *secs > 0);
        tracing::debug!(store = %self.name, key, ttl = ?ttl, "set");
        let cmd = Command::Set {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        };
        match self.exec(cmd).await? {
            Reply::Ok => Ok(true),
            other => Err(self.unexpected("SET", other)),
        }
    }

    /// Delete `key`. Deleting an absent key is [`Outcome::Missing`], not an error.
    pub async fn del(&self, key: &str) -> Result<Outcome> {
        tracing::debug!(store = %self.name, key, "del");
        let cmd = Command::Del {
            keys: vec![key.to_string()],
        };
        match self.exec(cmd).await? {
            Reply::Integer(0) => Ok(Outcome::Missing),
            Reply::Integer(n) if n > 0 => Ok(Outcome::Applied),
            other => Err(self.unexpected("DEL", other)),
        }
    }

    /// Set or overwrite the TTL of an existing key.
    pub async fn expire(&self, key: &str, ttl: u64) -> Result<Outcome> {
        tracing::debug!(store = %self.name, key, ttl, "expire");
        let cmd = Command::Expire {
            key: key.to_string(),
            seconds: ttl,
        };
        match self.exec(cmd).await? {
            Reply::Integer(1) => Ok(Outcome::Applied),
            Reply::Integer(0) => Ok(Outcome::Missing),
            other => Err(self.unexpected("EXPIRE", other)),
        }
    }

    /// Remaining lifetime of `key`.
    ///
    /// `None` if the key does not exist, [`Ttl::Persistent`] if it exists
    /// without expiry.
    pub async fn ttl_in_seconds(&self, key: &str) -> Result<Option<Ttl>> {
        tracing::debug!(store = %self.name, key, "ttl");
        match self.exec(Command::Ttl { key: key.to_string() }).await? {
            Reply::Integer(TTL_MISSING) => Ok(None),
            Reply::Integer(TTL_PERSISTENT) => Ok(Some(Ttl::Persistent)),
            Reply::Integer(secs) if secs >= 0 => Ok(Some(Ttl::Expires(secs as u64))),
            other => Err(self.unexpected("TTL", other)),
        }
    }

    /// Snapshot of the live keys, optionally restricted to a glob `pattern`.
    /// Order is unspecified.
    pub async fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let pattern = pattern.unwrap_or(MATCH_ALL);
        tracing::debug!(store = %self.name, pattern, "keys");
        self.backend.scan(pattern).await
    }

    /// Delete every key matching `pattern` (every key when `None`).
    ///
    /// Returns `true` even when nothing matched. On error, no claim is made
    /// about how many of the matched keys were removed.
    pub async fn delete_all(&self, pattern: Option<&str>) -> Result<bool> {
        let pattern = pattern.unwrap_or(MATCH_ALL);
        let keys = self.backend.scan(pattern).await?;
        tracing::debug!(store = %self.name, pattern, matched = keys.len(), "delete_all");
        if keys.is_empty() {
            return Ok(true);
        }
        match self.exec(Command::Del { keys }).await? {
            Reply::Integer(_) => Ok(true),
            other => Err(self.unexpected("DEL", other)),
        }
    }

    /// Release the backend connection. Other clones of this store lose it too.
    pub async fn close(self) -> Result<()> {
        tracing::debug!(store = %self.name, "close");
        self.backend.close().await
    }

    async fn exec(&self, cmd: Command) -> Result<Reply> {
        self.backend.command(cmd).await
    }

    fn unexpected(&self, command: &str, reply: Reply) -> CachetError {
        tracing::warn!(store = %self.name, command, reply = ?reply, "unexpected backend reply");
        CachetError::Protocol(format!("unexpected reply to {command}: {reply:?}"))
    }
}
