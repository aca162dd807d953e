//! Core traits and types for Cachet.
//!
//! - [`Store`] is the facade callers use: a named, null-safe key-value API with
//!   per-key TTL support.
//! - [`Backend`] is the minimal command interface a key-value server has to
//!   provide for the facade to work on top of it.
//! - [`CachetError`] is the single error type; a miss is never an error.

pub mod glob;
mod store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::Store;

// ---------------------------------------------------------------------------
// CachetError
// ---------------------------------------------------------------------------

/// Unified error type for all Cachet operations.
#[derive(Debug, Error)]
pub enum CachetError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("config error: {0}")]
    Config(String),
}

impl CachetError {
    /// Whether this error came from talking to the backend (as opposed to
    /// local misconfiguration).
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            CachetError::Connection(_) | CachetError::Backend(_) | CachetError::Protocol(_)
        )
    }
}

pub type Result<T, E = CachetError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Ttl / Outcome
// ---------------------------------------------------------------------------

/// Remaining lifetime of an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "snake_case")]
pub enum Ttl {
    /// The key expires in this many whole seconds.
    Expires(u64),
    /// The key exists and has no expiry.
    Persistent,
}

impl Ttl {
    pub fn seconds(&self) -> Option<u64> {
        match self {
            Ttl::Expires(secs) => Some(*secs),
            Ttl::Persistent => None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Ttl::Persistent)
    }
}

/// Result of a single-key mutation that only applies to existing keys
/// (`del`, `expire`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The key existed and the mutation was applied.
    Applied,
    /// The key did not exist; nothing was done.
    Missing,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Outcome::Missing)
    }
}

// ---------------------------------------------------------------------------
// Backend command interface
// ---------------------------------------------------------------------------

/// A primitive command understood by every [`Backend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "UPPERCASE")]
pub enum Command {
    Get {
        key: String,
    },
    /// Write `value`. `ttl: None` stores without expiry and clears any
    /// previous TTL on the key.
    Set {
        key: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ttl: Option<u64>,
    },
    Del {
        keys: Vec<String>,
    },
    Expire {
        key: String,
        seconds: u64,
    },
    Ttl {
        key: String,
    },
}

impl Command {
    /// Command name as the backend knows it.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::Expire { .. } => "EXPIRE",
            Command::Ttl { .. } => "TTL",
        }
    }
}

/// Raw reply to a [`Command`], shaped after the usual key-value server reply
/// types.
///
/// | Command | Reply |
/// |---------|-------|
/// | `GET` | `Bulk(value)` or `Nil` |
/// | `SET` | `Ok` |
/// | `DEL` | `Integer(number of keys removed)` |
/// | `EXPIRE` | `Integer(1)` if applied, `Integer(0)` if the key is absent |
/// | `TTL` | `Integer(secs)`, `Integer(-1)` without expiry, `Integer(-2)` if absent |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    Nil,
    Ok,
    Bulk(String),
    Integer(i64),
}

/// TTL reply for a key that exists but never expires.
pub const TTL_PERSISTENT: i64 = -1;
/// TTL reply for a key that does not exist.
pub const TTL_MISSING: i64 = -2;

/// A key-value server the [`Store`] facade can run on.
///
/// Implementations own their connection and must be safe for concurrent use
/// by many in-flight commands. Expiry is entirely the backend's job.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a single primitive command.
    async fn command(&self, cmd: Command) -> Result<Reply>;

    /// Return every live key matching the glob `pattern`.
    async fn scan(&self, pattern: &str) -> Result<Vec<String>>;

    /// Release the underlying connection. Commands issued afterwards may fail.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
