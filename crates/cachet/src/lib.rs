//! Cachet — a namespaced key-value store facade with per-key TTL.
//!
//! This crate re-exports the Cachet sub-crates for single-import usage.
//! Enable features to choose which backends are available.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `memory` |
//! | `memory` | In-process `MemoryBackend` |
//! | `redis` | `RedisBackend` over a Redis server |
//! | `full` | All backends |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cachet::{Outcome, Store, Ttl};
//! use cachet::memory::MemoryBackend;
//!
//! let store = Store::new("sessions", MemoryBackend::new());
//! store.set("user:1", "alice", Some(60)).await?;
//! assert_eq!(store.ttl_in_seconds("user:1").await?, Some(Ttl::Expires(60)));
//! assert_eq!(store.del("user:1").await?, Outcome::Applied);
//! assert_eq!(store.del("user:1").await?, Outcome::Missing);
//! ```

/// Core traits and types: Store, Backend, Command, Reply, CachetError, glob matching.
/// Always available.
pub use cachet_core as core;

pub use cachet_core::{Backend, CachetError, Outcome, Result, Store, Ttl};

/// In-process backend with lazy TTL expiry.
#[cfg(feature = "memory")]
pub use cachet_memory as memory;

/// Redis backend and its connection config.
#[cfg(feature = "redis")]
pub use cachet_redis as redis;
