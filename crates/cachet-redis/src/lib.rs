//! Redis integration for Cachet.
//!
//! [`RedisBackend`] implements the [`Backend`](cachet_core::Backend) command
//! interface on top of a single multiplexed Redis connection, acquired when the
//! backend is constructed and shared by every in-flight command. Expiry is
//! enforced by Redis itself; pattern scans use native `SCAN ... MATCH`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cachet_redis::{RedisBackend, RedisBackendConfig, Store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RedisBackend::connect(RedisBackendConfig::from_env()?).await?;
//! let store = Store::new("sessions", backend);
//!
//! store.set("user:1", "alice", Some(3600)).await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;

pub use backend::RedisBackend;
pub use config::RedisBackendConfig;

// Re-export core types for convenience.
pub use cachet_core::{Backend, CachetError, Outcome, Store, Ttl};
