//! In-process [`Backend`](cachet_core::Backend) for Cachet.
//!
//! [`MemoryBackend`] keeps entries in a map guarded by an async `RwLock` and
//! enforces TTLs lazily: an expired entry is invisible to every command and is
//! dropped the next time a write touches it, or on [`MemoryBackend::purge_expired`].
//!
//! Pattern scans evaluate the glob over the whole key set (see
//! [`cachet_core::glob`]), so `keys`/`delete_all` cost O(total keys) here.
//!
//! ```rust,no_run
//! use cachet_core::Store;
//! use cachet_memory::MemoryBackend;
//!
//! # async fn example() -> Result<(), cachet_core::CachetError> {
//! let store = Store::new("local", MemoryBackend::new());
//! store.set("greeting", "hello", Some(30)).await?;
//! # Ok(())
//! # }
//! ```

mod backend;

pub use backend::MemoryBackend;

// Re-export core types for convenience.
pub use cachet_core::{Backend, CachetError, Outcome, Store, Ttl};
