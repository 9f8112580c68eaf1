//! Session cache for backend responses
//!
//! Views read through a shared [`CacheManager`] before asking the backend, so
//! revisiting a screen does not flash a loading state. Entries are timestamped
//! envelopes; each reader supplies its own TTL and expired entries are removed
//! lazily when read. Writes against the backend clear dependent entries through
//! the declared [`InvalidationGraph`].

mod clock;
mod invalidation;
mod manager;
mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use invalidation::{CachedResource, InvalidationGraph, Mutation};
pub use manager::{CacheError, CacheManager, DEFAULT_TTL_SECS};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
