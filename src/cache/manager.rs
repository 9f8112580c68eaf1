//! Cache manager for memoizing backend responses
//!
//! Provides a `CacheManager` that stores serializable data as timestamped JSON
//! envelopes in a [`Storage`] backend. Freshness is decided by the reader: the
//! TTL is passed on every `get`, never stored with the entry.

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::invalidation::{CachedResource, InvalidationGraph, Mutation};
use super::storage::{FileStorage, MemoryStorage, Storage, StorageError};

/// TTL used by `get_default`, in seconds
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Errors that can occur when writing to the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Keys must be non-empty
    #[error("Cache key must not be empty")]
    EmptyKey,

    /// The payload could not be encoded as JSON
    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The storage backend rejected the write
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Envelope written to storage
#[derive(Debug, Serialize)]
struct CacheEntry<'a, T> {
    /// The cached data
    data: &'a T,
    /// When the data was cached, in epoch milliseconds
    timestamp: i64,
}

/// Envelope as read back; the payload stays untyped until it is known to be fresh
#[derive(Debug, Deserialize)]
struct StoredEntry {
    data: Value,
    timestamp: i64,
}

/// Reads and writes cached responses for every view
///
/// Cloning is cheap and every clone shares the same storage, so the manager is
/// built once at startup and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct CacheManager {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    graph: InvalidationGraph,
}

impl CacheManager {
    /// Creates a cache over the given storage and clock with the default invalidation graph
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            graph: InvalidationGraph::default(),
        }
    }

    /// Creates a cache that lives for the current session only
    pub fn session() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock))
    }

    /// Creates a cache persisted in the XDG cache directory
    ///
    /// Uses `~/.cache/grok-sdr/responses/` on Linux, or the equivalent on other platforms.
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn persistent() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "grok-sdr")?;
        Some(Self::with_dir(project_dirs.cache_dir().join("responses")))
    }

    /// Creates a cache persisted in a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self::new(Arc::new(FileStorage::new(cache_dir)), Arc::new(SystemClock))
    }

    /// Replaces the invalidation graph
    pub fn with_graph(mut self, graph: InvalidationGraph) -> Self {
        self.graph = graph;
        self
    }

    /// The underlying storage, for inspecting raw entries
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Reads data cached under `key` if it is younger than `ttl_secs`
    ///
    /// Missing, corrupted and expired entries all yield `None`. Expired entries
    /// are deleted on the way out; a TTL of zero or less treats every entry as
    /// expired.
    pub fn get<T: DeserializeOwned>(&self, key: &str, ttl_secs: i64) -> Option<T> {
        if key.is_empty() {
            return None;
        }

        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!("Cache read for '{}' failed: {}", key, e);
                return None;
            }
        };

        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(_) => {
                debug!("Ignoring malformed cache entry '{}'", key);
                return None;
            }
        };

        // Out-of-range or future timestamps come from foreign writers; treat them as expired
        let age_millis = self
            .clock
            .now_millis()
            .checked_sub(entry.timestamp)
            .filter(|age| *age >= 0);
        let fresh = age_millis.is_some_and(|age| ttl_secs > 0 && age <= ttl_secs.saturating_mul(1000));
        if !fresh {
            debug!("Cache entry '{}' expired ({:?} ms old)", key, age_millis);
            if let Err(e) = self.storage.remove_item(key) {
                warn!("Failed to delete expired cache entry '{}': {}", key, e);
            }
            return None;
        }

        serde_json::from_value(entry.data).ok()
    }

    /// Reads `key` with the default five minute TTL
    pub fn get_default<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key, DEFAULT_TTL_SECS)
    }

    /// Reads a known resource with its own TTL
    pub fn get_resource<T: DeserializeOwned>(&self, resource: CachedResource) -> Option<T> {
        self.get(resource.key(), resource.ttl_secs())
    }

    /// Writes `data` under `key`, stamped with the current time
    ///
    /// Overwrites any existing entry. Storage failures are returned so callers
    /// can carry on uncached.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_millis(),
        };
        let json = serde_json::to_string(&entry)?;
        self.storage.set_item(key, &json)?;
        Ok(())
    }

    /// Writes a known resource
    pub fn set_resource<T: Serialize>(
        &self,
        resource: CachedResource,
        data: &T,
    ) -> Result<(), CacheError> {
        self.set(resource.key(), data)
    }

    /// Deletes the entry under `key`, or every entry in the store when `key` is `None`
    ///
    /// The full clear is global: it also removes entries written by other views.
    pub fn clear(&self, key: Option<&str>) -> Result<(), StorageError> {
        match key {
            Some(key) => self.storage.remove_item(key),
            None => self.storage.clear(),
        }
    }

    /// Clears every resource that depends on data changed by `mutation`
    ///
    /// Returns the keys that were cleared.
    pub fn invalidate(&self, mutation: Mutation) -> Vec<&'static str> {
        let keys: Vec<&'static str> = self
            .graph
            .dependents(mutation)
            .iter()
            .map(|resource| resource.key())
            .collect();

        for key in &keys {
            if let Err(e) = self.clear(Some(key)) {
                warn!("Failed to clear cache entry '{}': {}", key, e);
            }
        }
        debug!("{:?} invalidated {:?}", mutation, keys);
        keys
    }
}
