//! Cache Store
//!
//! The graph never stores generated output itself. Transformers write code,
//! source maps and ASTs to a key/blob store and the resulting keys ride along
//! on each [`AssetRecord`]. When a graph mutation removes assets, their keys
//! are evicted here.

use std::io::{Cursor, Read};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::asset::AssetRecord;
use crate::error::CacheError;
use crate::graph::Subgraph;

/// A key to blob store.
pub trait CacheStore: Send + Sync {
    /// Read a whole entry.
    fn get_blob(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    fn set_blob(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;

    /// Open an entry for streaming reads.
    fn get_stream(&self, key: &str) -> Result<Box<dyn Read + Send>, CacheError>;

    /// Write an entry from a stream, consuming it to the end.
    fn set_stream(&self, key: &str, stream: &mut dyn Read) -> Result<(), CacheError>;

    fn has(&self, key: &str) -> bool;

    /// Delete an entry. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool, CacheError>;
}

/// An in-memory [`CacheStore`], safe to share between worker threads.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Arc<[u8]>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, key: &str) -> Result<Arc<[u8]>, CacheError> {
        self.entries
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }
}

impl CacheStore for MemoryCache {
    fn get_blob(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        Ok(self.entry(key)?.to_vec())
    }

    fn set_blob(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), Arc::from(bytes));
        Ok(())
    }

    fn get_stream(&self, key: &str) -> Result<Box<dyn Read + Send>, CacheError> {
        Ok(Box::new(Cursor::new(self.entry(key)?)))
    }

    fn set_stream(&self, key: &str, stream: &mut dyn Read) -> Result<(), CacheError> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        self.entries.insert(key.to_string(), Arc::from(bytes));
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Delete the generated output of every asset in `removed`.
///
/// Returns how many cache entries were actually deleted.
pub fn evict_removed_assets(
    cache: &dyn CacheStore,
    removed: &Subgraph<AssetRecord>,
) -> Result<usize, CacheError> {
    let mut evicted = 0;
    for asset in removed.nodes() {
        for key in asset.cache_keys() {
            if cache.remove(key)? {
                evicted += 1;
            }
        }
    }
    debug!(assets = removed.node_count(), evicted, "evicted removed assets");
    Ok(evicted)
}
