//! Process-wide schema cache
//!
//! Definitions are loaded lazily from the [`SchemaStore`](crate::storage::SchemaStore) on
//! first access and kept for the lifetime of the process. Concurrent misses for the same
//! name are serialised on a per-name lock so the store sees at most one load at a time
//! per name; misses for different names proceed in parallel.
//!
//! Failed loads are returned to the caller and not remembered: the next lookup of the
//! same name goes back to the store.

use crate::error::DbResult;
use crate::storage::Storage;
use crate::types::SchemaDefinition;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Compute-if-absent cache of schema definitions
pub struct SchemaCache {
    storage: Storage,
    /// Loaded definitions by schema name
    entries: DashMap<String, Arc<SchemaDefinition>>,
    /// Per-name load locks, present only while a load of that name is in flight
    loading: DashMap<String, Arc<Mutex<()>>>,
}

impl SchemaCache {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            entries: DashMap::new(),
            loading: DashMap::new(),
        }
    }

    /// Get a definition, loading it from storage on a miss
    pub fn get(&self, name: &str) -> DbResult<Arc<SchemaDefinition>> {
        if let Some(definition) = self.entries.get(name) {
            return Ok(definition.clone());
        }

        // Clone the lock out so the map shard is not held while loading.
        let lock = self
            .loading
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let result = {
            let _guard = lock.lock();
            self.load(name)
        };
        drop(lock);

        // The last caller out removes the lock, whether or not the load succeeded.
        self.loading
            .remove_if(name, |_, pending| Arc::strong_count(pending) == 1);
        result
    }

    /// Load `name` under its per-name lock
    fn load(&self, name: &str) -> DbResult<Arc<SchemaDefinition>> {
        // Another caller may have finished the load while we waited.
        if let Some(definition) = self.entries.get(name) {
            debug!(schema = %name, "Schema cache filled by concurrent load");
            return Ok(definition.clone());
        }

        debug!(schema = %name, "Schema cache miss");
        match self.storage.load(name) {
            Ok(definition) => {
                let definition = Arc::new(definition);
                self.entries.insert(name.to_string(), definition.clone());
                Ok(definition)
            }
            Err(e) => {
                warn!(schema = %name, error = %e, "Failed to load schema");
                Err(e)
            }
        }
    }

    /// Drop the cached definition of `name`, if any
    pub fn invalidate(&self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Check whether `name` is cached
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of cached definitions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
