//! In-memory storage backend for testing and development

use super::{decode_entry, encode_entry, validate_schema_name, SchemaStore};
use crate::error::{DbError, DbResult};
use crate::schema_codec::SchemaCodec;
use crate::types::SchemaDefinition;
use apache_avro::Schema;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory storage backend
///
/// Holds the same encoded entries the file backend writes, so loads go through the
/// codec exactly as they would from disk.
#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    codec: SchemaCodec,
    /// Encoded entries by schema name
    entries: DashMap<String, Vec<u8>>,
    /// Number of `load` calls served
    loads: AtomicUsize,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: SchemaCodec) -> Self {
        Self {
            codec,
            ..Default::default()
        }
    }

    /// Number of `load` calls made against this store
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Replace the raw entry for `name`
    pub fn put_raw(&self, name: impl Into<String>, entry: Vec<u8>) {
        self.entries.insert(name.into(), entry);
    }
}

impl SchemaStore for MemorySchemaStore {
    fn save(&self, name: &str, key_column: &str, schema: &Schema) -> DbResult<SchemaDefinition> {
        validate_schema_name(name)?;
        let (definition, entry) = encode_entry(&self.codec, name, key_column, schema)?;
        self.entries.insert(name.to_string(), entry);
        Ok(definition)
    }

    fn load(&self, name: &str) -> DbResult<SchemaDefinition> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let entry = self
            .entries
            .get(name)
            .map(|e| e.clone())
            .ok_or_else(|| DbError::SchemaNotFound(name.to_string()))?;
        decode_entry(&self.codec, name, &entry)
    }
}
