//! Durable schema storage
//!
//! Every schema is persisted as one entry keyed by its name:
//!
//! ```text
//! [key_field_index: i32 big-endian][gzip(schema json)]
//! ```
//!
//! - **File**: one `<name>.avsc.bin` file per schema under a storage directory
//! - **Memory**: the same entries held in a map, for tests and development
//!
//! Writes are plain overwrites. Neither backend locks against concurrent `save` calls
//! for the same name, across threads or processes; the last writer wins and a crash
//! mid-write can leave a truncated file behind.

mod file;
mod memory;

pub use file::FileSchemaStore;
pub use memory::MemorySchemaStore;

use crate::config::StorageConfig;
use crate::error::{DbError, DbResult, ValidationError};
use crate::schema_codec::SchemaCodec;
use crate::types::{key_field_position, SchemaDefinition};
use apache_avro::Schema;
use std::sync::Arc;

/// Extension of persisted schema files
pub const SCHEMA_FILE_EXTENSION: &str = ".avsc.bin";

/// Size of the key field index header
const KEY_INDEX_LEN: usize = 4;

/// Storage backend trait for schema persistence
pub trait SchemaStore: Send + Sync {
    /// Persist `schema` under `name`, designating `key_column` as its key field.
    ///
    /// Replaces any definition previously stored under the same name.
    fn save(&self, name: &str, key_column: &str, schema: &Schema) -> DbResult<SchemaDefinition>;

    /// Load the definition stored under `name`
    fn load(&self, name: &str) -> DbResult<SchemaDefinition>;
}

/// Shared schema store handle
pub type Storage = Arc<dyn SchemaStore>;

/// Create a storage backend from configuration
pub fn create_storage(config: &StorageConfig, codec: SchemaCodec) -> Storage {
    match config {
        StorageConfig::Memory => Arc::new(MemorySchemaStore::with_codec(codec)),
        StorageConfig::File { path } => Arc::new(FileSchemaStore::with_codec(path, codec)),
    }
}

/// Reject names that cannot be used as a single file name
pub(crate) fn validate_schema_name(name: &str) -> DbResult<()> {
    if name.is_empty() {
        return Err(ValidationError::EmptySchemaName.into());
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(ValidationError::InvalidSchemaName(name.to_string()).into());
    }
    Ok(())
}

/// Build the stored entry for a schema, locating the key column first
pub(crate) fn encode_entry(
    codec: &SchemaCodec,
    name: &str,
    key_column: &str,
    schema: &Schema,
) -> DbResult<(SchemaDefinition, Vec<u8>)> {
    let index = key_field_position(schema, key_column).ok_or_else(|| DbError::KeyFieldNotFound {
        schema: name.to_string(),
        key_column: key_column.to_string(),
    })?;

    let blob = codec
        .encode(schema)
        .map_err(|e| DbError::Serialization(e.to_string()))?;

    let mut entry = Vec::with_capacity(KEY_INDEX_LEN + blob.len());
    entry.extend_from_slice(&(index as i32).to_be_bytes());
    entry.extend_from_slice(&blob);

    let definition = SchemaDefinition::new(name, schema.clone(), index)?;
    Ok((definition, entry))
}

/// Parse a stored entry back into a definition
pub(crate) fn decode_entry(
    codec: &SchemaCodec,
    name: &str,
    entry: &[u8],
) -> DbResult<SchemaDefinition> {
    let corrupt = |reason: String| DbError::CorruptSchema {
        name: name.to_string(),
        reason,
    };

    if entry.len() < KEY_INDEX_LEN {
        return Err(corrupt(format!(
            "entry too short: {} bytes, need at least {}",
            entry.len(),
            KEY_INDEX_LEN
        )));
    }

    let (header, blob) = entry.split_at(KEY_INDEX_LEN);
    let index = i32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let index =
        usize::try_from(index).map_err(|_| corrupt(format!("negative key field index {}", index)))?;

    let schema = codec.decode(blob).map_err(|e| corrupt(e.to_string()))?;
    SchemaDefinition::new(name, schema, index)
}
