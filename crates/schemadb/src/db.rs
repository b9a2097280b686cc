//! Record store - main interface
//!
//! Ties the schema store, schema cache and record store together:
//!
//! - `create_schema`: validate -> encode -> persist (-> optionally invalidate cache)
//! - `upsert_record`: cached schema -> decode JSON -> coerce key -> overwrite
//! - `get_record`: cached schema -> coerce key text -> lookup -> encode JSON

use crate::cache::SchemaCache;
use crate::config::DbConfig;
use crate::error::{DbError, DbResult, ValidationError};
use crate::record_codec::{RecordCodec, RecordCodecError};
use crate::record_store::{parse_key, record_key, RecordStore};
use crate::schema_codec::SchemaCodec;
use crate::storage::{create_storage, validate_schema_name, Storage};
use crate::types::{CreateSchemaRequest, SchemaDefinition};
use apache_avro::Schema;
use std::sync::Arc;
use tracing::{debug, info};

/// Schema-governed record store
///
/// Thread-safe; share it behind an `Arc` between request handlers.
pub struct SchemaDb {
    /// Durable schema storage
    storage: Storage,
    /// Schema definitions by name, loaded on demand
    cache: SchemaCache,
    /// Records of all schemas
    records: RecordStore,
    codec: RecordCodec,
    refresh_on_create: bool,
}

impl SchemaDb {
    /// Create a record store with the given configuration
    pub fn new(config: DbConfig) -> DbResult<Self> {
        config.validate()?;
        let codec = SchemaCodec::with_level(config.compression_level);
        let storage = create_storage(&config.storage, codec);
        Ok(Self::with_storage(storage, config.cache.refresh_on_create))
    }

    /// Create a record store over an existing schema storage backend
    pub fn with_storage(storage: Storage, refresh_on_create: bool) -> Self {
        Self {
            cache: SchemaCache::new(storage.clone()),
            storage,
            records: RecordStore::new(),
            codec: RecordCodec::new(),
            refresh_on_create,
        }
    }

    // ========================================================================
    // Schemas
    // ========================================================================

    /// Create (or silently replace) schema `schema_name`
    ///
    /// Existing records are not migrated. Unless `cache.refresh_on_create` is set, a
    /// definition already cached keeps being served until restart.
    pub fn create_schema(
        &self,
        schema_name: &str,
        schema: Option<&Schema>,
        key_column: &str,
    ) -> DbResult<SchemaDefinition> {
        if schema_name.is_empty() {
            return Err(ValidationError::EmptySchemaName.into());
        }
        let schema = schema.ok_or(ValidationError::MissingSchema)?;
        if key_column.is_empty() {
            return Err(ValidationError::EmptyKeyColumn.into());
        }
        validate_schema_name(schema_name)?;

        let definition = self.storage.save(schema_name, key_column, schema)?;
        info!(
            schema = %schema_name,
            key_field = %key_column,
            fields = definition.fields().len(),
            "Created schema"
        );

        if self.refresh_on_create && self.cache.invalidate(schema_name) {
            debug!(schema = %schema_name, "Invalidated cached schema");
        }

        Ok(definition)
    }

    /// Create a schema from a request body
    pub fn create_schema_from_request(
        &self,
        schema_name: &str,
        request: &CreateSchemaRequest,
    ) -> DbResult<SchemaDefinition> {
        if schema_name.is_empty() {
            return Err(ValidationError::EmptySchemaName.into());
        }
        let schema = request.parse_schema()?;
        self.create_schema(
            schema_name,
            schema.as_ref(),
            request.key_column.as_deref().unwrap_or_default(),
        )
    }

    /// Get the definition of a schema
    pub fn describe_schema(&self, schema_name: &str) -> DbResult<Arc<SchemaDefinition>> {
        self.cache.get(schema_name)
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Insert or replace a record of `schema_name` from its JSON form
    pub fn upsert_record(&self, schema_name: &str, json: &str) -> DbResult<()> {
        let definition = self.cache.get(schema_name)?;
        let key_field = &definition.key_field().name;

        let record = self
            .codec
            .decode(json, &definition)
            .map_err(|e| match e {
                RecordCodecError::MissingField(field) if field == *key_field => {
                    DbError::MissingKeyField {
                        schema: schema_name.to_string(),
                        field,
                    }
                }
                e => DbError::RecordDecode {
                    schema: schema_name.to_string(),
                    reason: e.to_string(),
                },
            })?;

        let key = record_key(&record, &definition, &self.codec)?;
        let replaced = self.records.put(key.clone(), record).is_some();
        debug!(schema = %schema_name, key = %key, replaced, "Upserted record");
        Ok(())
    }

    /// Fetch a record of `schema_name` as JSON; `Ok(None)` if no record has that key
    pub fn get_record(&self, schema_name: &str, key: &str) -> DbResult<Option<String>> {
        let definition = self.cache.get(schema_name)?;
        let key = parse_key(key, &definition)?;

        let Some(record) = self.records.get(&key) else {
            debug!(schema = %schema_name, key = %key, "Record not found");
            return Ok(None);
        };

        self.codec
            .encode(&record, &definition)
            .map(Some)
            .map_err(|e| DbError::RecordEncode {
                schema: schema_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Number of records held, across all schemas
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of cached schema definitions
    pub fn cached_schema_count(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for SchemaDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaDb")
            .field("cache", &self.cache)
            .field("records", &self.records.len())
            .field("refresh_on_create", &self.refresh_on_create)
            .finish()
    }
}
