//! # SchemaDB
//!
//! A minimal schema-governed record store.
//!
//! Clients register named Avro record schemas, each with one designated key field,
//! then upsert and fetch JSON records that must conform to them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          SchemaDb                            │
//! │  ├── create_schema(name, schema, key_column)                │
//! │  ├── upsert_record(name, json)                              │
//! │  ├── get_record(name, key)                                  │
//! │  └── describe_schema(name)                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Schema Layer                                                │
//! │  ├── SchemaCache (lazy, one load per name)                  │
//! │  └── SchemaCodec (gzip'd canonical schema JSON)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Record Layer                                                │
//! │  ├── RecordCodec (JSON <-> Avro values)                     │
//! │  └── RecordStore (in-memory, last write wins)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Schema Storage                                              │
//! │  ├── File   (<dir>/<name>.avsc.bin, durable)                │
//! │  └── Memory (development/testing)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Schemas survive restarts; records do not.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemadb::{DbConfig, SchemaDb};
//! use apache_avro::Schema;
//!
//! let db = SchemaDb::new(DbConfig::file("./schemas"))?;
//!
//! let schema = Schema::parse_str(r#"{"type": "record", "name": "User", "fields": [
//!     {"name": "id", "type": "long"},
//!     {"name": "name", "type": "string"}
//! ]}"#)?;
//! db.create_schema("users", Some(&schema), "id")?;
//!
//! db.upsert_record("users", r#"{"id": 1, "name": "Ann"}"#)?;
//! assert_eq!(
//!     db.get_record("users", "1")?.as_deref(),
//!     Some(r#"{"id":1,"name":"Ann"}"#)
//! );
//! ```
//!
//! ## Keys
//!
//! Keys of `int` and `long` key fields are numeric; every other key type is compared by
//! its string rendering. Records of all schemas share one key space, so equal keys in
//! two schemas address the same record.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod record_codec;
pub mod record_store;
pub mod schema_codec;
pub mod storage;
pub mod types;

// Re-exports for convenience
pub use cache::SchemaCache;
pub use config::{CacheConfig, DbConfig, StorageConfig};
pub use db::SchemaDb;
pub use error::{error_codes, DbError, DbResult, ValidationError};
pub use record_codec::{RecordCodec, RecordCodecError};
pub use record_store::RecordStore;
pub use schema_codec::{SchemaCodec, SchemaCodecError};
pub use storage::{FileSchemaStore, MemorySchemaStore, SchemaStore, Storage};
pub use types::{
    CreateSchemaRequest, FieldType, KeyValue, SchemaDefinition, SchemaField, StructuredRecord,
};
