//! Record store errors

use thiserror::Error;

/// Stable error codes for presentation layers
pub mod error_codes {
    // Lookup misses
    pub const SCHEMA_NOT_FOUND: u32 = 40401;

    // Invalid client input
    pub const VALIDATION_ERROR: u32 = 42201;
    pub const KEY_FIELD_NOT_FOUND: u32 = 42202;
    pub const RECORD_DECODE_ERROR: u32 = 42203;
    pub const MISSING_KEY_FIELD: u32 = 42204;
    pub const INVALID_KEY_FORMAT: u32 = 42205;

    // Internal errors
    pub const INTERNAL_ERROR: u32 = 50001;
    pub const STORAGE_ERROR: u32 = 50002;
    pub const CORRUPT_SCHEMA: u32 = 50003;
}

/// Rejected create-schema input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Schema name cannot be null or empty")]
    EmptySchemaName,

    #[error("Avro schema cannot be null or empty")]
    MissingSchema,

    #[error("Key column cannot be null or empty")]
    EmptyKeyColumn,

    #[error("Invalid schema name '{0}': must not contain path separators")]
    InvalidSchemaName(String),

    #[error("Invalid Avro schema: {0}")]
    InvalidSchema(String),
}

/// Record store error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Key column '{key_column}' not found in schema '{schema}'")]
    KeyFieldNotFound { schema: String, key_column: String },

    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Corrupt schema '{name}': {reason}")]
    CorruptSchema { name: String, reason: String },

    #[error("Record does not conform to schema '{schema}': {reason}")]
    RecordDecode { schema: String, reason: String },

    #[error("Record for schema '{schema}' has no value for key field '{field}'")]
    MissingKeyField { schema: String, field: String },

    #[error("Invalid key '{key}' for {expected} key field")]
    InvalidKeyFormat { key: String, expected: &'static str },

    #[error("Record cannot be rendered with schema '{schema}': {reason}")]
    RecordEncode { schema: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Get the stable error code
    pub fn error_code(&self) -> u32 {
        match self {
            DbError::Validation(_) => error_codes::VALIDATION_ERROR,
            DbError::KeyFieldNotFound { .. } => error_codes::KEY_FIELD_NOT_FOUND,
            DbError::SchemaNotFound(_) => error_codes::SCHEMA_NOT_FOUND,
            DbError::CorruptSchema { .. } => error_codes::CORRUPT_SCHEMA,
            DbError::RecordDecode { .. } => error_codes::RECORD_DECODE_ERROR,
            DbError::MissingKeyField { .. } => error_codes::MISSING_KEY_FIELD,
            DbError::InvalidKeyFormat { .. } => error_codes::INVALID_KEY_FORMAT,
            DbError::RecordEncode { .. } => error_codes::INTERNAL_ERROR,
            DbError::Serialization(_) => error_codes::INTERNAL_ERROR,
            DbError::Config(_) => error_codes::INTERNAL_ERROR,
            DbError::Io(_) => error_codes::STORAGE_ERROR,
        }
    }

    /// Whether the caller sent bad input (as opposed to a server-side fault)
    pub fn is_client_error(&self) -> bool {
        self.error_code() < error_codes::INTERNAL_ERROR
    }
}

/// Result type for record store operations
pub type DbResult<T> = Result<T, DbError>;

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Serialization(e.to_string())
    }
}
