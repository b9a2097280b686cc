//! Compact binary form of Avro schemas
//!
//! A schema is rendered to its JSON text (defaults and docs included) and gzip-compressed.
//! The blob is opaque to callers; [`SchemaCodec::decode`] reverses both steps.

use apache_avro::Schema;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use thiserror::Error;

/// Errors produced while encoding or decoding a schema blob
#[derive(Debug, Error)]
pub enum SchemaCodecError {
    #[error("Schema serialization failed: {0}")]
    Serialize(String),

    #[error("Compression error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Schema parse error: {0}")]
    Parse(String),
}

pub type SchemaCodecResult<T> = Result<T, SchemaCodecError>;

/// Gzip-over-JSON schema codec
#[derive(Debug, Clone, Copy)]
pub struct SchemaCodec {
    level: Compression,
}

impl Default for SchemaCodec {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl SchemaCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific gzip level (0-9)
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    /// Render the schema to JSON text and compress it
    pub fn encode(&self, schema: &Schema) -> SchemaCodecResult<Vec<u8>> {
        let json =
            serde_json::to_string(schema).map_err(|e| SchemaCodecError::Serialize(e.to_string()))?;

        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder.write_all(json.as_bytes())?;
        Ok(encoder.finish()?)
    }

    /// Decompress and parse a blob produced by [`SchemaCodec::encode`]
    pub fn decode(&self, bytes: &[u8]) -> SchemaCodecResult<Schema> {
        let mut json = String::new();
        GzDecoder::new(bytes).read_to_string(&mut json)?;

        Schema::parse_str(&json).map_err(|e| SchemaCodecError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_SCHEMA: &str = r#"{
        "type": "record",
        "name": "Order",
        "namespace": "shop",
        "doc": "A customer order",
        "fields": [
            {"name": "orderId", "type": "string"},
            {"name": "quantity", "type": "int", "default": 1},
            {"name": "tags", "type": {"type": "array", "items": "string"}},
            {"name": "status", "type": {"type": "enum", "name": "Status", "symbols": ["OPEN", "SHIPPED"]}},
            {"name": "note", "type": ["null", "string"], "default": null}
        ]
    }"#;

    #[test]
    fn test_schema_round_trip() {
        let codec = SchemaCodec::new();
        let schema = Schema::parse_str(ORDER_SCHEMA).unwrap();

        let bytes = codec.encode(&schema).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(decoded, schema);
        match (&decoded, &schema) {
            (Schema::Record(a), Schema::Record(b)) => {
                let names_a: Vec<_> = a.fields.iter().map(|f| &f.name).collect();
                let names_b: Vec<_> = b.fields.iter().map(|f| &f.name).collect();
                assert_eq!(names_a, names_b);
                assert_eq!(a.fields[1].default, Some(serde_json::json!(1)));
            }
            _ => panic!("Expected record schemas"),
        }
    }

    #[test]
    fn test_encoded_form_is_gzip() {
        let bytes = SchemaCodec::new()
            .encode(&Schema::parse_str(ORDER_SCHEMA).unwrap())
            .unwrap();
        // gzip magic
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_compression_level_does_not_change_content() {
        let schema = Schema::parse_str(ORDER_SCHEMA).unwrap();
        let fast = SchemaCodec::with_level(1).encode(&schema).unwrap();
        let best = SchemaCodec::with_level(9).encode(&schema).unwrap();
        let codec = SchemaCodec::new();
        assert_eq!(codec.decode(&fast).unwrap(), codec.decode(&best).unwrap());
    }

    #[test]
    fn test_decode_garbage() {
        let err = SchemaCodec::new().decode(b"not gzip at all").unwrap_err();
        assert!(matches!(err, SchemaCodecError::Compression(_)));
    }

    #[test]
    fn test_decode_truncated() {
        let codec = SchemaCodec::new();
        let bytes = codec.encode(&Schema::parse_str(ORDER_SCHEMA).unwrap()).unwrap();
        assert!(codec.decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_decode_valid_gzip_invalid_schema() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"type": "mystery"}"#).unwrap();
        let bytes = encoder.finish().unwrap();

        let err = SchemaCodec::new().decode(&bytes).unwrap_err();
        assert!(matches!(err, SchemaCodecError::Parse(_)));
    }
}
