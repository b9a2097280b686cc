//! In-memory record storage and key coercion
//!
//! Records of every schema share one map keyed by [`KeyValue`] alone, so two schemas
//! holding the same key value address the same slot. Writes are unconditional
//! last-write-wins overwrites; readers see either the previous or the new record.

use crate::error::{DbError, DbResult};
use crate::record_codec::RecordCodec;
use crate::types::{FieldType, KeyValue, SchemaDefinition, StructuredRecord};
use apache_avro::types::Value;
use dashmap::DashMap;
use std::sync::Arc;

/// Process-wide map from coerced key to record
#[derive(Debug, Default)]
pub struct RecordStore {
    records: DashMap<KeyValue, Arc<StructuredRecord>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record stored under `key`
    pub fn put(&self, key: KeyValue, record: StructuredRecord) -> Option<Arc<StructuredRecord>> {
        self.records.insert(key, Arc::new(record))
    }

    /// Get the record stored under `key`
    pub fn get(&self, key: &KeyValue) -> Option<Arc<StructuredRecord>> {
        self.records.get(key).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Derive the lookup key of a decoded record.
///
/// `int` and `long` key fields keep their numeric value; any other kind is keyed by its
/// string rendering (`float` and `double` in their JSON form). A missing or null key
/// value is rejected.
pub fn record_key(
    record: &StructuredRecord,
    definition: &SchemaDefinition,
    codec: &RecordCodec,
) -> DbResult<KeyValue> {
    let key_field = definition.key_field();
    let missing = || DbError::MissingKeyField {
        schema: definition.name().to_string(),
        field: key_field.name.clone(),
    };

    let value = record.get(&key_field.name).ok_or_else(missing)?;
    match value {
        Value::Null => Err(missing()),
        Value::Union(_, inner) if matches!(**inner, Value::Null) => Err(missing()),
        Value::Int(i) if key_field.field_type.is_integer() => Ok(KeyValue::Long(i64::from(*i))),
        Value::Long(l) if key_field.field_type.is_integer() => Ok(KeyValue::Long(*l)),
        other => match key_text(other) {
            Some(text) => Ok(KeyValue::String(text)),
            // Composite values are keyed by their JSON rendering.
            None => codec
                .encode_field(definition, definition.key_field_index(), other)
                .map(KeyValue::String)
                .map_err(|e| DbError::RecordEncode {
                    schema: definition.name().to_string(),
                    reason: e.to_string(),
                }),
        },
    }
}

/// String rendering of a scalar key value; `None` for null and composite values
fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Boolean(b) => Some(b.to_string()),
        Value::Int(i) | Value::Date(i) | Value::TimeMillis(i) => Some(i.to_string()),
        Value::Long(l)
        | Value::TimeMicros(l)
        | Value::TimestampMillis(l)
        | Value::TimestampMicros(l) => Some(l.to_string()),
        // Same text the record encoder writes, so `1.0` stays `1.0`.
        Value::Float(f) => serde_json::to_string(f).ok(),
        Value::Double(d) => serde_json::to_string(d).ok(),
        Value::String(s) | Value::Enum(_, s) => Some(s.clone()),
        Value::Bytes(b) | Value::Fixed(_, b) => Some(String::from_utf8_lossy(b).into_owned()),
        Value::Uuid(u) => Some(u.to_string()),
        Value::Union(_, inner) => key_text(inner),
        _ => None,
    }
}

/// Coerce fetch-time key text to the key field's type
pub fn parse_key(key: &str, definition: &SchemaDefinition) -> DbResult<KeyValue> {
    let invalid = |expected: &'static str| DbError::InvalidKeyFormat {
        key: key.to_string(),
        expected,
    };

    match definition.key_field().field_type {
        FieldType::Long => key
            .parse::<i64>()
            .map(KeyValue::Long)
            .map_err(|_| invalid("long")),
        FieldType::Int => key
            .parse::<i32>()
            .map(|i| KeyValue::Long(i64::from(i)))
            .map_err(|_| invalid("int")),
        _ => Ok(KeyValue::String(key.to_string())),
    }
}
