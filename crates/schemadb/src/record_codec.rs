//! JSON <-> Avro record conversion
//!
//! Decoding is strict: the document must be a JSON object whose keys are all declared
//! fields of the record schema, and every value must fit its field type. Absent fields
//! take their schema default.
//!
//! Encoding follows the Avro JSON encoding:
//! - record fields in declaration order, map keys sorted
//! - non-null union values wrapped as `{"<branch>": value}`
//! - `bytes` and `fixed` as ISO-8859-1 strings
//!
//! Decoding accepts both wrapped and bare union values, so anything this module
//! encodes decodes back to the same record. The bare form is a relaxation over the
//! Avro JSON decoder, which only accepts the wrapped form; a bare value takes the first
//! branch that accepts it.

use crate::types::{FieldType, SchemaDefinition, StructuredRecord};
use apache_avro::schema::{Name, RecordSchema};
use apache_avro::types::Value;
use apache_avro::Schema;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashMap;
use thiserror::Error;

/// Errors converting between JSON documents and records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordCodecError {
    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Expected a JSON object at '{0}'")]
    NotAnObject(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid value at '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Unresolved schema reference '{0}'")]
    UnresolvedReference(String),

    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type RecordCodecResult<T> = Result<T, RecordCodecError>;

/// Converts JSON documents to records of a schema and back
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCodec;

impl RecordCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode a JSON document into a record of `definition`
    pub fn decode(
        &self,
        json: &str,
        definition: &SchemaDefinition,
    ) -> RecordCodecResult<StructuredRecord> {
        let document: JsonValue =
            serde_json::from_str(json).map_err(|e| RecordCodecError::Json(e.to_string()))?;
        let names = NamedTypes::collect(definition.schema());

        let object = document
            .as_object()
            .ok_or_else(|| RecordCodecError::NotAnObject(definition.name().to_string()))?;
        let fields = decode_record(definition.record_schema(), object, "", &names)?;
        Ok(StructuredRecord::new(fields))
    }

    /// Encode a record of `definition` as JSON text
    pub fn encode(
        &self,
        record: &StructuredRecord,
        definition: &SchemaDefinition,
    ) -> RecordCodecResult<String> {
        let names = NamedTypes::collect(definition.schema());
        let view = RecordView {
            record: definition.record_schema(),
            fields: record.fields(),
            names: &names,
        };
        serde_json::to_string(&view).map_err(|e| RecordCodecError::Encode(e.to_string()))
    }

    /// Render a single top-level field value as JSON text
    pub fn encode_field(
        &self,
        definition: &SchemaDefinition,
        field_index: usize,
        value: &Value,
    ) -> RecordCodecResult<String> {
        let field = definition
            .record_schema()
            .fields
            .get(field_index)
            .ok_or_else(|| RecordCodecError::Encode(format!("no field at {}", field_index)))?;
        let names = NamedTypes::collect(definition.schema());
        let view = ValueView {
            value,
            schema: &field.schema,
            names: &names,
        };
        serde_json::to_string(&view).map_err(|e| RecordCodecError::Encode(e.to_string()))
    }
}

// ============================================================================
// Named types
// ============================================================================

/// Named types (records, enums, fixed) reachable from a schema, for resolving references
struct NamedTypes<'a> {
    by_name: HashMap<&'a Name, &'a Schema>,
}

impl<'a> NamedTypes<'a> {
    fn collect(schema: &'a Schema) -> Self {
        let mut by_name = HashMap::new();
        Self::walk(schema, &mut by_name);
        Self { by_name }
    }

    fn walk(schema: &'a Schema, out: &mut HashMap<&'a Name, &'a Schema>) {
        match schema {
            Schema::Record(record) => {
                if out.insert(&record.name, schema).is_none() {
                    for field in &record.fields {
                        Self::walk(&field.schema, out);
                    }
                }
            }
            Schema::Enum(e) => {
                out.insert(&e.name, schema);
            }
            Schema::Fixed(f) => {
                out.insert(&f.name, schema);
            }
            Schema::Array(array) => Self::walk(&array.items, out),
            Schema::Map(map) => Self::walk(&map.types, out),
            Schema::Union(union) => {
                for variant in union.variants() {
                    Self::walk(variant, out);
                }
            }
            Schema::Decimal(decimal) => Self::walk(&decimal.inner, out),
            _ => {}
        }
    }

    fn resolve(&self, name: &Name) -> RecordCodecResult<&'a Schema> {
        self.by_name
            .get(name)
            .or_else(|| {
                self.by_name
                    .iter()
                    .find(|(candidate, _)| candidate.name == name.name)
                    .map(|(_, schema)| schema)
            })
            .copied()
            .ok_or_else(|| RecordCodecError::UnresolvedReference(name.fullname(None)))
    }
}

// ============================================================================
// JSON -> Avro
// ============================================================================

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn mismatch(path: &str, schema: &Schema, json: &JsonValue) -> RecordCodecError {
    RecordCodecError::TypeMismatch {
        path: path.to_string(),
        expected: FieldType::of(schema).to_string(),
        actual: json_kind(json).to_string(),
    }
}

fn decode_record(
    record: &RecordSchema,
    object: &JsonMap<String, JsonValue>,
    path: &str,
    names: &NamedTypes<'_>,
) -> RecordCodecResult<Vec<(String, Value)>> {
    if let Some(unknown) = object
        .keys()
        .find(|key| !record.fields.iter().any(|f| &f.name == *key))
    {
        return Err(RecordCodecError::UnknownField(join_path(path, unknown)));
    }

    let mut fields = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let field_path = join_path(path, &field.name);
        let value = match (object.get(&field.name), &field.default) {
            (Some(json), _) => json_to_avro(json, &field.schema, &field_path, names)?,
            (None, Some(default)) => json_to_avro(default, &field.schema, &field_path, names)?,
            (None, None) => return Err(RecordCodecError::MissingField(field_path)),
        };
        fields.push((field.name.clone(), value));
    }
    Ok(fields)
}

/// Decode an Avro JSON bytes string (one char per byte)
fn latin1_bytes(s: &str, path: &str) -> RecordCodecResult<Vec<u8>> {
    s.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| RecordCodecError::InvalidValue {
                path: path.to_string(),
                reason: format!("character {:?} is not a byte", c),
            })
        })
        .collect()
}

fn json_to_avro(
    json: &JsonValue,
    schema: &Schema,
    path: &str,
    names: &NamedTypes<'_>,
) -> RecordCodecResult<Value> {
    let invalid = |reason: String| RecordCodecError::InvalidValue {
        path: path.to_string(),
        reason,
    };

    match (schema, json) {
        (Schema::Ref { name }, _) => json_to_avro(json, names.resolve(name)?, path, names),

        (Schema::Null, JsonValue::Null) => Ok(Value::Null),

        (Schema::Boolean, JsonValue::Bool(b)) => Ok(Value::Boolean(*b)),

        (Schema::Int, JsonValue::Number(n)) => {
            let i = n.as_i64().ok_or_else(|| mismatch(path, schema, json))?;
            let v = i32::try_from(i).map_err(|_| invalid(format!("{} out of int range", i)))?;
            Ok(Value::Int(v))
        }

        (Schema::Long, JsonValue::Number(n)) => {
            if n.is_u64() && !n.is_i64() {
                return Err(invalid(format!("{} out of long range", n)));
            }
            let i = n.as_i64().ok_or_else(|| mismatch(path, schema, json))?;
            Ok(Value::Long(i))
        }

        (Schema::Float, JsonValue::Number(n)) => {
            let f = n.as_f64().ok_or_else(|| mismatch(path, schema, json))?;
            let narrowed = f as f32;
            if f.is_finite() && !narrowed.is_finite() {
                return Err(invalid(format!("{} out of float range", n)));
            }
            Ok(Value::Float(narrowed))
        }

        (Schema::Double, JsonValue::Number(n)) => {
            let f = n.as_f64().ok_or_else(|| mismatch(path, schema, json))?;
            Ok(Value::Double(f))
        }

        (Schema::String, JsonValue::String(s)) => Ok(Value::String(s.clone())),

        (Schema::Bytes, JsonValue::String(s)) => Ok(Value::Bytes(latin1_bytes(s, path)?)),

        (Schema::Array(array), JsonValue::Array(items)) => {
            let values = items
                .iter()
                .enumerate()
                .map(|(i, item)| json_to_avro(item, &array.items, &format!("{}[{}]", path, i), names))
                .collect::<RecordCodecResult<Vec<_>>>()?;
            Ok(Value::Array(values))
        }

        (Schema::Map(map), JsonValue::Object(object)) => {
            let mut values = HashMap::with_capacity(object.len());
            for (key, item) in object {
                let value = json_to_avro(item, &map.types, &join_path(path, key), names)?;
                values.insert(key.clone(), value);
            }
            Ok(Value::Map(values))
        }

        (Schema::Union(union), _) => {
            let variants = union.variants();

            // Avro JSON encoding: {"<branch>": value}
            if let JsonValue::Object(object) = json {
                if object.len() == 1 {
                    if let Some((branch, inner)) = object.iter().next() {
                        for (idx, variant) in variants.iter().enumerate() {
                            if branch_name(variant) == *branch {
                                if let Ok(v) = json_to_avro(inner, variant, path, names) {
                                    return Ok(Value::Union(idx as u32, Box::new(v)));
                                }
                            }
                        }
                    }
                }
            }

            // Bare value: first variant that accepts it
            for (idx, variant) in variants.iter().enumerate() {
                if let Ok(v) = json_to_avro(json, variant, path, names) {
                    return Ok(Value::Union(idx as u32, Box::new(v)));
                }
            }

            Err(mismatch(path, schema, json))
        }

        (Schema::Record(record), JsonValue::Object(object)) => {
            Ok(Value::Record(decode_record(record, object, path, names)?))
        }
        (Schema::Record(_), _) => Err(RecordCodecError::NotAnObject(path.to_string())),

        (Schema::Enum(e), JsonValue::String(s)) => match e.symbols.iter().position(|sym| sym == s)
        {
            Some(pos) => Ok(Value::Enum(pos as u32, s.clone())),
            None => Err(invalid(format!("'{}' is not a symbol of enum {}", s, e.name.name))),
        },

        (Schema::Fixed(fixed), JsonValue::String(s)) => {
            let bytes = latin1_bytes(s, path)?;
            if bytes.len() != fixed.size {
                return Err(invalid(format!(
                    "fixed size mismatch: expected {}, got {}",
                    fixed.size,
                    bytes.len()
                )));
            }
            Ok(Value::Fixed(fixed.size, bytes))
        }

        (Schema::Date, JsonValue::Number(_)) => match json_to_avro(json, &Schema::Int, path, names)? {
            Value::Int(days) => Ok(Value::Date(days)),
            _ => Err(mismatch(path, schema, json)),
        },

        (Schema::TimeMillis, JsonValue::Number(_)) => {
            match json_to_avro(json, &Schema::Int, path, names)? {
                Value::Int(ms) => Ok(Value::TimeMillis(ms)),
                _ => Err(mismatch(path, schema, json)),
            }
        }

        (Schema::TimeMicros, JsonValue::Number(n)) => n
            .as_i64()
            .map(Value::TimeMicros)
            .ok_or_else(|| mismatch(path, schema, json)),

        (Schema::TimestampMillis, JsonValue::Number(n)) => n
            .as_i64()
            .map(Value::TimestampMillis)
            .ok_or_else(|| mismatch(path, schema, json)),

        (Schema::TimestampMicros, JsonValue::Number(n)) => n
            .as_i64()
            .map(Value::TimestampMicros)
            .ok_or_else(|| mismatch(path, schema, json)),

        (Schema::Uuid, JsonValue::String(s)) => Value::String(s.clone())
            .resolve(schema)
            .map_err(|e| invalid(e.to_string())),

        (Schema::Decimal(decimal), JsonValue::String(_)) => {
            json_to_avro(json, &decimal.inner, path, names)?
                .resolve(schema)
                .map_err(|e| invalid(e.to_string()))
        }

        // Remaining engine-native kinds: resolve from the underlying representation.
        (other, JsonValue::Number(n)) if FieldType::of(other) == FieldType::Other("logical") => {
            let raw = n.as_i64().ok_or_else(|| mismatch(path, schema, json))?;
            Value::Long(raw)
                .resolve(other)
                .map_err(|e| invalid(e.to_string()))
        }

        _ => Err(mismatch(path, schema, json)),
    }
}

// ============================================================================
// Avro -> JSON
// ============================================================================

/// Union branch name used by the Avro JSON encoding
fn branch_name(schema: &Schema) -> String {
    match schema {
        Schema::Record(r) => r.name.fullname(None),
        Schema::Enum(e) => e.name.fullname(None),
        Schema::Fixed(f) => f.name.fullname(None),
        Schema::Ref { name } => name.fullname(None),
        Schema::Date | Schema::TimeMillis => "int".to_string(),
        Schema::TimeMicros | Schema::TimestampMillis | Schema::TimestampMicros => {
            "long".to_string()
        }
        Schema::Uuid => "string".to_string(),
        Schema::Decimal(decimal) => branch_name(&decimal.inner),
        other => FieldType::of(other).to_string(),
    }
}

fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Serializes a record in schema field order
struct RecordView<'a> {
    record: &'a RecordSchema,
    fields: &'a [(String, Value)],
    names: &'a NamedTypes<'a>,
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.fields.len()))?;
        for field in &self.record.fields {
            let value = self
                .fields
                .iter()
                .find(|(name, _)| *name == field.name)
                .map(|(_, value)| value)
                .ok_or_else(|| S::Error::custom(format!("missing field '{}'", field.name)))?;
            map.serialize_entry(
                &field.name,
                &ValueView {
                    value,
                    schema: &field.schema,
                    names: self.names,
                },
            )?;
        }
        if let Some((extra, _)) = self
            .fields
            .iter()
            .find(|(name, _)| !self.record.fields.iter().any(|f| f.name == *name))
        {
            return Err(S::Error::custom(format!("undeclared field '{}'", extra)));
        }
        map.end()
    }
}

/// Serializes one value against its schema
struct ValueView<'a> {
    value: &'a Value,
    schema: &'a Schema,
    names: &'a NamedTypes<'a>,
}

impl<'a> ValueView<'a> {
    fn child(&self, value: &'a Value, schema: &'a Schema) -> ValueView<'a> {
        ValueView {
            value,
            schema,
            names: self.names,
        }
    }
}

impl Serialize for ValueView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Schema::Ref { name } = self.schema {
            let resolved = self.names.resolve(name).map_err(S::Error::custom)?;
            return self.child(self.value, resolved).serialize(serializer);
        }

        match (self.schema, self.value) {
            (Schema::Union(union), Value::Union(idx, inner)) => {
                let variant = union
                    .variants()
                    .get(*idx as usize)
                    .ok_or_else(|| S::Error::custom(format!("union branch {} out of range", idx)))?;
                if matches!(**inner, Value::Null) {
                    return serializer.serialize_unit();
                }
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(&branch_name(variant), &self.child(inner, variant))?;
                map.end()
            }

            (Schema::Record(record), Value::Record(fields)) => RecordView {
                record,
                fields,
                names: self.names,
            }
            .serialize(serializer),

            (Schema::Array(array), Value::Array(items)) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item, &array.items))?;
                }
                seq.end()
            }

            (Schema::Map(map_schema), Value::Map(entries)) => {
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                let mut map = serializer.serialize_map(Some(keys.len()))?;
                for key in keys {
                    map.serialize_entry(key, &self.child(&entries[key], &map_schema.types))?;
                }
                map.end()
            }

            (_, Value::Null) => serializer.serialize_unit(),
            (_, Value::Boolean(b)) => serializer.serialize_bool(*b),
            (_, Value::Int(i)) => serializer.serialize_i32(*i),
            (_, Value::Long(l)) => serializer.serialize_i64(*l),
            (_, Value::Float(f)) => serializer.serialize_f32(*f),
            (_, Value::Double(d)) => serializer.serialize_f64(*d),
            (_, Value::String(s)) => serializer.serialize_str(s),
            (_, Value::Bytes(b)) | (_, Value::Fixed(_, b)) => {
                serializer.serialize_str(&latin1_string(b))
            }
            (_, Value::Enum(_, symbol)) => serializer.serialize_str(symbol),
            (_, Value::Date(days)) | (_, Value::TimeMillis(days)) => serializer.serialize_i32(*days),
            (_, Value::TimeMicros(v))
            | (_, Value::TimestampMillis(v))
            | (_, Value::TimestampMicros(v))
            | (_, Value::LocalTimestampMillis(v))
            | (_, Value::LocalTimestampMicros(v)) => serializer.serialize_i64(*v),
            (_, Value::Uuid(uuid)) => serializer.serialize_str(&uuid.to_string()),
            (_, Value::Decimal(decimal)) => {
                let bytes = Vec::<u8>::try_from(decimal).map_err(S::Error::custom)?;
                serializer.serialize_str(&latin1_string(&bytes))
            }

            (schema, value) => Err(S::Error::custom(format!(
                "{:?} does not match {} schema",
                value,
                FieldType::of(schema)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(schema: &str, key_index: usize) -> SchemaDefinition {
        SchemaDefinition::new("test", Schema::parse_str(schema).unwrap(), key_index).unwrap()
    }

    fn users() -> SchemaDefinition {
        definition(
            r#"{"type": "record", "name": "User", "fields": [
                {"name": "id", "type": "long"},
                {"name": "name", "type": "string"}
            ]}"#,
            0,
        )
    }

    fn rich() -> SchemaDefinition {
        definition(
            r#"{"type": "record", "name": "Profile", "namespace": "app", "fields": [
                {"name": "id", "type": "string"},
                {"name": "age", "type": "int"},
                {"name": "score", "type": "double"},
                {"name": "active", "type": "boolean", "default": true},
                {"name": "tags", "type": {"type": "array", "items": "string"}, "default": []},
                {"name": "attrs", "type": {"type": "map", "values": "long"}, "default": {}},
                {"name": "email", "type": ["null", "string"], "default": null},
                {"name": "status", "type": {"type": "enum", "name": "Status", "symbols": ["ACTIVE", "BANNED"]}},
                {"name": "address", "type": ["null", {"type": "record", "name": "Address", "fields": [
                    {"name": "city", "type": "string"},
                    {"name": "zip", "type": "string"}
                ]}], "default": null},
                {"name": "previous", "type": ["null", "Address"], "default": null},
                {"name": "raw", "type": "bytes", "default": ""}
            ]}"#,
            0,
        )
    }

    #[test]
    fn test_decode_encode_users() {
        let codec = RecordCodec::new();
        let record = codec.decode(r#"{"name": "Ann", "id": 1}"#, &users()).unwrap();

        assert_eq!(record.get("id"), Some(&Value::Long(1)));
        assert_eq!(record.get("name"), Some(&Value::String("Ann".into())));
        // Declaration order, not document order
        assert_eq!(
            codec.encode(&record, &users()).unwrap(),
            r#"{"id":1,"name":"Ann"}"#
        );
    }

    #[test]
    fn test_defaults_applied() {
        let codec = RecordCodec::new();
        let record = codec
            .decode(r#"{"id": "u1", "age": 30, "score": 1.5, "status": "ACTIVE"}"#, &rich())
            .unwrap();

        assert_eq!(record.get("active"), Some(&Value::Boolean(true)));
        assert_eq!(record.get("tags"), Some(&Value::Array(vec![])));
        assert_eq!(
            record.get("email"),
            Some(&Value::Union(0, Box::new(Value::Null)))
        );
        assert_eq!(record.get("raw"), Some(&Value::Bytes(vec![])));
    }

    #[test]
    fn test_rich_round_trip() {
        let codec = RecordCodec::new();
        let def = rich();
        let json = r#"{
            "id": "u1", "age": 30, "score": 2.25, "active": false,
            "tags": ["a", "b"], "attrs": {"z": 1, "a": 2},
            "email": {"string": "ann@example.com"},
            "status": "BANNED",
            "address": {"app.Address": {"city": "Oslo", "zip": "0150"}},
            "previous": {"city": "Bergen", "zip": "5003"},
            "raw": "\u0000ÿ"
        }"#;

        let record = codec.decode(json, &def).unwrap();
        let encoded = codec.encode(&record, &def).unwrap();
        assert_eq!(
            encoded,
            concat!(
                r#"{"id":"u1","age":30,"score":2.25,"active":false,"tags":["a","b"],"#,
                r#""attrs":{"a":2,"z":1},"email":{"string":"ann@example.com"},"status":"BANNED","#,
                r#""address":{"app.Address":{"city":"Oslo","zip":"0150"}},"#,
                r#""previous":{"app.Address":{"city":"Bergen","zip":"5003"}},"#,
                r#""raw":"\u0000ÿ"}"#
            )
        );
        assert_eq!(codec.decode(&encoded, &def).unwrap(), record);
        assert_eq!(record.get("raw"), Some(&Value::Bytes(vec![0, 255])));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let codec = RecordCodec::new();
        let def = rich();
        let record = codec
            .decode(
                r#"{"id": "u1", "age": 1, "score": 0, "status": "ACTIVE", "attrs": {"b": 1, "c": 2, "a": 3}}"#,
                &def,
            )
            .unwrap();
        let first = codec.encode(&record, &def).unwrap();
        for _ in 0..5 {
            assert_eq!(codec.encode(&record, &def).unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RecordCodec::new()
            .decode(r#"{"id": 1, "name": "Ann", "age": 3}"#, &users())
            .unwrap_err();
        assert_eq!(err, RecordCodecError::UnknownField("age".into()));
    }

    #[test]
    fn test_nested_unknown_field_rejected() {
        let err = RecordCodec::new()
            .decode(
                r#"{"id": "u1", "age": 1, "score": 0, "status": "ACTIVE",
                    "address": {"city": "Oslo", "zip": "1", "country": "NO"}}"#,
                &rich(),
            )
            .unwrap_err();
        // Bare record rejected, no other union branch accepts an object
        assert!(matches!(err, RecordCodecError::TypeMismatch { path, .. } if path == "address"));
    }

    #[test]
    fn test_type_mismatch() {
        let err = RecordCodec::new()
            .decode(r#"{"id": "1", "name": "Ann"}"#, &users())
            .unwrap_err();
        assert_eq!(
            err,
            RecordCodecError::TypeMismatch {
                path: "id".into(),
                expected: "long".into(),
                actual: "string".into()
            }
        );
    }

    #[test]
    fn test_fractional_for_long_rejected() {
        let err = RecordCodec::new()
            .decode(r#"{"id": 1.5, "name": "Ann"}"#, &users())
            .unwrap_err();
        assert!(matches!(err, RecordCodecError::TypeMismatch { .. }));
    }

    #[test]
    fn test_int_range_checked() {
        let err = RecordCodec::new()
            .decode(
                r#"{"id": "u1", "age": 3000000000, "score": 0, "status": "ACTIVE"}"#,
                &rich(),
            )
            .unwrap_err();
        assert!(matches!(err, RecordCodecError::InvalidValue { path, .. } if path == "age"));
    }

    #[test]
    fn test_float_range_checked() {
        let def = definition(
            r#"{"type": "record", "name": "M", "fields": [
                {"name": "id", "type": "long"},
                {"name": "f", "type": "float"}
            ]}"#,
            0,
        );
        let codec = RecordCodec::new();

        let err = codec.decode(r#"{"id": 1, "f": 1e39}"#, &def).unwrap_err();
        assert!(matches!(err, RecordCodecError::InvalidValue { path, .. } if path == "f"));

        let record = codec.decode(r#"{"id": 1, "f": 1.5}"#, &def).unwrap();
        let json = codec.encode(&record, &def).unwrap();
        assert_eq!(json, r#"{"id":1,"f":1.5}"#);
        assert_eq!(codec.decode(&json, &def).unwrap(), record);
    }

    #[test]
    fn test_bare_union_value_takes_first_accepting_branch() {
        let def = definition(
            r#"{"type": "record", "name": "U", "fields": [
                {"name": "id", "type": "long"},
                {"name": "email", "type": ["null", "string"]}
            ]}"#,
            0,
        );
        let codec = RecordCodec::new();

        let bare = codec
            .decode(r#"{"id": 1, "email": "ann@example.com"}"#, &def)
            .unwrap();
        let wrapped = codec
            .decode(r#"{"id": 1, "email": {"string": "ann@example.com"}}"#, &def)
            .unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(
            bare.get("email"),
            Some(&Value::Union(1, Box::new(Value::String("ann@example.com".into()))))
        );
        assert_eq!(
            codec.encode(&bare, &def).unwrap(),
            r#"{"id":1,"email":{"string":"ann@example.com"}}"#
        );
    }

    #[test]
    fn test_missing_required_field() {
        let err = RecordCodec::new()
            .decode(r#"{"name": "Ann"}"#, &users())
            .unwrap_err();
        assert_eq!(err, RecordCodecError::MissingField("id".into()));
    }

    #[test]
    fn test_invalid_enum_symbol() {
        let err = RecordCodec::new()
            .decode(r#"{"id": "u1", "age": 1, "score": 0, "status": "GONE"}"#, &rich())
            .unwrap_err();
        assert!(matches!(err, RecordCodecError::InvalidValue { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RecordCodec::new().decode(r#"{"id": 1,"#, &users()),
            Err(RecordCodecError::Json(_))
        ));
        assert!(matches!(
            RecordCodec::new().decode("[1, 2]", &users()),
            Err(RecordCodecError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_logical_types() {
        let def = definition(
            r#"{"type": "record", "name": "Event", "fields": [
                {"name": "id", "type": {"type": "string", "logicalType": "uuid"}},
                {"name": "day", "type": {"type": "int", "logicalType": "date"}},
                {"name": "at", "type": {"type": "long", "logicalType": "timestamp-millis"}}
            ]}"#,
            0,
        );
        let codec = RecordCodec::new();
        let json = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","day":19000,"at":1700000000000}"#;

        let record = codec.decode(json, &def).unwrap();
        assert_eq!(record.get("day"), Some(&Value::Date(19000)));
        assert_eq!(
            record.get("at"),
            Some(&Value::TimestampMillis(1_700_000_000_000))
        );
        assert_eq!(codec.encode(&record, &def).unwrap(), json);
    }

    #[test]
    fn test_encode_field() {
        let codec = RecordCodec::new();
        let def = rich();
        let record = codec
            .decode(r#"{"id": "u1", "age": 1, "score": 0, "status": "ACTIVE"}"#, &def)
            .unwrap();
        assert_eq!(
            codec
                .encode_field(&def, 7, record.get("status").unwrap())
                .unwrap(),
            r#""ACTIVE""#
        );
    }

    #[test]
    fn test_encode_rejects_foreign_record() {
        let codec = RecordCodec::new();
        let record = codec.decode(r#"{"id": 1, "name": "Ann"}"#, &users()).unwrap();
        let other = definition(
            r#"{"type": "record", "name": "Order", "fields": [{"name": "orderId", "type": "long"}]}"#,
            0,
        );
        assert!(matches!(
            codec.encode(&record, &other),
            Err(RecordCodecError::Encode(_))
        ));
    }
}
