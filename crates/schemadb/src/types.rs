//! Schema and record types
//!
//! - [`FieldType`], [`SchemaField`] - field introspection over an Avro record schema
//! - [`SchemaDefinition`] - a named record schema with its designated key field
//! - [`StructuredRecord`] - a decoded record, one value per declared field
//! - [`KeyValue`] - the coerced lookup key of a record
//! - [`CreateSchemaRequest`] - the create-schema request body

use crate::error::{DbError, DbResult, ValidationError};
use apache_avro::schema::RecordSchema;
use apache_avro::types::Value;
use apache_avro::Schema;
use serde::{Deserialize, Serialize};

/// Kind of a top-level schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Null,
    Boolean,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    Float,
    Double,
    Bytes,
    String,
    Array,
    Map,
    Record,
    Enum,
    Fixed,
    Union,
    /// Logical and other engine-native kinds, passed through untouched
    Other(&'static str),
}

impl FieldType {
    /// Classify an Avro schema node
    pub fn of(schema: &Schema) -> Self {
        match schema {
            Schema::Null => FieldType::Null,
            Schema::Boolean => FieldType::Boolean,
            Schema::Int => FieldType::Int,
            Schema::Long => FieldType::Long,
            Schema::Float => FieldType::Float,
            Schema::Double => FieldType::Double,
            Schema::Bytes => FieldType::Bytes,
            Schema::String => FieldType::String,
            Schema::Array(_) => FieldType::Array,
            Schema::Map(_) => FieldType::Map,
            Schema::Record(_) => FieldType::Record,
            Schema::Enum(_) => FieldType::Enum,
            Schema::Fixed(_) => FieldType::Fixed,
            Schema::Union(_) => FieldType::Union,
            Schema::Date => FieldType::Other("date"),
            Schema::Uuid => FieldType::Other("uuid"),
            Schema::Decimal(_) => FieldType::Other("decimal"),
            Schema::TimeMillis => FieldType::Other("time-millis"),
            Schema::TimeMicros => FieldType::Other("time-micros"),
            Schema::TimestampMillis => FieldType::Other("timestamp-millis"),
            Schema::TimestampMicros => FieldType::Other("timestamp-micros"),
            Schema::Ref { .. } => FieldType::Other("ref"),
            _ => FieldType::Other("logical"),
        }
    }

    /// Whether keys of this kind are stored as numbers
    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Long)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Bytes => "bytes",
            FieldType::String => "string",
            FieldType::Array => "array",
            FieldType::Map => "map",
            FieldType::Record => "record",
            FieldType::Enum => "enum",
            FieldType::Fixed => "fixed",
            FieldType::Union => "union",
            FieldType::Other(name) => name,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A top-level field of a record schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
}

/// Find the position of `key_column` among the top-level fields of a record schema.
///
/// Exact, case-sensitive match. Non-record schemas have no fields and never match.
pub fn key_field_position(schema: &Schema, key_column: &str) -> Option<usize> {
    match schema {
        Schema::Record(record) => record.fields.iter().position(|f| f.name == key_column),
        _ => None,
    }
}

/// A named record schema with its designated key field
///
/// Invariant: the schema is an Avro record and `key_field_index < fields().len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    name: String,
    schema: Schema,
    fields: Vec<SchemaField>,
    key_field_index: usize,
}

impl SchemaDefinition {
    /// Compose a definition, checking the record/key-index invariant.
    ///
    /// Violations are reported as [`DbError::CorruptSchema`]: a definition is only ever
    /// assembled from persisted state.
    pub fn new(name: impl Into<String>, schema: Schema, key_field_index: usize) -> DbResult<Self> {
        let name = name.into();
        let fields: Vec<SchemaField> = match &schema {
            Schema::Record(record) => record
                .fields
                .iter()
                .map(|f| SchemaField {
                    name: f.name.clone(),
                    field_type: FieldType::of(&f.schema),
                })
                .collect(),
            other => {
                return Err(DbError::CorruptSchema {
                    name,
                    reason: format!("expected a record schema, got {}", FieldType::of(other)),
                })
            }
        };

        if key_field_index >= fields.len() {
            return Err(DbError::CorruptSchema {
                name,
                reason: format!(
                    "key field index {} out of range for {} fields",
                    key_field_index,
                    fields.len()
                ),
            });
        }

        Ok(Self {
            name,
            schema,
            fields,
            key_field_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying Avro schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The Avro record node of the schema
    pub fn record_schema(&self) -> &RecordSchema {
        match &self.schema {
            Schema::Record(record) => record,
            _ => unreachable!("SchemaDefinition always wraps a record schema"),
        }
    }

    /// Top-level fields in declaration order
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn key_field_index(&self) -> usize {
        self.key_field_index
    }

    /// The designated key field
    pub fn key_field(&self) -> &SchemaField {
        &self.fields[self.key_field_index]
    }
}

impl std::fmt::Display for SchemaDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if i == self.key_field_index {
                write!(f, "*")?;
            }
            write!(f, "{}: {}", field.name, field.field_type)?;
        }
        write!(f, ")")
    }
}

/// Coerced lookup key of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// Key fields declared `int` or `long`
    Long(i64),
    /// Any other key field kind, by its string rendering
    String(String),
}

impl std::fmt::Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyValue::Long(v) => write!(f, "{}", v),
            KeyValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        KeyValue::Long(v)
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::String(s.to_string())
    }
}

/// A decoded record: one Avro value per declared field, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord {
    fields: Vec<(String, Value)>,
}

impl StructuredRecord {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    /// Value of a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Convert into an Avro record value
    pub fn into_value(self) -> Value {
        Value::Record(self.fields)
    }
}

/// Create-schema request body
///
/// ```json
/// {"avroSchema": {"type": "record", "name": "User", "fields": [...]}, "keyColumn": "id"}
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaRequest {
    /// Avro schema as a JSON tree
    #[serde(default)]
    pub avro_schema: Option<serde_json::Value>,

    /// Name of the key column
    #[serde(default)]
    pub key_column: Option<String>,
}

impl CreateSchemaRequest {
    pub fn new(avro_schema: serde_json::Value, key_column: impl Into<String>) -> Self {
        Self {
            avro_schema: Some(avro_schema),
            key_column: Some(key_column.into()),
        }
    }

    /// Parse a request body
    pub fn from_json(body: &str) -> DbResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Parse the embedded Avro schema, if any
    pub fn parse_schema(&self) -> DbResult<Option<Schema>> {
        match &self.avro_schema {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Schema::parse(value)
                .map(Some)
                .map_err(|e| ValidationError::InvalidSchema(e.to_string()).into()),
        }
    }
}
