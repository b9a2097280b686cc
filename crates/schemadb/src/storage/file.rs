//! File-per-schema storage backend

use super::{decode_entry, encode_entry, validate_schema_name, SchemaStore, SCHEMA_FILE_EXTENSION};
use crate::error::{DbError, DbResult};
use crate::schema_codec::SchemaCodec;
use crate::types::SchemaDefinition;
use apache_avro::Schema;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stores each schema as `<root>/<name>.avsc.bin`
#[derive(Debug, Clone)]
pub struct FileSchemaStore {
    root: PathBuf,
    codec: SchemaCodec,
}

impl FileSchemaStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_codec(root, SchemaCodec::default())
    }

    pub fn with_codec(root: impl Into<PathBuf>, codec: SchemaCodec) -> Self {
        Self {
            root: root.into(),
            codec,
        }
    }

    /// Storage directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding schema `name`
    pub fn schema_path(&self, name: &str) -> DbResult<PathBuf> {
        validate_schema_name(name)?;
        Ok(self.root.join(format!("{}{}", name, SCHEMA_FILE_EXTENSION)))
    }
}

impl SchemaStore for FileSchemaStore {
    fn save(&self, name: &str, key_column: &str, schema: &Schema) -> DbResult<SchemaDefinition> {
        let path = self.schema_path(name)?;
        let (definition, entry) = encode_entry(&self.codec, name, key_column, schema)?;

        fs::create_dir_all(&self.root)?;
        let mut file = fs::File::create(&path)?;
        file.write_all(&entry)?;
        file.flush()?;

        info!(
            schema = %name,
            key_field = %key_column,
            key_index = definition.key_field_index(),
            path = %path.display(),
            bytes = entry.len(),
            "Saved schema"
        );

        Ok(definition)
    }

    fn load(&self, name: &str) -> DbResult<SchemaDefinition> {
        let path = self.schema_path(name)?;
        let entry = match fs::read(&path) {
            Ok(entry) => entry,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DbError::SchemaNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        debug!(schema = %name, path = %path.display(), bytes = entry.len(), "Loaded schema file");
        decode_entry(&self.codec, name, &entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user_schema() -> Schema {
        Schema::parse_str(
            r#"{"type": "record", "name": "User", "fields": [
                {"name": "id", "type": "long"},
                {"name": "name", "type": "string"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_save_creates_directory_and_file() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("schemas");
        let store = FileSchemaStore::new(&root);

        store.save("users", "id", &user_schema()).unwrap();

        let path = root.join("users.avsc.bin");
        assert!(path.is_file());
        let bytes = fs::read(path).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        assert!(!root.join("orders.avsc.bin").exists());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileSchemaStore::new(dir.path());

        let saved = store.save("users", "name", &user_schema()).unwrap();
        let loaded = store.load("users").unwrap();

        assert_eq!(saved, loaded);
        assert_eq!(loaded.key_field_index(), 1);
        assert_eq!(loaded.name(), "users");
    }

    #[test]
    fn test_load_survives_new_store_instance() {
        let dir = tempdir().unwrap();
        FileSchemaStore::new(dir.path())
            .save("users", "id", &user_schema())
            .unwrap();

        let reopened = FileSchemaStore::new(dir.path());
        assert_eq!(reopened.load("users").unwrap().key_field().name, "id");
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileSchemaStore::new(dir.path());
        store.save("users", "id", &user_schema()).unwrap();

        let replacement = Schema::parse_str(
            r#"{"type": "record", "name": "User", "fields": [{"name": "email", "type": "string"}]}"#,
        )
        .unwrap();
        store.save("users", "email", &replacement).unwrap();

        let loaded = store.load("users").unwrap();
        assert_eq!(loaded.fields().len(), 1);
        assert_eq!(loaded.key_field().name, "email");
    }

    #[test]
    fn test_key_field_not_found_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = FileSchemaStore::new(dir.path());

        let err = store.save("users", "missing", &user_schema()).unwrap_err();
        assert!(matches!(err, DbError::KeyFieldNotFound { .. }));
        assert!(!store.schema_path("users").unwrap().exists());
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        let store = FileSchemaStore::new(dir.path());
        assert!(matches!(
            store.load("nonexistent"),
            Err(DbError::SchemaNotFound(name)) if name == "nonexistent"
        ));
    }

    #[test]
    fn test_load_truncated_file() {
        let dir = tempdir().unwrap();
        let store = FileSchemaStore::new(dir.path());
        fs::write(dir.path().join("users.avsc.bin"), [0u8, 0]).unwrap();

        assert!(matches!(
            store.load("users"),
            Err(DbError::CorruptSchema { .. })
        ));
    }

    #[test]
    fn test_load_garbage_payload() {
        let dir = tempdir().unwrap();
        let store = FileSchemaStore::new(dir.path());
        fs::write(dir.path().join("users.avsc.bin"), b"\0\0\0\0garbage").unwrap();

        assert!(matches!(
            store.load("users"),
            Err(DbError::CorruptSchema { .. })
        ));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempdir().unwrap();
        let store = FileSchemaStore::new(dir.path());
        assert!(matches!(
            store.save("../escape", "id", &user_schema()),
            Err(DbError::Validation(_))
        ));
    }
}
