//! Schema files.
//!
//! A schema file lists the lists of an application and their Options fields:
//!
//! ```toml
//! [[lists]]
//! key = "users"
//! item_name = "User"
//! backend = "relational"
//!
//! [[lists.fields]]
//! path = "colors"
//! options = ["red", "green", "blue"]
//! default = { red = true }
//! is_not_nullable = false
//! ```
//!
//! [`SchemaConfig::assemble`] turns it into fields and adapters, failing on the
//! first configuration error.

use std::collections::HashSet;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::adapters::{
    AdapterConfig, ColumnType, DocumentSchema, FieldAdapter, StorageBackend, StorageBinding,
    TableSchema,
};
use crate::errors::{ConfigurationError, ConfigurationResult, SchemaError};
use crate::field::OptionsField;
use crate::registry::ListNames;
use crate::types::FlagSet;

/// Primary-key column every assembled table starts with.
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub lists: Vec<ListConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub key: String,
    /// Canonical item-type name; the key when omitted.
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub backend: StorageBackend,
    /// Collection or table name; the key when omitted.
    #[serde(default)]
    pub storage_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl ListConfig {
    pub fn storage_name(&self) -> &str {
        self.storage_name.as_deref().unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub path: String,
    /// Kept raw so a non-array value is reported as a configuration error.
    #[serde(default)]
    pub options: JsonValue,
    #[serde(default)]
    pub default: Option<FlagSet>,
    #[serde(flatten)]
    pub adapter: AdapterConfig,
}

impl SchemaConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Item names of every list, as seen by the fields.
    pub fn list_names(&self) -> ListNames {
        let mut names = ListNames::new();
        for list in &self.lists {
            if let Some(item_name) = &list.item_name {
                names.insert(list.key.clone(), item_name.clone());
            }
        }
        names
    }

    pub fn assemble(&self) -> ConfigurationResult<Vec<AssembledList>> {
        let names = self.list_names();
        self.lists.iter().map(|list| AssembledList::build(list, &names)).collect()
    }

    /// Loads and assembles in one step.
    pub fn load_and_assemble(path: impl AsRef<Path>) -> Result<Vec<AssembledList>, SchemaError> {
        Ok(Self::load(path)?.assemble()?)
    }
}

#[derive(Debug, Clone)]
pub struct AssembledField {
    pub field: OptionsField,
    pub adapter: FieldAdapter,
}

impl AssembledField {
    pub fn binding(&self) -> StorageBinding {
        self.adapter.binding()
    }
}

#[derive(Debug, Clone)]
pub struct AssembledList {
    pub key: String,
    pub storage_name: String,
    pub backend: StorageBackend,
    pub fields: Vec<AssembledField>,
}

impl AssembledList {
    fn build(list: &ListConfig, names: &ListNames) -> ConfigurationResult<Self> {
        let mut fields = Vec::with_capacity(list.fields.len());
        let mut seen = HashSet::new();
        for config in &list.fields {
            if !seen.insert(config.path.as_str()) {
                return Err(ConfigurationError::DuplicatePath {
                    list_key: list.key.clone(),
                    path: config.path.clone(),
                });
            }
            if list.backend == StorageBackend::Relational && config.path == ID_COLUMN {
                return Err(ConfigurationError::ReservedPath {
                    list_key: list.key.clone(),
                    path: config.path.clone(),
                    backend: list.backend,
                });
            }
            let mut field =
                OptionsField::new(config.path.clone(), list.key.clone(), &config.options, names)?;
            if let Some(default) = &config.default {
                field = field.with_default_value(default.clone());
            }
            let adapter = FieldAdapter::new(list.backend, &field, config.adapter.clone())?;
            fields.push(AssembledField { field, adapter });
        }
        debug!("assembled list {} with {} Options fields", list.key, fields.len());
        Ok(Self {
            key: list.key.clone(),
            storage_name: list.storage_name().to_string(),
            backend: list.backend,
            fields,
        })
    }

    pub fn field(&self, path: &str) -> Option<&AssembledField> {
        self.fields.iter().find(|assembled| assembled.field.path() == path)
    }

    /// Document schema with every document-bound field added.
    pub fn document_schema(&self) -> DocumentSchema {
        let mut schema = DocumentSchema::new(self.storage_name.clone());
        for assembled in &self.fields {
            if let FieldAdapter::Document(adapter) = &assembled.adapter {
                adapter.add_to_document_schema(&mut schema);
            }
        }
        schema
    }

    /// Table with an `id` primary key and every table-bound field added.
    pub fn table_schema(&self) -> TableSchema {
        let mut table = TableSchema::new(self.storage_name.clone());
        table.column(ID_COLUMN, ColumnType::Uuid).primary();
        for assembled in &self.fields {
            if let FieldAdapter::Relational(adapter) = &assembled.adapter {
                adapter.add_to_table_schema(&mut table);
            }
        }
        table
    }

    /// Auxiliary SDL types of every field, in declaration order. Field
    /// declarations belong to the host's item type and are not included.
    pub fn sdl(&self) -> String {
        let mut out = String::new();
        for assembled in &self.fields {
            for ty in assembled.field.gql_aux_types() {
                out.push_str(&ty);
                out.push_str("\n\n");
            }
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OptionsProblem;

    const SCHEMA: &str = r#"
[[lists]]
key = "users"
item_name = "User"
backend = "relational"

[[lists.fields]]
path = "colors"
options = ["red", "green", "blue"]
default = { red = true }
is_not_nullable = true

[[lists.fields]]
path = "roles"
options = ["admin", "editor"]

[[lists]]
key = "Post"
storage_name = "posts"

[[lists.fields]]
path = "flags"
options = ["pinned", "hidden"]
is_indexed = true
"#;

    #[test]
    fn parses_lists_and_fields() {
        let config = SchemaConfig::from_toml_str(SCHEMA).unwrap();
        assert_eq!(config.lists.len(), 2);
        assert_eq!(config.lists[0].backend, StorageBackend::Relational);
        assert_eq!(config.lists[1].backend, StorageBackend::Document);
        assert_eq!(config.lists[1].storage_name(), "posts");

        let colors = &config.lists[0].fields[0];
        assert!(colors.adapter.is_not_nullable);
        assert_eq!(colors.default, Some(FlagSet::from([("red", true)])));
        assert!(config.lists[1].fields[0].adapter.is_indexed);
    }

    #[test]
    fn assembles_fields_with_item_names() {
        let lists = SchemaConfig::from_toml_str(SCHEMA).unwrap().assemble().unwrap();
        let users = &lists[0];
        let colors = users.field("colors").unwrap();
        assert_eq!(colors.field.output_type_name(), "OptionsUser_colors");
        assert!(matches!(colors.binding(), StorageBinding::Relational(_)));

        let table = users.table_schema();
        assert_eq!(table.columns().len(), 3);
        assert!(!table.column_named("colors").unwrap().nullable);

        let posts = lists[1].document_schema();
        assert!(!posts.is_strict());
        assert!(posts.field("flags").unwrap().index);
    }

    #[test]
    fn sdl_lists_all_aux_types() {
        let lists = SchemaConfig::from_toml_str(SCHEMA).unwrap().assemble().unwrap();
        let sdl = lists[0].sdl();
        assert!(sdl.starts_with("type OptionsUser_colors {"));
        assert!(sdl.contains("input OptionsUserInput_roles {"));
        assert!(!sdl.contains("colors: OptionsUser_colors"));
        assert_eq!(sdl.matches("type OptionsUser_").count(), 2);
    }

    #[test]
    fn missing_options_fail_assembly() {
        let config = SchemaConfig::from_toml_str(
            r#"
[[lists]]
key = "users"

[[lists.fields]]
path = "colors"
"#,
        )
        .unwrap();
        let err = config.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidOptions {
                problem: OptionsProblem::NotAnArray,
                ..
            }
        ));
    }

    #[test]
    fn repeated_path_fails_assembly() {
        let config = SchemaConfig::from_toml_str(
            r#"
[[lists]]
key = "users"
item_name = "User"
backend = "relational"

[[lists.fields]]
path = "colors"
options = ["red"]

[[lists.fields]]
path = "colors"
options = ["blue"]
is_not_nullable = true
"#,
        )
        .unwrap();
        let err = config.assemble().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicatePath {
                list_key: "users".to_string(),
                path: "colors".to_string(),
            }
        );
    }

    #[test]
    fn same_path_on_different_lists_is_fine() {
        let config = SchemaConfig::from_toml_str(
            r#"
[[lists]]
key = "users"

[[lists.fields]]
path = "colors"
options = ["red"]

[[lists]]
key = "posts"

[[lists.fields]]
path = "colors"
options = ["blue"]
"#,
        )
        .unwrap();
        assert_eq!(config.assemble().unwrap().len(), 2);
    }

    #[test]
    fn relational_field_cannot_take_the_primary_key() {
        let config = SchemaConfig::from_toml_str(
            r#"
[[lists]]
key = "users"
backend = "relational"

[[lists.fields]]
path = "id"
options = ["red"]
"#,
        )
        .unwrap();
        let err = config.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ReservedPath {
                backend: StorageBackend::Relational,
                ..
            }
        ));
        assert_eq!(err.path(), "id");
    }

    #[test]
    fn document_field_may_use_id_path() {
        let config = SchemaConfig::from_toml_str(
            r#"
[[lists]]
key = "users"

[[lists.fields]]
path = "id"
options = ["red"]
"#,
        )
        .unwrap();
        let lists = config.assemble().unwrap();
        assert!(lists[0].document_schema().field("id").is_some());
    }

    #[test]
    fn assembled_table_keeps_its_primary_key() {
        let lists = SchemaConfig::from_toml_str(SCHEMA).unwrap().assemble().unwrap();
        let sql = lists[0].table_schema().to_create_sql();
        assert!(sql.contains("\"id\" UUID PRIMARY KEY"));
        assert_eq!(sql.matches("\"colors\"").count(), 1);
    }

    #[test]
    fn indexed_relational_field_fails_assembly() {
        let config = SchemaConfig::from_toml_str(
            r#"
[[lists]]
key = "users"
backend = "relational"

[[lists.fields]]
path = "colors"
options = ["red"]
is_unique = true
"#,
        )
        .unwrap();
        let err = config.assemble().unwrap_err();
        assert!(matches!(err, ConfigurationError::UnsupportedIndex { .. }));
        assert_eq!(err.list_key(), "users");
    }
}
