//! Document-store binding (RedisJSON).
//!
//! The field is stored as a schema-less object under its path; the owning
//! collection schema is relaxed to non-strict so the object's keys are not
//! validated while every other field keeps its declared shape.

use std::collections::BTreeMap;

use log::debug;
use redis::{Cmd, RedisResult, aio::ConnectionManager, cmd};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::adapters::AdapterConfig;
use crate::field::OptionsField;
use crate::filters::QueryConditions;
use crate::types::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFieldKind {
    /// Schema-less object container.
    Open,
    String,
    Number,
    Boolean,
}

/// Declaration of one field in a document schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentField {
    pub path: String,
    pub kind: DocumentFieldKind,
    pub required: bool,
    pub unique: bool,
    pub index: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

impl DocumentField {
    pub fn new(path: impl Into<String>, kind: DocumentFieldKind) -> Self {
        Self {
            path: path.into(),
            kind,
            required: false,
            unique: false,
            index: false,
            default: None,
        }
    }
}

/// A collection schema owned by the host. Adapters only add to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSchema {
    pub name: String,
    fields: BTreeMap<String, DocumentField>,
    strict: bool,
}

impl DocumentSchema {
    /// New strict schema with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            strict: true,
        }
    }

    pub fn add(&mut self, field: DocumentField) {
        self.fields.insert(field.path.clone(), field);
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn field(&self, path: &str) -> Option<&DocumentField> {
        self.fields.get(path)
    }

    pub fn fields(&self) -> impl Iterator<Item = &DocumentField> {
        self.fields.values()
    }
}

#[derive(Debug, Clone)]
pub struct DocumentFieldAdapter {
    path: String,
    list_key: String,
    config: AdapterConfig,
}

impl DocumentFieldAdapter {
    pub fn new(field: &OptionsField, config: AdapterConfig) -> Self {
        Self {
            path: field.path().to_string(),
            list_key: field.list_key().to_string(),
            config,
        }
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    /// The open-object declaration with the field's storage options merged in.
    pub fn binding(&self) -> DocumentField {
        let mut field = DocumentField::new(self.path.clone(), DocumentFieldKind::Open);
        field.required = self.config.is_required;
        field.unique = self.config.is_unique;
        field.index = self.config.is_indexed;
        field.default = self
            .config
            .default_to
            .as_ref()
            .map(|flags| flags.clone().without_unset())
            .filter(|flags| !flags.is_empty())
            .map(|flags| flags.to_json());
        field
    }

    pub fn add_to_document_schema(&self, schema: &mut DocumentSchema) {
        schema.add(self.binding());
        schema.set_strict(false);
        debug!("bound {}.{} to document schema {}", self.list_key, self.path, schema.name);
    }

    /// JSONPath of the field inside its document.
    pub fn json_path(&self) -> String {
        format!("$.{}", self.path)
    }

    /// The `JSON.SET` applying a resolved write to the document at `key`.
    /// `None` when the write leaves the field untouched.
    pub fn write_command(&self, key: &str, outcome: &FieldValue) -> Option<Cmd> {
        let value = outcome.to_json()?;
        let mut command = cmd("JSON.SET");
        command.arg(key).arg(self.json_path()).arg(value.to_string());
        Some(command)
    }

    /// Runs [`Self::write_command`]. Returns `false` when nothing had to be written.
    pub async fn apply_write(
        &self,
        conn: &mut ConnectionManager,
        key: &str,
        outcome: &FieldValue,
    ) -> RedisResult<bool> {
        let Some(command) = self.write_command(key, outcome) else {
            return Ok(false);
        };
        command.query_async::<()>(conn).await?;
        Ok(true)
    }

    /// Reads this field out of a fetched document.
    pub fn stored_value<'a>(
        &self,
        document: &'a JsonMap<String, JsonValue>,
    ) -> Option<&'a JsonValue> {
        document.get(&self.path)
    }
}

impl QueryConditions for DocumentFieldAdapter {
    fn field_path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ListNames;
    use crate::types::FlagSet;
    use serde_json::json;

    fn adapter(config: AdapterConfig) -> DocumentFieldAdapter {
        let names = ListNames::new();
        let field = OptionsField::from_names("colors", "User", ["red", "green"], &names).unwrap();
        DocumentFieldAdapter::new(&field, config)
    }

    fn packed(command: &Cmd) -> String {
        String::from_utf8_lossy(&command.get_packed_command()).into_owned()
    }

    #[test]
    fn binding_relaxes_schema_and_declares_open_object() {
        let mut schema = DocumentSchema::new("users");
        schema.add(DocumentField::new("name", DocumentFieldKind::String));
        assert!(schema.is_strict());

        adapter(AdapterConfig::default()).add_to_document_schema(&mut schema);

        assert!(!schema.is_strict());
        let field = schema.field("colors").unwrap();
        assert_eq!(field.kind, DocumentFieldKind::Open);
        assert_eq!(schema.field("name").unwrap().kind, DocumentFieldKind::String);
    }

    #[test]
    fn binding_merges_storage_options() {
        let config = AdapterConfig {
            is_indexed: true,
            is_required: true,
            default_to: Some(FlagSet::from([("red", Some(true)), ("green", None)])),
            ..Default::default()
        };
        let field = adapter(config).binding();
        assert!(field.index);
        assert!(field.required);
        assert!(!field.unique);
        assert_eq!(field.default, Some(json!({ "red": true })));
    }

    #[test]
    fn absent_write_has_no_command() {
        let command =
            adapter(AdapterConfig::default()).write_command("snug:users:1", &FieldValue::Absent);
        assert!(command.is_none());
    }

    #[test]
    fn set_and_clear_writes_use_json_set() {
        let adapter = adapter(AdapterConfig::default());

        let set = adapter
            .write_command("snug:users:1", &FieldValue::Set(FlagSet::from([("red", true)])))
            .unwrap();
        let packed_set = packed(&set);
        assert!(packed_set.contains("JSON.SET"));
        assert!(packed_set.contains("snug:users:1"));
        assert!(packed_set.contains("$.colors"));
        assert!(packed_set.contains(r#"{"red":true}"#));

        let clear = adapter.write_command("snug:users:1", &FieldValue::Null).unwrap();
        assert!(packed(&clear).contains("null"));
    }
}
