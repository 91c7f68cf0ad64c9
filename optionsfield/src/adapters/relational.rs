//! Relational-table binding.
//!
//! The whole flag set lives in one JSONB column. Uniqueness and indexes on
//! that blob are not supported and are rejected when the adapter is built,
//! before any table definition is produced.

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::adapters::{AdapterConfig, StorageBackend};
use crate::errors::{ConfigurationError, ConfigurationResult, IndexConstraint};
use crate::field::OptionsField;
use crate::filters::{QueryConditions, jsonb_literal, quote_identifier};
use crate::types::{FieldValue, FlagSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Jsonb,
    Text,
    Integer,
    Boolean,
    Uuid,
}

impl ColumnType {
    pub const fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Jsonb => "JSONB",
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Uuid => "UUID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            primary_key: false,
            default: None,
        }
    }

    pub fn not_nullable(&mut self) -> &mut Self {
        self.nullable = false;
        self
    }

    pub fn primary(&mut self) -> &mut Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn default_to(&mut self, value: JsonValue) -> &mut Self {
        self.default = Some(value);
        self
    }

    /// Column clause of a `CREATE TABLE` statement.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_identifier(&self.name), self.column_type.sql_name());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.default_literal(default));
        }
        sql
    }

    fn default_literal(&self, value: &JsonValue) -> String {
        match (self.column_type, value) {
            (_, JsonValue::Null) => "NULL".to_string(),
            (ColumnType::Jsonb, value) => jsonb_literal(value),
            (_, JsonValue::String(text)) => format!("'{}'", text.replace('\'', "''")),
            (_, other) => other.to_string(),
        }
    }
}

/// A table definition owned by the host. Adapters only add columns to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub name: String,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column, replacing any earlier column with the same name.
    pub fn column(&mut self, name: impl Into<String>, column_type: ColumnType) -> &mut ColumnDef {
        let name = name.into();
        self.columns.retain(|column| column.name != name);
        self.columns.push(ColumnDef::new(name, column_type));
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    pub fn jsonb(&mut self, name: impl Into<String>) -> &mut ColumnDef {
        self.column(name, ColumnType::Jsonb)
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_named(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn to_create_sql(&self) -> String {
        let columns: Vec<String> =
            self.columns.iter().map(|column| format!("  {}", column.to_sql())).collect();
        format!(
            "CREATE TABLE {} (\n{}\n);",
            quote_identifier(&self.name),
            columns.join(",\n")
        )
    }
}

#[derive(Debug, Clone)]
pub struct RelationalFieldAdapter {
    path: String,
    list_key: String,
    is_not_nullable: bool,
    default_to: Option<FlagSet>,
}

impl RelationalFieldAdapter {
    /// Fails when the field asks for a unique constraint or an index.
    pub fn new(field: &OptionsField, config: AdapterConfig) -> ConfigurationResult<Self> {
        let constraint = if config.is_unique {
            Some(IndexConstraint::Unique)
        } else if config.is_indexed {
            Some(IndexConstraint::Index)
        } else {
            None
        };
        if let Some(constraint) = constraint {
            return Err(ConfigurationError::UnsupportedIndex {
                list_key: field.list_key().to_string(),
                path: field.path().to_string(),
                backend: StorageBackend::Relational,
                constraint,
            });
        }

        let default_to = config
            .default_to
            .map(FlagSet::without_unset)
            .filter(|flags| !flags.is_empty());

        Ok(Self {
            path: field.path().to_string(),
            list_key: field.list_key().to_string(),
            is_not_nullable: config.is_not_nullable,
            default_to,
        })
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    pub fn binding(&self) -> ColumnDef {
        let mut column = ColumnDef::new(self.path.clone(), ColumnType::Jsonb);
        if self.is_not_nullable {
            column.not_nullable();
        }
        if let Some(default) = &self.default_to {
            column.default_to(default.to_json());
        }
        column
    }

    pub fn add_to_table_schema(&self, table: &mut TableSchema) {
        let binding = self.binding();
        let column = table.jsonb(self.path.clone());
        *column = binding;
        debug!("bound {}.{} to table {}", self.list_key, self.path, table.name);
    }

    /// Blob text of a stored flag set.
    pub fn encode(flags: &FlagSet) -> String {
        flags.to_json().to_string()
    }

    /// Parses blob text back into a flag set; unreadable text counts as nothing stored.
    pub fn decode(text: &str) -> Option<FlagSet> {
        match serde_json::from_str::<JsonValue>(text) {
            Ok(value) => FlagSet::from_stored(Some(&value)),
            Err(err) => {
                warn!("ignoring unreadable options column value: {err}");
                None
            }
        }
    }

    /// SQL assignment applying a resolved write, `None` when the column stays untouched.
    pub fn update_assignment(&self, outcome: &FieldValue) -> Option<String> {
        let column = quote_identifier(&self.path);
        match outcome {
            FieldValue::Absent => None,
            FieldValue::Null => Some(format!("{column} = NULL")),
            FieldValue::Set(flags) => {
                Some(format!("{column} = {}", jsonb_literal(&flags.to_json())))
            }
        }
    }
}

impl QueryConditions for RelationalFieldAdapter {
    fn field_path(&self) -> &str {
        &self.path
    }
}
