//! Storage adapters for Options fields.
//!
//! One adapter per backend, picked when the schema is assembled. Both consume
//! the same [`OptionsField`] and answer filter requests through
//! [`QueryConditions`].

pub mod document;
pub mod relational;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationResult;
use crate::field::OptionsField;
use crate::filters::QueryConditions;
use crate::types::FlagSet;

pub use document::{DocumentField, DocumentFieldAdapter, DocumentFieldKind, DocumentSchema};
pub use relational::{ColumnDef, ColumnType, RelationalFieldAdapter, TableSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Document,
    Relational,
}

impl StorageBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Document => "document",
            StorageBackend::Relational => "relational",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage-level settings of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub is_unique: bool,
    pub is_indexed: bool,
    pub is_required: bool,
    /// Relational only: emit `NOT NULL` on the column.
    pub is_not_nullable: bool,
    /// Storage-level default for the raw stored value.
    pub default_to: Option<FlagSet>,
}

/// How one field is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageBinding {
    Document(DocumentField),
    Relational(ColumnDef),
}

impl StorageBinding {
    pub fn backend(&self) -> StorageBackend {
        match self {
            StorageBinding::Document(_) => StorageBackend::Document,
            StorageBinding::Relational(_) => StorageBackend::Relational,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldAdapter {
    Document(DocumentFieldAdapter),
    Relational(RelationalFieldAdapter),
}

impl FieldAdapter {
    /// Builds the adapter for `backend`, failing on configurations the backend cannot honour.
    pub fn new(
        backend: StorageBackend,
        field: &OptionsField,
        config: AdapterConfig,
    ) -> ConfigurationResult<Self> {
        match backend {
            StorageBackend::Document => {
                Ok(FieldAdapter::Document(DocumentFieldAdapter::new(field, config)))
            }
            StorageBackend::Relational => {
                Ok(FieldAdapter::Relational(RelationalFieldAdapter::new(field, config)?))
            }
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            FieldAdapter::Document(_) => StorageBackend::Document,
            FieldAdapter::Relational(_) => StorageBackend::Relational,
        }
    }

    pub fn binding(&self) -> StorageBinding {
        match self {
            FieldAdapter::Document(adapter) => StorageBinding::Document(adapter.binding()),
            FieldAdapter::Relational(adapter) => StorageBinding::Relational(adapter.binding()),
        }
    }
}

impl QueryConditions for FieldAdapter {
    fn field_path(&self) -> &str {
        match self {
            FieldAdapter::Document(adapter) => adapter.field_path(),
            FieldAdapter::Relational(adapter) => adapter.field_path(),
        }
    }
}
