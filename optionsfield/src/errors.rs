use thiserror::Error;

use crate::adapters::StorageBackend;

/// Raised while assembling a schema when a field or adapter is set up in a way
/// that can never work. Fatal to schema assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The `options` list of an Options field is malformed.
    #[error("the Options field {list_key}.{path} is not configured with valid options: {problem}")]
    InvalidOptions {
        list_key: String,
        path: String,
        problem: OptionsProblem,
    },

    /// The field path cannot be used as a schema field name.
    #[error(
        "the Options field {list_key}.{path} has an invalid path; \
         paths must be valid GraphQL names"
    )]
    InvalidPath { list_key: String, path: String },

    /// The list's item name cannot prefix a GraphQL type name.
    #[error(
        "the Options field {list_key}.{path} would derive its types from the item name \
         `{item_name}`, which is not a valid GraphQL name"
    )]
    InvalidItemName {
        list_key: String,
        path: String,
        item_name: String,
    },

    /// Two fields of one list share a path.
    #[error("the {list_key} list declares more than one field at {path}")]
    DuplicatePath { list_key: String, path: String },

    /// The path is taken by a column the backend defines itself.
    #[error(
        "the Options field {list_key}.{path} collides with the {backend} adapter's \
         own `{path}` column"
    )]
    ReservedPath {
        list_key: String,
        path: String,
        backend: StorageBackend,
    },

    /// A uniqueness or index constraint was requested on a backend that cannot honour it.
    #[error(
        "the Options field type doesn't support {constraint} on the {backend} adapter; \
         check the config for {path} on the {list_key} list"
    )]
    UnsupportedIndex {
        list_key: String,
        path: String,
        backend: StorageBackend,
        constraint: IndexConstraint,
    },
}

impl ConfigurationError {
    /// Key of the list owning the misconfigured field.
    pub fn list_key(&self) -> &str {
        match self {
            Self::InvalidOptions { list_key, .. }
            | Self::InvalidPath { list_key, .. }
            | Self::InvalidItemName { list_key, .. }
            | Self::DuplicatePath { list_key, .. }
            | Self::ReservedPath { list_key, .. }
            | Self::UnsupportedIndex { list_key, .. } => list_key,
        }
    }

    /// Path of the misconfigured field.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidOptions { path, .. }
            | Self::InvalidPath { path, .. }
            | Self::InvalidItemName { path, .. }
            | Self::DuplicatePath { path, .. }
            | Self::ReservedPath { path, .. }
            | Self::UnsupportedIndex { path, .. } => path,
        }
    }
}

/// Why an option list was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsProblem {
    #[error("options must be an array of names")]
    NotAnArray,

    #[error("options must declare at least one name")]
    Empty,

    #[error("option at index {index} is not a string")]
    NonString { index: usize },

    #[error("option `{name}` is declared more than once")]
    Duplicate { name: String },

    #[error("option `{name}` is not a valid GraphQL name")]
    InvalidName { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexConstraint {
    Unique,
    Index,
}

impl std::fmt::Display for IndexConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unique => f.write_str("unique constraints"),
            Self::Index => f.write_str("indexes"),
        }
    }
}

/// Errors produced while loading a schema file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse schema file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_index_names_field_and_list() {
        let err = ConfigurationError::UnsupportedIndex {
            list_key: "User".to_string(),
            path: "colors".to_string(),
            backend: StorageBackend::Relational,
            constraint: IndexConstraint::Index,
        };
        let message = err.to_string();
        assert!(message.contains("colors"));
        assert!(message.contains("User"));
        assert!(message.contains("indexes"));
        assert_eq!(err.list_key(), "User");
        assert_eq!(err.path(), "colors");
    }

    #[test]
    fn invalid_options_includes_problem() {
        let err = ConfigurationError::InvalidOptions {
            list_key: "Post".to_string(),
            path: "flags".to_string(),
            problem: OptionsProblem::NotAnArray,
        };
        assert_eq!(
            err.to_string(),
            "the Options field Post.flags is not configured with valid options: \
             options must be an array of names"
        );
    }

    #[test]
    fn duplicate_path_names_list_and_path() {
        let err = ConfigurationError::DuplicatePath {
            list_key: "users".to_string(),
            path: "colors".to_string(),
        };
        assert_eq!(err.to_string(), "the users list declares more than one field at colors");
        assert_eq!(err.list_key(), "users");
        assert_eq!(err.path(), "colors");
    }
}
