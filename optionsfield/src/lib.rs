//! Options field type.
//!
//! A field type for schema-driven APIs that stores a set of named flags, each
//! `true`, `false` or unset. The crate covers the three concerns every such
//! field must keep consistent:
//!
//! - schema shape: [`OptionsField`] derives GraphQL output/input types and
//!   field declarations;
//! - value semantics: [`codec`] normalizes, defaults, merges partial updates
//!   and projects stored values for reads;
//! - storage: [`adapters`] bind the field to a document store or a relational
//!   table, sharing the [`filters::QueryConditions`] capability.
//!
//! ```
//! use optionsfield::{FieldValue, FlagSet, OptionsField, registry::ListNames};
//!
//! let names = ListNames::new().with("users", "User");
//! let field =
//!     OptionsField::from_names("colors", "users", ["red", "green", "blue"], &names).unwrap();
//! assert_eq!(field.output_type_name(), "OptionsUser_colors");
//!
//! let incoming = FieldValue::Set(FlagSet::from([("red", true)]));
//! assert_eq!(
//!     field.resolve_input(&incoming, None),
//!     FieldValue::Set(FlagSet::from([("red", true)]))
//! );
//! ```

pub mod adapters;
pub mod codec;
pub mod config;
pub mod defaults;
pub mod errors;
pub mod field;
pub mod filters;
pub mod registry;
pub mod types;

pub use adapters::{AdapterConfig, FieldAdapter, StorageBackend, StorageBinding};
pub use config::{AssembledField, AssembledList, SchemaConfig};
pub use defaults::{DefaultContext, DefaultSpec};
pub use errors::*;
pub use field::{OptionsField, SchemaContribution};
pub use registry::ItemNameProvider;
pub use types::{FieldValue, FlagSet, OptionList};
