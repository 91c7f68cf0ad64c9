//! The Options field type.
//!
//! An Options field stores a set of named boolean flags, each of which may
//! also be unset. [`OptionsField`] is built once per declared field when the
//! schema is assembled and is immutable afterwards; it contributes schema
//! fragments, resolves defaults and merges writes through [`crate::codec`].

use log::debug;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::codec;
use crate::defaults::{DefaultContext, DefaultSpec};
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::filters::{equality_input_fields, in_input_fields};
use crate::registry::ItemNameProvider;
use crate::types::{FieldValue, FlagSet, OptionList, is_graphql_name};

#[derive(Debug, Clone)]
pub struct OptionsField {
    path: String,
    list_key: String,
    item_type_name: String,
    options: OptionList,
    default_value: DefaultSpec,
    output_type_name: String,
    input_type_name: String,
}

/// Every schema fragment one field contributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaContribution {
    pub aux_types: Vec<String>,
    pub output_fields: Vec<String>,
    pub query_input_fields: Vec<String>,
    pub create_input_fields: Vec<String>,
    pub update_input_fields: Vec<String>,
    pub aux_queries: Vec<String>,
    pub aux_mutations: Vec<String>,
}

impl OptionsField {
    /// Builds the field from its raw `options` configuration value.
    ///
    /// Type names are `Options{Item}_{path}` and `Options{Item}Input_{path}`;
    /// they are unique because they embed the list's item name and the field
    /// path. Rejecting duplicate paths within a list is the host's job
    /// ([`crate::config`] does it for schema files).
    pub fn new(
        path: impl Into<String>,
        list_key: impl Into<String>,
        options: &JsonValue,
        names: &impl ItemNameProvider,
    ) -> ConfigurationResult<Self> {
        let path = path.into();
        let list_key = list_key.into();

        if !is_graphql_name(&path) {
            return Err(ConfigurationError::InvalidPath { list_key, path });
        }

        let options =
            OptionList::from_value(options).map_err(|problem| ConfigurationError::InvalidOptions {
                list_key: list_key.clone(),
                path: path.clone(),
                problem,
            })?;

        let item_type_name = names.item_type_name(&list_key);
        if !is_graphql_name(&item_type_name) {
            return Err(ConfigurationError::InvalidItemName {
                list_key,
                path,
                item_name: item_type_name,
            });
        }
        let output_type_name = format!("Options{item_type_name}_{path}");
        let input_type_name = format!("Options{item_type_name}Input_{path}");

        debug!("built Options field {list_key}.{path} with {} options", options.len());

        Ok(Self {
            path,
            list_key,
            item_type_name,
            options,
            default_value: DefaultSpec::Omitted,
            output_type_name,
            input_type_name,
        })
    }

    /// Same as [`Self::new`] for callers holding typed option names.
    pub fn from_names<I, S>(
        path: impl Into<String>,
        list_key: impl Into<String>,
        options: I,
        names: &impl ItemNameProvider,
    ) -> ConfigurationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(|name| JsonValue::String(name.into())).collect();
        let options = JsonValue::Array(options);
        Self::new(path, list_key, &options, names)
    }

    pub fn with_default_value(mut self, default_value: impl Into<DefaultSpec>) -> Self {
        self.default_value = default_value.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    pub fn item_type_name(&self) -> &str {
        &self.item_type_name
    }

    pub fn options(&self) -> &OptionList {
        &self.options
    }

    pub fn output_type_name(&self) -> &str {
        &self.output_type_name
    }

    pub fn input_type_name(&self) -> &str {
        &self.input_type_name
    }

    pub fn default_spec(&self) -> &DefaultSpec {
        &self.default_value
    }

    // ========== Schema ==========

    /// Output object type and input object type, one nullable `Boolean` per option.
    pub fn gql_aux_types(&self) -> Vec<String> {
        let body: String = self.options.iter().map(|name| format!("  {name}: Boolean\n")).collect();
        vec![
            format!("type {} {{\n{body}}}", self.output_type_name),
            format!("input {} {{\n{body}}}", self.input_type_name),
        ]
    }

    pub fn gql_aux_queries(&self) -> Vec<String> {
        Vec::new()
    }

    pub fn gql_aux_mutations(&self) -> Vec<String> {
        Vec::new()
    }

    pub fn gql_output_fields(&self) -> Vec<String> {
        vec![format!("{}: {}", self.path, self.output_type_name)]
    }

    /// Equality and membership filters over the whole flag set.
    pub fn gql_query_input_fields(&self) -> Vec<String> {
        // TODO: per-option filters (`{path}_{option}: Boolean`) need a matching
        // condition builder in `filters` first.
        let mut fields = equality_input_fields(&self.path, &self.input_type_name);
        fields.extend(in_input_fields(&self.path, &self.input_type_name));
        fields
    }

    pub fn gql_update_input_fields(&self) -> Vec<String> {
        vec![format!("{}: {}", self.path, self.input_type_name)]
    }

    pub fn gql_create_input_fields(&self) -> Vec<String> {
        vec![format!("{}: {}", self.path, self.input_type_name)]
    }

    pub fn schema_contribution(&self) -> SchemaContribution {
        SchemaContribution {
            aux_types: self.gql_aux_types(),
            output_fields: self.gql_output_fields(),
            query_input_fields: self.gql_query_input_fields(),
            create_input_fields: self.gql_create_input_fields(),
            update_input_fields: self.gql_update_input_fields(),
            aux_queries: self.gql_aux_queries(),
            aux_mutations: self.gql_aux_mutations(),
        }
    }

    /// Admin metadata rebuilt from `base` with the option list attached.
    /// Anything another field layer added on top of `base` is not carried over.
    pub fn extend_admin_meta(
        &self,
        base: &JsonMap<String, JsonValue>,
    ) -> JsonMap<String, JsonValue> {
        let mut meta = base.clone();
        let options = self.options.iter().map(|name| JsonValue::String(name.to_string())).collect();
        meta.insert("options".to_string(), JsonValue::Array(options));
        meta
    }

    // ========== Values ==========

    /// Output resolver: the stored value of `item` projected onto every declared option.
    pub fn resolve_output(&self, item: &JsonMap<String, JsonValue>) -> FlagSet {
        let stored = FlagSet::from_stored(item.get(&self.path));
        codec::project_for_read(&self.options, stored.as_ref())
    }

    /// Default flags for a create.
    pub async fn default_value(&self, ctx: DefaultContext) -> FlagSet {
        codec::resolve_default(&self.options, &self.default_value, ctx).await
    }

    /// The write value for this field inside an input object.
    pub fn incoming_value(&self, data: &JsonMap<String, JsonValue>) -> FieldValue {
        FieldValue::from_json(data.get(&self.path))
    }

    /// Merges `incoming` with the value stored on `existing_item` (`None` on create).
    pub fn resolve_input(
        &self,
        incoming: &FieldValue,
        existing_item: Option<&JsonMap<String, JsonValue>>,
    ) -> FieldValue {
        let previous = existing_item.and_then(|item| FlagSet::from_stored(item.get(&self.path)));
        codec::merge_for_write(&self.options, previous.as_ref(), incoming)
    }

    /// Create path: an absent input takes the default value, then is merged
    /// against nothing.
    pub async fn resolve_create(&self, incoming: &FieldValue, ctx: DefaultContext) -> FieldValue {
        if incoming.is_absent() {
            let default = FieldValue::Set(self.default_value(ctx).await);
            return self.resolve_input(&default, None);
        }
        self.resolve_input(incoming, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OptionsProblem;
    use crate::registry::ListNames;
    use serde_json::json;

    fn names() -> ListNames {
        ListNames::new().with("users", "User")
    }

    fn colors() -> OptionsField {
        OptionsField::from_names("colors", "users", ["red", "green", "blue"], &names()).unwrap()
    }

    #[test]
    fn derives_type_names_from_item_name_and_path() {
        let field = colors();
        assert_eq!(field.item_type_name(), "User");
        assert_eq!(field.output_type_name(), "OptionsUser_colors");
        assert_eq!(field.input_type_name(), "OptionsUserInput_colors");
    }

    #[test]
    fn rejects_item_names_that_cannot_prefix_a_type() {
        let err = OptionsField::from_names("colors", "user-accounts", ["red"], &ListNames::new())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidItemName {
                list_key: "user-accounts".to_string(),
                path: "colors".to_string(),
                item_name: "user-accounts".to_string(),
            }
        );

        let names = ListNames::new().with("user-accounts", "UserAccount");
        let field = OptionsField::from_names("colors", "user-accounts", ["red"], &names).unwrap();
        assert_eq!(field.output_type_name(), "OptionsUserAccount_colors");
    }

    #[test]
    fn rejects_non_array_options() {
        let err = OptionsField::new("colors", "users", &json!("red,green"), &names()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidOptions {
                list_key: "users".to_string(),
                path: "colors".to_string(),
                problem: OptionsProblem::NotAnArray,
            }
        );
    }

    #[test]
    fn rejects_paths_that_are_not_schema_names() {
        let err =
            OptionsField::from_names("favourite colors", "users", ["red"], &names()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPath { .. }));
    }

    #[test]
    fn emits_output_and_input_types() {
        let body = "  red: Boolean\n  green: Boolean\n  blue: Boolean\n";
        assert_eq!(
            colors().gql_aux_types(),
            vec![
                format!("type OptionsUser_colors {{\n{body}}}"),
                format!("input OptionsUserInput_colors {{\n{body}}}"),
            ]
        );
    }

    #[test]
    fn field_declarations_reference_derived_types() {
        let field = colors();
        assert_eq!(field.gql_output_fields(), vec!["colors: OptionsUser_colors"]);
        assert_eq!(field.gql_create_input_fields(), vec!["colors: OptionsUserInput_colors"]);
        assert_eq!(field.gql_update_input_fields(), vec!["colors: OptionsUserInput_colors"]);
        assert_eq!(
            field.gql_query_input_fields(),
            vec![
                "colors: OptionsUserInput_colors",
                "colors_not: OptionsUserInput_colors",
                "colors_in: [OptionsUserInput_colors]",
                "colors_not_in: [OptionsUserInput_colors]",
            ]
        );
        assert!(field.gql_aux_queries().is_empty());
        assert!(field.gql_aux_mutations().is_empty());
    }

    #[test]
    fn admin_meta_is_rebuilt_from_base() {
        let base = json!({ "path": "colors", "label": "Colors" });
        let meta = colors().extend_admin_meta(base.as_object().unwrap());
        assert_eq!(
            JsonValue::Object(meta),
            json!({ "path": "colors", "label": "Colors", "options": ["red", "green", "blue"] })
        );
    }

    #[test]
    fn output_resolver_projects_stored_value() {
        let item = json!({ "colors": { "red": true } });
        assert_eq!(
            colors().resolve_output(item.as_object().unwrap()),
            FlagSet::from([("red", Some(true)), ("green", None), ("blue", None)])
        );

        let empty = json!({ "colors": null });
        assert_eq!(
            colors().resolve_output(empty.as_object().unwrap()),
            FlagSet::from([("red", None), ("green", None), ("blue", None)])
        );
    }

    #[test]
    fn resolve_input_uses_existing_item_value() {
        let field = colors();
        let existing = json!({ "id": "1", "colors": { "red": true } });
        let data = json!({ "colors": { "blue": false } });
        let incoming = field.incoming_value(data.as_object().unwrap());

        assert_eq!(
            field.resolve_input(&incoming, existing.as_object()),
            FieldValue::Set(FlagSet::from([("red", true), ("blue", false)]))
        );
    }

    #[test]
    fn resolve_input_keeps_absent_and_null_apart() {
        let field = colors();
        let existing = json!({ "colors": { "red": true } });

        let untouched = field.incoming_value(json!({ "name": "x" }).as_object().unwrap());
        assert_eq!(field.resolve_input(&untouched, existing.as_object()), FieldValue::Absent);

        let cleared = field.incoming_value(json!({ "colors": null }).as_object().unwrap());
        assert_eq!(field.resolve_input(&cleared, existing.as_object()), FieldValue::Null);
    }

    #[tokio::test]
    async fn create_without_input_uses_default() {
        let field = colors().with_default_value(FlagSet::from([("green", true)]));
        let created = field.resolve_create(&FieldValue::Absent, DefaultContext::default()).await;
        assert_eq!(created, FieldValue::Set(FlagSet::from([("green", true)])));
    }

    #[tokio::test]
    async fn create_with_input_ignores_default() {
        let field = colors().with_default_value(FlagSet::from([("green", true)]));
        let incoming = FieldValue::Set(FlagSet::from([("red", false)]));
        let created = field.resolve_create(&incoming, DefaultContext::default()).await;
        assert_eq!(created, FieldValue::Set(FlagSet::from([("red", false)])));
    }
}
