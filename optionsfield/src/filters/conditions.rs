use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Value as JsonValue, json};

/// A storage-level filter over one field.
///
/// # Examples
///
/// ```
/// use optionsfield::filters::QueryCondition;
/// use serde_json::json;
///
/// let cond = QueryCondition::eq("colors", json!({ "red": true }));
/// assert_eq!(cond.to_document_query(), json!({ "colors": { "$eq": { "red": true } } }));
/// assert_eq!(cond.to_sql_clause(), r#""colors" = '{"red":true}'::jsonb"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum QueryCondition {
    Equals { field: String, value: JsonValue },
    NotEquals { field: String, value: JsonValue },
    In { field: String, values: Vec<JsonValue> },
    NotIn { field: String, values: Vec<JsonValue> },
}

impl QueryCondition {
    #[inline]
    pub fn eq(field: impl Into<String>, value: JsonValue) -> Self {
        Self::Equals {
            field: field.into(),
            value,
        }
    }

    #[inline]
    pub fn ne(field: impl Into<String>, value: JsonValue) -> Self {
        Self::NotEquals {
            field: field.into(),
            value,
        }
    }

    #[inline]
    pub fn is_in(field: impl Into<String>, values: impl IntoIterator<Item = JsonValue>) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().collect(),
        }
    }

    #[inline]
    pub fn not_in(field: impl Into<String>, values: impl IntoIterator<Item = JsonValue>) -> Self {
        Self::NotIn {
            field: field.into(),
            values: values.into_iter().collect(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. }
            | Self::NotEquals { field, .. }
            | Self::In { field, .. }
            | Self::NotIn { field, .. } => field,
        }
    }

    /// Document-store query object (`$eq`, `$ne`, `$in`, `$not: { $in }`).
    pub fn to_document_query(&self) -> JsonValue {
        let predicate = match self {
            Self::Equals { value, .. } => json!({ "$eq": value }),
            Self::NotEquals { value, .. } => json!({ "$ne": value }),
            Self::In { values, .. } => json!({ "$in": values }),
            Self::NotIn { values, .. } => json!({ "$not": { "$in": values } }),
        };
        let mut query = JsonMap::new();
        query.insert(self.field().to_string(), predicate);
        JsonValue::Object(query)
    }

    /// SQL predicate against a JSONB column.
    pub fn to_sql_clause(&self) -> String {
        let column = quote_identifier(self.field());
        match self {
            Self::Equals { value: JsonValue::Null, .. } => format!("{column} IS NULL"),
            Self::NotEquals { value: JsonValue::Null, .. } => format!("{column} IS NOT NULL"),
            Self::Equals { value, .. } => format!("{column} = {}", jsonb_literal(value)),
            Self::NotEquals { value, .. } => {
                format!("{column} IS DISTINCT FROM {}", jsonb_literal(value))
            }
            Self::In { values, .. } => {
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                format!("{column} IN ({})", jsonb_list(values))
            }
            Self::NotIn { values, .. } => {
                if values.is_empty() {
                    return "TRUE".to_string();
                }
                format!("({column} IS NULL OR {column} NOT IN ({}))", jsonb_list(values))
            }
        }
    }
}

/// Double-quotes a SQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A JSON value as a `jsonb` SQL literal.
pub fn jsonb_literal(value: &JsonValue) -> String {
    format!("'{}'::jsonb", value.to_string().replace('\'', "''"))
}

fn jsonb_list(values: &[JsonValue]) -> String {
    values.iter().map(jsonb_literal).collect::<Vec<_>>().join(", ")
}

pub type ConditionBuilder = Box<dyn Fn(JsonValue) -> QueryCondition + Send + Sync>;

/// Filter argument name → builder turning the argument value into a condition.
pub type ConditionBuilders = BTreeMap<String, ConditionBuilder>;

/// `path` → equals, `path_not` → not equals, both against `db_path`.
pub fn equality_conditions(path: &str, db_path: &str) -> ConditionBuilders {
    let mut builders = ConditionBuilders::new();
    let eq_path = db_path.to_string();
    builders.insert(
        path.to_string(),
        Box::new(move |value: JsonValue| QueryCondition::eq(eq_path.clone(), value)),
    );
    let ne_path = db_path.to_string();
    builders.insert(
        format!("{path}_not"),
        Box::new(move |value: JsonValue| QueryCondition::ne(ne_path.clone(), value)),
    );
    builders
}

/// `path_in` → membership, `path_not_in` → non-membership, both against `db_path`.
/// A non-array argument is treated as a one-element list.
pub fn in_conditions(path: &str, db_path: &str) -> ConditionBuilders {
    let mut builders = ConditionBuilders::new();
    let in_path = db_path.to_string();
    builders.insert(
        format!("{path}_in"),
        Box::new(move |value: JsonValue| {
            QueryCondition::is_in(in_path.clone(), into_list(value))
        }),
    );
    let not_in_path = db_path.to_string();
    builders.insert(
        format!("{path}_not_in"),
        Box::new(move |value: JsonValue| {
            QueryCondition::not_in(not_in_path.clone(), into_list(value))
        }),
    );
    builders
}

fn into_list(value: JsonValue) -> Vec<JsonValue> {
    match value {
        JsonValue::Array(values) => values,
        other => vec![other],
    }
}

/// Filter capability for storage adapters.
///
/// Any adapter able to name its field path gets equality and membership
/// conditions; adapters share no base type, they only implement `field_path`.
pub trait QueryConditions {
    /// Path of the field in the public schema (filter argument prefix).
    fn field_path(&self) -> &str;

    fn equality_conditions(&self, db_path: &str) -> ConditionBuilders {
        equality_conditions(self.field_path(), db_path)
    }

    fn in_conditions(&self, db_path: &str) -> ConditionBuilders {
        in_conditions(self.field_path(), db_path)
    }

    /// Union of equality and membership conditions.
    fn query_conditions(&self, db_path: &str) -> ConditionBuilders {
        let mut builders = self.equality_conditions(db_path);
        builders.extend(self.in_conditions(db_path));
        builders
    }

    /// Builds the condition for one filter argument, `None` if the argument is unknown.
    fn condition_for(
        &self,
        db_path: &str,
        argument: &str,
        value: JsonValue,
    ) -> Option<QueryCondition> {
        self.query_conditions(db_path).get(argument).map(|builder| builder(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ColorsField;

    impl QueryConditions for ColorsField {
        fn field_path(&self) -> &str {
            "colors"
        }
    }

    #[test]
    fn query_conditions_is_union_of_equality_and_membership() {
        let keys: Vec<String> = ColorsField.query_conditions("colors_db").into_keys().collect();
        assert_eq!(keys, vec!["colors", "colors_in", "colors_not", "colors_not_in"]);
    }

    #[test]
    fn builders_target_the_storage_path() {
        let cond = ColorsField
            .condition_for("data.colors", "colors_not", json!({ "red": true }))
            .unwrap();
        assert_eq!(cond, QueryCondition::ne("data.colors", json!({ "red": true })));
    }

    #[test]
    fn no_per_option_conditions() {
        assert!(ColorsField.condition_for("colors", "colors_red", json!(true)).is_none());
    }

    #[test]
    fn membership_accepts_single_values() {
        let cond =
            ColorsField.condition_for("colors", "colors_in", json!({ "red": true })).unwrap();
        assert_eq!(cond, QueryCondition::is_in("colors", [json!({ "red": true })]));
    }

    #[test]
    fn renders_document_queries() {
        let cond = QueryCondition::not_in("colors", [json!({ "red": true }), JsonValue::Null]);
        assert_eq!(
            cond.to_document_query(),
            json!({ "colors": { "$not": { "$in": [{ "red": true }, null] } } })
        );
    }

    #[test]
    fn renders_sql_clauses() {
        assert_eq!(
            QueryCondition::eq("colors", JsonValue::Null).to_sql_clause(),
            "\"colors\" IS NULL"
        );
        assert_eq!(
            QueryCondition::ne("colors", json!({ "it's": true })).to_sql_clause(),
            r#""colors" IS DISTINCT FROM '{"it''s":true}'::jsonb"#
        );
        assert_eq!(
            QueryCondition::is_in("colors", [json!({ "red": true }), json!({ "blue": false })])
                .to_sql_clause(),
            r#""colors" IN ('{"red":true}'::jsonb, '{"blue":false}'::jsonb)"#
        );
        assert_eq!(QueryCondition::is_in("colors", Vec::new()).to_sql_clause(), "FALSE");
        assert_eq!(QueryCondition::not_in("colors", Vec::new()).to_sql_clause(), "TRUE");
    }
}
