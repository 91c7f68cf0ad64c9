//! Filter argument declarations for the query schema.
//!
//! Names produced here match the keys of [`super::ConditionBuilders`], so every
//! declared filter argument has a condition builder behind it.

/// `path` and `path_not`, both typed `ty`.
pub fn equality_input_fields(path: &str, ty: &str) -> Vec<String> {
    vec![format!("{path}: {ty}"), format!("{path}_not: {ty}")]
}

/// `path_in` and `path_not_in`, both typed `[ty]`.
pub fn in_input_fields(path: &str, ty: &str) -> Vec<String> {
    vec![format!("{path}_in: [{ty}]"), format!("{path}_not_in: [{ty}]")]
}
