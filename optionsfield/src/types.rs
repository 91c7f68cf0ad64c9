use std::collections::BTreeMap;
use std::collections::btree_map;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::errors::OptionsProblem;

static GRAPHQL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("GraphQL name pattern is valid"));

/// Returns `true` when `name` can be used verbatim as a GraphQL field or type name.
pub fn is_graphql_name(name: &str) -> bool {
    GRAPHQL_NAME.is_match(name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// FlagSet
// ═══════════════════════════════════════════════════════════════════════════════

/// Mapping from option name to a tri-state flag.
///
/// `Some(true)` / `Some(false)` are recorded opinions, `None` means "no opinion".
/// Baselines and read projections carry `None` entries for every declared
/// option; persisted values never do (see [`crate::codec::merge_for_write`]).
///
/// Serializes as a plain JSON object, `None` becoming `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeMap<String, Option<bool>>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded opinion for `name`, `None` when absent or unset.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied().flatten()
    }

    /// Raw entry for `name`: `None` if the key is missing, `Some(None)` if present as null.
    pub fn entry(&self, name: &str) -> Option<Option<bool>> {
        self.0.get(name).copied()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<bool>) -> Option<Option<bool>> {
        self.0.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<bool>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Writes every entry of `other` over `self`, entry by entry. `other` wins.
    pub fn overlay(&mut self, other: &FlagSet) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), *value);
        }
    }

    /// Drops every `None` entry.
    pub fn without_unset(mut self) -> Self {
        self.0.retain(|_, value| value.is_some());
        self
    }

    /// Lenient conversion from a JSON object. Boolean entries are kept, `null`
    /// entries become `None`, anything else is dropped with a warning.
    pub fn from_json_object(object: &JsonMap<String, JsonValue>) -> Self {
        let mut flags = Self::new();
        for (name, value) in object {
            match value {
                JsonValue::Bool(flag) => {
                    flags.insert(name.clone(), Some(*flag));
                }
                JsonValue::Null => {
                    flags.insert(name.clone(), None);
                }
                other => {
                    warn!("ignoring non-boolean value {other} for option `{name}`");
                }
            }
        }
        flags
    }

    /// Reads a stored value. `null` and missing both mean "nothing stored".
    pub fn from_stored(value: Option<&JsonValue>) -> Option<Self> {
        match value {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Object(object)) => Some(Self::from_json_object(object)),
            Some(other) => {
                warn!("ignoring stored options value that is not an object: {other}");
                None
            }
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let object: JsonMap<String, JsonValue> = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), value.map_or(JsonValue::Null, JsonValue::Bool)))
            .collect();
        JsonValue::Object(object)
    }
}

impl<S: Into<String>> FromIterator<(S, Option<bool>)> for FlagSet {
    fn from_iter<I: IntoIterator<Item = (S, Option<bool>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[(S, Option<bool>); N]> for FlagSet {
    fn from(entries: [(S, Option<bool>); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<S: Into<String>, const N: usize> From<[(S, bool); N]> for FlagSet {
    fn from(entries: [(S, bool); N]) -> Self {
        entries.into_iter().map(|(k, v)| (k, Some(v))).collect()
    }
}

impl IntoIterator for FlagSet {
    type Item = (String, Option<bool>);
    type IntoIter = btree_map::IntoIter<String, Option<bool>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FieldValue - tri-state write value
// ═══════════════════════════════════════════════════════════════════════════════

/// The value of an Options field in a write, or the outcome of resolving one.
///
/// | Variant  | Input meaning                 | Outcome meaning                     |
/// |----------|-------------------------------|-------------------------------------|
/// | `Absent` | field not part of this write  | leave the stored value untouched    |
/// | `Null`   | explicit `null`: clear it     | store `null`                        |
/// | `Set`    | flags to apply                | store these flags                   |
///
/// # JSON Serialization
///
/// - missing key → `Absent` (via `#[serde(default)]`)
/// - `null` → `Null`
/// - `{...}` → `Set`
///
/// `Absent` should be skipped with `skip_serializing_if = "FieldValue::is_absent"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldValue {
    #[default]
    Absent,
    Null,
    Set(FlagSet),
}

impl FieldValue {
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    #[inline]
    pub fn as_set(&self) -> Option<&FlagSet> {
        match self {
            FieldValue::Set(flags) => Some(flags),
            FieldValue::Absent | FieldValue::Null => None,
        }
    }

    #[inline]
    pub fn into_set(self) -> Option<FlagSet> {
        match self {
            FieldValue::Set(flags) => Some(flags),
            FieldValue::Absent | FieldValue::Null => None,
        }
    }

    /// Lenient conversion from an optional JSON value. Values that are neither
    /// `null` nor an object are treated as `Absent` so a malformed input never
    /// clears stored data.
    pub fn from_json(value: Option<&JsonValue>) -> Self {
        match value {
            None => FieldValue::Absent,
            Some(JsonValue::Null) => FieldValue::Null,
            Some(JsonValue::Object(object)) => FieldValue::Set(FlagSet::from_json_object(object)),
            Some(other) => {
                warn!("ignoring options input that is not an object: {other}");
                FieldValue::Absent
            }
        }
    }

    /// JSON form of the value, `None` for `Absent`.
    pub fn to_json(&self) -> Option<JsonValue> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Null => Some(JsonValue::Null),
            FieldValue::Set(flags) => Some(flags.to_json()),
        }
    }
}

impl From<FlagSet> for FieldValue {
    fn from(flags: FlagSet) -> Self {
        FieldValue::Set(flags)
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Absent | FieldValue::Null => serializer.serialize_none(),
            FieldValue::Set(flags) => flags.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<FlagSet>::deserialize(deserializer).map(|value| match value {
            Some(flags) => FieldValue::Set(flags),
            None => FieldValue::Null,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OptionList
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered, duplicate-free, non-empty list of option names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionList(Vec<String>);

impl OptionList {
    /// Validates a typed list of names.
    pub fn new<I, S>(names: I) -> Result<Self, OptionsProblem>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !is_graphql_name(&name) {
                return Err(OptionsProblem::InvalidName { name });
            }
            if seen.contains(&name) {
                return Err(OptionsProblem::Duplicate { name });
            }
            seen.push(name);
        }
        if seen.is_empty() {
            return Err(OptionsProblem::Empty);
        }
        Ok(Self(seen))
    }

    /// Validates a raw configuration value, which must be an array of strings.
    pub fn from_value(value: &JsonValue) -> Result<Self, OptionsProblem> {
        let JsonValue::Array(items) = value else {
            return Err(OptionsProblem::NotAnArray);
        };
        let names = items
            .iter()
            .enumerate()
            .map(|(index, item)| item.as_str().ok_or(OptionsProblem::NonString { index }))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(names)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|option| option == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
