//! Item-type names for lists.
//!
//! Schema type names of an Options field embed the canonical item-type name of
//! the owning list. That name belongs to the host schema; this module only
//! defines how it is looked up.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Maps a list key to its canonical item-type name. Must be total and pure:
/// unknown keys fall back to the key itself.
pub trait ItemNameProvider {
    fn item_type_name(&self, list_key: &str) -> String;
}

impl<F> ItemNameProvider for F
where
    F: Fn(&str) -> String,
{
    fn item_type_name(&self, list_key: &str) -> String {
        self(list_key)
    }
}

/// An owned list-key → item-name table.
#[derive(Debug, Clone, Default)]
pub struct ListNames {
    names: HashMap<String, String>,
}

impl ListNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, list_key: impl Into<String>, item_name: impl Into<String>) {
        self.names.insert(list_key.into(), item_name.into());
    }

    pub fn with(mut self, list_key: impl Into<String>, item_name: impl Into<String>) -> Self {
        self.insert(list_key, item_name);
        self
    }
}

impl ItemNameProvider for ListNames {
    fn item_type_name(&self, list_key: &str) -> String {
        self.names.get(list_key).cloned().unwrap_or_else(|| list_key.to_string())
    }
}

static REGISTRY: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, String>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Records the item-type name of a list in the process-wide registry.
pub fn register_list(list_key: impl Into<String>, item_name: impl Into<String>) {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(list_key.into(), item_name.into());
}

/// Looks up a list in the process-wide registry, falling back to the key.
pub fn item_type_name_for(list_key: &str) -> String {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(list_key)
        .cloned()
        .unwrap_or_else(|| list_key.to_string())
}

/// [`ItemNameProvider`] backed by the process-wide registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalRegistry;

impl ItemNameProvider for GlobalRegistry {
    fn item_type_name(&self, list_key: &str) -> String {
        item_type_name_for(list_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn list_names_fall_back_to_key() {
        let names = ListNames::new().with("users", "User");
        assert_eq!(names.item_type_name("users"), "User");
        assert_eq!(names.item_type_name("Post"), "Post");
    }

    #[test]
    fn closures_are_providers() {
        let provider = |key: &str| key.to_uppercase();
        assert_eq!(provider.item_type_name("todo"), "TODO");
    }

    #[test]
    #[serial]
    fn global_registry_round_trip() {
        register_list("registry_test_list", "RegistryTestItem");
        assert_eq!(GlobalRegistry.item_type_name("registry_test_list"), "RegistryTestItem");
        assert_eq!(item_type_name_for("registry_test_unknown"), "registry_test_unknown");
    }
}
