use std::io::Write;

use optionsfield::{SchemaConfig, SchemaError, StorageBackend};
use tempfile::NamedTempFile;

fn write_schema(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write schema");
    file
}

#[test]
fn loads_and_assembles_from_disk() {
    let file = write_schema(
        r#"
[[lists]]
key = "tasks"
item_name = "Task"
backend = "relational"
storage_name = "task_items"

[[lists.fields]]
path = "labels"
options = ["urgent", "blocked"]
default_to = { urgent = false }
"#,
    );

    let lists = SchemaConfig::load_and_assemble(file.path()).unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].backend, StorageBackend::Relational);

    let ddl = lists[0].table_schema().to_create_sql();
    assert!(ddl.starts_with("CREATE TABLE \"task_items\""));
    assert!(ddl.contains("\"labels\" JSONB DEFAULT '{\"urgent\":false}'::jsonb"));
}

#[test]
fn configuration_errors_surface_from_load() {
    let file = write_schema(
        r#"
[[lists]]
key = "tasks"

[[lists.fields]]
path = "labels"
options = "urgent"
"#,
    );

    let err = SchemaConfig::load_and_assemble(file.path()).unwrap_err();
    assert!(matches!(err, SchemaError::Configuration(_)));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_schema("[[lists]\nkey = ");
    assert!(matches!(SchemaConfig::load(file.path()), Err(SchemaError::Parse(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        SchemaConfig::load("/definitely/not/here/schema.toml"),
        Err(SchemaError::Io(_))
    ));
}
