use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use optionsfield::{AssembledList, SchemaContribution, StorageBackend, StorageBinding};
use serde::Serialize;

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, report_table};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Schema fragments",
        commands: &[
            "optionsfield schema sdl                 # SDL types for every Options field",
            "optionsfield schema sdl users           # Only the users list",
            "optionsfield --output json schema sdl   # Full field contributions as JSON",
        ],
    },
    ExampleGroup {
        title: "Storage bindings",
        commands: &[
            "optionsfield schema bindings            # How every field is persisted",
            "optionsfield schema bindings --ddl      # CREATE TABLE / document schema per list",
        ],
    },
];

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Print the SDL contributed by Options fields
    #[command(name = "sdl")]
    Sdl {
        /// List to print (optional, prints all if omitted)
        list: Option<String>,
    },

    /// Show the storage binding of every Options field
    #[command(name = "bindings")]
    Bindings {
        /// List to show (optional, shows all if omitted)
        list: Option<String>,

        /// Print the table DDL or document schema instead of the summary
        #[arg(long)]
        ddl: bool,
    },
}

pub async fn handle_schema_commands(
    command: SchemaCommands,
    schema: Option<&PathBuf>,
    output: &OutputManager,
) -> Result<()> {
    let lists = super::load_lists(schema, output)?;

    match command {
        SchemaCommands::Sdl { list } => show_sdl(&select(&lists, list.as_deref())?, output),
        SchemaCommands::Bindings { list, ddl } => {
            let selected = select(&lists, list.as_deref())?;
            if ddl {
                show_ddl(&selected, output)
            } else {
                output.display(&BindingReport::from_lists(&selected))
            }
        }
    }
}

fn select<'a>(lists: &'a [AssembledList], key: Option<&str>) -> Result<Vec<&'a AssembledList>> {
    match key {
        None => Ok(lists.iter().collect()),
        Some(key) => {
            let list = lists
                .iter()
                .find(|list| list.key == key)
                .with_context(|| format!("No list named '{key}' in the schema"))?;
            Ok(vec![list])
        }
    }
}

#[derive(Serialize)]
struct FieldContribution<'a> {
    list: &'a str,
    path: &'a str,
    #[serde(flatten)]
    contribution: SchemaContribution,
}

fn show_sdl(lists: &[&AssembledList], output: &OutputManager) -> Result<()> {
    if output.is_json() {
        let contributions: Vec<FieldContribution<'_>> = lists
            .iter()
            .flat_map(|list| {
                list.fields.iter().map(move |assembled| FieldContribution {
                    list: &list.key,
                    path: assembled.field.path(),
                    contribution: assembled.field.schema_contribution(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&contributions)?);
        return Ok(());
    }

    for list in lists {
        if list.fields.is_empty() {
            output.warning(&format!("{} has no Options fields", list.key));
            continue;
        }
        output.heading(&list.key);
        output.raw(&list.sdl());
        for assembled in &list.fields {
            for declaration in assembled.field.gql_output_fields() {
                output.bullet(&declaration);
            }
        }
    }
    Ok(())
}

fn show_ddl(lists: &[&AssembledList], output: &OutputManager) -> Result<()> {
    for list in lists {
        output.heading(&format!("{} ({})", list.storage_name, list.backend));
        match list.backend {
            StorageBackend::Relational => output.raw(&list.table_schema().to_create_sql()),
            StorageBackend::Document => {
                let schema = serde_json::to_string_pretty(&list.document_schema())?;
                output.raw(&schema);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BindingRow {
    list: String,
    field: String,
    #[serde(flatten)]
    binding: StorageBinding,
}

/// One row per Options field with its storage binding.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct BindingReport {
    rows: Vec<BindingRow>,
}

impl BindingReport {
    pub fn from_lists(lists: &[&AssembledList]) -> Self {
        let rows = lists
            .iter()
            .flat_map(|list| {
                list.fields.iter().map(move |assembled| BindingRow {
                    list: list.key.clone(),
                    field: assembled.field.path().to_string(),
                    binding: assembled.binding(),
                })
            })
            .collect();
        Self { rows }
    }
}

fn describe(binding: &StorageBinding) -> (String, String, String) {
    match binding {
        StorageBinding::Document(field) => {
            let mut constraints = Vec::new();
            if field.required {
                constraints.push("required");
            }
            if field.unique {
                constraints.push("unique");
            }
            if field.index {
                constraints.push("indexed");
            }
            (
                format!("{:?}", field.kind).to_lowercase(),
                constraints.join(", "),
                field.default.as_ref().map(ToString::to_string).unwrap_or_default(),
            )
        }
        StorageBinding::Relational(column) => (
            column.column_type.sql_name().to_string(),
            if column.nullable { String::new() } else { "not null".to_string() },
            column.default.as_ref().map(ToString::to_string).unwrap_or_default(),
        ),
    }
}

impl TableDisplay for BindingReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let headers = ["List", "Field", "Backend", "Type", "Constraints", "Default"];
        let mut table = report_table(options, &headers);
        for row in &self.rows {
            let (kind, constraints, default) = describe(&row.binding);
            table.add_row(vec![
                Cell::new(&row.list),
                Cell::new(&row.field),
                Cell::new(row.binding.backend().as_str()),
                Cell::new(kind),
                Cell::new(constraints),
                Cell::new(default),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                let (kind, _, _) = describe(&row.binding);
                format!("{}.{}:{}", row.list, row.field, kind)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optionsfield::SchemaConfig;

    const SCHEMA: &str = r#"
[[lists]]
key = "users"
backend = "relational"

[[lists.fields]]
path = "colors"
options = ["red"]
is_not_nullable = true

[[lists]]
key = "posts"

[[lists.fields]]
path = "flags"
options = ["pinned"]
is_unique = true
"#;

    #[test]
    fn bindings_describe_each_backend() {
        let lists = SchemaConfig::from_toml_str(SCHEMA).unwrap().assemble().unwrap();
        let report = BindingReport::from_lists(&lists.iter().collect::<Vec<_>>());
        assert_eq!(report.to_compact(), "users.colors:JSONB posts.flags:open");
        assert_eq!(describe(&report.rows[0].binding).1, "not null");
        assert_eq!(describe(&report.rows[1].binding).1, "unique");
    }

    #[test]
    fn unknown_list_is_an_error() {
        let lists = SchemaConfig::from_toml_str(SCHEMA).unwrap().assemble().unwrap();
        assert!(select(&lists, Some("missing")).is_err());
        assert_eq!(select(&lists, Some("posts")).unwrap().len(), 1);
        assert_eq!(select(&lists, None).unwrap().len(), 2);
    }
}
