use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use optionsfield::AssembledList;
use serde::Serialize;

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, report_table};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Validate a schema file",
    commands: &[
        "optionsfield --schema schema.toml check      # Assemble every list and field",
        "OPTIONSFIELD_SCHEMA=schema.toml optionsfield check --output json",
    ],
}];

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub list: String,
    pub path: String,
    pub backend: String,
    pub options: Vec<String>,
    pub output_type: String,
    pub input_type: String,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub lists: usize,
    pub fields: Vec<FieldReport>,
}

impl CheckReport {
    pub fn from_lists(lists: &[AssembledList]) -> Self {
        let fields = lists
            .iter()
            .flat_map(|list| {
                list.fields.iter().map(move |assembled| FieldReport {
                    list: list.key.clone(),
                    path: assembled.field.path().to_string(),
                    backend: list.backend.to_string(),
                    options: assembled.field.options().iter().map(str::to_string).collect(),
                    output_type: assembled.field.output_type_name().to_string(),
                    input_type: assembled.field.input_type_name().to_string(),
                })
            })
            .collect();
        Self {
            lists: lists.len(),
            fields,
        }
    }
}

impl TableDisplay for CheckReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let headers = ["List", "Field", "Backend", "Options", "Output type"];
        let mut table = report_table(options, &headers);
        for field in &self.fields {
            table.add_row(vec![
                Cell::new(&field.list),
                Cell::new(&field.path),
                Cell::new(&field.backend),
                Cell::new(field.options.join(", ")),
                Cell::new(&field.output_type),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{}.{}={}", field.list, field.path, field.options.join("|")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub async fn handle_check(schema: Option<&PathBuf>, output: &OutputManager) -> Result<()> {
    let lists = super::load_lists(schema, output).context("Schema check failed")?;

    let report = CheckReport::from_lists(&lists);
    output.key_value("Lists", &report.lists.to_string());
    output.key_value("Options fields", &report.fields.len().to_string());
    output.display(&report)?;
    output.success(&format!(
        "{} Options field(s) across {} list(s) assembled cleanly",
        report.fields.len(),
        report.lists
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use optionsfield::SchemaConfig;

    #[test]
    fn report_covers_every_field() {
        let config = SchemaConfig::from_toml_str(
            r#"
[[lists]]
key = "users"
item_name = "User"

[[lists.fields]]
path = "colors"
options = ["red", "green"]

[[lists.fields]]
path = "roles"
options = ["admin"]
"#,
        )
        .unwrap();
        let report = CheckReport::from_lists(&config.assemble().unwrap());
        assert_eq!(report.lists, 1);
        assert_eq!(report.fields.len(), 2);
        assert_eq!(report.fields[0].output_type, "OptionsUser_colors");
        assert_eq!(report.fields[0].backend, "document");
        assert_eq!(report.to_compact(), "users.colors=red|green users.roles=admin");
    }
}
