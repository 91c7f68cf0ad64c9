use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color as TableColor, Table};
use optionsfield::registry::ListNames;
use optionsfield::{DefaultContext, FieldValue, FlagSet, OptionList, OptionsField, codec};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, report_table};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Merge a partial update",
        commands: &[
            concat!(
                "optionsfield codec merge --options red,blue ",
                r#"--previous '{"red":true}' --incoming '{"blue":true}'"#
            ),
            r#"optionsfield codec merge --options red,green --incoming null   # Clears the field"#,
        ],
    },
    ExampleGroup {
        title: "Read and create",
        commands: &[
            r#"optionsfield codec read --options red,green,blue --stored '{"red":true}'"#,
            r#"optionsfield codec create --options red,green --default '{"red":true}'"#,
        ],
    },
];

#[derive(Args, Clone)]
pub struct OptionsArg {
    /// Declared option names, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    options: Vec<String>,
}

#[derive(Subcommand)]
pub enum CodecCommands {
    /// Merge an incoming write value with the stored one
    #[command(name = "merge")]
    Merge {
        #[command(flatten)]
        options: OptionsArg,

        /// Stored flags as JSON (omit when nothing is stored)
        #[arg(long)]
        previous: Option<String>,

        /// Incoming write value as JSON; omit for an untouched field, `null` to clear
        #[arg(long)]
        incoming: Option<String>,
    },

    /// Project a stored value onto every declared option
    #[command(name = "read")]
    Read {
        #[command(flatten)]
        options: OptionsArg,

        /// Stored flags as JSON (omit when nothing is stored)
        #[arg(long, alias = "previous")]
        stored: Option<String>,
    },

    /// Resolve a create, falling back to the default when no value is given
    #[command(name = "create")]
    Create {
        #[command(flatten)]
        options: OptionsArg,

        /// Incoming write value as JSON; omit to use the default
        #[arg(long)]
        incoming: Option<String>,

        /// Static default flags as JSON
        #[arg(long)]
        default: Option<String>,
    },
}

/// Outcome of a codec run, shaped for every output format.
#[derive(Debug, Serialize)]
pub struct CodecReport {
    pub outcome: &'static str,
    pub flags: Option<FlagSet>,
}

impl CodecReport {
    pub fn from_value(value: FieldValue) -> Self {
        match value {
            FieldValue::Absent => Self {
                outcome: "absent",
                flags: None,
            },
            FieldValue::Null => Self {
                outcome: "null",
                flags: None,
            },
            FieldValue::Set(flags) => Self {
                outcome: "set",
                flags: Some(flags),
            },
        }
    }

    fn from_flags(flags: FlagSet) -> Self {
        Self::from_value(FieldValue::Set(flags))
    }
}

fn flag_cell(flag: bool, options: &GlobalOptions) -> Cell {
    let cell = Cell::new(flag);
    match (options.no_color, flag) {
        (true, _) => cell,
        (false, true) => cell.fg(TableColor::Green),
        (false, false) => cell.fg(TableColor::Red),
    }
}

impl TableDisplay for CodecReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = report_table(options, &["Option", "Value"]);
        match &self.flags {
            Some(flags) => {
                for (name, value) in flags.iter() {
                    let value = match value {
                        Some(flag) => flag_cell(flag, options),
                        None => Cell::new("unset"),
                    };
                    table.add_row(vec![Cell::new(name), value]);
                }
            }
            None => {
                table.add_row(vec![Cell::new("(field)"), Cell::new(self.outcome)]);
            }
        }
        table
    }

    fn to_compact(&self) -> String {
        match &self.flags {
            Some(flags) => flags.to_json().to_string(),
            None => self.outcome.to_string(),
        }
    }
}

pub async fn handle_codec_commands(command: CodecCommands, output: &OutputManager) -> Result<()> {
    let report = match command {
        CodecCommands::Merge {
            options,
            previous,
            incoming,
        } => {
            let options = option_list(&options)?;
            let previous = stored_flags(previous.as_deref(), "--previous")?;
            let incoming = write_value(incoming.as_deref())?;
            output.verbose(&format!("Merging {incoming:?} over {previous:?}"));
            CodecReport::from_value(codec::merge_for_write(&options, previous.as_ref(), &incoming))
        }
        CodecCommands::Read { options, stored } => {
            let options = option_list(&options)?;
            let stored = stored_flags(stored.as_deref(), "--stored")?;
            CodecReport::from_flags(codec::project_for_read(&options, stored.as_ref()))
        }
        CodecCommands::Create {
            options,
            incoming,
            default,
        } => {
            let names = ListNames::new();
            let mut field = OptionsField::from_names("value", "cli", options.options, &names)
                .context("Invalid --options")?;
            if let Some(default) = stored_flags(default.as_deref(), "--default")? {
                field = field.with_default_value(default);
            }
            let incoming = write_value(incoming.as_deref())?;
            let created = field.resolve_create(&incoming, DefaultContext::default()).await;
            CodecReport::from_value(created)
        }
    };

    if report.outcome == "absent" {
        output.info("Field untouched; nothing would be written");
    }
    output.display(&report)
}

fn option_list(arg: &OptionsArg) -> Result<OptionList> {
    OptionList::new(arg.options.iter().cloned())
        .map_err(|problem| anyhow!("Invalid --options: {problem}"))
}

fn parse_json(text: &str, flag: &str) -> Result<JsonValue> {
    serde_json::from_str(text).with_context(|| format!("{flag} is not valid JSON"))
}

fn stored_flags(text: Option<&str>, flag: &str) -> Result<Option<FlagSet>> {
    let Some(text) = text else {
        return Ok(None);
    };
    let value = parse_json(text, flag)?;
    if !(value.is_object() || value.is_null()) {
        anyhow::bail!("{flag} must be a JSON object or null");
    }
    Ok(FlagSet::from_stored(Some(&value)))
}

fn write_value(text: Option<&str>) -> Result<FieldValue> {
    match text {
        None => Ok(FieldValue::Absent),
        Some(text) => Ok(FieldValue::from_json(Some(&parse_json(text, "--incoming")?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_values_follow_the_json() {
        assert_eq!(write_value(None).unwrap(), FieldValue::Absent);
        assert_eq!(write_value(Some("null")).unwrap(), FieldValue::Null);
        assert_eq!(
            write_value(Some(r#"{"red":true}"#)).unwrap(),
            FieldValue::Set(FlagSet::from([("red", true)]))
        );
        assert!(write_value(Some("{not json")).is_err());
    }

    #[test]
    fn stored_flags_reject_scalars() {
        assert!(stored_flags(Some("3"), "--previous").is_err());
        assert_eq!(stored_flags(Some("null"), "--previous").unwrap(), None);
        assert_eq!(stored_flags(None, "--previous").unwrap(), None);
    }

    #[test]
    fn compact_report_prints_flags_or_outcome() {
        let set = CodecReport::from_flags(FlagSet::from([("red", true)]));
        assert_eq!(set.to_compact(), r#"{"red":true}"#);
        assert_eq!(CodecReport::from_value(FieldValue::Null).to_compact(), "null");
    }
}
