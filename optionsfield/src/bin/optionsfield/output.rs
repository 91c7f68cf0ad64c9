//! Rendering of command reports and status lines.
//!
//! Reports go to stdout in the selected [`OutputFormat`]. Status lines
//! (success, info, headings) are suppressed in JSON mode so stdout stays
//! parseable; warnings, errors and verbose detail go to stderr.

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{Attribute, Cell, Color as TableColor, Table, presets};
use serde::Serialize;

use crate::theme::{BULLET, Tone};

#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Bordered table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// One line, for shell pipelines
    Compact,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// A command result that can be shown as a table or a single line.
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    fn use_color(&self) -> bool {
        !self.options.no_color
    }

    /// Whether decorative stdout lines are wanted.
    fn chatty(&self) -> bool {
        !self.options.quiet && !self.is_json()
    }

    /// The report text for the selected format, `None` when quiet.
    pub fn render<T>(&self, data: &T) -> Result<Option<String>>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(None);
        }
        let text = match self.options.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Table => data.to_table(&self.options).to_string(),
            OutputFormat::Compact => data.to_compact(),
        };
        Ok(Some(text))
    }

    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if let Some(text) = self.render(data)? {
            println!("{text}");
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if self.chatty() {
            println!("{}", Tone::Success.status_line(message, self.use_color()));
        }
    }

    /// Always shown, even with `--quiet`.
    pub fn error(&self, message: &str) {
        eprintln!("{}", Tone::Failure.status_line(message, self.use_color()));
    }

    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", Tone::Caution.status_line(message, self.use_color()));
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", Tone::Detail.status_line(message, self.use_color()));
        }
    }

    pub fn info(&self, message: &str) {
        if self.chatty() {
            println!("{}", Tone::Note.status_line(message, self.use_color()));
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.chatty() {
            return;
        }
        if self.use_color() {
            println!("\n{}", Tone::Heading.paint(text, true));
        } else {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if self.chatty() {
            let color = self.use_color();
            println!("{}: {}", Tone::Label.paint(key, color), Tone::Value.paint(value, color));
        }
    }

    pub fn bullet(&self, text: &str) {
        if self.chatty() {
            println!("  {} {text}", Tone::Detail.paint(BULLET, self.use_color()));
        }
    }

    /// SDL, DDL and other text meant to be copied verbatim.
    pub fn raw(&self, text: &str) {
        if !self.options.quiet {
            println!("{text}");
        }
    }
}

/// An empty report table with a bold header row.
pub fn report_table(options: &GlobalOptions, headers: &[&str]) -> Table {
    let mut table = Table::new();
    let preset = if options.no_color { presets::ASCII_FULL } else { presets::UTF8_FULL_CONDENSED };
    table.load_preset(preset);
    let header = headers.iter().map(|title| {
        let cell = Cell::new(title).add_attribute(Attribute::Bold);
        if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
    });
    table.set_header(header.collect::<Vec<_>>());
    table
}
