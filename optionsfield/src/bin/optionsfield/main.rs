mod commands;
mod examples;
mod output;
mod theme;

use std::fmt::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::control::ShouldColorize;

use commands::{
    check::handle_check,
    codec::{CodecCommands, handle_codec_commands},
    schema::{SchemaCommands, handle_schema_commands},
};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ARROW, Tone};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("OPTIONSFIELD_SCHEMA", "Path to the schema file (same as --schema)"),
    ("RUST_LOG", "Log filter; defaults to warn, debug with --verbose"),
];

#[derive(Parser)]
#[command(name = "optionsfield", version)]
#[command(
    about = "Inspect and exercise Options fields",
    long_about = r#"Tooling for the Options field type.

Validates schema files, prints the SDL and storage bindings each Options
field contributes, and runs the value codec on JSON from the command line."#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Print progress detail and enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Schema file describing lists and their Options fields
    #[arg(long, env = "OPTIONSFIELD_SCHEMA", global = true)]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the schema file and report every Options field
    Check,

    /// Show SDL fragments and storage bindings
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Run the value codec on JSON input
    #[command(subcommand)]
    Codec(CodecCommands),
}

impl Cli {
    /// Parses with themed help and per-command example appendices.
    /// Clap prints and exits on `--help`, `--version` and usage errors.
    fn parse_themed() -> Self {
        let matches = help_command(ShouldColorize::from_env().should_colorize()).get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }

    fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            output_format: self.output.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
            no_color: self.no_color,
        }
    }
}

fn help_command(use_color: bool) -> Command {
    let mut command = Cli::command()
        .styles(help_styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(environment_appendix(use_color));
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            let appendix = examples_appendix(example.groups, use_color);
            *subcommand = subcommand.clone().after_long_help(appendix);
        }
    }
    command
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .header(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().bold())
}

fn examples_appendix(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = format!("{}\n", Tone::Heading.paint("Examples:", use_color));
    let arrow = Tone::Example.paint(ARROW, use_color);
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            buffer.push('\n');
        }
        let _ = writeln!(buffer, "  {}", Tone::Label.paint(group.title, use_color));
        for command in group.commands {
            let _ = writeln!(buffer, "    {arrow} {}", Tone::Example.paint(command, use_color));
        }
    }
    buffer
}

fn environment_appendix(use_color: bool) -> String {
    let mut buffer = format!("{}\n", Tone::Heading.paint("Environment Variables:", use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(
            buffer,
            "  {}  {}",
            Tone::Label.paint(key, use_color),
            Tone::Value.paint(description, use_color)
        );
    }
    let tip = "'optionsfield <command> --help' lists examples for each command.";
    let _ = writeln!(
        buffer,
        "\n{} {}",
        Tone::Heading.paint("Tip:", use_color),
        Tone::Example.paint(tip, use_color)
    );
    buffer
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_themed();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(cli.global_options());
    match execute(cli.command, cli.schema, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Commands, schema: Option<PathBuf>, output: &OutputManager) -> Result<()> {
    let schema = schema.as_ref();
    match command {
        Commands::Check => handle_check(schema, output).await,
        Commands::Schema(schema_cmd) => handle_schema_commands(schema_cmd, schema, output).await,
        Commands::Codec(codec_cmd) => handle_codec_commands(codec_cmd, output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn every_example_names_a_subcommand() {
        let command = Cli::command();
        for example in command_examples() {
            assert!(command.find_subcommand(example.name).is_some(), "{}", example.name);
        }
    }

    #[test]
    fn examples_appendix_lists_commands_plainly() {
        let text = examples_appendix(crate::commands::check::EXAMPLES, false);
        assert!(text.starts_with("Examples:\n"));
        assert!(text.contains(&format!("{ARROW} optionsfield --schema schema.toml check")));
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let args = ["optionsfield", "codec", "read", "--options", "red", "--output", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.global_options().output_format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Codec(_)));
    }
}
