pub mod check;
pub mod codec;
pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use optionsfield::{AssembledList, SchemaConfig};

use crate::output::OutputManager;

/// Loads and assembles the schema file, failing with the path in the message.
pub fn load_lists(schema: Option<&PathBuf>, output: &OutputManager) -> Result<Vec<AssembledList>> {
    let path = schema_path(schema)?;
    output.verbose(&format!("Loading schema from {}", path.display()));
    let config = SchemaConfig::load(path)
        .with_context(|| format!("Failed to load schema file {}", path.display()))?;
    let lists = config
        .assemble()
        .with_context(|| format!("Invalid schema in {}", path.display()))?;
    Ok(lists)
}

fn schema_path(schema: Option<&PathBuf>) -> Result<&Path> {
    schema
        .map(PathBuf::as_path)
        .context("No schema file given; pass --schema or set OPTIONSFIELD_SCHEMA")
}
