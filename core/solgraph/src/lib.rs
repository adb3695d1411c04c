#![warn(clippy::pedantic)]
//! Entry points for reading Solidity compiler AST output.
//!
//! This crate is a thin layer over [`solgraph_ast`]: it accepts compiler output
//! as a JSON string, an already parsed [`serde_json::Value`] or a file on disk,
//! and hands back the [`Context`] that owns every node together with the ids of
//! the source units in source-list order.
//!
//! ```rust,no_run
//! use solgraph::parse_file;
//! use solgraph_ast::nodes::ContractDefinition;
//!
//! let output = parse_file("build/output.json")?;
//! for unit in &output.units {
//!     for id in output.context.walk(*unit) {
//!         if let Some(contract) = output.context.locate_as::<ContractDefinition>(id) {
//!             println!("{}", contract.name);
//!         }
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Both the legacy (`name`/`attributes`/`children`) and the modern (`nodeType`)
//! AST shapes are accepted, and may be mixed within one output.
//!
//! Errors are reported as [`anyhow::Error`] wrapping the underlying
//! [`AstError`], so callers can still downcast to match on the variant.
//!
//! [`AstError`]: solgraph_ast::errors::AstError

use std::path::Path;

use anyhow::Context as _;
use serde_json::Value;
use solgraph_ast::{
    context::Context,
    nodes::NodeId,
    reader::{AstReader, ReaderConfig},
};
use tracing::debug;

/// A fully read and postprocessed group of source units.
#[derive(Debug)]
pub struct ParsedOutput {
    pub context: Context,
    /// Source unit ids ordered by source-list index.
    pub units: Vec<NodeId>,
}

/// Parses compiler output given as JSON text, with the default configuration.
///
/// # Errors
///
/// Returns an error if `json` is not valid JSON or if any unit fails to convert.
pub fn parse(json: &str) -> anyhow::Result<ParsedOutput> {
    parse_with_config(json, ReaderConfig::default())
}

/// # Errors
///
/// See [`parse`].
pub fn parse_with_config(json: &str, config: ReaderConfig) -> anyhow::Result<ParsedOutput> {
    let value: Value = serde_json::from_str(json).context("compiler output is not valid JSON")?;
    parse_value_with_config(&value, config)
}

/// Parses compiler output that has already been deserialized.
///
/// # Errors
///
/// Returns an error if any unit fails to convert; nothing is kept in that case.
pub fn parse_value(output: &Value) -> anyhow::Result<ParsedOutput> {
    parse_value_with_config(output, ReaderConfig::default())
}

/// # Errors
///
/// See [`parse_value`].
pub fn parse_value_with_config(
    output: &Value,
    config: ReaderConfig,
) -> anyhow::Result<ParsedOutput> {
    let mut reader = AstReader::with_config(config);
    let units = reader
        .read(output)
        .context("failed to build the AST graph from compiler output")?;
    let context = reader.into_context();
    debug!(units = units.len(), nodes = context.len(), "compiler output read");
    Ok(ParsedOutput { context, units })
}

/// Reads compiler output from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or for the reasons listed in [`parse`].
pub fn parse_file(path: impl AsRef<Path>) -> anyhow::Result<ParsedOutput> {
    parse_file_with_config(path, ReaderConfig::default())
}

/// # Errors
///
/// See [`parse_file`].
pub fn parse_file_with_config(
    path: impl AsRef<Path>,
    config: ReaderConfig,
) -> anyhow::Result<ParsedOutput> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_with_config(&json, config).with_context(|| format!("while reading {}", path.display()))
}
