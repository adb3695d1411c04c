//! Conversion of raw compiler output into typed nodes.
//!
//! A unit is read in one of two shapes. Legacy output nests scalars under
//! `attributes` and children under `children`; modern output flattens fields
//! onto the record. The shape is detected once per unit and every record is
//! dispatched through [`NodeKind::processor`].

pub(crate) mod legacy;
pub(crate) mod modern;
pub(crate) mod raw;

use core::fmt;
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    context::Context,
    errors::AstError,
    node_kind::NodeKind,
    nodes::{Node, NodeData, NodeId, SourceUnit},
    postprocessing::{self, NodePostprocessor, default_postprocessors},
};

/// Extracts the payload of one kind from a raw record, converting child records on the way.
pub(crate) type Processor = fn(&mut Conversion<'_>, &Value) -> Result<NodeData, AstError>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AstFormat {
    Legacy,
    Modern,
}

impl AstFormat {
    /// Detects the shape of a root record.
    #[must_use]
    pub fn detect(root: &Value) -> Option<Self> {
        if root.get("nodeType").is_some_and(Value::is_string) {
            Some(AstFormat::Modern)
        } else if root.get("name").is_some_and(Value::is_string)
            && (root.get("attributes").is_some() || root.get("children").is_some())
        {
            Some(AstFormat::Legacy)
        } else {
            None
        }
    }

    fn tag(self) -> &'static str {
        match self {
            AstFormat::Legacy => "name",
            AstFormat::Modern => "nodeType",
        }
    }
}

impl Display for AstFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AstFormat::Legacy => f.write_str("legacy"),
            AstFormat::Modern => f.write_str("modern"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Deepest nesting of raw records accepted before the read fails.
    pub max_depth: usize,
    /// Keep each node's raw record (without nested node records).
    pub keep_raw: bool,
    /// Run the default postprocessing pipeline after reading.
    pub postprocess: bool,
    /// Source text keyed by source entry key or absolute path.
    pub sources: BTreeMap<String, String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            keep_raw: true,
            postprocess: true,
            sources: BTreeMap::new(),
        }
    }
}

impl ReaderConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_keep_raw(mut self, keep_raw: bool) -> Self {
        self.keep_raw = keep_raw;
        self
    }

    #[must_use]
    pub fn with_postprocess(mut self, postprocess: bool) -> Self {
        self.postprocess = postprocess;
        self
    }

    #[must_use]
    pub fn with_source(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(key.into(), text.into());
        self
    }

    #[must_use]
    pub(crate) fn source_text(&self, unit: &SourceUnit) -> Option<&str> {
        self.sources
            .get(&unit.source_entry_key)
            .or_else(|| self.sources.get(&unit.absolute_path))
            .map(String::as_str)
    }
}

/// State of one recursive conversion.
pub(crate) struct Conversion<'a> {
    pub(crate) context: &'a mut Context,
    pub(crate) config: &'a ReaderConfig,
    pub(crate) format: AstFormat,
    depth: usize,
}

impl<'a> Conversion<'a> {
    pub(crate) fn new(context: &'a mut Context, config: &'a ReaderConfig, format: AstFormat) -> Self {
        Self {
            context,
            config,
            format,
            depth: 0,
        }
    }

    /// Converts one raw record and registers the resulting node.
    pub(crate) fn convert(&mut self, raw: &Value) -> Result<NodeId, AstError> {
        if self.depth >= self.config.max_depth {
            return Err(AstError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        let tag = raw
            .get(self.format.tag())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AstError::malformed("<record>", format!("missing `{}` tag", self.format.tag()))
            })?;
        let unsupported = || AstError::UnsupportedNodeKind {
            kind: tag.to_string(),
            format: self.format,
        };
        let kind: NodeKind = tag.parse().map_err(|_| unsupported())?;
        let processor = kind.processor(self.format).ok_or_else(unsupported)?;

        let id = match raw::id(raw)? {
            Some(id) => id,
            None => self.context.next_id(),
        };
        let src = raw::src(raw)?;

        self.depth += 1;
        let data = processor(self, raw);
        self.depth -= 1;
        let data = data?;

        let payload = (self.config.keep_raw || kind == NodeKind::InlineAssembly)
            .then(|| raw::shallow(raw, self.format));
        self.context.register(Node::new(id, src, data, payload))?;
        trace!(id, %kind, "converted record");
        Ok(id)
    }

    pub(crate) fn convert_opt(&mut self, raw: Option<&Value>) -> Result<Option<NodeId>, AstError> {
        match raw {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => self.convert(raw).map(Some),
        }
    }

    pub(crate) fn convert_array(&mut self, raw: Option<&Value>) -> Result<Vec<NodeId>, AstError> {
        match raw {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|item| self.convert(item)).collect(),
            Some(other) => Err(AstError::malformed(
                raw::tag(other),
                "expected an array of node records",
            )),
        }
    }

    /// Converts an array that may contain `null` holes.
    pub(crate) fn convert_sparse(
        &mut self,
        raw: Option<&Value>,
    ) -> Result<Vec<Option<NodeId>>, AstError> {
        match raw {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| self.convert_opt(Some(item)))
                .collect(),
            Some(other) => Err(AstError::malformed(
                raw::tag(other),
                "expected an array of node records",
            )),
        }
    }
}

/// Builds typed graphs from compiler output into one shared [`Context`].
pub struct AstReader {
    context: Context,
    config: ReaderConfig,
    postprocessors: Vec<Box<dyn NodePostprocessor>>,
}

impl Default for AstReader {
    fn default() -> Self {
        Self::new()
    }
}

impl AstReader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ReaderConfig) -> Self {
        Self::with_context(Context::new(), config)
    }

    /// Reads further units into an existing context.
    #[must_use]
    pub fn with_context(context: Context, config: ReaderConfig) -> Self {
        Self {
            context,
            config,
            postprocessors: default_postprocessors(),
        }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    #[must_use]
    pub fn into_context(self) -> Context {
        self.context
    }

    /// Converts every unit in `output` and runs the postprocessing pipeline.
    /// On failure nothing registered by this call stays in the context.
    ///
    /// Accepts a compiler output object with a `sources` map, an array of
    /// unit roots, or a single unit root.
    ///
    /// # Errors
    ///
    /// Returns the first [`AstError`] raised by conversion or postprocessing.
    pub fn read(&mut self, output: &Value) -> Result<Vec<NodeId>, AstError> {
        let entries = raw::unit_entries(output)?;
        self.context.begin_transaction();
        match self.read_entries(&entries) {
            Ok(units) => {
                self.context.commit();
                Ok(units)
            }
            Err(error) => {
                self.context.rollback();
                Err(error)
            }
        }
    }

    /// Re-runs the postprocessing pipeline over `units`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns the first error a pass raises.
    pub fn postprocess(&mut self, units: &[NodeId]) -> Result<(), AstError> {
        postprocessing::run(
            &self.postprocessors,
            &mut self.context,
            &self.config,
            units,
        )
    }

    fn read_entries(&mut self, entries: &[raw::UnitEntry<'_>]) -> Result<Vec<NodeId>, AstError> {
        let mut units = Vec::with_capacity(entries.len());
        for entry in entries {
            let format = AstFormat::detect(entry.root).ok_or_else(|| {
                AstError::malformed(
                    "SourceUnit",
                    format!("`{}` is neither a legacy nor a modern AST", entry.key),
                )
            })?;
            let before = self.context.len();
            let id = Conversion::new(&mut self.context, &self.config, format).convert(entry.root)?;
            let unit = self.context.locate_as_mut::<SourceUnit>(id).ok_or_else(|| {
                AstError::malformed(&entry.key, "root record is not a SourceUnit")
            })?;
            unit.source_entry_key.clone_from(&entry.key);
            if let Some(index) = entry.index {
                unit.source_list_index = index;
            }
            debug!(
                key = %entry.key,
                %format,
                nodes = self.context.len() - before,
                "converted source unit"
            );
            units.push(id);
        }
        units.sort_by_key(|id| {
            self.context
                .locate_as::<SourceUnit>(*id)
                .map_or(i64::MAX, |unit| unit.source_list_index)
        });
        if self.config.postprocess {
            self.postprocess(&units)?;
        }
        Ok(units)
    }
}

/// Reads `output` into a fresh context with the default configuration.
///
/// # Errors
///
/// See [`AstReader::read`].
pub fn read_compiler_output(output: &Value) -> Result<(Context, Vec<NodeId>), AstError> {
    let mut reader = AstReader::new();
    let units = reader.read(output)?;
    Ok((reader.into_context(), units))
}
