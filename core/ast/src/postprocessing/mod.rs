//! Whole-tree fix-up passes run after a group of units has been read.
//!
//! The order of [`default_postprocessors`] matters: inline assembly is expanded
//! before references are normalized, because the expanded Yul code introduces
//! nodes the normalizer must see, and documentation is reconstructed last so
//! it sees the final tree.

mod documentation;
mod inline_assembly;
mod references;

use tracing::debug;

pub use self::{
    documentation::DocumentationReconstructor, inline_assembly::InlineAssemblyExpander,
    references::BuiltinReferenceNormalizer,
};
use crate::{
    context::Context,
    errors::AstError,
    nodes::{Node, NodeId},
    reader::ReaderConfig,
};

/// One postprocessing pass.
pub trait NodePostprocessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_supported(&self, node: &Node) -> bool;

    /// Processes one supported node and reports whether it changed anything.
    ///
    /// # Errors
    ///
    /// Errors signal a broken invariant and abort the pipeline.
    fn process(
        &self,
        id: NodeId,
        context: &mut Context,
        config: &ReaderConfig,
    ) -> Result<bool, AstError>;
}

/// The default pipeline, in the order the passes must run.
#[must_use]
pub fn default_postprocessors() -> Vec<Box<dyn NodePostprocessor>> {
    vec![
        Box::new(InlineAssemblyExpander),
        Box::new(BuiltinReferenceNormalizer),
        Box::new(DocumentationReconstructor),
    ]
}

/// Runs `passes` in order over every node reachable from `units`. Each pass
/// sees the tree as the previous passes left it.
///
/// # Errors
///
/// Returns the first error a pass raises.
pub fn run(
    passes: &[Box<dyn NodePostprocessor>],
    context: &mut Context,
    config: &ReaderConfig,
    units: &[NodeId],
) -> Result<(), AstError> {
    for pass in passes {
        let mut touched = 0usize;
        for unit in units {
            for id in context.walk(*unit) {
                let supported = context
                    .locate(id)
                    .is_some_and(|node| pass.is_supported(node));
                if supported && pass.process(id, context, config)? {
                    touched += 1;
                }
            }
        }
        debug!(pass = pass.name(), touched, "postprocessing pass finished");
    }
    Ok(())
}
