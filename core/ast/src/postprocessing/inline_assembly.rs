use serde_json::Value;

use crate::{
    context::Context,
    errors::AstError,
    nodes::{InlineAssembly, Node, NodeId, YulIdentifier},
    postprocessing::NodePostprocessor,
    reader::{AstFormat, Conversion, ReaderConfig},
};

/// Converts the Yul sub-AST embedded in an `InlineAssembly` record and
/// attaches it as the node's `yul` child. Yul identifiers that name Solidity
/// variables are then linked through the external reference table.
pub struct InlineAssemblyExpander;

impl NodePostprocessor for InlineAssemblyExpander {
    fn name(&self) -> &'static str {
        "inline-assembly-expansion"
    }

    fn is_supported(&self, node: &Node) -> bool {
        node.payload::<InlineAssembly>()
            .is_some_and(|assembly| assembly.yul.is_none())
            && node
                .raw
                .as_ref()
                .and_then(|raw| raw.get("AST"))
                .is_some_and(Value::is_object)
    }

    fn process(
        &self,
        id: NodeId,
        context: &mut Context,
        config: &ReaderConfig,
    ) -> Result<bool, AstError> {
        let Some(ast) = context
            .locate(id)
            .and_then(|node| node.raw.as_ref())
            .and_then(|raw| raw.get("AST"))
            .cloned()
        else {
            return Ok(false);
        };

        context.begin_transaction();
        let converted = Conversion::new(context, config, AstFormat::Modern).convert(&ast);
        let yul = match converted {
            Ok(yul) => {
                context.commit();
                yul
            }
            Err(error) => {
                context.rollback();
                return Err(error);
            }
        };

        let references = {
            let assembly = context
                .locate_as_mut::<InlineAssembly>(id)
                .ok_or(AstError::UnknownNode { id })?;
            assembly.yul = Some(yul);
            assembly.external_references.clone()
        };
        context.set_parent(yul, Some(id));

        for node in context.walk(yul) {
            let Some(src) = context.locate(node).map(|node| node.src) else {
                continue;
            };
            let Some(identifier) = context.locate_as_mut::<YulIdentifier>(node) else {
                continue;
            };
            if identifier.referenced_declaration >= 0 {
                continue;
            }
            if let Some(reference) = references.iter().find(|reference| reference.src == src) {
                identifier.referenced_declaration = reference.declaration;
            }
        }
        Ok(true)
    }
}
