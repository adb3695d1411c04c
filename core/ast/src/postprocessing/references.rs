use crate::{
    context::Context,
    errors::AstError,
    node_kind::NodeKind,
    nodes::{BUILTIN_REFERENCE, Node, NodeData, NodeId},
    postprocessing::NodePostprocessor,
    reader::ReaderConfig,
};

/// Rewrites references that do not resolve in the finished tree to
/// [`BUILTIN_REFERENCE`]. Compilers give builtins such as `msg` or `abi`
/// ids that no declaration carries. Yul identifiers are covered too, since
/// inline assembly expansion links them to the ids its external references name.
pub struct BuiltinReferenceNormalizer;

impl NodePostprocessor for BuiltinReferenceNormalizer {
    fn name(&self) -> &'static str {
        "builtin-reference-normalization"
    }

    fn is_supported(&self, node: &Node) -> bool {
        matches!(
            node.kind(),
            NodeKind::Identifier
                | NodeKind::MemberAccess
                | NodeKind::IdentifierPath
                | NodeKind::UserDefinedTypeName
                | NodeKind::YulIdentifier
        )
    }

    fn process(
        &self,
        id: NodeId,
        context: &mut Context,
        _: &ReaderConfig,
    ) -> Result<bool, AstError> {
        let node = context.node(id)?;
        let Some(reference) = node.data.referenced_declaration() else {
            return Ok(false);
        };
        if reference < 0 || context.locate(reference).is_some() {
            return Ok(false);
        }
        let target = match &mut context.node_mut(id)?.data {
            NodeData::Identifier(identifier) => &mut identifier.referenced_declaration,
            NodeData::MemberAccess(access) => &mut access.referenced_declaration,
            NodeData::IdentifierPath(path) => &mut path.referenced_declaration,
            NodeData::UserDefinedTypeName(name) => &mut name.referenced_declaration,
            NodeData::YulIdentifier(identifier) => &mut identifier.referenced_declaration,
            _ => return Ok(false),
        };
        *target = BUILTIN_REFERENCE;
        Ok(true)
    }
}
