use crate::{
    context::{Context, NodeRef},
    documentation::extract_documentation_text,
    errors::AstError,
    factory::NodeFactory,
    node_kind::NodeKind,
    nodes::{Node, NodeId, SourceLocation, SourceUnit, StructuredDocumentation},
    postprocessing::NodePostprocessor,
    reader::ReaderConfig,
};

/// Recovers documentation the compiler did not attach, using the source text
/// from [`ReaderConfig::sources`]: a doc comment ending right before a
/// documentable node becomes its preceding documentation, and one ending right
/// before the closing brace of a contract or block becomes dangling documentation.
pub struct DocumentationReconstructor;

impl NodePostprocessor for DocumentationReconstructor {
    fn name(&self) -> &'static str {
        "documentation-reconstruction"
    }

    fn is_supported(&self, node: &Node) -> bool {
        let kind = node.kind();
        (kind.has_documentation_slot() || kind.is_documentation_container())
            && !node.src.is_unknown()
    }

    fn process(
        &self,
        id: NodeId,
        context: &mut Context,
        config: &ReaderConfig,
    ) -> Result<bool, AstError> {
        let Some(source) = unit_source(context, config, id) else {
            return Ok(false);
        };
        let mut changed = false;

        if context.documentation(id).is_none()
            && let Some((start, end)) = preceding_gap(context, id)
            && let Some(doc) = doc_comment_in(&source, start, end)
        {
            let doc = make_documentation(context, doc, source_index(context, id))?;
            context.attach_documentation(id, doc)?;
            changed = true;
        }

        let kind = context.node(id)?.kind();
        if kind.is_documentation_container()
            && context.dangling_documentation(id).is_none()
            && let Some((start, end)) = dangling_gap(context, &source, id)
            && let Some(doc) = doc_comment_in(&source, start, end)
        {
            let doc = make_documentation(context, doc, source_index(context, id))?;
            context.attach_dangling_documentation(id, doc)?;
            changed = true;
        }
        Ok(changed)
    }
}

/// A doc comment found in the source: byte range and cleaned-up text.
struct DocComment {
    offset: usize,
    length: usize,
    text: String,
}

fn unit_source(context: &Context, config: &ReaderConfig, id: NodeId) -> Option<String> {
    let mut root = id;
    while let Some(parent) = context.parent(root) {
        root = parent;
    }
    let unit = context.locate_as::<SourceUnit>(root)?;
    config.source_text(unit).map(str::to_string)
}

fn source_index(context: &Context, id: NodeId) -> i64 {
    context.locate(id).map_or(-1, |node| node.src.source_index)
}

fn to_offset(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

/// From the end of the previous sibling (or the start of the parent) to the node's start.
fn preceding_gap(context: &Context, id: NodeId) -> Option<(usize, usize)> {
    let node = context.locate(id)?;
    let start = match context.previous_sibling(id).and_then(|sibling| context.locate(sibling)) {
        Some(sibling) if !sibling.src.is_unknown() => sibling.src.end(),
        _ => context.locate(context.parent(id)?)?.src.offset,
    };
    let start = to_offset(start)?;
    let end = to_offset(node.src.offset)?;
    (start < end).then_some((start, end))
}

/// From the end of the last ordinary child to the closing brace.
fn dangling_gap(context: &Context, source: &str, id: NodeId) -> Option<(usize, usize)> {
    let node = context.locate(id)?;
    let last_child_end = node
        .children()
        .into_iter()
        .filter_map(|child| context.locate(child))
        .filter(|child| {
            child.kind() != NodeKind::StructuredDocumentation && !child.src.is_unknown()
        })
        .map(|child| child.src.end())
        .max();
    let start = to_offset(last_child_end.unwrap_or(node.src.offset))?;
    let end = to_offset(node.src.end() - 1)?;
    (source.as_bytes().get(end) == Some(&b'}') && start < end).then_some((start, end))
}

/// The doc comment that ends `source[start..end]`, allowing only trailing whitespace.
fn doc_comment_in(source: &str, start: usize, end: usize) -> Option<DocComment> {
    let gap = source.get(start..end)?;
    let (relative_start, relative_end) = trailing_doc_comment(gap)?;
    Some(DocComment {
        offset: start + relative_start,
        length: relative_end - relative_start,
        text: extract_documentation_text(&gap[relative_start..relative_end]),
    })
}

fn trailing_doc_comment(gap: &str) -> Option<(usize, usize)> {
    let trimmed = gap.trim_end();
    let end = trimmed.len();

    if trimmed.ends_with("*/") {
        let start = trimmed.rfind("/**")?;
        let body = trimmed.get(start + 3..end - 2)?;
        return (!body.contains("*/") && start + 4 <= end).then_some((start, end));
    }

    let mut start = None;
    let mut cursor = end;
    loop {
        let line_start = trimmed[..cursor].rfind('\n').map_or(0, |newline| newline + 1);
        let line = trimmed[line_start..cursor].trim_start();
        if !line.starts_with("///") {
            break;
        }
        start = Some(cursor - line.len());
        if line_start == 0 {
            break;
        }
        cursor = line_start - 1;
    }
    start.map(|start| (start, end))
}

fn make_documentation(
    context: &mut Context,
    doc: DocComment,
    source_index: i64,
) -> Result<NodeRef, AstError> {
    let src = SourceLocation::new(
        i64::try_from(doc.offset).unwrap_or(-1),
        i64::try_from(doc.length).unwrap_or(-1),
        source_index,
    );
    NodeFactory::new(context).make_at(src, StructuredDocumentation { text: doc.text })
}
