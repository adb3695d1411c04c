use solgraph_ast::{
    context::{Context, NodeRef},
    documentation::extract_documentation_text,
    errors::AstError,
    factory::NodeFactory,
    node_kind::NodeKind,
    nodes::{
        BUILTIN_REFERENCE, Block, Documentation, LiteralKind, SourceLocation,
        StructuredDocumentation, VariableDeclaration,
    },
};

fn doc_at(context: &mut Context, offset: i64, text: &str) -> NodeRef {
    NodeFactory::new(context)
        .make_at(
            SourceLocation::new(offset, 5, 0),
            StructuredDocumentation {
                text: text.to_string(),
            },
        )
        .unwrap()
}

fn block_at_100(context: &mut Context) -> NodeRef {
    NodeFactory::new(context)
        .make_at(
            SourceLocation::new(100, 100, 0),
            Block {
                doc_string: None,
                dangling_doc_string: None,
                statements: Vec::new(),
            },
        )
        .unwrap()
}

#[test]
fn test_container_documentation_placement() -> anyhow::Result<()> {
    let mut context = Context::new();
    let block = block_at_100(&mut context);
    let before = doc_at(&mut context, 90, "before");
    let after = doc_at(&mut context, 205, "after");
    context.append_child(block.id, before)?;
    context.append_child(block.id, after)?;

    assert_eq!(
        context.documentation(block.id),
        Some(Documentation::Node(before.id))
    );
    assert_eq!(
        context.dangling_documentation(block.id),
        Some(Documentation::Node(after.id))
    );
    Ok(())
}

#[test]
fn test_container_without_documentation() {
    let mut context = Context::new();
    let block = block_at_100(&mut context);
    assert_eq!(context.documentation(block.id), None);
    assert_eq!(context.dangling_documentation(block.id), None);
}

#[test]
fn test_container_text_and_node_forms() -> anyhow::Result<()> {
    let mut context = Context::new();
    let block = block_at_100(&mut context);
    let before = doc_at(&mut context, 90, "before");
    let after = doc_at(&mut context, 205, "after");
    context.append_child(block.id, before)?;
    context.append_child(block.id, after)?;

    context.set_documentation_text(block.id, Some("plain".to_string()))?;
    assert_eq!(
        context.documentation(block.id),
        Some(Documentation::Text("plain".to_string()))
    );
    assert_eq!(context.parent(before.id), None);
    assert_eq!(context.children(block.id), vec![after.id]);

    context.set_dangling_documentation_text(block.id, Some("tail".to_string()))?;
    assert_eq!(
        context.dangling_documentation(block.id),
        Some(Documentation::Text("tail".to_string()))
    );
    assert!(context.children(block.id).is_empty());

    context.attach_documentation(block.id, before)?;
    assert_eq!(
        context.documentation(block.id),
        Some(Documentation::Node(before.id))
    );
    assert_eq!(
        context.locate_as::<Block>(block.id).unwrap().doc_string,
        None
    );
    assert_eq!(context.children(block.id), vec![before.id]);

    context.attach_dangling_documentation(block.id, after)?;
    assert_eq!(
        context.dangling_documentation(block.id),
        Some(Documentation::Node(after.id))
    );
    assert_eq!(context.children(block.id), vec![before.id, after.id]);

    context.set_documentation_text(block.id, None)?;
    assert_eq!(context.documentation(block.id), None);
    Ok(())
}

#[test]
fn test_slot_documentation_forms() -> anyhow::Result<()> {
    let mut context = Context::new();
    let mut factory = NodeFactory::new(&mut context);
    let uint = factory.elementary_type_name("uint256")?;
    let variable = factory.variable_declaration("total", uint.id, BUILTIN_REFERENCE)?;
    let first = factory.structured_documentation("@notice first")?;
    let second = factory.structured_documentation("@notice second")?;

    context.set_documentation_text(variable.id, Some("@dev text".to_string()))?;
    assert_eq!(
        context.locate_as::<VariableDeclaration>(variable.id).unwrap().documentation,
        Some(Documentation::Text("@dev text".to_string()))
    );

    context.attach_documentation(variable.id, first)?;
    assert_eq!(
        context.documentation(variable.id),
        Some(Documentation::Node(first.id))
    );
    assert_eq!(context.parent(first.id), Some(variable.id));
    assert_eq!(context.children(variable.id), vec![first.id, uint.id]);

    context.attach_documentation(variable.id, second)?;
    assert_eq!(
        context.documentation(variable.id),
        Some(Documentation::Node(second.id))
    );
    assert_eq!(context.parent(first.id), None);
    assert!(context.locate(first.id).is_some());
    Ok(())
}

#[test]
fn test_documentation_on_unsupported_kind() -> anyhow::Result<()> {
    let mut context = Context::new();
    let mut factory = NodeFactory::new(&mut context);
    let literal = factory.literal(LiteralKind::Number, "1", "int_const 1")?;
    let uint = factory.elementary_type_name("uint256")?;
    let variable = factory.variable_declaration("total", uint.id, BUILTIN_REFERENCE)?;

    assert_eq!(
        context
            .set_documentation_text(literal.id, Some("nope".to_string()))
            .unwrap_err(),
        AstError::DocumentationUnsupported {
            id: literal.id,
            kind: NodeKind::Literal,
            flavour: "preceding",
        }
    );
    assert_eq!(
        context
            .set_dangling_documentation_text(variable.id, Some("nope".to_string()))
            .unwrap_err(),
        AstError::DocumentationUnsupported {
            id: variable.id,
            kind: NodeKind::VariableDeclaration,
            flavour: "dangling",
        }
    );
    assert_eq!(context.documentation(literal.id), None);
    Ok(())
}

#[test]
fn test_documentation_slot_only_takes_documentation_nodes() -> anyhow::Result<()> {
    let mut context = Context::new();
    let mut factory = NodeFactory::new(&mut context);
    let uint = factory.elementary_type_name("uint256")?;
    let variable = factory.variable_declaration("total", uint.id, BUILTIN_REFERENCE)?;
    let literal = factory.literal(LiteralKind::Number, "1", "int_const 1")?;
    let doc = factory.structured_documentation("@notice total")?;

    assert_eq!(
        context.attach_documentation(variable.id, literal).unwrap_err(),
        AstError::KindMismatch {
            id: literal.id,
            expected: NodeKind::StructuredDocumentation,
            found: NodeKind::Literal,
        }
    );

    context.attach_documentation(variable.id, doc)?;
    assert_eq!(
        context.replace_child(variable.id, literal, doc.id).unwrap_err(),
        AstError::KindMismatch {
            id: literal.id,
            expected: NodeKind::StructuredDocumentation,
            found: NodeKind::Literal,
        }
    );
    assert_eq!(context.parent(doc.id), Some(variable.id));
    assert_eq!(context.parent(literal.id), None);
    Ok(())
}

#[test]
fn test_comment_markers_are_stripped() {
    assert_eq!(
        extract_documentation_text("/**\n * @notice Adds\n * @param a first\n */"),
        "@notice Adds\n@param a first"
    );
    assert_eq!(
        extract_documentation_text("/// @title Counter"),
        "@title Counter"
    );
}
