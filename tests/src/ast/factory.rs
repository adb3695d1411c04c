use crate::utils::{assert_tree_consistency, parse_fixture};
use solgraph_ast::{
    context::Context,
    errors::AstError,
    factory::NodeFactory,
    node_kind::NodeKind,
    nodes::{
        BUILTIN_REFERENCE, Block, ContractDefinition, ExpressionStatement, Identifier, LiteralKind,
        SourceLocation,
        VariableDeclaration, VariableDeclarationStatement,
    },
};

#[test]
fn test_identifier_for_declaration() -> anyhow::Result<()> {
    let mut context = Context::new();
    let mut factory = NodeFactory::new(&mut context);
    let uint = factory.elementary_type_name("uint256")?;
    let declaration = factory.variable_declaration("balance", uint.id, BUILTIN_REFERENCE)?;
    let usage = factory.identifier_for(declaration.id)?;
    let literal = factory.literal(LiteralKind::Number, "1", "int_const 1")?;

    let identifier = context.locate_as::<Identifier>(usage.id).unwrap();
    assert_eq!(identifier.name, "balance");
    assert_eq!(identifier.type_string, "uint256");
    assert_eq!(identifier.referenced_declaration, declaration.id);

    let mut factory = NodeFactory::new(&mut context);
    assert_eq!(
        factory.identifier_for(literal.id).unwrap_err(),
        AstError::KindMismatch {
            id: literal.id,
            expected: NodeKind::VariableDeclaration,
            found: NodeKind::Literal,
        }
    );
    assert_eq!(
        factory.identifier_for(999).unwrap_err(),
        AstError::UnknownNode { id: 999 }
    );
    Ok(())
}

#[test]
fn test_factory_nodes_join_parsed_trees() -> anyhow::Result<()> {
    let mut output = parse_fixture("storage_modern.json");
    let context = &mut output.context;

    let mut factory = NodeFactory::new(context);
    let uint = factory.elementary_type_name("uint256")?;
    let variable = factory.variable_declaration("limit", uint.id, 3)?;
    assert!(uint.id > 4);
    assert!(variable.id > uint.id);

    context.append_child(3, variable)?;
    assert_eq!(
        context.locate_as::<ContractDefinition>(3).unwrap().nodes,
        vec![2, variable.id]
    );
    assert_eq!(
        context.closest_parent_of_kind(uint.id, NodeKind::SourceUnit),
        Some(4)
    );
    let located = context.locate(variable.id).unwrap();
    assert_eq!(located.context(), Some(context.id()));
    assert!(located.src.is_unknown());
    assert_eq!(
        context.locate_as::<VariableDeclaration>(variable.id).unwrap().type_string,
        "uint256"
    );
    assert_eq!(context.walk(4).len(), 6);
    assert_tree_consistency(context);
    Ok(())
}

#[test]
fn test_make_at_keeps_location() -> anyhow::Result<()> {
    let mut context = Context::new();
    let block = NodeFactory::new(&mut context).make_at(
        SourceLocation::new(10, 20, 1),
        Block {
            doc_string: None,
            dangling_doc_string: None,
            statements: Vec::new(),
        },
    )?;
    assert_eq!(
        context.locate(block.id).unwrap().src,
        SourceLocation::new(10, 20, 1)
    );
    assert_eq!(context.locate(block.id).unwrap().raw, None);
    Ok(())
}

#[test]
fn test_make_rejects_attached_children() -> anyhow::Result<()> {
    let mut context = Context::new();
    let mut factory = NodeFactory::new(&mut context);
    let name = factory.identifier("a", "uint256", BUILTIN_REFERENCE)?;
    let statement = factory.expression_statement(name.id)?;
    assert_eq!(
        factory.expression_statement(name.id).unwrap_err(),
        AstError::AlreadyAttached {
            id: name.id,
            parent: statement.id
        }
    );
    assert_eq!(
        factory.block(vec![12_345]).unwrap_err(),
        AstError::UnknownNode { id: 12_345 }
    );
    assert_eq!(context.len(), 2);
    Ok(())
}

#[test]
fn test_copy_remaps_references_inside_the_subtree() -> anyhow::Result<()> {
    let mut context = Context::new();
    let mut factory = NodeFactory::new(&mut context);
    let outer_type = factory.elementary_type_name("uint256")?;
    let outer = factory.variable_declaration("outer", outer_type.id, BUILTIN_REFERENCE)?;

    let inner_type = factory.elementary_type_name("uint256")?;
    let inner = factory.variable_declaration("inner", inner_type.id, BUILTIN_REFERENCE)?;
    let declare = factory.make(VariableDeclarationStatement {
        assignments: vec![Some(inner.id)],
        documentation: None,
        declarations: vec![inner.id],
        initial_value: None,
    })?;
    let left = factory.identifier_for(inner.id)?;
    let right = factory.identifier_for(outer.id)?;
    let assign = factory.assignment("=", left.id, right.id)?;
    let assign = factory.expression_statement(assign.id)?;
    let block = factory.block(vec![declare.id, assign.id])?;
    let size = context.walk(block.id).len();

    let copy = NodeFactory::new(&mut context).copy(block)?;
    let copied = context.walk(copy.id);
    assert_eq!(copied.len(), size);
    assert_eq!(context.parent(copy.id), None);
    for id in &copied {
        assert!(!context.walk(block.id).contains(id));
    }

    let statements = &context.locate_as::<Block>(copy.id).unwrap().statements;
    let declare_copy = context
        .locate_as::<VariableDeclarationStatement>(statements[0])
        .unwrap();
    let inner_copy = declare_copy.declarations[0];
    assert_ne!(inner_copy, inner.id);
    assert_eq!(declare_copy.assignments, vec![Some(inner_copy)]);

    let identifiers: Vec<_> = copied
        .iter()
        .filter_map(|id| context.locate_as::<Identifier>(*id))
        .map(|identifier| identifier.referenced_declaration)
        .collect();
    assert_eq!(identifiers, vec![inner_copy, outer.id]);
    assert_tree_consistency(&context);
    Ok(())
}

#[test]
fn test_make_with_rejects_children_of_another_context() -> anyhow::Result<()> {
    let mut other = Context::new();
    let foreign = NodeFactory::new(&mut other).identifier("a", "uint256", BUILTIN_REFERENCE)?;

    let mut context = Context::new();
    let context_id = context.id();
    let mut factory = NodeFactory::new(&mut context);
    let local = factory.identifier("b", "uint256", BUILTIN_REFERENCE)?;
    assert_eq!(foreign.id, local.id);

    let statement = ExpressionStatement {
        documentation: None,
        expression: foreign.id,
    };
    assert_eq!(
        factory.make_with(&[foreign], statement.clone()).unwrap_err(),
        AstError::ContextMismatch {
            id: foreign.id,
            expected: context_id,
            found: other.id(),
        }
    );
    assert_eq!(context.len(), 1);
    assert_eq!(context.parent(local.id), None);

    let made = NodeFactory::new(&mut context).make_with(&[local], statement)?;
    assert_eq!(context.children(made.id), vec![local.id]);
    assert_tree_consistency(&context);
    Ok(())
}
