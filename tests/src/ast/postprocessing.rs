use crate::utils::{
    assert_tree_consistency, load_source, parse_fixture, parse_fixture_with, snapshot,
};
use serde_json::{Value, json};
use solgraph_ast::{
    context::Context,
    errors::AstError,
    node_kind::NodeKind,
    nodes::{
        BUILTIN_REFERENCE, Documentation, Identifier, IdentifierPath, InlineAssembly,
        MemberAccess, StructuredDocumentation, UserDefinedTypeName, YulIdentifier,
    },
    postprocessing::{
        self, BuiltinReferenceNormalizer, InlineAssemblyExpander, NodePostprocessor,
        default_postprocessors,
    },
    reader::{AstFormat, AstReader, ReaderConfig},
};

fn counter_with_sources() -> ReaderConfig {
    ReaderConfig::default().with_source("counter.sol", load_source("counter.sol"))
}

fn doc_text(context: &Context, doc: Option<Documentation>) -> String {
    match doc {
        Some(Documentation::Node(id)) => context
            .locate_as::<StructuredDocumentation>(id)
            .unwrap()
            .text
            .clone(),
        Some(Documentation::Text(text)) => text,
        None => panic!("no documentation"),
    }
}

fn assembly_unit(yul: &Value) -> Value {
    assembly_unit_referencing(yul, 32)
}

fn assembly_unit_referencing(yul: &Value, declaration: i64) -> Value {
    json!({
        "id": 100,
        "nodeType": "SourceUnit",
        "absolutePath": "assembly.sol",
        "src": "0:200:0",
        "nodes": [{
            "id": 20,
            "nodeType": "FunctionDefinition",
            "name": "g",
            "kind": "freeFunction",
            "scope": 100,
            "stateMutability": "pure",
            "visibility": "internal",
            "src": "0:120:0",
            "modifiers": [],
            "parameters": { "id": 21, "nodeType": "ParameterList", "parameters": [], "src": "10:2:0" },
            "returnParameters": { "id": 22, "nodeType": "ParameterList", "parameters": [], "src": "13:0:0" },
            "body": {
                "id": 30,
                "nodeType": "Block",
                "src": "14:100:0",
                "statements": [
                    {
                        "id": 33,
                        "nodeType": "VariableDeclarationStatement",
                        "assignments": [32],
                        "src": "20:10:0",
                        "declarations": [{
                            "id": 32,
                            "nodeType": "VariableDeclaration",
                            "name": "v",
                            "scope": 30,
                            "stateVariable": false,
                            "storageLocation": "default",
                            "visibility": "internal",
                            "src": "20:9:0",
                            "typeDescriptions": { "typeString": "uint256" },
                            "typeName": {
                                "id": 31,
                                "nodeType": "ElementaryTypeName",
                                "name": "uint256",
                                "src": "20:7:0",
                                "typeDescriptions": { "typeString": "uint256" }
                            }
                        }]
                    },
                    {
                        "id": 34,
                        "nodeType": "InlineAssembly",
                        "src": "40:60:0",
                        "evmVersion": "paris",
                        "externalReferences": [{
                            "declaration": declaration,
                            "isOffset": false,
                            "isSlot": false,
                            "src": "60:1:0",
                            "valueSize": 1
                        }],
                        "AST": yul
                    }
                ]
            }
        }]
    })
}

fn assign_to_v() -> Value {
    json!({
        "nodeType": "YulBlock",
        "src": "49:51:0",
        "statements": [{
            "nodeType": "YulAssignment",
            "src": "60:6:0",
            "variableNames": [{ "nodeType": "YulIdentifier", "name": "v", "src": "60:1:0" }],
            "value": { "nodeType": "YulLiteral", "kind": "number", "value": "2", "type": "", "src": "65:1:0" }
        }]
    })
}

fn state_variable(id: i64, type_name: &Value, value: &Value) -> Value {
    json!({
        "id": id,
        "nodeType": "VariableDeclaration",
        "name": format!("v{id}"),
        "constant": false,
        "scope": 50,
        "stateVariable": true,
        "storageLocation": "default",
        "visibility": "internal",
        "src": "20:10:0",
        "typeDescriptions": { "typeString": "uint256" },
        "typeName": type_name,
        "value": value
    })
}

fn identifier(id: i64, referenced_declaration: i64) -> Value {
    json!({
        "id": id,
        "nodeType": "Identifier",
        "name": "x",
        "referencedDeclaration": referenced_declaration,
        "src": "28:1:0",
        "typeDescriptions": { "typeString": "uint256" }
    })
}

fn user_type(id: i64, referenced_declaration: i64, path: &Value) -> Value {
    json!({
        "id": id,
        "nodeType": "UserDefinedTypeName",
        "referencedDeclaration": referenced_declaration,
        "pathNode": path,
        "src": "20:5:0",
        "typeDescriptions": { "typeString": "contract C" }
    })
}

fn path(id: i64, referenced_declaration: i64) -> Value {
    json!({
        "id": id,
        "nodeType": "IdentifierPath",
        "name": "C",
        "referencedDeclaration": referenced_declaration,
        "src": "20:1:0"
    })
}

fn references_unit() -> Value {
    json!({
        "id": 100,
        "nodeType": "SourceUnit",
        "absolutePath": "references.sol",
        "src": "0:200:0",
        "nodes": [{
            "id": 50,
            "nodeType": "ContractDefinition",
            "name": "C",
            "contractKind": "contract",
            "abstract": false,
            "linearizedBaseContracts": [50],
            "scope": 100,
            "baseContracts": [],
            "src": "0:200:0",
            "nodes": [
                state_variable(52, &user_type(51, 777, &path(53, 888)), &identifier(54, 999)),
                state_variable(56, &user_type(55, 50, &path(57, 50)), &identifier(58, 52)),
                state_variable(60, &user_type(59, -3, &path(61, -4)), &identifier(62, -42))
            ]
        }]
    })
}

fn yul_reference(context: &Context) -> i64 {
    let identifiers = context.nodes_of_kind(NodeKind::YulIdentifier);
    assert_eq!(identifiers.len(), 1);
    context
        .locate_as::<YulIdentifier>(identifiers[0])
        .unwrap()
        .referenced_declaration
}

#[test]
fn test_expanded_assembly_references_are_normalized() -> anyhow::Result<()> {
    let unit = assembly_unit_referencing(&assign_to_v(), 999);
    let mut reader = AstReader::new();
    reader.read(&unit)?;
    assert_eq!(yul_reference(reader.context()), BUILTIN_REFERENCE);

    let config = ReaderConfig::default().with_postprocess(false);
    let mut reader = AstReader::with_config(config.clone());
    let units = reader.read(&unit)?;
    let normalize_first: Vec<Box<dyn NodePostprocessor>> = vec![
        Box::new(BuiltinReferenceNormalizer),
        Box::new(InlineAssemblyExpander),
    ];
    postprocessing::run(&normalize_first, reader.context_mut(), &config, &units)?;
    assert_eq!(yul_reference(reader.context()), 999);
    Ok(())
}

#[test]
fn test_reference_normalization_by_kind() -> anyhow::Result<()> {
    let mut reader = AstReader::new();
    reader.read(&references_unit())?;
    let context = reader.context();
    let identifier = |id| context.locate_as::<Identifier>(id).unwrap().referenced_declaration;
    let path = |id| context.locate_as::<IdentifierPath>(id).unwrap().referenced_declaration;
    let user_type = |id| {
        context
            .locate_as::<UserDefinedTypeName>(id)
            .unwrap()
            .referenced_declaration
    };

    assert_eq!(identifier(54), BUILTIN_REFERENCE);
    assert_eq!(path(53), BUILTIN_REFERENCE);
    assert_eq!(user_type(51), BUILTIN_REFERENCE);

    assert_eq!(identifier(58), 52);
    assert_eq!(path(57), 50);
    assert_eq!(user_type(55), 50);
    assert_eq!(context.referenced_declaration(55).unwrap().id, 50);

    assert_eq!(identifier(62), -42);
    assert_eq!(path(61), -4);
    assert_eq!(user_type(59), -3);
    Ok(())
}

#[test]
fn test_reference_normalization_is_idempotent() -> anyhow::Result<()> {
    let config = ReaderConfig::default().with_postprocess(false);
    let mut reader = AstReader::with_config(config);
    let units = reader.read(&references_unit())?;
    let untouched = snapshot(reader.context());

    let pipeline = default_postprocessors();
    postprocessing::run(&pipeline, reader.context_mut(), &ReaderConfig::default(), &units)?;
    let once = snapshot(reader.context());
    assert_ne!(once, untouched);

    postprocessing::run(&pipeline, reader.context_mut(), &ReaderConfig::default(), &units)?;
    assert_eq!(snapshot(reader.context()), once);
    assert_eq!(
        reader.context().locate_as::<Identifier>(54).unwrap().referenced_declaration,
        BUILTIN_REFERENCE
    );
    Ok(())
}

#[test]
fn test_inline_assembly_is_expanded_and_linked() {
    let mut reader = AstReader::new();
    let units = reader.read(&assembly_unit(&assign_to_v())).unwrap();
    let context = reader.context();
    assert_eq!(units, vec![100]);

    let yul = context.locate_as::<InlineAssembly>(34).unwrap().yul.unwrap();
    assert_eq!(context.locate(yul).unwrap().kind(), NodeKind::YulBlock);
    assert_eq!(context.parent(yul), Some(34));
    assert_eq!(context.children(34), vec![yul]);
    assert_eq!(
        context.closest_parent_of_kind(yul, NodeKind::FunctionDefinition),
        Some(20)
    );

    let identifiers = context.nodes_of_kind(NodeKind::YulIdentifier);
    assert_eq!(identifiers.len(), 1);
    assert_eq!(
        context.locate_as::<YulIdentifier>(identifiers[0]).unwrap().referenced_declaration,
        32
    );
    assert_eq!(context.referenced_declaration(identifiers[0]).unwrap().id, 32);
    assert_tree_consistency(context);
}

#[test]
fn test_inline_assembly_without_raw_payloads_is_expanded() {
    let mut reader = AstReader::with_config(ReaderConfig::default().with_keep_raw(false));
    reader.read(&assembly_unit(&assign_to_v())).unwrap();
    let context = reader.context();
    assert!(context.locate_as::<InlineAssembly>(34).unwrap().yul.is_some());
    assert!(context.locate(33).unwrap().raw.is_none());
}

#[test]
fn test_broken_yul_rolls_back_the_read() {
    let yul = json!({
        "nodeType": "YulBlock",
        "src": "49:51:0",
        "statements": [{ "nodeType": "YulFrobnicate", "src": "60:1:0" }]
    });
    let mut reader = AstReader::new();
    let error = reader.read(&assembly_unit(&yul)).unwrap_err();
    assert_eq!(
        error,
        AstError::UnsupportedNodeKind {
            kind: "YulFrobnicate".to_string(),
            format: AstFormat::Modern,
        }
    );
    assert!(reader.context().is_empty());
}

#[test]
fn test_dangling_references_become_builtin() {
    let unit = json!({
        "id": 100,
        "nodeType": "SourceUnit",
        "absolutePath": "builtins.sol",
        "src": "0:40:0",
        "nodes": [{
            "id": 4,
            "nodeType": "ExpressionStatement",
            "src": "0:11:0",
            "expression": {
                "id": 3,
                "nodeType": "MemberAccess",
                "memberName": "sender",
                "referencedDeclaration": 4242,
                "src": "0:10:0",
                "typeDescriptions": { "typeString": "address" },
                "expression": {
                    "id": 2,
                    "nodeType": "Identifier",
                    "name": "msg",
                    "referencedDeclaration": -15,
                    "src": "0:3:0",
                    "typeDescriptions": { "typeString": "msg" }
                }
            }
        }]
    });

    let mut reader = AstReader::new();
    reader.read(&unit).unwrap();
    let context = reader.context();
    assert_eq!(
        context.locate_as::<MemberAccess>(3).unwrap().referenced_declaration,
        BUILTIN_REFERENCE
    );
    assert_eq!(
        context.locate_as::<Identifier>(2).unwrap().referenced_declaration,
        -15
    );
    assert!(context.referenced_declaration(3).is_none());

    let mut raw_reader = AstReader::with_config(ReaderConfig::default().with_postprocess(false));
    raw_reader.read(&unit).unwrap();
    assert_eq!(
        raw_reader
            .context()
            .locate_as::<MemberAccess>(3)
            .unwrap()
            .referenced_declaration,
        4242
    );
}

#[test]
fn test_documentation_is_reconstructed_from_sources() {
    let output = parse_fixture_with("counter_modern.json", counter_with_sources());
    let context = &output.context;
    let source = load_source("counter.sol");

    assert_eq!(context.len(), 16);
    assert_eq!(doc_text(context, context.documentation(11)), "@title Counter");
    assert_eq!(doc_text(context, context.documentation(10)), "@notice Sets y");
    assert_eq!(
        doc_text(context, context.dangling_documentation(9)),
        "trailing note"
    );
    assert_eq!(
        doc_text(context, context.dangling_documentation(11)),
        "@dev end of contract"
    );
    assert!(context.documentation(2).is_none());
    assert!(context.documentation(9).is_none());

    let children = context.children(11);
    let first = context.locate(children[0]).unwrap();
    assert_eq!(first.kind(), NodeKind::StructuredDocumentation);
    let last = context.locate(*children.last().unwrap()).unwrap();
    assert_eq!(last.kind(), NodeKind::StructuredDocumentation);
    assert_eq!(last.src.source_index, 0);

    for doc in context.nodes_of_kind(NodeKind::StructuredDocumentation) {
        let src = context.locate(doc).unwrap().src;
        let start = usize::try_from(src.offset).unwrap();
        let end = usize::try_from(src.end()).unwrap();
        let comment = &source[start..end];
        assert!(comment.starts_with("///") || comment.starts_with("/**"));
        assert!(context.parent(doc).is_some());
    }
    assert_tree_consistency(context);
}

#[test]
fn test_documentation_needs_source_text() {
    let output = parse_fixture("counter_modern.json");
    assert_eq!(output.context.len(), 12);
    assert!(output.context.documentation(11).is_none());
    assert!(output.context.dangling_documentation(11).is_none());
    assert!(output.context.nodes_of_kind(NodeKind::StructuredDocumentation).is_empty());
}

#[test]
fn test_postprocessing_is_idempotent() {
    let config = counter_with_sources();
    let output = parse_fixture_with("counter_modern.json", config.clone());
    let before = snapshot(&output.context);

    let mut reader = AstReader::with_context(output.context, config);
    reader.postprocess(&output.units).unwrap();
    assert_eq!(snapshot(reader.context()), before);

    let mut reader = AstReader::new();
    let units = reader.read(&assembly_unit(&assign_to_v())).unwrap();
    let before = snapshot(reader.context());
    reader.postprocess(&units).unwrap();
    assert_eq!(snapshot(reader.context()), before);
}

#[test]
fn test_postprocessing_can_run_after_a_plain_read() {
    let config = counter_with_sources().with_postprocess(false);
    let output = parse_fixture_with("counter_modern.json", config.clone());
    assert_eq!(output.context.len(), 12);

    let mut reader = AstReader::with_context(output.context, config);
    reader.postprocess(&output.units).unwrap();
    assert_eq!(reader.context().len(), 16);
}
