use crate::utils::{
    assert_tree_consistency, kinds_in_order, load_fixture, parse_fixture, snapshot,
};
use serde_json::{Value, json};
use solgraph_ast::{
    errors::AstError,
    node_kind::NodeKind,
    nodes::{
        ContractDefinition, ContractKind, DataLocation, ElementaryTypeName,
        ElementaryTypeNameExpression, ForStatement, FunctionDefinition, FunctionKind, Identifier,
        Mutability, SourceLocation, SourceUnit, StateMutability, TupleExpression,
        TypeNameOperand, VariableDeclaration, VariableDeclarationStatement, Visibility,
    },
    reader::{AstFormat, AstReader, ReaderConfig, read_compiler_output},
};

fn legacy_unit(children: Value) -> Value {
    json!({
        "id": 100,
        "name": "SourceUnit",
        "src": "0:500:0",
        "attributes": { "absolutePath": "legacy.sol" },
        "children": children
    })
}

fn modern_unit(nodes: Value) -> Value {
    json!({
        "id": 100,
        "nodeType": "SourceUnit",
        "absolutePath": "modern.sol",
        "src": "0:500:0",
        "nodes": nodes
    })
}

fn without_postprocessing() -> AstReader {
    AstReader::with_config(ReaderConfig::default().with_postprocess(false))
}

#[test]
fn test_counter_scenario() {
    let output = parse_fixture("counter_modern.json");
    let context = &output.context;

    assert_eq!(output.units, vec![12]);
    assert_eq!(context.len(), 12);
    assert_eq!(context.children(12), vec![11]);
    assert!(context.locate(11).unwrap().is::<ContractDefinition>());

    let function = context.locate_as::<FunctionDefinition>(10).unwrap();
    assert_eq!(function.name, "f");
    assert_eq!(function.body, Some(9));
    assert!(context.children(10).contains(&9));
    assert_eq!(
        context.closest_parent_of_kind(6, NodeKind::FunctionDefinition),
        Some(10)
    );
    assert_tree_consistency(context);
}

#[test]
fn test_registered_ids_are_unique() {
    let output = parse_fixture("counter_modern.json");
    let nodes = snapshot(&output.context);
    assert_eq!(nodes.len(), output.context.len());
    for node in &nodes {
        let located = output.context.locate(node.id).unwrap();
        assert_eq!(located.id, node.id);
        assert_eq!(located.context(), Some(output.context.id()));
    }
}

#[test]
fn test_source_unit_records_entry_key_and_exports() {
    let output = parse_fixture("counter_modern.json");
    let unit = output.context.locate_as::<SourceUnit>(12).unwrap();
    assert_eq!(unit.source_entry_key, "counter.sol");
    assert_eq!(unit.source_list_index, 0);
    let exported = output.context.resolve_export(12, "C").unwrap();
    assert_eq!(exported.id, 11);
    assert!(output.context.resolve_export(12, "D").is_none());
}

#[test]
fn test_legacy_and_modern_formats_are_equivalent() {
    let legacy = parse_fixture("storage_legacy.json");
    let modern = parse_fixture("storage_modern.json");

    assert_eq!(
        kinds_in_order(&legacy.context, legacy.units[0]),
        kinds_in_order(&modern.context, modern.units[0])
    );
    assert_eq!(
        kinds_in_order(&modern.context, modern.units[0]),
        vec![
            "SourceUnit",
            "ContractDefinition",
            "VariableDeclaration",
            "ElementaryTypeName"
        ]
    );

    for context in [&legacy.context, &modern.context] {
        let unit = context.locate_as::<SourceUnit>(4).unwrap();
        assert_eq!(unit.source_entry_key, "storage.sol");
        assert_eq!(unit.absolute_path, "storage.sol");

        let contract = context.locate_as::<ContractDefinition>(3).unwrap();
        assert_eq!(contract.name, "Storage");
        assert_eq!(contract.kind, ContractKind::Contract);
        assert_eq!(contract.linearized_base_contracts, vec![3]);
        assert!(contract.fully_implemented);

        let variable = context.locate_as::<VariableDeclaration>(2).unwrap();
        assert_eq!(variable.name, "value");
        assert_eq!(variable.type_string, "uint256");
        assert_eq!(variable.visibility, Visibility::Internal);
        assert_eq!(variable.storage_location, DataLocation::Default);
        assert_eq!(variable.mutability, Mutability::Mutable);
        assert!(variable.state_variable);
        assert!(!variable.constant);
        assert_eq!(variable.scope, 3);
        assert_eq!(variable.type_name, Some(1));

        let type_name = context.locate_as::<ElementaryTypeName>(1).unwrap();
        assert_eq!(type_name.name, "uint256");
        assert_eq!(type_name.type_string, "uint256");
        assert_eq!(
            context.locate(1).unwrap().src,
            SourceLocation::new(23, 7, 0)
        );
    }
}

#[test]
fn test_format_is_detected_from_root() {
    assert_eq!(
        AstFormat::detect(&legacy_unit(json!([]))),
        Some(AstFormat::Legacy)
    );
    assert_eq!(
        AstFormat::detect(&modern_unit(json!([]))),
        Some(AstFormat::Modern)
    );
    assert_eq!(AstFormat::detect(&json!({ "id": 1 })), None);
}

#[test]
fn test_raw_payload_is_shallow() {
    let output = parse_fixture("storage_modern.json");
    let raw = output.context.locate(3).unwrap().raw.as_ref().unwrap();
    assert_eq!(raw["name"], "Storage");
    assert!(raw.get("nodes").is_none());

    let mut reader = AstReader::with_config(ReaderConfig::default().with_keep_raw(false));
    reader.read(&load_fixture("storage_modern.json")).unwrap();
    assert!(reader.context().locate(3).unwrap().raw.is_none());
}

#[test]
fn test_units_are_ordered_by_source_index() {
    let output = json!([
        {
            "id": 1, "nodeType": "SourceUnit", "absolutePath": "b.sol",
            "src": "0:0:1", "nodes": []
        },
        {
            "id": 2, "nodeType": "SourceUnit", "absolutePath": "a.sol",
            "src": "0:0:0", "nodes": []
        }
    ]);
    let (context, units) = read_compiler_output(&output).unwrap();
    assert_eq!(units, vec![2, 1]);
    assert_eq!(context.source_units(), vec![2, 1]);
}

#[test]
fn test_legacy_yul_block_is_unsupported() {
    let raw = legacy_unit(json!([
        { "id": 1, "name": "YulBlock", "src": "0:2:0", "attributes": {} }
    ]));
    let mut reader = AstReader::new();
    let error = reader.read(&raw).unwrap_err();
    assert_eq!(
        error,
        AstError::UnsupportedNodeKind {
            kind: "YulBlock".to_string(),
            format: AstFormat::Legacy,
        }
    );
    assert!(reader.context().is_empty());
}

#[test]
fn test_unknown_tag_is_unsupported() {
    let raw = modern_unit(json!([{ "id": 1, "nodeType": "Frobnicate", "src": "0:1:0" }]));
    let error = read_compiler_output(&raw).unwrap_err();
    assert_eq!(
        error,
        AstError::UnsupportedNodeKind {
            kind: "Frobnicate".to_string(),
            format: AstFormat::Modern,
        }
    );
}

#[test]
fn test_missing_required_field_is_malformed() {
    let raw = modern_unit(json!([{
        "id": 1, "nodeType": "ContractDefinition", "src": "0:10:0",
        "contractKind": "contract", "nodes": []
    }]));
    let error = read_compiler_output(&raw).unwrap_err();
    assert!(matches!(
        error,
        AstError::MalformedRecord { ref kind, .. } if kind == "ContractDefinition"
    ));
}

#[test]
fn test_failed_read_leaves_context_untouched() {
    let mut reader = AstReader::new();
    reader.read(&load_fixture("storage_modern.json")).unwrap();
    let before = snapshot(reader.context());

    let broken = json!({
        "id": 20, "nodeType": "SourceUnit", "absolutePath": "broken.sol", "src": "0:50:1",
        "nodes": [{
            "id": 19, "nodeType": "ContractDefinition", "name": "Broken",
            "contractKind": "contract", "src": "0:50:1",
            "nodes": [
                {
                    "id": 17, "nodeType": "VariableDeclaration", "name": "ok",
                    "src": "10:10:1",
                    "typeName": { "id": 16, "nodeType": "ElementaryTypeName",
                                  "name": "bool", "src": "10:4:1" }
                },
                { "id": 18, "nodeType": "Frobnicate", "src": "30:5:1" }
            ]
        }]
    });
    assert!(reader.read(&broken).is_err());
    assert_eq!(snapshot(reader.context()), before);
    assert!(reader.context().locate(16).is_none());
    assert_eq!(reader.context_mut().next_id(), 5);
}

#[test]
fn test_id_collision_between_units_of_one_context() {
    let mut reader = AstReader::new();
    reader.read(&load_fixture("storage_modern.json")).unwrap();
    let error = reader.read(&load_fixture("counter_modern.json")).unwrap_err();
    assert_eq!(error, AstError::IdCollision { id: 1 });
    assert_eq!(reader.context().len(), 4);
}

#[test]
fn test_depth_guard() {
    let mut reader = AstReader::with_config(ReaderConfig::default().with_max_depth(2));
    let error = reader.read(&load_fixture("storage_modern.json")).unwrap_err();
    assert_eq!(error, AstError::DepthLimitExceeded { limit: 2 });
    assert!(reader.context().is_empty());
}

#[test]
fn test_missing_ids_are_allocated() {
    let raw = modern_unit(json!([{
        "nodeType": "PragmaDirective", "src": "0:23:0",
        "literals": ["solidity", "^", "0.8", ".0"]
    }]));
    let (context, units) = read_compiler_output(&raw).unwrap();
    assert_eq!(units, vec![100]);
    let pragma = context.children(100)[0];
    assert_ne!(pragma, 100);
    assert_eq!(context.locate(pragma).unwrap().kind(), NodeKind::PragmaDirective);
    assert_eq!(context.parent(pragma), Some(100));

    let raw = modern_unit(json!([{
        "id": null, "nodeType": "PragmaDirective", "src": "0:23:0",
        "literals": ["solidity", "^", "0.8", ".0"]
    }]));
    let (context, _) = read_compiler_output(&raw).unwrap();
    assert_eq!(context.len(), 2);

    let raw = modern_unit(json!([{
        "id": "7", "nodeType": "PragmaDirective", "src": "0:23:0",
        "literals": ["solidity", "^", "0.8", ".0"]
    }]));
    let error = read_compiler_output(&raw).unwrap_err();
    assert!(matches!(
        error,
        AstError::MalformedRecord { ref kind, .. } if kind == "PragmaDirective"
    ));
}

#[test]
fn test_skipped_tuple_slots_stay_in_assignments() {
    let raw = modern_unit(json!([{
        "id": 20, "nodeType": "FunctionDefinition", "name": "f", "kind": "freeFunction",
        "scope": 100, "stateMutability": "pure", "visibility": "internal", "src": "0:90:0",
        "modifiers": [],
        "parameters": { "id": 1, "nodeType": "ParameterList", "parameters": [], "src": "10:2:0" },
        "returnParameters": { "id": 2, "nodeType": "ParameterList", "parameters": [], "src": "13:0:0" },
        "body": {
            "id": 10, "nodeType": "Block", "src": "14:70:0",
            "statements": [{
                "id": 9, "nodeType": "VariableDeclarationStatement", "src": "20:30:0",
                "assignments": [null, 5],
                "declarations": [null, {
                    "id": 5, "nodeType": "VariableDeclaration", "name": "b", "scope": 10,
                    "stateVariable": false, "storageLocation": "default",
                    "visibility": "internal", "src": "23:9:0",
                    "typeDescriptions": { "typeString": "uint256" },
                    "typeName": {
                        "id": 4, "nodeType": "ElementaryTypeName", "name": "uint256",
                        "src": "23:7:0", "typeDescriptions": { "typeString": "uint256" }
                    }
                }],
                "initialValue": {
                    "id": 8, "nodeType": "Identifier", "name": "pair",
                    "referencedDeclaration": -1, "src": "40:4:0",
                    "typeDescriptions": { "typeString": "tuple(uint256,uint256)" }
                }
            }]
        }
    }]));
    let mut reader = without_postprocessing();
    reader.read(&raw).unwrap();
    let context = reader.context();
    let statement = context.locate_as::<VariableDeclarationStatement>(9).unwrap();
    assert_eq!(statement.assignments, vec![None, Some(5)]);
    assert_eq!(statement.declarations, vec![5]);
    assert_eq!(context.children(9), vec![5, 8]);
    assert_tree_consistency(context);
}

#[test]
fn test_legacy_function_derivations() {
    let raw = legacy_unit(json!([{
        "id": 5, "name": "FunctionDefinition", "src": "0:40:0",
        "attributes": {
            "name": "", "isConstructor": false, "payable": true, "constant": false,
            "visibility": "external", "scope": 100
        },
        "children": [
            { "id": 1, "name": "ParameterList", "src": "8:2:0", "children": [] },
            { "id": 2, "name": "ParameterList", "src": "20:0:0", "children": [] },
            { "id": 3, "name": "Block", "src": "20:2:0", "children": [] }
        ]
    }]));
    let mut reader = without_postprocessing();
    reader.read(&raw).unwrap();
    let function = reader.context().locate_as::<FunctionDefinition>(5).unwrap();
    assert_eq!(function.kind, FunctionKind::Fallback);
    assert_eq!(function.state_mutability, StateMutability::Payable);
    assert_eq!(function.visibility, Visibility::External);
    assert_eq!(function.parameters, 1);
    assert_eq!(function.return_parameters, 2);
    assert_eq!(function.body, Some(3));
    assert_eq!(reader.context().children(5), vec![1, 2, 3]);
}

#[test]
fn test_legacy_for_statement_null_markers() {
    let raw = legacy_unit(json!([{
        "id": 4, "name": "ForStatement", "src": "0:30:0",
        "attributes": { "initializationExpression": null, "loopExpression": null },
        "children": [
            {
                "id": 1, "name": "Identifier", "src": "5:4:0",
                "attributes": { "value": "flag", "type": "bool", "referencedDeclaration": 90 }
            },
            { "id": 2, "name": "Block", "src": "11:2:0", "children": [] }
        ]
    }]));
    let mut reader = without_postprocessing();
    reader.read(&raw).unwrap();
    let context = reader.context();
    let statement = context.locate_as::<ForStatement>(4).unwrap();
    assert_eq!(statement.initialization_expression, None);
    assert_eq!(statement.condition, Some(1));
    assert_eq!(statement.loop_expression, None);
    assert_eq!(statement.body, 2);

    let identifier = context.locate_as::<Identifier>(1).unwrap();
    assert_eq!(identifier.name, "flag");
    assert_eq!(identifier.referenced_declaration, 90);
}

#[test]
fn test_legacy_elementary_type_name_expression_keeps_bare_name() {
    let raw = legacy_unit(json!([{
        "id": 1, "name": "ElementaryTypeNameExpression", "src": "0:7:0",
        "attributes": { "value": "address", "type": "type(address)" }
    }]));
    let (context, _) = read_compiler_output(&raw).unwrap();
    let expression = context.locate_as::<ElementaryTypeNameExpression>(1).unwrap();
    assert_eq!(
        expression.type_name,
        TypeNameOperand::Name("address".to_string())
    );
    assert!(context.children(1).is_empty());
}

#[test]
fn test_tuple_components_keep_holes() {
    let identifier = |id: i64, name: &str| {
        json!({
            "id": id, "nodeType": "Identifier", "name": name, "src": "0:1:0",
            "referencedDeclaration": -1
        })
    };
    let raw = modern_unit(json!([{
        "id": 3, "nodeType": "TupleExpression", "src": "0:6:0", "isInlineArray": false,
        "components": [identifier(1, "a"), null, identifier(2, "c")]
    }]));
    let (context, _) = read_compiler_output(&raw).unwrap();
    let tuple = context.locate_as::<TupleExpression>(3).unwrap();
    assert_eq!(tuple.components, vec![Some(1), None, Some(2)]);
    assert_eq!(context.children(3), vec![1, 2]);
}

#[test]
fn test_modern_string_documentation_is_text() {
    let raw = modern_unit(json!([{
        "id": 3, "nodeType": "ContractDefinition", "name": "C", "contractKind": "library",
        "documentation": "Utility functions", "src": "0:20:0", "nodes": []
    }]));
    let (context, _) = read_compiler_output(&raw).unwrap();
    let contract = context.locate_as::<ContractDefinition>(3).unwrap();
    assert_eq!(contract.kind, ContractKind::Library);
    assert_eq!(contract.doc_string.as_deref(), Some("Utility functions"));
    assert!(context.children(3).is_empty());
}
