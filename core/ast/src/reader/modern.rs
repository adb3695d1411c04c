//! Processors for the modern (`nodeType`) schema, where fields and child
//! records sit directly on each record.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    documentation::extract_documentation_text,
    errors::AstError,
    nodes::{
        ArrayTypeName, Assignment, BUILTIN_REFERENCE, BinaryOperation, Block, Break,
        Conditional, Continue,
        ContractDefinition, DataLocation, DoWhileStatement, Documentation,
        ElementaryTypeName, ElementaryTypeNameExpression, EmitStatement, EnumDefinition,
        EnumValue, ErrorDefinition, EventDefinition, ExpressionStatement, ExternalReference,
        ForStatement, FunctionCall, FunctionCallOptions, FunctionDefinition, FunctionKind,
        FunctionTypeName, Identifier, IdentifierPath, IfStatement, ImportDirective,
        IndexAccess, IndexRangeAccess, InheritanceSpecifier, InlineAssembly, Literal, Mapping,
        MemberAccess, ModifierDefinition, ModifierInvocation, Mutability, NewExpression,
        NodeData, NodeId, OverrideSpecifier, ParameterList, PlaceholderStatement,
        PragmaDirective, Return, RevertStatement, SourceUnit, StateMutability,
        StructDefinition, StructuredDocumentation, SymbolAlias, Throw, TryCatchClause,
        TryStatement, TupleExpression, TypeNameOperand, UnaryOperation, UncheckedBlock,
        UserDefinedTypeName, UserDefinedValueTypeDefinition, UsingForDirective,
        UsingForOperator, VariableDeclaration, VariableDeclarationStatement, Visibility,
        WhileStatement, YulAssignment, YulBlock, YulBreak, YulCase, YulCode, YulContinue,
        YulData, YulExpressionStatement, YulForLoop, YulFunctionCall, YulFunctionDefinition,
        YulIdentifier, YulIf, YulLeave, YulLiteral, YulObject, YulSwitch, YulTypedName,
        YulVariableDeclaration,
    },
    reader::{
        Conversion,
        raw::{self, field, modern_type_string},
    },
};

type Processed = Result<NodeData, AstError>;

fn one(conversion: &mut Conversion<'_>, raw: &Value, name: &str) -> Result<NodeId, AstError> {
    conversion.convert(raw::required(raw, name)?)
}

fn opt(conversion: &mut Conversion<'_>, raw: &Value, name: &str) -> Result<Option<NodeId>, AstError> {
    conversion.convert_opt(field(raw, name))
}

fn many(conversion: &mut Conversion<'_>, raw: &Value, name: &str) -> Result<Vec<NodeId>, AstError> {
    conversion.convert_array(field(raw, name))
}

/// Older compilers emit documentation as a string, newer ones as a record.
fn documentation(
    conversion: &mut Conversion<'_>,
    raw: &Value,
) -> Result<Option<Documentation>, AstError> {
    match field(raw, "documentation") {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(Documentation::Text(text.clone()))),
        Some(record) => conversion.convert(record).map(|id| Some(Documentation::Node(id))),
    }
}

fn visibility(raw: &Value) -> Result<Visibility, AstError> {
    raw::parsed_or(raw, "visibility", Visibility::Default)
}

pub(crate) fn contract_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let mut nodes = Vec::new();
    let mut doc_string = None;
    match documentation(conversion, raw)? {
        Some(Documentation::Node(id)) => nodes.push(id),
        Some(Documentation::Text(text)) => doc_string = Some(text),
        None => {}
    }
    nodes.extend(many(conversion, raw, "baseContracts")?);
    nodes.extend(many(conversion, raw, "nodes")?);
    Ok(ContractDefinition {
        name: raw::string(raw, "name")?,
        scope: raw::reference(raw, "scope"),
        kind: raw::parsed(raw, "contractKind")?,
        is_abstract: raw::boolean(raw, "abstract"),
        fully_implemented: field(raw, "fullyImplemented")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        linearized_base_contracts: raw::ids(raw, "linearizedBaseContracts"),
        used_errors: raw::ids(raw, "usedErrors"),
        used_events: raw::ids(raw, "usedEvents"),
        doc_string,
        dangling_doc_string: None,
        name_location: raw::opt_src(raw, "nameLocation")?,
        nodes,
    }
    .into())
}

pub(crate) fn enum_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(EnumDefinition {
        name: raw::string(raw, "name")?,
        name_location: raw::opt_src(raw, "nameLocation")?,
        documentation: documentation(conversion, raw)?,
        members: many(conversion, raw, "members")?,
    }
    .into())
}

pub(crate) fn enum_value(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(EnumValue {
        name: raw::string(raw, "name")?,
        name_location: raw::opt_src(raw, "nameLocation")?,
    }
    .into())
}

pub(crate) fn error_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ErrorDefinition {
        name: raw::string(raw, "name")?,
        name_location: raw::opt_src(raw, "nameLocation")?,
        documentation: documentation(conversion, raw)?,
        parameters: one(conversion, raw, "parameters")?,
    }
    .into())
}

pub(crate) fn event_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(EventDefinition {
        anonymous: raw::boolean(raw, "anonymous"),
        name: raw::string(raw, "name")?,
        name_location: raw::opt_src(raw, "nameLocation")?,
        documentation: documentation(conversion, raw)?,
        parameters: one(conversion, raw, "parameters")?,
    }
    .into())
}

pub(crate) fn function_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let name = raw::string_or_default(raw, "name");
    let kind = match raw::opt_parsed::<FunctionKind>(raw, "kind")? {
        Some(kind) => kind,
        None => FunctionKind::from_legacy(raw::boolean(raw, "isConstructor"), &name),
    };
    let state_mutability = match raw::opt_parsed::<StateMutability>(raw, "stateMutability")? {
        Some(mutability) => mutability,
        None => StateMutability::from_legacy(
            raw::boolean(raw, "payable"),
            raw::boolean(raw, "constant"),
        ),
    };
    Ok(FunctionDefinition {
        scope: raw::reference(raw, "scope"),
        kind,
        name,
        is_virtual: raw::boolean(raw, "virtual"),
        visibility: visibility(raw)?,
        state_mutability,
        is_constructor: kind == FunctionKind::Constructor,
        name_location: raw::opt_src(raw, "nameLocation")?,
        documentation: documentation(conversion, raw)?,
        parameters: one(conversion, raw, "parameters")?,
        override_specifier: opt(conversion, raw, "overrides")?,
        modifiers: many(conversion, raw, "modifiers")?,
        return_parameters: one(conversion, raw, "returnParameters")?,
        body: opt(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn modifier_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ModifierDefinition {
        name: raw::string(raw, "name")?,
        is_virtual: raw::boolean(raw, "virtual"),
        visibility: raw::parsed_or(raw, "visibility", Visibility::Internal)?,
        name_location: raw::opt_src(raw, "nameLocation")?,
        documentation: documentation(conversion, raw)?,
        parameters: one(conversion, raw, "parameters")?,
        override_specifier: opt(conversion, raw, "overrides")?,
        body: opt(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn struct_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(StructDefinition {
        name: raw::string(raw, "name")?,
        scope: raw::reference(raw, "scope"),
        visibility: visibility(raw)?,
        name_location: raw::opt_src(raw, "nameLocation")?,
        documentation: documentation(conversion, raw)?,
        members: many(conversion, raw, "members")?,
    }
    .into())
}

pub(crate) fn user_defined_value_type_definition(
    conversion: &mut Conversion<'_>,
    raw: &Value,
) -> Processed {
    Ok(UserDefinedValueTypeDefinition {
        name: raw::string(raw, "name")?,
        name_location: raw::opt_src(raw, "nameLocation")?,
        underlying_type: one(conversion, raw, "underlyingType")?,
    }
    .into())
}

pub(crate) fn variable_declaration(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let constant = raw::boolean(raw, "constant");
    Ok(VariableDeclaration {
        constant,
        indexed: raw::boolean(raw, "indexed"),
        name: raw::string_or_default(raw, "name"),
        scope: raw::reference(raw, "scope"),
        state_variable: raw::boolean(raw, "stateVariable"),
        storage_location: raw::parsed_or(raw, "storageLocation", DataLocation::Default)?,
        visibility: visibility(raw)?,
        mutability: raw::parsed_or(raw, "mutability", Mutability::from_constant(constant))?,
        type_string: modern_type_string(raw),
        name_location: raw::opt_src(raw, "nameLocation")?,
        documentation: documentation(conversion, raw)?,
        type_name: opt(conversion, raw, "typeName")?,
        override_specifier: opt(conversion, raw, "overrides")?,
        value: opt(conversion, raw, "value")?,
    }
    .into())
}

pub(crate) fn assignment(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Assignment {
        type_string: modern_type_string(raw),
        operator: raw::string(raw, "operator")?,
        left_hand_side: one(conversion, raw, "leftHandSide")?,
        right_hand_side: one(conversion, raw, "rightHandSide")?,
    }
    .into())
}

pub(crate) fn binary_operation(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(BinaryOperation {
        type_string: modern_type_string(raw),
        operator: raw::string(raw, "operator")?,
        left_expression: one(conversion, raw, "leftExpression")?,
        right_expression: one(conversion, raw, "rightExpression")?,
    }
    .into())
}

pub(crate) fn conditional(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Conditional {
        type_string: modern_type_string(raw),
        condition: one(conversion, raw, "condition")?,
        true_expression: one(conversion, raw, "trueExpression")?,
        false_expression: one(conversion, raw, "falseExpression")?,
    }
    .into())
}

pub(crate) fn elementary_type_name_expression(
    conversion: &mut Conversion<'_>,
    raw: &Value,
) -> Processed {
    let type_name = match raw::required(raw, "typeName")? {
        Value::String(name) => TypeNameOperand::Name(name.clone()),
        record => TypeNameOperand::Node(conversion.convert(record)?),
    };
    Ok(ElementaryTypeNameExpression {
        type_string: modern_type_string(raw),
        type_name,
    }
    .into())
}

pub(crate) fn function_call(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let names = raw::strings(raw, "names");
    Ok(FunctionCall {
        type_string: modern_type_string(raw),
        kind: raw::parsed(raw, "kind")?,
        field_names: (!names.is_empty()).then_some(names),
        expression: one(conversion, raw, "expression")?,
        arguments: many(conversion, raw, "arguments")?,
    }
    .into())
}

pub(crate) fn function_call_options(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(FunctionCallOptions {
        type_string: modern_type_string(raw),
        names: raw::strings(raw, "names"),
        expression: one(conversion, raw, "expression")?,
        options: many(conversion, raw, "options")?,
    }
    .into())
}

pub(crate) fn identifier(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Identifier {
        type_string: modern_type_string(raw),
        name: raw::string(raw, "name")?,
        referenced_declaration: raw::reference(raw, "referencedDeclaration"),
        overloaded_declarations: raw::ids(raw, "overloadedDeclarations"),
    }
    .into())
}

pub(crate) fn index_access(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(IndexAccess {
        type_string: modern_type_string(raw),
        base_expression: one(conversion, raw, "baseExpression")?,
        index_expression: opt(conversion, raw, "indexExpression")?,
    }
    .into())
}

pub(crate) fn index_range_access(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(IndexRangeAccess {
        type_string: modern_type_string(raw),
        base_expression: one(conversion, raw, "baseExpression")?,
        start_expression: opt(conversion, raw, "startExpression")?,
        end_expression: opt(conversion, raw, "endExpression")?,
    }
    .into())
}

pub(crate) fn literal(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Literal {
        type_string: modern_type_string(raw),
        kind: raw::parsed(raw, "kind")?,
        hex_value: raw::string_or_default(raw, "hexValue"),
        value: raw::opt_string(raw, "value"),
        subdenomination: raw::opt_string(raw, "subdenomination"),
    }
    .into())
}

pub(crate) fn member_access(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(MemberAccess {
        type_string: modern_type_string(raw),
        member_name: raw::string(raw, "memberName")?,
        referenced_declaration: raw::reference(raw, "referencedDeclaration"),
        expression: one(conversion, raw, "expression")?,
    }
    .into())
}

pub(crate) fn new_expression(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(NewExpression {
        type_string: modern_type_string(raw),
        type_name: one(conversion, raw, "typeName")?,
    }
    .into())
}

pub(crate) fn tuple_expression(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(TupleExpression {
        type_string: modern_type_string(raw),
        is_inline_array: raw::boolean(raw, "isInlineArray"),
        components: conversion.convert_sparse(field(raw, "components"))?,
    }
    .into())
}

pub(crate) fn unary_operation(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(UnaryOperation {
        type_string: modern_type_string(raw),
        prefix: raw::boolean(raw, "prefix"),
        operator: raw::string(raw, "operator")?,
        sub_expression: one(conversion, raw, "subExpression")?,
    }
    .into())
}

pub(crate) fn identifier_path(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(IdentifierPath {
        name: raw::string(raw, "name")?,
        referenced_declaration: raw::reference(raw, "referencedDeclaration"),
    }
    .into())
}

fn symbol_alias(alias: &Value) -> SymbolAlias {
    let (foreign, foreign_declaration) = match field(alias, "foreign") {
        Some(Value::String(name)) => (Some(name.clone()), BUILTIN_REFERENCE),
        Some(record) => (
            raw::opt_string(record, "name"),
            raw::reference(record, "referencedDeclaration"),
        ),
        None => (None, BUILTIN_REFERENCE),
    };
    SymbolAlias {
        foreign,
        foreign_declaration,
        local: raw::opt_string(alias, "local"),
    }
}

pub(crate) fn import_directive(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    let symbol_aliases = field(raw, "symbolAliases")
        .and_then(Value::as_array)
        .map(|aliases| aliases.iter().map(symbol_alias).collect())
        .unwrap_or_default();
    Ok(ImportDirective {
        file: raw::string(raw, "file")?,
        absolute_path: raw::string_or_default(raw, "absolutePath"),
        unit_alias: raw::string_or_default(raw, "unitAlias"),
        symbol_aliases,
        scope: raw::reference(raw, "scope"),
        source_unit: raw::reference(raw, "sourceUnit"),
    }
    .into())
}

pub(crate) fn inheritance_specifier(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(InheritanceSpecifier {
        base_type: one(conversion, raw, "baseName")?,
        arguments: many(conversion, raw, "arguments")?,
    }
    .into())
}

pub(crate) fn modifier_invocation(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ModifierInvocation {
        kind: raw::opt_parsed(raw, "kind")?,
        modifier_name: one(conversion, raw, "modifierName")?,
        arguments: many(conversion, raw, "arguments")?,
    }
    .into())
}

pub(crate) fn override_specifier(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(OverrideSpecifier {
        overrides: many(conversion, raw, "overrides")?,
    }
    .into())
}

pub(crate) fn parameter_list(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ParameterList {
        parameters: many(conversion, raw, "parameters")?,
    }
    .into())
}

pub(crate) fn pragma_directive(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(PragmaDirective {
        literals: raw::strings(raw, "literals"),
    }
    .into())
}

/// Export tables map each name to a list of declarations; the first one is kept.
pub(crate) fn exported_symbols(raw: &Value) -> BTreeMap<String, NodeId> {
    field(raw, "exportedSymbols")
        .and_then(Value::as_object)
        .map(|symbols| {
            symbols
                .iter()
                .filter_map(|(name, ids)| {
                    let id = match ids {
                        Value::Array(ids) => ids.first().and_then(Value::as_i64),
                        other => other.as_i64(),
                    };
                    id.map(|id| (name.clone(), id))
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn source_unit(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let absolute_path = raw::string_or_default(raw, "absolutePath");
    Ok(SourceUnit {
        source_entry_key: absolute_path.clone(),
        source_list_index: raw::src(raw)?.source_index,
        absolute_path,
        exported_symbols: exported_symbols(raw),
        license: raw::opt_string(raw, "license"),
        nodes: many(conversion, raw, "nodes")?,
    }
    .into())
}

pub(crate) fn structured_documentation(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(StructuredDocumentation {
        text: extract_documentation_text(&raw::string(raw, "text")?),
    }
    .into())
}

pub(crate) fn using_for_directive(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let mut function_list = Vec::new();
    let mut operators = Vec::new();
    if let Some(entries) = field(raw, "functionList").and_then(Value::as_array) {
        for entry in entries {
            if let Some(function) = field(entry, "function") {
                function_list.push(conversion.convert(function)?);
            } else {
                let function = conversion.convert(raw::required(entry, "definition")?)?;
                function_list.push(function);
                operators.push(UsingForOperator {
                    function,
                    operator: raw::string(entry, "operator")?,
                });
            }
        }
    }
    Ok(UsingForDirective {
        is_global: raw::boolean(raw, "global"),
        operators,
        library_name: opt(conversion, raw, "libraryName")?,
        function_list,
        type_name: opt(conversion, raw, "typeName")?,
    }
    .into())
}

pub(crate) fn block(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Block {
        doc_string: raw::opt_string(raw, "documentation"),
        dangling_doc_string: None,
        statements: many(conversion, raw, "statements")?,
    }
    .into())
}

pub(crate) fn break_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Break {
        documentation: documentation(conversion, raw)?,
    }
    .into())
}

pub(crate) fn continue_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Continue {
        documentation: documentation(conversion, raw)?,
    }
    .into())
}

pub(crate) fn do_while_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(DoWhileStatement {
        documentation: documentation(conversion, raw)?,
        condition: one(conversion, raw, "condition")?,
        body: one(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn emit_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(EmitStatement {
        documentation: documentation(conversion, raw)?,
        event_call: one(conversion, raw, "eventCall")?,
    }
    .into())
}

pub(crate) fn expression_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ExpressionStatement {
        documentation: documentation(conversion, raw)?,
        expression: one(conversion, raw, "expression")?,
    }
    .into())
}

pub(crate) fn for_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ForStatement {
        documentation: documentation(conversion, raw)?,
        initialization_expression: opt(conversion, raw, "initializationExpression")?,
        condition: opt(conversion, raw, "condition")?,
        loop_expression: opt(conversion, raw, "loopExpression")?,
        body: one(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn if_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(IfStatement {
        documentation: documentation(conversion, raw)?,
        condition: one(conversion, raw, "condition")?,
        true_body: one(conversion, raw, "trueBody")?,
        false_body: opt(conversion, raw, "falseBody")?,
    }
    .into())
}

/// Since 0.6 references are flat records; before that each one is wrapped in
/// a single-key object named after the referenced identifier.
pub(crate) fn external_reference(entry: &Value) -> Result<ExternalReference, AstError> {
    let (name, record) = match entry.as_object() {
        Some(object) if !object.contains_key("declaration") && object.len() == 1 => object
            .iter()
            .next()
            .map_or((None, entry), |(name, record)| (Some(name.clone()), record)),
        _ => (None, entry),
    };
    Ok(ExternalReference {
        name,
        declaration: raw::reference(record, "declaration"),
        src: raw::src(record)?,
        value_size: field(record, "valueSize")
            .and_then(Value::as_i64)
            .unwrap_or(1),
        suffix: raw::opt_string(record, "suffix"),
        is_offset: raw::boolean(record, "isOffset"),
        is_slot: raw::boolean(record, "isSlot"),
    })
}

/// The embedded `AST` is expanded later, by the inline-assembly pass.
pub(crate) fn inline_assembly(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let external_references = field(raw, "externalReferences")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(external_reference)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();
    Ok(InlineAssembly {
        external_references,
        operations: raw::opt_string(raw, "operations"),
        flags: raw::strings(raw, "flags"),
        evm_version: raw::opt_string(raw, "evmVersion"),
        documentation: documentation(conversion, raw)?,
        yul: None,
    }
    .into())
}

pub(crate) fn placeholder_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(PlaceholderStatement {
        documentation: documentation(conversion, raw)?,
    }
    .into())
}

pub(crate) fn return_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Return {
        function_return_parameters: raw::reference(raw, "functionReturnParameters"),
        documentation: documentation(conversion, raw)?,
        expression: opt(conversion, raw, "expression")?,
    }
    .into())
}

pub(crate) fn revert_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(RevertStatement {
        documentation: documentation(conversion, raw)?,
        error_call: one(conversion, raw, "errorCall")?,
    }
    .into())
}

pub(crate) fn throw_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Throw {
        documentation: documentation(conversion, raw)?,
    }
    .into())
}

pub(crate) fn try_catch_clause(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(TryCatchClause {
        error_name: raw::string_or_default(raw, "errorName"),
        documentation: documentation(conversion, raw)?,
        parameters: opt(conversion, raw, "parameters")?,
        block: one(conversion, raw, "block")?,
    }
    .into())
}

pub(crate) fn try_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(TryStatement {
        documentation: documentation(conversion, raw)?,
        external_call: one(conversion, raw, "externalCall")?,
        clauses: many(conversion, raw, "clauses")?,
    }
    .into())
}

pub(crate) fn unchecked_block(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(UncheckedBlock {
        doc_string: raw::opt_string(raw, "documentation"),
        dangling_doc_string: None,
        statements: many(conversion, raw, "statements")?,
    }
    .into())
}

/// Skipped tuple slots show up as `null` in both arrays. They are kept as holes
/// in `assignments`, which stays positional, and dropped from `declarations`.
pub(crate) fn variable_declaration_statement(
    conversion: &mut Conversion<'_>,
    raw: &Value,
) -> Processed {
    let assignments = field(raw, "assignments")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().map(Value::as_i64).collect())
        .unwrap_or_default();
    let documentation = documentation(conversion, raw)?;
    let declarations = conversion
        .convert_sparse(field(raw, "declarations"))?
        .into_iter()
        .flatten()
        .collect();
    Ok(VariableDeclarationStatement {
        assignments,
        documentation,
        declarations,
        initial_value: opt(conversion, raw, "initialValue")?,
    }
    .into())
}

pub(crate) fn while_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(WhileStatement {
        documentation: documentation(conversion, raw)?,
        condition: one(conversion, raw, "condition")?,
        body: one(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn array_type_name(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ArrayTypeName {
        type_string: modern_type_string(raw),
        base_type: one(conversion, raw, "baseType")?,
        length: opt(conversion, raw, "length")?,
    }
    .into())
}

pub(crate) fn elementary_type_name(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ElementaryTypeName {
        type_string: modern_type_string(raw),
        name: raw::string(raw, "name")?,
        state_mutability: raw::parsed_or(raw, "stateMutability", StateMutability::NonPayable)?,
    }
    .into())
}

pub(crate) fn function_type_name(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(FunctionTypeName {
        type_string: modern_type_string(raw),
        visibility: visibility(raw)?,
        state_mutability: raw::parsed_or(raw, "stateMutability", StateMutability::NonPayable)?,
        parameter_types: one(conversion, raw, "parameterTypes")?,
        return_parameter_types: one(conversion, raw, "returnParameterTypes")?,
    }
    .into())
}

pub(crate) fn mapping(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Mapping {
        type_string: modern_type_string(raw),
        key_type: one(conversion, raw, "keyType")?,
        value_type: one(conversion, raw, "valueType")?,
    }
    .into())
}

pub(crate) fn user_defined_type_name(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(UserDefinedTypeName {
        type_string: modern_type_string(raw),
        name: raw::opt_string(raw, "name"),
        referenced_declaration: raw::reference(raw, "referencedDeclaration"),
        path: opt(conversion, raw, "pathNode")?,
    }
    .into())
}

pub(crate) fn yul_assignment(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulAssignment {
        variable_names: many(conversion, raw, "variableNames")?,
        value: one(conversion, raw, "value")?,
    }
    .into())
}

pub(crate) fn yul_block(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulBlock {
        statements: many(conversion, raw, "statements")?,
    }
    .into())
}

pub(crate) fn yul_break(_: &mut Conversion<'_>, _: &Value) -> Processed {
    Ok(YulBreak {}.into())
}

/// The `default` case carries the string `"default"` instead of a literal.
pub(crate) fn yul_case(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let value = match field(raw, "value") {
        None | Some(Value::String(_)) => None,
        Some(record) => Some(conversion.convert(record)?),
    };
    Ok(YulCase {
        value,
        body: one(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn yul_continue(_: &mut Conversion<'_>, _: &Value) -> Processed {
    Ok(YulContinue {}.into())
}

pub(crate) fn yul_expression_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulExpressionStatement {
        expression: one(conversion, raw, "expression")?,
    }
    .into())
}

pub(crate) fn yul_for_loop(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulForLoop {
        pre: one(conversion, raw, "pre")?,
        condition: one(conversion, raw, "condition")?,
        post: one(conversion, raw, "post")?,
        body: one(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn yul_function_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulFunctionDefinition {
        name: raw::string(raw, "name")?,
        parameters: many(conversion, raw, "parameters")?,
        return_variables: many(conversion, raw, "returnVariables")?,
        body: one(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn yul_if(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulIf {
        condition: one(conversion, raw, "condition")?,
        body: one(conversion, raw, "body")?,
    }
    .into())
}

pub(crate) fn yul_leave(_: &mut Conversion<'_>, _: &Value) -> Processed {
    Ok(YulLeave {}.into())
}

pub(crate) fn yul_switch(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulSwitch {
        expression: one(conversion, raw, "expression")?,
        cases: many(conversion, raw, "cases")?,
    }
    .into())
}

pub(crate) fn yul_variable_declaration(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulVariableDeclaration {
        variables: many(conversion, raw, "variables")?,
        value: opt(conversion, raw, "value")?,
    }
    .into())
}

pub(crate) fn yul_function_call(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulFunctionCall {
        function_name: one(conversion, raw, "functionName")?,
        arguments: many(conversion, raw, "arguments")?,
    }
    .into())
}

/// Identifiers naming Solidity variables are linked to their declarations
/// by the inline-assembly pass.
pub(crate) fn yul_identifier(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulIdentifier {
        name: raw::string(raw, "name")?,
        referenced_declaration: raw::reference(raw, "referencedDeclaration"),
    }
    .into())
}

pub(crate) fn yul_literal(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulLiteral {
        kind: raw::parsed(raw, "kind")?,
        value: raw::string_or_default(raw, "value"),
        hex_value: raw::opt_string(raw, "hexValue"),
        type_string: raw::string_or_default(raw, "type"),
    }
    .into())
}

pub(crate) fn yul_typed_name(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulTypedName {
        name: raw::string(raw, "name")?,
        type_string: raw::string_or_default(raw, "type"),
    }
    .into())
}

pub(crate) fn yul_code(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulCode {
        block: one(conversion, raw, "block")?,
    }
    .into())
}

pub(crate) fn yul_data(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulData {
        name: raw::string(raw, "name")?,
        value: raw::string_or_default(raw, "value"),
    }
    .into())
}

pub(crate) fn yul_object(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(YulObject {
        name: raw::string(raw, "name")?,
        code: one(conversion, raw, "code")?,
        sub_objects: many(conversion, raw, "subObjects")?,
    }
    .into())
}
