//! Processors for the legacy schema: scalars live under `attributes`, child
//! records form one positional `children` array whose layout depends on
//! which optional parts are present.

use serde_json::Value;

use crate::{
    documentation::extract_documentation_text,
    errors::AstError,
    node_kind::NodeKind,
    nodes::{
        ArrayTypeName, Assignment, BUILTIN_REFERENCE, BinaryOperation, Block, Break,
        Conditional, Continue, ContractDefinition, DataLocation, DoWhileStatement,
        Documentation, ElementaryTypeName, ElementaryTypeNameExpression, EmitStatement,
        EnumDefinition, EnumValue, EventDefinition, ExpressionStatement, ForStatement,
        FunctionCall, FunctionCallKind, FunctionCallOptions, FunctionDefinition, FunctionKind,
        FunctionTypeName, Identifier, IfStatement, ImportDirective, IndexAccess,
        IndexRangeAccess, InheritanceSpecifier, InlineAssembly, Literal, LiteralKind, Mapping,
        MemberAccess, ModifierDefinition, ModifierInvocation, Mutability, NewExpression,
        NodeData, NodeId, OverrideSpecifier, ParameterList, PlaceholderStatement,
        PragmaDirective, Return, SourceUnit, StateMutability, StructDefinition,
        StructuredDocumentation, SymbolAlias, Throw, TryCatchClause, TryStatement,
        TupleExpression, TypeNameOperand, UnaryOperation, UserDefinedTypeName,
        UsingForDirective, VariableDeclaration, VariableDeclarationStatement, Visibility,
        WhileStatement,
    },
    reader::{
        Conversion, modern,
        raw::{self, attributes, field},
    },
};

type Processed = Result<NodeData, AstError>;

fn type_string(raw: &Value) -> String {
    raw::string_or_default(attributes(raw), "type")
}

fn kind_of(record: &Value) -> Option<NodeKind> {
    raw::tag(record).parse().ok()
}

/// Child records with `null` placeholders removed.
fn records(raw: &Value) -> Vec<&Value> {
    raw::children(raw)
        .iter()
        .filter(|child| !child.is_null())
        .collect()
}

fn convert_all(conversion: &mut Conversion<'_>, records: &[&Value]) -> Result<Vec<NodeId>, AstError> {
    records
        .iter()
        .map(|record| conversion.convert(record))
        .collect()
}

fn nth(
    conversion: &mut Conversion<'_>,
    raw: &Value,
    records: &[&Value],
    index: usize,
) -> Result<NodeId, AstError> {
    let record = records
        .get(index)
        .ok_or_else(|| AstError::malformed(raw::tag(raw), format!("missing child #{index}")))?;
    conversion.convert(record)
}

fn nth_opt(
    conversion: &mut Conversion<'_>,
    records: &[&Value],
    index: usize,
) -> Result<Option<NodeId>, AstError> {
    conversion.convert_opt(records.get(index).copied())
}

/// Splits a leading `StructuredDocumentation` child off the remaining children.
/// Without one, the `documentation` attribute string is used.
fn documented<'v>(
    conversion: &mut Conversion<'_>,
    raw: &'v Value,
) -> Result<(Option<Documentation>, Vec<&'v Value>), AstError> {
    let mut rest = records(raw);
    if rest
        .first()
        .is_some_and(|first| kind_of(first) == Some(NodeKind::StructuredDocumentation))
    {
        let doc = conversion.convert(rest.remove(0))?;
        return Ok((Some(Documentation::Node(doc)), rest));
    }
    let text = raw::opt_string(attributes(raw), "documentation");
    Ok((text.map(Documentation::Text), rest))
}

/// Legacy marks absent optional parts with explicit `null` attributes; the
/// remaining children fill the present parts in order.
fn optional_parts<const N: usize>(
    conversion: &mut Conversion<'_>,
    raw: &Value,
    records: &[&Value],
    parts: [&str; N],
) -> Result<[Option<NodeId>; N], AstError> {
    let attrs = attributes(raw);
    let mut result = [None; N];
    let mut next = 0;
    for (slot, part) in result.iter_mut().zip(parts) {
        let marked_absent = attrs.get(part).is_some_and(Value::is_null);
        if !marked_absent {
            *slot = nth_opt(conversion, records, next)?;
            next += 1;
        }
    }
    Ok(result)
}

fn visibility(raw: &Value) -> Result<Visibility, AstError> {
    raw::parsed_or(attributes(raw), "visibility", Visibility::Default)
}

fn state_mutability(raw: &Value) -> Result<StateMutability, AstError> {
    let attrs = attributes(raw);
    match raw::opt_parsed(attrs, "stateMutability")? {
        Some(mutability) => Ok(mutability),
        None => Ok(StateMutability::from_legacy(
            raw::boolean(attrs, "payable"),
            raw::boolean(attrs, "constant"),
        )),
    }
}

pub(crate) fn source_unit(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let absolute_path = raw::string_or_default(attrs, "absolutePath");
    Ok(SourceUnit {
        source_entry_key: absolute_path.clone(),
        source_list_index: raw::src(raw)?.source_index,
        absolute_path,
        exported_symbols: modern::exported_symbols(attrs),
        license: raw::opt_string(attrs, "license"),
        nodes: convert_all(conversion, &records(raw))?,
    }
    .into())
}

pub(crate) fn pragma_directive(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(PragmaDirective {
        literals: raw::strings(attributes(raw), "literals"),
    }
    .into())
}

fn symbol_alias(alias: &Value) -> SymbolAlias {
    let (foreign, foreign_declaration) = match field(alias, "foreign") {
        Some(Value::Number(id)) => (None, id.as_i64().unwrap_or(BUILTIN_REFERENCE)),
        Some(Value::String(name)) => (Some(name.clone()), BUILTIN_REFERENCE),
        Some(record) => {
            let attrs = attributes(record);
            (
                raw::opt_string(attrs, "value").or_else(|| raw::opt_string(record, "name")),
                raw::reference(attrs, "referencedDeclaration"),
            )
        }
        None => (None, BUILTIN_REFERENCE),
    };
    SymbolAlias {
        foreign,
        foreign_declaration,
        local: raw::opt_string(alias, "local"),
    }
}

pub(crate) fn import_directive(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let symbol_aliases = field(attrs, "symbolAliases")
        .and_then(Value::as_array)
        .map(|aliases| aliases.iter().map(symbol_alias).collect())
        .unwrap_or_default();
    Ok(ImportDirective {
        file: raw::string(attrs, "file")?,
        absolute_path: raw::string_or_default(attrs, "absolutePath"),
        unit_alias: raw::string_or_default(attrs, "unitAlias"),
        symbol_aliases,
        scope: raw::reference(attrs, "scope"),
        source_unit: raw::reference(attrs, "SourceUnit"),
    }
    .into())
}

pub(crate) fn contract_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let nodes = convert_all(conversion, &records(raw))?;
    Ok(ContractDefinition {
        name: raw::string(attrs, "name")?,
        scope: raw::reference(attrs, "scope"),
        kind: raw::parsed(attrs, "contractKind")?,
        is_abstract: raw::boolean(attrs, "abstract"),
        fully_implemented: field(attrs, "fullyImplemented")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        linearized_base_contracts: raw::ids(attrs, "linearizedBaseContracts"),
        used_errors: Vec::new(),
        used_events: Vec::new(),
        doc_string: raw::opt_string(attrs, "documentation"),
        dangling_doc_string: None,
        name_location: None,
        nodes,
    }
    .into())
}

pub(crate) fn inheritance_specifier(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    let base_type = nth(conversion, raw, &records, 0)?;
    Ok(InheritanceSpecifier {
        base_type,
        arguments: convert_all(conversion, records.get(1..).unwrap_or_default())?,
    }
    .into())
}

/// `using L for *;` has no type-name child.
pub(crate) fn using_for_directive(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(UsingForDirective {
        is_global: false,
        operators: Vec::new(),
        library_name: nth_opt(conversion, &records, 0)?,
        function_list: Vec::new(),
        type_name: nth_opt(conversion, &records, 1)?,
    }
    .into())
}

pub(crate) fn struct_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let (documentation, rest) = documented(conversion, raw)?;
    Ok(StructDefinition {
        name: raw::string(attrs, "name")?,
        scope: raw::reference(attrs, "scope"),
        visibility: visibility(raw)?,
        name_location: None,
        documentation,
        members: convert_all(conversion, &rest)?,
    }
    .into())
}

pub(crate) fn enum_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let (documentation, rest) = documented(conversion, raw)?;
    Ok(EnumDefinition {
        name: raw::string(attributes(raw), "name")?,
        name_location: None,
        documentation,
        members: convert_all(conversion, &rest)?,
    }
    .into())
}

pub(crate) fn enum_value(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(EnumValue {
        name: raw::string(attributes(raw), "name")?,
        name_location: None,
    }
    .into())
}

pub(crate) fn parameter_list(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ParameterList {
        parameters: convert_all(conversion, &records(raw))?,
    }
    .into())
}

pub(crate) fn override_specifier(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(OverrideSpecifier {
        overrides: convert_all(conversion, &records(raw))?,
    }
    .into())
}

/// Children come as parameters, optional overrides, modifiers, return
/// parameters and an optional body; the two parameter lists are told apart by position.
pub(crate) fn function_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let name = raw::string_or_default(attrs, "name");
    let kind = match raw::opt_parsed::<FunctionKind>(attrs, "kind")? {
        Some(kind) => kind,
        None => FunctionKind::from_legacy(raw::boolean(attrs, "isConstructor"), &name),
    };
    let (documentation, rest) = documented(conversion, raw)?;

    let mut parameter_lists = Vec::new();
    let mut override_specifier = None;
    let mut modifiers = Vec::new();
    let mut body = None;
    for record in rest {
        let id = conversion.convert(record)?;
        match kind_of(record) {
            Some(NodeKind::ParameterList) => parameter_lists.push(id),
            Some(NodeKind::OverrideSpecifier) => override_specifier = Some(id),
            Some(NodeKind::ModifierInvocation) => modifiers.push(id),
            _ => body = Some(id),
        }
    }
    let [parameters, return_parameters] = parameter_lists[..] else {
        return Err(AstError::malformed(
            "FunctionDefinition",
            format!("expected 2 parameter lists, found {}", parameter_lists.len()),
        ));
    };

    Ok(FunctionDefinition {
        scope: raw::reference(attrs, "scope"),
        kind,
        name,
        is_virtual: raw::boolean(attrs, "virtual"),
        visibility: visibility(raw)?,
        state_mutability: state_mutability(raw)?,
        is_constructor: kind == FunctionKind::Constructor,
        name_location: None,
        documentation,
        parameters,
        override_specifier,
        modifiers,
        return_parameters,
        body,
    }
    .into())
}

/// Children are classified by kind: type name, override specifier, documentation,
/// anything else is the initial value.
pub(crate) fn variable_declaration(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let constant = raw::boolean(attrs, "constant");
    let (mut documentation, rest) = documented(conversion, raw)?;
    let mut type_name = None;
    let mut override_specifier = None;
    let mut value = None;
    for record in rest {
        let id = conversion.convert(record)?;
        match kind_of(record) {
            Some(kind) if kind.is_type_name() => type_name = Some(id),
            Some(NodeKind::OverrideSpecifier) => override_specifier = Some(id),
            Some(NodeKind::StructuredDocumentation) => documentation = Some(Documentation::Node(id)),
            _ => value = Some(id),
        }
    }
    Ok(VariableDeclaration {
        constant,
        indexed: raw::boolean(attrs, "indexed"),
        name: raw::string_or_default(attrs, "name"),
        scope: raw::reference(attrs, "scope"),
        state_variable: raw::boolean(attrs, "stateVariable"),
        storage_location: raw::parsed_or(attrs, "storageLocation", DataLocation::Default)?,
        visibility: visibility(raw)?,
        mutability: raw::parsed_or(attrs, "mutability", Mutability::from_constant(constant))?,
        type_string: type_string(raw),
        name_location: None,
        documentation,
        type_name,
        override_specifier,
        value,
    }
    .into())
}

pub(crate) fn modifier_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let (documentation, rest) = documented(conversion, raw)?;
    let mut parameters = None;
    let mut override_specifier = None;
    let mut body = None;
    for record in rest {
        let id = conversion.convert(record)?;
        match kind_of(record) {
            Some(NodeKind::ParameterList) => parameters = Some(id),
            Some(NodeKind::OverrideSpecifier) => override_specifier = Some(id),
            _ => body = Some(id),
        }
    }
    Ok(ModifierDefinition {
        name: raw::string(attrs, "name")?,
        is_virtual: raw::boolean(attrs, "virtual"),
        visibility: raw::parsed_or(attrs, "visibility", Visibility::Internal)?,
        name_location: None,
        documentation,
        parameters: parameters.ok_or_else(|| raw::missing(raw, "ParameterList"))?,
        override_specifier,
        body,
    }
    .into())
}

pub(crate) fn modifier_invocation(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    let modifier_name = nth(conversion, raw, &records, 0)?;
    Ok(ModifierInvocation {
        kind: raw::opt_parsed(attributes(raw), "kind")?,
        modifier_name,
        arguments: convert_all(conversion, records.get(1..).unwrap_or_default())?,
    }
    .into())
}

pub(crate) fn event_definition(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let (documentation, rest) = documented(conversion, raw)?;
    Ok(EventDefinition {
        anonymous: raw::boolean(attrs, "anonymous"),
        name: raw::string(attrs, "name")?,
        name_location: None,
        documentation,
        parameters: nth(conversion, raw, &rest, 0)?,
    }
    .into())
}

pub(crate) fn user_defined_type_name(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    Ok(UserDefinedTypeName {
        type_string: type_string(raw),
        name: raw::opt_string(attrs, "name"),
        referenced_declaration: raw::reference(attrs, "referencedDeclaration"),
        path: nth_opt(conversion, &records(raw), 0)?,
    }
    .into())
}

pub(crate) fn elementary_type_name(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    Ok(ElementaryTypeName {
        type_string: type_string(raw),
        name: raw::string(attrs, "name")?,
        state_mutability: raw::parsed_or(attrs, "stateMutability", StateMutability::NonPayable)?,
    }
    .into())
}

pub(crate) fn mapping(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(Mapping {
        type_string: type_string(raw),
        key_type: nth(conversion, raw, &records, 0)?,
        value_type: nth(conversion, raw, &records, 1)?,
    }
    .into())
}

pub(crate) fn array_type_name(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(ArrayTypeName {
        type_string: type_string(raw),
        base_type: nth(conversion, raw, &records, 0)?,
        length: nth_opt(conversion, &records, 1)?,
    }
    .into())
}

pub(crate) fn function_type_name(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(FunctionTypeName {
        type_string: type_string(raw),
        visibility: visibility(raw)?,
        state_mutability: state_mutability(raw)?,
        parameter_types: nth(conversion, raw, &records, 0)?,
        return_parameter_types: nth(conversion, raw, &records, 1)?,
    }
    .into())
}

pub(crate) fn block(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Block {
        doc_string: raw::opt_string(attributes(raw), "documentation"),
        dangling_doc_string: None,
        statements: convert_all(conversion, &records(raw))?,
    }
    .into())
}

fn statement_documentation(raw: &Value) -> Option<Documentation> {
    raw::opt_string(attributes(raw), "documentation").map(Documentation::Text)
}

pub(crate) fn placeholder_statement(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(PlaceholderStatement {
        documentation: statement_documentation(raw),
    }
    .into())
}

pub(crate) fn break_statement(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Break {
        documentation: statement_documentation(raw),
    }
    .into())
}

pub(crate) fn continue_statement(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Continue {
        documentation: statement_documentation(raw),
    }
    .into())
}

pub(crate) fn throw_statement(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Throw {
        documentation: statement_documentation(raw),
    }
    .into())
}

pub(crate) fn if_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(IfStatement {
        documentation: statement_documentation(raw),
        condition: nth(conversion, raw, &records, 0)?,
        true_body: nth(conversion, raw, &records, 1)?,
        false_body: nth_opt(conversion, &records, 2)?,
    }
    .into())
}

pub(crate) fn try_catch_clause(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let mut parameters = None;
    let mut block = None;
    for record in records(raw) {
        let id = conversion.convert(record)?;
        if kind_of(record) == Some(NodeKind::ParameterList) {
            parameters = Some(id);
        } else {
            block = Some(id);
        }
    }
    Ok(TryCatchClause {
        error_name: raw::string_or_default(attributes(raw), "errorName"),
        documentation: statement_documentation(raw),
        parameters,
        block: block.ok_or_else(|| raw::missing(raw, "Block"))?,
    }
    .into())
}

pub(crate) fn try_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    let external_call = nth(conversion, raw, &records, 0)?;
    Ok(TryStatement {
        documentation: statement_documentation(raw),
        external_call,
        clauses: convert_all(conversion, records.get(1..).unwrap_or_default())?,
    }
    .into())
}

pub(crate) fn while_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(WhileStatement {
        documentation: statement_documentation(raw),
        condition: nth(conversion, raw, &records, 0)?,
        body: nth(conversion, raw, &records, 1)?,
    }
    .into())
}

pub(crate) fn do_while_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(DoWhileStatement {
        documentation: statement_documentation(raw),
        condition: nth(conversion, raw, &records, 0)?,
        body: nth(conversion, raw, &records, 1)?,
    }
    .into())
}

pub(crate) fn for_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    let [initialization_expression, condition, loop_expression] = optional_parts(
        conversion,
        raw,
        &records,
        ["initializationExpression", "condition", "loopExpression"],
    )?;
    let present = [initialization_expression, condition, loop_expression]
        .iter()
        .flatten()
        .count();
    Ok(ForStatement {
        documentation: statement_documentation(raw),
        initialization_expression,
        condition,
        loop_expression,
        body: nth(conversion, raw, &records, present)?,
    }
    .into())
}

pub(crate) fn inline_assembly(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let external_references = field(attrs, "externalReferences")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(modern::external_reference)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();
    Ok(InlineAssembly {
        external_references,
        operations: raw::opt_string(attrs, "operations"),
        flags: Vec::new(),
        evm_version: raw::opt_string(attrs, "evmVersion"),
        documentation: statement_documentation(raw),
        yul: None,
    }
    .into())
}

pub(crate) fn return_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(Return {
        function_return_parameters: raw::reference(attributes(raw), "functionReturnParameters"),
        documentation: statement_documentation(raw),
        expression: nth_opt(conversion, &records(raw), 0)?,
    }
    .into())
}

pub(crate) fn emit_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(EmitStatement {
        documentation: statement_documentation(raw),
        event_call: nth(conversion, raw, &records(raw), 0)?,
    }
    .into())
}

pub(crate) fn variable_declaration_statement(
    conversion: &mut Conversion<'_>,
    raw: &Value,
) -> Processed {
    let assignments = field(attributes(raw), "assignments")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().map(Value::as_i64).collect())
        .unwrap_or_default();
    let mut declarations = Vec::new();
    let mut initial_value = None;
    for record in records(raw) {
        let id = conversion.convert(record)?;
        if kind_of(record) == Some(NodeKind::VariableDeclaration) {
            declarations.push(id);
        } else {
            initial_value = Some(id);
        }
    }
    Ok(VariableDeclarationStatement {
        assignments,
        documentation: statement_documentation(raw),
        declarations,
        initial_value,
    }
    .into())
}

pub(crate) fn expression_statement(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(ExpressionStatement {
        documentation: statement_documentation(raw),
        expression: nth(conversion, raw, &records(raw), 0)?,
    }
    .into())
}

pub(crate) fn conditional(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(Conditional {
        type_string: type_string(raw),
        condition: nth(conversion, raw, &records, 0)?,
        true_expression: nth(conversion, raw, &records, 1)?,
        false_expression: nth(conversion, raw, &records, 2)?,
    }
    .into())
}

pub(crate) fn assignment(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(Assignment {
        type_string: type_string(raw),
        operator: raw::string(attributes(raw), "operator")?,
        left_hand_side: nth(conversion, raw, &records, 0)?,
        right_hand_side: nth(conversion, raw, &records, 1)?,
    }
    .into())
}

/// Holes in the component list are kept as `null` children.
pub(crate) fn tuple_expression(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(TupleExpression {
        type_string: type_string(raw),
        is_inline_array: raw::boolean(attributes(raw), "isInlineArray"),
        components: conversion.convert_sparse(raw.get("children"))?,
    }
    .into())
}

pub(crate) fn unary_operation(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    Ok(UnaryOperation {
        type_string: type_string(raw),
        prefix: raw::boolean(attrs, "prefix"),
        operator: raw::string(attrs, "operator")?,
        sub_expression: nth(conversion, raw, &records(raw), 0)?,
    }
    .into())
}

pub(crate) fn binary_operation(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(BinaryOperation {
        type_string: type_string(raw),
        operator: raw::string(attributes(raw), "operator")?,
        left_expression: nth(conversion, raw, &records, 0)?,
        right_expression: nth(conversion, raw, &records, 1)?,
    }
    .into())
}

pub(crate) fn function_call(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    let kind = match raw::opt_parsed::<FunctionCallKind>(attrs, "kind")? {
        Some(kind) => kind,
        None => FunctionCallKind::from_legacy(
            raw::boolean(attrs, "type_conversion"),
            raw::boolean(attrs, "isStructConstructorCall"),
        ),
    };
    let names = raw::strings(attrs, "names");
    let records = records(raw);
    let expression = nth(conversion, raw, &records, 0)?;
    Ok(FunctionCall {
        type_string: type_string(raw),
        kind,
        field_names: (!names.is_empty()).then_some(names),
        expression,
        arguments: convert_all(conversion, records.get(1..).unwrap_or_default())?,
    }
    .into())
}

pub(crate) fn function_call_options(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    let expression = nth(conversion, raw, &records, 0)?;
    Ok(FunctionCallOptions {
        type_string: type_string(raw),
        names: raw::strings(attributes(raw), "names"),
        expression,
        options: convert_all(conversion, records.get(1..).unwrap_or_default())?,
    }
    .into())
}

pub(crate) fn new_expression(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(NewExpression {
        type_string: type_string(raw),
        type_name: nth(conversion, raw, &records(raw), 0)?,
    }
    .into())
}

pub(crate) fn member_access(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    Ok(MemberAccess {
        type_string: type_string(raw),
        member_name: raw::string(attrs, "member_name")?,
        referenced_declaration: raw::reference(attrs, "referencedDeclaration"),
        expression: nth(conversion, raw, &records(raw), 0)?,
    }
    .into())
}

pub(crate) fn index_access(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    Ok(IndexAccess {
        type_string: type_string(raw),
        base_expression: nth(conversion, raw, &records, 0)?,
        index_expression: nth_opt(conversion, &records, 1)?,
    }
    .into())
}

pub(crate) fn index_range_access(conversion: &mut Conversion<'_>, raw: &Value) -> Processed {
    let records = records(raw);
    let base_expression = nth(conversion, raw, &records, 0)?;
    let [start_expression, end_expression] = optional_parts(
        conversion,
        raw,
        records.get(1..).unwrap_or_default(),
        ["startExpression", "endExpression"],
    )?;
    Ok(IndexRangeAccess {
        type_string: type_string(raw),
        base_expression,
        start_expression,
        end_expression,
    }
    .into())
}

/// Legacy identifiers carry their name in the `value` attribute.
pub(crate) fn identifier(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    Ok(Identifier {
        type_string: type_string(raw),
        name: raw::string(attrs, "value")?,
        referenced_declaration: raw::reference(attrs, "referencedDeclaration"),
        overloaded_declarations: raw::ids(attrs, "overloadedDeclarations"),
    }
    .into())
}

pub(crate) fn elementary_type_name_expression(
    conversion: &mut Conversion<'_>,
    raw: &Value,
) -> Processed {
    let type_name = match nth_opt(conversion, &records(raw), 0)? {
        Some(id) => TypeNameOperand::Node(id),
        None => TypeNameOperand::Name(raw::string(attributes(raw), "value")?),
    };
    Ok(ElementaryTypeNameExpression {
        type_string: type_string(raw),
        type_name,
    }
    .into())
}

pub(crate) fn literal(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    let attrs = attributes(raw);
    Ok(Literal {
        type_string: type_string(raw),
        kind: raw::parsed_or(attrs, "token", LiteralKind::Number)?,
        hex_value: raw::string_or_default(attrs, "hexvalue"),
        value: raw::opt_string(attrs, "value"),
        subdenomination: raw::opt_string(attrs, "subdenomination"),
    }
    .into())
}

pub(crate) fn structured_documentation(_: &mut Conversion<'_>, raw: &Value) -> Processed {
    Ok(StructuredDocumentation {
        text: extract_documentation_text(&raw::string(attributes(raw), "text")?),
    }
    .into())
}
