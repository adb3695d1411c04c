use core::fmt;
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::Serialize;
use serde_json::Value;

use crate::{context::ContextId, errors::AstError, node_kind::NodeKind};

/// Identity of a node inside its context. Compiler ids are non-negative.
pub type NodeId = i64;

/// Cross-reference value meaning "no resolvable target" (builtin or compiler-internal symbol).
pub const BUILTIN_REFERENCE: NodeId = -1;

/// Byte range of a node in one of the compiled sources, as `offset:length:source_index`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct SourceLocation {
    pub offset: i64,
    pub length: i64,
    pub source_index: i64,
}

impl SourceLocation {
    pub const UNKNOWN: SourceLocation = SourceLocation {
        offset: -1,
        length: -1,
        source_index: -1,
    };

    #[must_use]
    pub fn new(offset: i64, length: i64, source_index: i64) -> Self {
        Self {
            offset,
            length,
            source_index,
        }
    }

    /// Offset one past the last byte of the range.
    #[must_use]
    pub fn end(&self) -> i64 {
        self.offset.saturating_add(self.length)
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.offset < 0
    }

    #[must_use]
    pub fn contains(&self, other: &SourceLocation) -> bool {
        self.source_index == other.source_index
            && self.offset <= other.offset
            && other.end() <= self.end()
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.length, self.source_index)
    }
}

impl FromStr for SourceLocation {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(':')
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AstError::malformed("SourceLocation", format!("`{s}`: {e}")))?;
        match parts.as_slice() {
            [offset, length, source_index] => Ok(Self::new(*offset, *length, *source_index)),
            [offset, length] => Ok(Self::new(*offset, *length, -1)),
            _ => Err(AstError::malformed(
                "SourceLocation",
                format!("`{s}` is not in `offset:length:index` form"),
            )),
        }
    }
}

/// Documentation attached to a node: inline text or a `StructuredDocumentation` child.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub enum Documentation {
    Text(String),
    Node(NodeId),
}

impl Documentation {
    #[must_use]
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Documentation::Node(id) => Some(*id),
            Documentation::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Documentation::Text(text) => Some(text),
            Documentation::Node(_) => None,
        }
    }
}

/// Operand of an `ElementaryTypeNameExpression`: older compilers emit the bare
/// type name, newer ones an `ElementaryTypeName` node.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub enum TypeNameOperand {
    Name(String),
    Node(NodeId),
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct SymbolAlias {
    pub foreign: Option<String>,
    pub foreign_declaration: NodeId,
    pub local: Option<String>,
}

/// Solidity declaration referenced from inside an inline assembly block.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ExternalReference {
    pub name: Option<String>,
    pub declaration: NodeId,
    pub src: SourceLocation,
    pub value_size: i64,
    pub suffix: Option<String>,
    pub is_offset: bool,
    pub is_slot: bool,
}

/// `using {f as +} for T` binds a user-defined operator to the function path `function`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct UsingForOperator {
    pub function: NodeId,
    pub operator: String,
}

macro_rules! string_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$attr:meta])*
                $variant:ident = $text:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
        pub enum $name {
            $(
                $(#[$attr])*
                #[serde(rename = $text)]
                $variant,
            )*
        }

        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )*
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )*
                    _ => Err(format!("unknown {} `{s}`", stringify!($name))),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    pub enum ContractKind {
        Contract = "contract",
        Interface = "interface",
        Library = "library",
    }
}

string_enum! {
    pub enum FunctionKind {
        Function = "function",
        Receive = "receive",
        Constructor = "constructor",
        Fallback = "fallback",
        FreeFunction = "freeFunction",
    }
}

string_enum! {
    pub enum Visibility {
        External = "external",
        Public = "public",
        Internal = "internal",
        Private = "private",
        Default = "default",
    }
}

string_enum! {
    pub enum StateMutability {
        Pure = "pure",
        View = "view",
        Constant = "constant",
        NonPayable = "nonpayable",
        Payable = "payable",
    }
}

string_enum! {
    pub enum Mutability {
        Mutable = "mutable",
        Immutable = "immutable",
        Constant = "constant",
    }
}

string_enum! {
    pub enum DataLocation {
        Storage = "storage",
        Memory = "memory",
        Calldata = "calldata",
        Transient = "transient",
        Default = "default",
    }
}

string_enum! {
    pub enum LiteralKind {
        Number = "number",
        Bool = "bool",
        String = "string",
        HexString = "hexString",
        UnicodeString = "unicodeString",
    }
}

string_enum! {
    pub enum FunctionCallKind {
        FunctionCall = "functionCall",
        TypeConversion = "typeConversion",
        StructConstructorCall = "structConstructorCall",
    }
}

string_enum! {
    pub enum ModifierInvocationKind {
        ModifierInvocation = "modifierInvocation",
        BaseConstructorSpecifier = "baseConstructorSpecifier",
    }
}

string_enum! {
    pub enum YulLiteralKind {
        Number = "number",
        Bool = "bool",
        String = "string",
    }
}

/// Borrowed view of one child-bearing field of a payload.
pub(crate) enum Slot<'a> {
    One(&'a NodeId),
    Opt(&'a Option<NodeId>),
    Many(&'a Vec<NodeId>),
    Sparse(&'a Vec<Option<NodeId>>),
    Doc(&'a Option<Documentation>),
    Operand(&'a TypeNameOperand),
}

pub(crate) enum SlotMut<'a> {
    One(&'a mut NodeId),
    Opt(&'a mut Option<NodeId>),
    Many(&'a mut Vec<NodeId>),
    Sparse(&'a mut Vec<Option<NodeId>>),
    Doc(&'a mut Option<Documentation>),
    Operand(&'a mut TypeNameOperand),
}

macro_rules! ast_slot {
    (@val $slots:ident $slot:ident, $field:expr) => {};
    (@one $slots:ident $slot:ident, $field:expr) => {
        $slots.push($slot::One($field));
    };
    (@opt $slots:ident $slot:ident, $field:expr) => {
        $slots.push($slot::Opt($field));
    };
    (@many $slots:ident $slot:ident, $field:expr) => {
        $slots.push($slot::Many($field));
    };
    (@sparse $slots:ident $slot:ident, $field:expr) => {
        $slots.push($slot::Sparse($field));
    };
    (@doc $slots:ident $slot:ident, $field:expr) => {
        $slots.push($slot::Doc($field));
    };
    (@operand $slots:ident $slot:ident, $field:expr) => {
        $slots.push($slot::Operand($field));
    };
}

/// Typed payload of one node kind.
pub trait NodePayload: Into<NodeData> {
    const KIND: NodeKind;

    fn from_data(data: &NodeData) -> Option<&Self>;

    fn from_data_mut(data: &mut NodeData) -> Option<&mut Self>;
}

/// Declares the payload structs. Every field is tagged with how it takes part
/// in the derived children sequence (`val` fields do not); children are listed
/// in field order.
macro_rules! ast_nodes {
    (
        $(
            $(#[$outer:meta])*
            pub struct $name:ident {
                $(
                    $(#[$field_attr:meta])*
                    $slot:ident $field:ident : $field_ty:ty
                ),* $(,)?
            }
        )+
    ) => {
        $(
            $(#[$outer])*
            #[derive(Clone, PartialEq, Eq, Debug, Serialize)]
            pub struct $name {
                $(
                    $(#[$field_attr])*
                    pub $field : $field_ty,
                )*
            }

            impl $name {
                #[allow(unused_mut)]
                pub(crate) fn slots(&self) -> Vec<Slot<'_>> {
                    let mut slots: Vec<Slot<'_>> = Vec::new();
                    $( ast_slot!(@ $slot slots Slot, &self.$field); )*
                    slots
                }

                #[allow(unused_mut)]
                pub(crate) fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
                    let mut slots: Vec<SlotMut<'_>> = Vec::new();
                    $( ast_slot!(@ $slot slots SlotMut, &mut self.$field); )*
                    slots
                }
            }

            impl From<$name> for NodeData {
                fn from(payload: $name) -> Self {
                    NodeData::$name(payload)
                }
            }

            impl NodePayload for $name {
                const KIND: NodeKind = NodeKind::$name;

                fn from_data(data: &NodeData) -> Option<&Self> {
                    match data {
                        NodeData::$name(payload) => Some(payload),
                        _ => None,
                    }
                }

                fn from_data_mut(data: &mut NodeData) -> Option<&mut Self> {
                    match data {
                        NodeData::$name(payload) => Some(payload),
                        _ => None,
                    }
                }
            }
        )+

        /// Kind-specific payload of a node.
        #[derive(Clone, PartialEq, Eq, Debug, Serialize)]
        #[serde(tag = "nodeType")]
        pub enum NodeData {
            $( $name($name), )+
        }

        impl NodeData {
            #[must_use]
            pub fn kind(&self) -> NodeKind {
                match self {
                    $( NodeData::$name(_) => NodeKind::$name, )+
                }
            }

            pub(crate) fn slots(&self) -> Vec<Slot<'_>> {
                match self {
                    $( NodeData::$name(payload) => payload.slots(), )+
                }
            }

            pub(crate) fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
                match self {
                    $( NodeData::$name(payload) => payload.slots_mut(), )+
                }
            }
        }
    };
}

ast_nodes! {

    /// Contracts, interfaces and libraries. Structured documentation, inheritance
    /// specifiers and members all live in `nodes`, in source order.
    pub struct ContractDefinition {
        val name: String,
        val scope: NodeId,
        val kind: ContractKind,
        val is_abstract: bool,
        val fully_implemented: bool,
        val linearized_base_contracts: Vec<NodeId>,
        val used_errors: Vec<NodeId>,
        val used_events: Vec<NodeId>,
        val doc_string: Option<String>,
        val dangling_doc_string: Option<String>,
        val name_location: Option<SourceLocation>,
        many nodes: Vec<NodeId>,
    }

    pub struct EnumDefinition {
        val name: String,
        val name_location: Option<SourceLocation>,
        doc documentation: Option<Documentation>,
        many members: Vec<NodeId>,
    }

    pub struct EnumValue {
        val name: String,
        val name_location: Option<SourceLocation>,
    }

    pub struct ErrorDefinition {
        val name: String,
        val name_location: Option<SourceLocation>,
        doc documentation: Option<Documentation>,
        one parameters: NodeId,
    }

    pub struct EventDefinition {
        val anonymous: bool,
        val name: String,
        val name_location: Option<SourceLocation>,
        doc documentation: Option<Documentation>,
        one parameters: NodeId,
    }

    pub struct FunctionDefinition {
        val scope: NodeId,
        val kind: FunctionKind,
        val name: String,
        val is_virtual: bool,
        val visibility: Visibility,
        val state_mutability: StateMutability,
        val is_constructor: bool,
        val name_location: Option<SourceLocation>,
        doc documentation: Option<Documentation>,
        one parameters: NodeId,
        opt override_specifier: Option<NodeId>,
        many modifiers: Vec<NodeId>,
        one return_parameters: NodeId,
        opt body: Option<NodeId>,
    }

    pub struct ModifierDefinition {
        val name: String,
        val is_virtual: bool,
        val visibility: Visibility,
        val name_location: Option<SourceLocation>,
        doc documentation: Option<Documentation>,
        one parameters: NodeId,
        opt override_specifier: Option<NodeId>,
        opt body: Option<NodeId>,
    }

    pub struct StructDefinition {
        val name: String,
        val scope: NodeId,
        val visibility: Visibility,
        val name_location: Option<SourceLocation>,
        doc documentation: Option<Documentation>,
        many members: Vec<NodeId>,
    }

    pub struct UserDefinedValueTypeDefinition {
        val name: String,
        val name_location: Option<SourceLocation>,
        one underlying_type: NodeId,
    }

    /// State variables, parameters, struct members and locals.
    pub struct VariableDeclaration {
        val constant: bool,
        val indexed: bool,
        val name: String,
        val scope: NodeId,
        val state_variable: bool,
        val storage_location: DataLocation,
        val visibility: Visibility,
        val mutability: Mutability,
        val type_string: String,
        val name_location: Option<SourceLocation>,
        doc documentation: Option<Documentation>,
        /// Absent for `var` declarations of old compilers.
        opt type_name: Option<NodeId>,
        opt override_specifier: Option<NodeId>,
        opt value: Option<NodeId>,
    }

    pub struct Assignment {
        val type_string: String,
        val operator: String,
        one left_hand_side: NodeId,
        one right_hand_side: NodeId,
    }

    pub struct BinaryOperation {
        val type_string: String,
        val operator: String,
        one left_expression: NodeId,
        one right_expression: NodeId,
    }

    pub struct Conditional {
        val type_string: String,
        one condition: NodeId,
        one true_expression: NodeId,
        one false_expression: NodeId,
    }

    pub struct ElementaryTypeNameExpression {
        val type_string: String,
        operand type_name: TypeNameOperand,
    }

    pub struct FunctionCall {
        val type_string: String,
        val kind: FunctionCallKind,
        val field_names: Option<Vec<String>>,
        one expression: NodeId,
        many arguments: Vec<NodeId>,
    }

    /// `f{value: 1, gas: 2}`; `names[i]` labels `options[i]`.
    pub struct FunctionCallOptions {
        val type_string: String,
        val names: Vec<String>,
        one expression: NodeId,
        many options: Vec<NodeId>,
    }

    pub struct Identifier {
        val type_string: String,
        val name: String,
        val referenced_declaration: NodeId,
        val overloaded_declarations: Vec<NodeId>,
    }

    pub struct IndexAccess {
        val type_string: String,
        one base_expression: NodeId,
        opt index_expression: Option<NodeId>,
    }

    pub struct IndexRangeAccess {
        val type_string: String,
        one base_expression: NodeId,
        opt start_expression: Option<NodeId>,
        opt end_expression: Option<NodeId>,
    }

    pub struct Literal {
        val type_string: String,
        val kind: LiteralKind,
        val hex_value: String,
        /// Absent for hex strings that are not valid UTF-8.
        val value: Option<String>,
        val subdenomination: Option<String>,
    }

    pub struct MemberAccess {
        val type_string: String,
        val member_name: String,
        val referenced_declaration: NodeId,
        one expression: NodeId,
    }

    pub struct NewExpression {
        val type_string: String,
        one type_name: NodeId,
    }

    /// Components keep their holes: `(a, , c)` has a `None` in the middle.
    pub struct TupleExpression {
        val type_string: String,
        val is_inline_array: bool,
        sparse components: Vec<Option<NodeId>>,
    }

    pub struct UnaryOperation {
        val type_string: String,
        val prefix: bool,
        val operator: String,
        one sub_expression: NodeId,
    }

    pub struct IdentifierPath {
        val name: String,
        val referenced_declaration: NodeId,
    }

    pub struct ImportDirective {
        val file: String,
        val absolute_path: String,
        val unit_alias: String,
        val symbol_aliases: Vec<SymbolAlias>,
        val scope: NodeId,
        val source_unit: NodeId,
    }

    pub struct InheritanceSpecifier {
        one base_type: NodeId,
        many arguments: Vec<NodeId>,
    }

    pub struct ModifierInvocation {
        val kind: Option<ModifierInvocationKind>,
        one modifier_name: NodeId,
        many arguments: Vec<NodeId>,
    }

    pub struct OverrideSpecifier {
        many overrides: Vec<NodeId>,
    }

    pub struct ParameterList {
        many parameters: Vec<NodeId>,
    }

    pub struct PragmaDirective {
        val literals: Vec<String>,
    }

    /// Root of one source file.
    pub struct SourceUnit {
        val source_entry_key: String,
        val source_list_index: i64,
        val absolute_path: String,
        /// Export table: symbol name to declaration id.
        val exported_symbols: BTreeMap<String, NodeId>,
        val license: Option<String>,
        many nodes: Vec<NodeId>,
    }

    pub struct StructuredDocumentation {
        val text: String,
    }

    pub struct UsingForDirective {
        val is_global: bool,
        val operators: Vec<UsingForOperator>,
        opt library_name: Option<NodeId>,
        many function_list: Vec<NodeId>,
        opt type_name: Option<NodeId>,
    }

    pub struct Block {
        val doc_string: Option<String>,
        val dangling_doc_string: Option<String>,
        many statements: Vec<NodeId>,
    }

    pub struct Break {
        doc documentation: Option<Documentation>,
    }

    pub struct Continue {
        doc documentation: Option<Documentation>,
    }

    pub struct DoWhileStatement {
        doc documentation: Option<Documentation>,
        one condition: NodeId,
        one body: NodeId,
    }

    pub struct EmitStatement {
        doc documentation: Option<Documentation>,
        one event_call: NodeId,
    }

    pub struct ExpressionStatement {
        doc documentation: Option<Documentation>,
        one expression: NodeId,
    }

    pub struct ForStatement {
        doc documentation: Option<Documentation>,
        opt initialization_expression: Option<NodeId>,
        opt condition: Option<NodeId>,
        opt loop_expression: Option<NodeId>,
        one body: NodeId,
    }

    pub struct IfStatement {
        doc documentation: Option<Documentation>,
        one condition: NodeId,
        one true_body: NodeId,
        opt false_body: Option<NodeId>,
    }

    /// `yul` stays empty until the inline-assembly pass expands the embedded sub-AST.
    pub struct InlineAssembly {
        val external_references: Vec<ExternalReference>,
        val operations: Option<String>,
        val flags: Vec<String>,
        val evm_version: Option<String>,
        doc documentation: Option<Documentation>,
        opt yul: Option<NodeId>,
    }

    pub struct PlaceholderStatement {
        doc documentation: Option<Documentation>,
    }

    pub struct Return {
        val function_return_parameters: NodeId,
        doc documentation: Option<Documentation>,
        opt expression: Option<NodeId>,
    }

    pub struct RevertStatement {
        doc documentation: Option<Documentation>,
        one error_call: NodeId,
    }

    pub struct Throw {
        doc documentation: Option<Documentation>,
    }

    pub struct TryCatchClause {
        val error_name: String,
        doc documentation: Option<Documentation>,
        opt parameters: Option<NodeId>,
        one block: NodeId,
    }

    pub struct TryStatement {
        doc documentation: Option<Documentation>,
        one external_call: NodeId,
        many clauses: Vec<NodeId>,
    }

    pub struct UncheckedBlock {
        val doc_string: Option<String>,
        val dangling_doc_string: Option<String>,
        many statements: Vec<NodeId>,
    }

    pub struct VariableDeclarationStatement {
        /// Declared variable ids by position, with holes for skipped tuple slots.
        val assignments: Vec<Option<NodeId>>,
        doc documentation: Option<Documentation>,
        /// The declared variables without holes; `assignments` carries their tuple positions.
        many declarations: Vec<NodeId>,
        opt initial_value: Option<NodeId>,
    }

    pub struct WhileStatement {
        doc documentation: Option<Documentation>,
        one condition: NodeId,
        one body: NodeId,
    }

    pub struct ArrayTypeName {
        val type_string: String,
        one base_type: NodeId,
        opt length: Option<NodeId>,
    }

    pub struct ElementaryTypeName {
        val type_string: String,
        val name: String,
        val state_mutability: StateMutability,
    }

    pub struct FunctionTypeName {
        val type_string: String,
        val visibility: Visibility,
        val state_mutability: StateMutability,
        one parameter_types: NodeId,
        one return_parameter_types: NodeId,
    }

    pub struct Mapping {
        val type_string: String,
        one key_type: NodeId,
        one value_type: NodeId,
    }

    pub struct UserDefinedTypeName {
        val type_string: String,
        /// Not emitted by compilers that carry an `IdentifierPath` instead.
        val name: Option<String>,
        val referenced_declaration: NodeId,
        opt path: Option<NodeId>,
    }

    pub struct YulAssignment {
        many variable_names: Vec<NodeId>,
        one value: NodeId,
    }

    pub struct YulBlock {
        many statements: Vec<NodeId>,
    }

    pub struct YulBreak {}

    /// `value` is empty for the `default` case.
    pub struct YulCase {
        opt value: Option<NodeId>,
        one body: NodeId,
    }

    pub struct YulContinue {}

    pub struct YulExpressionStatement {
        one expression: NodeId,
    }

    pub struct YulForLoop {
        one pre: NodeId,
        one condition: NodeId,
        one post: NodeId,
        one body: NodeId,
    }

    pub struct YulFunctionDefinition {
        val name: String,
        many parameters: Vec<NodeId>,
        many return_variables: Vec<NodeId>,
        one body: NodeId,
    }

    pub struct YulIf {
        one condition: NodeId,
        one body: NodeId,
    }

    pub struct YulLeave {}

    pub struct YulSwitch {
        one expression: NodeId,
        many cases: Vec<NodeId>,
    }

    pub struct YulVariableDeclaration {
        many variables: Vec<NodeId>,
        opt value: Option<NodeId>,
    }

    pub struct YulFunctionCall {
        one function_name: NodeId,
        many arguments: Vec<NodeId>,
    }

    pub struct YulIdentifier {
        val name: String,
        val referenced_declaration: NodeId,
    }

    pub struct YulLiteral {
        val kind: YulLiteralKind,
        val value: String,
        val hex_value: Option<String>,
        val type_string: String,
    }

    pub struct YulTypedName {
        val name: String,
        val type_string: String,
    }

    pub struct YulCode {
        one block: NodeId,
    }

    pub struct YulData {
        val name: String,
        val value: String,
    }

    pub struct YulObject {
        val name: String,
        one code: NodeId,
        many sub_objects: Vec<NodeId>,
    }
}

/// A node of the graph. Children are not stored here: they are derived from the
/// child-bearing fields of `data`.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub src: SourceLocation,
    /// The raw compiler record this node was read from, with nested node records stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    pub data: NodeData,
    pub(crate) parent: Option<NodeId>,
    #[serde(skip)]
    pub(crate) context: Option<ContextId>,
}
