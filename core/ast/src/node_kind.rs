use core::fmt;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::Serialize;

use crate::reader::{AstFormat, Processor, legacy, modern};

macro_rules! optional_processor {
    () => {
        None
    };
    ($processor:path) => {
        Some($processor as Processor)
    };
}

/// Declares the closed set of node kinds together with their per-format
/// processors. A kind without a `legacy` entry cannot appear in legacy output.
macro_rules! node_kinds {
    (
        $(
            $kind:ident => { $(legacy: $legacy:path,)? modern: $modern:path $(,)? }
        ),+ $(,)?
    ) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
        pub enum NodeKind {
            $( $kind, )+
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[ $( NodeKind::$kind, )+ ];

            /// The kind tag compilers emit (`nodeType` / legacy `name`).
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( NodeKind::$kind => stringify!($kind), )+
                }
            }

            pub(crate) fn processor(self, format: AstFormat) -> Option<Processor> {
                match (self, format) {
                    $(
                        (NodeKind::$kind, AstFormat::Legacy) => optional_processor!($($legacy)?),
                        (NodeKind::$kind, AstFormat::Modern) => optional_processor!($modern),
                    )+
                }
            }
        }
    };
}

node_kinds! {
    ContractDefinition => { legacy: legacy::contract_definition, modern: modern::contract_definition },
    EnumDefinition => { legacy: legacy::enum_definition, modern: modern::enum_definition },
    EnumValue => { legacy: legacy::enum_value, modern: modern::enum_value },
    ErrorDefinition => { modern: modern::error_definition },
    EventDefinition => { legacy: legacy::event_definition, modern: modern::event_definition },
    FunctionDefinition => { legacy: legacy::function_definition, modern: modern::function_definition },
    ModifierDefinition => { legacy: legacy::modifier_definition, modern: modern::modifier_definition },
    StructDefinition => { legacy: legacy::struct_definition, modern: modern::struct_definition },
    UserDefinedValueTypeDefinition => { modern: modern::user_defined_value_type_definition },
    VariableDeclaration => { legacy: legacy::variable_declaration, modern: modern::variable_declaration },

    Assignment => { legacy: legacy::assignment, modern: modern::assignment },
    BinaryOperation => { legacy: legacy::binary_operation, modern: modern::binary_operation },
    Conditional => { legacy: legacy::conditional, modern: modern::conditional },
    ElementaryTypeNameExpression => {
        legacy: legacy::elementary_type_name_expression,
        modern: modern::elementary_type_name_expression,
    },
    FunctionCall => { legacy: legacy::function_call, modern: modern::function_call },
    FunctionCallOptions => { legacy: legacy::function_call_options, modern: modern::function_call_options },
    Identifier => { legacy: legacy::identifier, modern: modern::identifier },
    IndexAccess => { legacy: legacy::index_access, modern: modern::index_access },
    IndexRangeAccess => { legacy: legacy::index_range_access, modern: modern::index_range_access },
    Literal => { legacy: legacy::literal, modern: modern::literal },
    MemberAccess => { legacy: legacy::member_access, modern: modern::member_access },
    NewExpression => { legacy: legacy::new_expression, modern: modern::new_expression },
    TupleExpression => { legacy: legacy::tuple_expression, modern: modern::tuple_expression },
    UnaryOperation => { legacy: legacy::unary_operation, modern: modern::unary_operation },

    IdentifierPath => { modern: modern::identifier_path },
    ImportDirective => { legacy: legacy::import_directive, modern: modern::import_directive },
    InheritanceSpecifier => { legacy: legacy::inheritance_specifier, modern: modern::inheritance_specifier },
    ModifierInvocation => { legacy: legacy::modifier_invocation, modern: modern::modifier_invocation },
    OverrideSpecifier => { legacy: legacy::override_specifier, modern: modern::override_specifier },
    ParameterList => { legacy: legacy::parameter_list, modern: modern::parameter_list },
    PragmaDirective => { legacy: legacy::pragma_directive, modern: modern::pragma_directive },
    SourceUnit => { legacy: legacy::source_unit, modern: modern::source_unit },
    StructuredDocumentation => {
        legacy: legacy::structured_documentation,
        modern: modern::structured_documentation,
    },
    UsingForDirective => { legacy: legacy::using_for_directive, modern: modern::using_for_directive },

    Block => { legacy: legacy::block, modern: modern::block },
    Break => { legacy: legacy::break_statement, modern: modern::break_statement },
    Continue => { legacy: legacy::continue_statement, modern: modern::continue_statement },
    DoWhileStatement => { legacy: legacy::do_while_statement, modern: modern::do_while_statement },
    EmitStatement => { legacy: legacy::emit_statement, modern: modern::emit_statement },
    ExpressionStatement => { legacy: legacy::expression_statement, modern: modern::expression_statement },
    ForStatement => { legacy: legacy::for_statement, modern: modern::for_statement },
    IfStatement => { legacy: legacy::if_statement, modern: modern::if_statement },
    InlineAssembly => { legacy: legacy::inline_assembly, modern: modern::inline_assembly },
    PlaceholderStatement => {
        legacy: legacy::placeholder_statement,
        modern: modern::placeholder_statement,
    },
    Return => { legacy: legacy::return_statement, modern: modern::return_statement },
    RevertStatement => { modern: modern::revert_statement },
    Throw => { legacy: legacy::throw_statement, modern: modern::throw_statement },
    TryCatchClause => { legacy: legacy::try_catch_clause, modern: modern::try_catch_clause },
    TryStatement => { legacy: legacy::try_statement, modern: modern::try_statement },
    UncheckedBlock => { modern: modern::unchecked_block },
    VariableDeclarationStatement => {
        legacy: legacy::variable_declaration_statement,
        modern: modern::variable_declaration_statement,
    },
    WhileStatement => { legacy: legacy::while_statement, modern: modern::while_statement },

    ArrayTypeName => { legacy: legacy::array_type_name, modern: modern::array_type_name },
    ElementaryTypeName => { legacy: legacy::elementary_type_name, modern: modern::elementary_type_name },
    FunctionTypeName => { legacy: legacy::function_type_name, modern: modern::function_type_name },
    Mapping => { legacy: legacy::mapping, modern: modern::mapping },
    UserDefinedTypeName => { legacy: legacy::user_defined_type_name, modern: modern::user_defined_type_name },

    YulAssignment => { modern: modern::yul_assignment },
    YulBlock => { modern: modern::yul_block },
    YulBreak => { modern: modern::yul_break },
    YulCase => { modern: modern::yul_case },
    YulContinue => { modern: modern::yul_continue },
    YulExpressionStatement => { modern: modern::yul_expression_statement },
    YulForLoop => { modern: modern::yul_for_loop },
    YulFunctionDefinition => { modern: modern::yul_function_definition },
    YulIf => { modern: modern::yul_if },
    YulLeave => { modern: modern::yul_leave },
    YulSwitch => { modern: modern::yul_switch },
    YulVariableDeclaration => { modern: modern::yul_variable_declaration },
    YulFunctionCall => { modern: modern::yul_function_call },
    YulIdentifier => { modern: modern::yul_identifier },
    YulLiteral => { modern: modern::yul_literal },
    YulTypedName => { modern: modern::yul_typed_name },
    YulCode => { modern: modern::yul_code },
    YulData => { modern: modern::yul_data },
    YulObject => { modern: modern::yul_object },
}

impl NodeKind {
    #[must_use]
    pub fn is_yul(self) -> bool {
        self.as_str().starts_with("Yul")
    }

    #[must_use]
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::Assignment
                | NodeKind::BinaryOperation
                | NodeKind::Conditional
                | NodeKind::ElementaryTypeNameExpression
                | NodeKind::FunctionCall
                | NodeKind::FunctionCallOptions
                | NodeKind::Identifier
                | NodeKind::IndexAccess
                | NodeKind::IndexRangeAccess
                | NodeKind::Literal
                | NodeKind::MemberAccess
                | NodeKind::NewExpression
                | NodeKind::TupleExpression
                | NodeKind::UnaryOperation
        )
    }

    #[must_use]
    pub fn is_type_name(self) -> bool {
        matches!(
            self,
            NodeKind::ArrayTypeName
                | NodeKind::ElementaryTypeName
                | NodeKind::FunctionTypeName
                | NodeKind::Mapping
                | NodeKind::UserDefinedTypeName
        )
    }

    /// Kinds that keep structured documentation inside their child list and
    /// may carry dangling documentation.
    #[must_use]
    pub fn is_documentation_container(self) -> bool {
        matches!(
            self,
            NodeKind::ContractDefinition | NodeKind::Block | NodeKind::UncheckedBlock
        )
    }

    /// Kinds with a single preceding-documentation slot.
    #[must_use]
    pub fn has_documentation_slot(self) -> bool {
        match self {
            NodeKind::EnumDefinition
            | NodeKind::ErrorDefinition
            | NodeKind::EventDefinition
            | NodeKind::FunctionDefinition
            | NodeKind::ModifierDefinition
            | NodeKind::StructDefinition
            | NodeKind::VariableDeclaration
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::DoWhileStatement
            | NodeKind::EmitStatement
            | NodeKind::ExpressionStatement
            | NodeKind::ForStatement
            | NodeKind::IfStatement
            | NodeKind::InlineAssembly
            | NodeKind::PlaceholderStatement
            | NodeKind::Return
            | NodeKind::RevertStatement
            | NodeKind::Throw
            | NodeKind::TryCatchClause
            | NodeKind::TryStatement
            | NodeKind::VariableDeclarationStatement
            | NodeKind::WhileStatement => true,
            NodeKind::ContractDefinition
            | NodeKind::EnumValue
            | NodeKind::UserDefinedValueTypeDefinition
            | NodeKind::Assignment
            | NodeKind::BinaryOperation
            | NodeKind::Conditional
            | NodeKind::ElementaryTypeNameExpression
            | NodeKind::FunctionCall
            | NodeKind::FunctionCallOptions
            | NodeKind::Identifier
            | NodeKind::IndexAccess
            | NodeKind::IndexRangeAccess
            | NodeKind::Literal
            | NodeKind::MemberAccess
            | NodeKind::NewExpression
            | NodeKind::TupleExpression
            | NodeKind::UnaryOperation
            | NodeKind::IdentifierPath
            | NodeKind::ImportDirective
            | NodeKind::InheritanceSpecifier
            | NodeKind::ModifierInvocation
            | NodeKind::OverrideSpecifier
            | NodeKind::ParameterList
            | NodeKind::PragmaDirective
            | NodeKind::SourceUnit
            | NodeKind::StructuredDocumentation
            | NodeKind::UsingForDirective
            | NodeKind::Block
            | NodeKind::UncheckedBlock
            | NodeKind::ArrayTypeName
            | NodeKind::ElementaryTypeName
            | NodeKind::FunctionTypeName
            | NodeKind::Mapping
            | NodeKind::UserDefinedTypeName
            | NodeKind::YulAssignment
            | NodeKind::YulBlock
            | NodeKind::YulBreak
            | NodeKind::YulCase
            | NodeKind::YulContinue
            | NodeKind::YulExpressionStatement
            | NodeKind::YulForLoop
            | NodeKind::YulFunctionDefinition
            | NodeKind::YulIf
            | NodeKind::YulLeave
            | NodeKind::YulSwitch
            | NodeKind::YulVariableDeclaration
            | NodeKind::YulFunctionCall
            | NodeKind::YulIdentifier
            | NodeKind::YulLiteral
            | NodeKind::YulTypedName
            | NodeKind::YulCode
            | NodeKind::YulData
            | NodeKind::YulObject => false,
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown node kind `{s}`"))
    }
}
