//! Programmatic construction of nodes after parsing.
//!
//! Nodes made here take their ids from the same counter the reader uses and
//! are registered the same way, so consumers cannot tell them apart from
//! parsed nodes.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{
    context::{Context, NodeRef},
    errors::AstError,
    node_kind::NodeKind,
    nodes::{
        Assignment, BinaryOperation, Block, DataLocation, ElementaryTypeName,
        ExpressionStatement, FunctionCall, FunctionCallKind, Identifier, Literal, LiteralKind,
        MemberAccess, Mutability, Node, NodeData, NodeId, ParameterList, Return,
        SourceLocation, StateMutability, StructuredDocumentation, VariableDeclaration,
        Visibility,
    },
};

pub struct NodeFactory<'c> {
    context: &'c mut Context,
}

impl<'c> NodeFactory<'c> {
    #[must_use]
    pub fn new(context: &'c mut Context) -> Self {
        Self { context }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Creates a node of any kind with an unknown source location.
    ///
    /// Child ids in the payload are bare, so they always name nodes of this
    /// context. An id taken from another context's node is reported as
    /// [`AstError::UnknownNode`], or silently names an unrelated local node;
    /// use [`NodeFactory::make_with`] when children come in as [`NodeRef`]s.
    ///
    /// # Errors
    ///
    /// Every child id the payload names must be a detached node of this context;
    /// see [`Context::register`].
    pub fn make(&mut self, data: impl Into<NodeData>) -> Result<NodeRef, AstError> {
        self.make_at(SourceLocation::UNKNOWN, data)
    }

    /// Like [`NodeFactory::make`], but first checks that every node in
    /// `children` belongs to this context.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::ContextMismatch`] for the first foreign child, then
    /// whatever [`NodeFactory::make`] returns.
    pub fn make_with(
        &mut self,
        children: &[NodeRef],
        data: impl Into<NodeData>,
    ) -> Result<NodeRef, AstError> {
        for child in children {
            self.check_owned(*child)?;
        }
        self.make(data)
    }

    /// Creates a node of any kind at `src`.
    ///
    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn make_at(
        &mut self,
        src: SourceLocation,
        data: impl Into<NodeData>,
    ) -> Result<NodeRef, AstError> {
        let data = data.into();
        let id = self.context.next_id();
        trace!(id, kind = %data.kind(), "making node");
        self.context.register(Node::new(id, src, data, None))
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn identifier(
        &mut self,
        name: impl Into<String>,
        type_string: impl Into<String>,
        referenced_declaration: NodeId,
    ) -> Result<NodeRef, AstError> {
        self.make(Identifier {
            type_string: type_string.into(),
            name: name.into(),
            referenced_declaration,
            overloaded_declarations: Vec::new(),
        })
    }

    /// An identifier referring to `declaration` by name.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] if `declaration` is not registered and
    /// [`AstError::KindMismatch`] if it is not a named declaration.
    pub fn identifier_for(&mut self, declaration: NodeId) -> Result<NodeRef, AstError> {
        let node = self.context.node(declaration)?;
        let (name, type_string) = match &node.data {
            NodeData::VariableDeclaration(variable) => {
                (variable.name.clone(), variable.type_string.clone())
            }
            NodeData::FunctionDefinition(function) => (function.name.clone(), String::new()),
            NodeData::ContractDefinition(contract) => (
                contract.name.clone(),
                format!("type(contract {})", contract.name),
            ),
            NodeData::StructDefinition(structure) => (structure.name.clone(), String::new()),
            NodeData::EnumDefinition(definition) => (definition.name.clone(), String::new()),
            NodeData::EventDefinition(event) => (event.name.clone(), String::new()),
            NodeData::ErrorDefinition(error) => (error.name.clone(), String::new()),
            NodeData::ModifierDefinition(modifier) => (modifier.name.clone(), String::new()),
            NodeData::UserDefinedValueTypeDefinition(definition) => {
                (definition.name.clone(), String::new())
            }
            other => {
                return Err(AstError::KindMismatch {
                    id: declaration,
                    expected: NodeKind::VariableDeclaration,
                    found: other.kind(),
                });
            }
        };
        self.identifier(name, type_string, declaration)
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn elementary_type_name(&mut self, name: impl Into<String>) -> Result<NodeRef, AstError> {
        let name = name.into();
        self.make(ElementaryTypeName {
            type_string: name.clone(),
            name,
            state_mutability: StateMutability::NonPayable,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn literal(
        &mut self,
        kind: LiteralKind,
        value: impl Into<String>,
        type_string: impl Into<String>,
    ) -> Result<NodeRef, AstError> {
        let value = value.into();
        let hex_value = value.bytes().map(|byte| format!("{byte:02x}")).collect();
        self.make(Literal {
            type_string: type_string.into(),
            kind,
            hex_value,
            value: Some(value),
            subdenomination: None,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn parameter_list(&mut self, parameters: Vec<NodeId>) -> Result<NodeRef, AstError> {
        self.make(ParameterList { parameters })
    }

    /// A local variable of type `type_name` declared in `scope`.
    ///
    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn variable_declaration(
        &mut self,
        name: impl Into<String>,
        type_name: NodeId,
        scope: NodeId,
    ) -> Result<NodeRef, AstError> {
        let type_string = self.type_string_of(type_name);
        self.make(VariableDeclaration {
            constant: false,
            indexed: false,
            name: name.into(),
            scope,
            state_variable: false,
            storage_location: DataLocation::Default,
            visibility: Visibility::Internal,
            mutability: Mutability::Mutable,
            type_string,
            name_location: None,
            documentation: None,
            type_name: Some(type_name),
            override_specifier: None,
            value: None,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn block(&mut self, statements: Vec<NodeId>) -> Result<NodeRef, AstError> {
        self.make(Block {
            doc_string: None,
            dangling_doc_string: None,
            statements,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn expression_statement(&mut self, expression: NodeId) -> Result<NodeRef, AstError> {
        self.make(ExpressionStatement {
            documentation: None,
            expression,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn return_statement(
        &mut self,
        expression: Option<NodeId>,
        function_return_parameters: NodeId,
    ) -> Result<NodeRef, AstError> {
        self.make(Return {
            function_return_parameters,
            documentation: None,
            expression,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn assignment(
        &mut self,
        operator: impl Into<String>,
        left_hand_side: NodeId,
        right_hand_side: NodeId,
    ) -> Result<NodeRef, AstError> {
        let type_string = self.type_string_of(left_hand_side);
        self.make(Assignment {
            type_string,
            operator: operator.into(),
            left_hand_side,
            right_hand_side,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn binary_operation(
        &mut self,
        operator: impl Into<String>,
        left_expression: NodeId,
        right_expression: NodeId,
        type_string: impl Into<String>,
    ) -> Result<NodeRef, AstError> {
        self.make(BinaryOperation {
            type_string: type_string.into(),
            operator: operator.into(),
            left_expression,
            right_expression,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn function_call(
        &mut self,
        expression: NodeId,
        arguments: Vec<NodeId>,
        type_string: impl Into<String>,
    ) -> Result<NodeRef, AstError> {
        self.make(FunctionCall {
            type_string: type_string.into(),
            kind: FunctionCallKind::FunctionCall,
            field_names: None,
            expression,
            arguments,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn member_access(
        &mut self,
        expression: NodeId,
        member_name: impl Into<String>,
        referenced_declaration: NodeId,
        type_string: impl Into<String>,
    ) -> Result<NodeRef, AstError> {
        self.make(MemberAccess {
            type_string: type_string.into(),
            member_name: member_name.into(),
            referenced_declaration,
            expression,
        })
    }

    /// # Errors
    ///
    /// See [`NodeFactory::make`].
    pub fn structured_documentation(
        &mut self,
        text: impl Into<String>,
    ) -> Result<NodeRef, AstError> {
        self.make(StructuredDocumentation { text: text.into() })
    }

    /// Deep-copies the subtree rooted at `node` under fresh ids. References
    /// pointing inside the subtree are redirected to the copies; the copy is detached.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::ContextMismatch`] when `node` belongs to another context
    /// and [`AstError::UnknownNode`] when it is not registered.
    pub fn copy(&mut self, node: NodeRef) -> Result<NodeRef, AstError> {
        self.check_owned(node)?;
        self.context.node(node.id)?;
        let originals = self.context.walk(node.id);
        let mut mapping: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        for original in &originals {
            mapping.insert(*original, self.context.next_id());
        }
        let remap = |id: NodeId| mapping.get(&id).copied().unwrap_or(id);

        for original in originals.iter().rev() {
            let source = self.context.node(*original)?;
            let mut data = source.data.clone();
            data.remap_children(remap);
            for reference in data.references_mut() {
                *reference = remap(*reference);
            }
            let copy = Node::new(remap(*original), source.src, data, source.raw.clone());
            self.context.register(copy)?;
        }
        Ok(self.context.node_ref(remap(node.id)))
    }

    fn check_owned(&self, node: NodeRef) -> Result<(), AstError> {
        if node.context == self.context.id() {
            return Ok(());
        }
        Err(AstError::ContextMismatch {
            id: node.id,
            expected: self.context.id(),
            found: node.context,
        })
    }

    fn type_string_of(&self, id: NodeId) -> String {
        let Some(node) = self.context.locate(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::ElementaryTypeName(name) => name.type_string.clone(),
            NodeData::VariableDeclaration(variable) => variable.type_string.clone(),
            NodeData::Identifier(identifier) => identifier.type_string.clone(),
            NodeData::MemberAccess(access) => access.type_string.clone(),
            NodeData::IndexAccess(access) => access.type_string.clone(),
            _ => String::new(),
        }
    }
}
