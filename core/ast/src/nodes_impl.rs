use serde_json::Value;

use crate::{
    context::ContextId,
    node_kind::NodeKind,
    nodes::{
        Documentation, Node, NodeData, NodeId, NodePayload, Slot, SlotMut, SourceLocation,
        TypeNameOperand,
    },
};

/// Outcome of detaching a child id from a payload.
pub(crate) enum Detach {
    Detached,
    Required,
    Missing,
}

impl Node {
    #[must_use]
    pub fn new(id: NodeId, src: SourceLocation, data: NodeData, raw: Option<Value>) -> Self {
        Self {
            id,
            src,
            raw,
            data,
            parent: None,
            context: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The context the node is registered in, if any.
    #[must_use]
    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    /// Ordered children, derived from the payload on every call.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        self.data.child_ids()
    }

    #[must_use]
    pub fn is<T: NodePayload>(&self) -> bool {
        self.kind() == T::KIND
    }

    #[must_use]
    pub fn payload<T: NodePayload>(&self) -> Option<&T> {
        T::from_data(&self.data)
    }

    pub fn payload_mut<T: NodePayload>(&mut self) -> Option<&mut T> {
        T::from_data_mut(&mut self.data)
    }
}

impl NodeData {
    pub(crate) fn child_ids(&self) -> Vec<NodeId> {
        let mut children = Vec::new();
        for slot in self.slots() {
            match slot {
                Slot::One(id) => children.push(*id),
                Slot::Opt(id) => children.extend(*id),
                Slot::Many(ids) => children.extend(ids.iter().copied()),
                Slot::Sparse(ids) => children.extend(ids.iter().flatten().copied()),
                Slot::Doc(doc) => children.extend(doc.as_ref().and_then(Documentation::as_node)),
                Slot::Operand(operand) => {
                    if let TypeNameOperand::Node(id) = operand {
                        children.push(*id);
                    }
                }
            }
        }
        children
    }

    /// Swaps `old` for `new` in place. Returns `false` when `old` is not a child.
    pub(crate) fn replace_child_id(&mut self, old: NodeId, new: NodeId) -> bool {
        for slot in self.slots_mut() {
            let target = match slot {
                SlotMut::One(id) => Some(id),
                SlotMut::Opt(id) => id.as_mut(),
                SlotMut::Many(ids) => ids.iter_mut().find(|id| **id == old),
                SlotMut::Sparse(ids) => ids.iter_mut().flatten().find(|id| **id == old),
                SlotMut::Doc(doc) => match doc {
                    Some(Documentation::Node(id)) => Some(id),
                    _ => None,
                },
                SlotMut::Operand(operand) => match operand {
                    TypeNameOperand::Node(id) => Some(id),
                    TypeNameOperand::Name(_) => None,
                },
            };
            if let Some(id) = target.filter(|id| **id == old) {
                *id = new;
                return true;
            }
        }
        false
    }

    pub(crate) fn detach_child_id(&mut self, child: NodeId) -> Detach {
        for slot in self.slots_mut() {
            match slot {
                SlotMut::One(id) if *id == child => return Detach::Required,
                SlotMut::Operand(TypeNameOperand::Node(id)) if *id == child => {
                    return Detach::Required;
                }
                SlotMut::Opt(id) if *id == Some(child) => {
                    *id = None;
                    return Detach::Detached;
                }
                SlotMut::Doc(doc) if *doc == Some(Documentation::Node(child)) => {
                    *doc = None;
                    return Detach::Detached;
                }
                SlotMut::Many(ids) => {
                    if let Some(position) = ids.iter().position(|id| *id == child) {
                        ids.remove(position);
                        return Detach::Detached;
                    }
                }
                SlotMut::Sparse(ids) => {
                    if let Some(component) = ids.iter_mut().find(|id| **id == Some(child)) {
                        *component = None;
                        return Detach::Detached;
                    }
                }
                _ => {}
            }
        }
        Detach::Missing
    }

    /// Rewrites every child id through `map`.
    pub(crate) fn remap_children(&mut self, map: impl Fn(NodeId) -> NodeId) {
        for slot in self.slots_mut() {
            match slot {
                SlotMut::One(id) => *id = map(*id),
                SlotMut::Opt(id) => {
                    if let Some(id) = id {
                        *id = map(*id);
                    }
                }
                SlotMut::Many(ids) => ids.iter_mut().for_each(|id| *id = map(*id)),
                SlotMut::Sparse(ids) => ids.iter_mut().flatten().for_each(|id| *id = map(*id)),
                SlotMut::Doc(doc) => {
                    if let Some(Documentation::Node(id)) = doc {
                        *id = map(*id);
                    }
                }
                SlotMut::Operand(operand) => {
                    if let TypeNameOperand::Node(id) = operand {
                        *id = map(*id);
                    }
                }
            }
        }
    }

    /// The child list that holds the kind's first children, if the kind starts with one.
    pub(crate) fn leading_child_list_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self.slots_mut().into_iter().next()? {
            SlotMut::Many(ids) => Some(ids),
            _ => None,
        }
    }

    /// The child list that holds the kind's last children, if the kind ends with one.
    pub(crate) fn trailing_child_list_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self.slots_mut().into_iter().next_back()? {
            SlotMut::Many(ids) => Some(ids),
            _ => None,
        }
    }

    pub(crate) fn documentation_slot(&self) -> Option<&Option<Documentation>> {
        self.slots().into_iter().find_map(|slot| match slot {
            Slot::Doc(doc) => Some(doc),
            _ => None,
        })
    }

    pub(crate) fn documentation_slot_mut(&mut self) -> Option<&mut Option<Documentation>> {
        self.slots_mut().into_iter().find_map(|slot| match slot {
            SlotMut::Doc(doc) => Some(doc),
            _ => None,
        })
    }

    /// Every cross-reference id the payload stores outside its child slots.
    pub(crate) fn references_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            NodeData::ContractDefinition(contract) => {
                let mut refs = vec![&mut contract.scope];
                refs.extend(contract.linearized_base_contracts.iter_mut());
                refs.extend(contract.used_errors.iter_mut());
                refs.extend(contract.used_events.iter_mut());
                refs
            }
            NodeData::FunctionDefinition(function) => vec![&mut function.scope],
            NodeData::StructDefinition(structure) => vec![&mut structure.scope],
            NodeData::VariableDeclaration(variable) => vec![&mut variable.scope],
            NodeData::Identifier(identifier) => {
                let mut refs = vec![&mut identifier.referenced_declaration];
                refs.extend(identifier.overloaded_declarations.iter_mut());
                refs
            }
            NodeData::MemberAccess(access) => vec![&mut access.referenced_declaration],
            NodeData::IdentifierPath(path) => vec![&mut path.referenced_declaration],
            NodeData::UserDefinedTypeName(name) => vec![&mut name.referenced_declaration],
            NodeData::YulIdentifier(identifier) => vec![&mut identifier.referenced_declaration],
            NodeData::ImportDirective(import) => {
                let mut refs = vec![&mut import.scope, &mut import.source_unit];
                refs.extend(
                    import
                        .symbol_aliases
                        .iter_mut()
                        .map(|alias| &mut alias.foreign_declaration),
                );
                refs
            }
            NodeData::SourceUnit(unit) => unit.exported_symbols.values_mut().collect(),
            NodeData::InlineAssembly(assembly) => assembly
                .external_references
                .iter_mut()
                .map(|reference| &mut reference.declaration)
                .collect(),
            NodeData::Return(statement) => vec![&mut statement.function_return_parameters],
            NodeData::VariableDeclarationStatement(statement) => {
                statement.assignments.iter_mut().flatten().collect()
            }
            NodeData::UsingForDirective(directive) => directive
                .operators
                .iter_mut()
                .map(|operator| &mut operator.function)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The `referenced_declaration` of kinds whose target may be a builtin.
    #[must_use]
    pub fn referenced_declaration(&self) -> Option<NodeId> {
        match self {
            NodeData::Identifier(identifier) => Some(identifier.referenced_declaration),
            NodeData::MemberAccess(access) => Some(access.referenced_declaration),
            NodeData::IdentifierPath(path) => Some(path.referenced_declaration),
            NodeData::UserDefinedTypeName(name) => Some(name.referenced_declaration),
            NodeData::YulIdentifier(identifier) => Some(identifier.referenced_declaration),
            _ => None,
        }
    }
}
