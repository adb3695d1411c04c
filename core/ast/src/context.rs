use core::fmt;
use std::{
    fmt::{Display, Formatter},
    sync::atomic::{AtomicU64, Ordering},
};

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{trace, warn};

use crate::{
    errors::AstError,
    nodes::{Documentation, Node, NodeId, NodePayload, SourceUnit},
    node_kind::NodeKind,
    nodes_impl::Detach,
};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Context`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct ContextId(u64);

impl Display for ContextId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "ctx{}", self.0)
    }
}

/// Handle naming a node together with the context that owns it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct NodeRef {
    pub context: ContextId,
    pub id: NodeId,
}

#[derive(Debug)]
struct Journal {
    registered: Vec<NodeId>,
    last_id: NodeId,
}

/// Identity registry for one group of units parsed together. Owns every node
/// of the group; all relations other than parent/child are plain ids resolved
/// through [`Context::locate`].
#[derive(Debug)]
pub struct Context {
    id: ContextId,
    nodes: FxHashMap<NodeId, Node>,
    last_id: NodeId,
    journal: Vec<Journal>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: FxHashMap::default(),
            last_id: 0,
            journal: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an id not used by any registered node, greater than every id seen so far.
    pub fn next_id(&mut self) -> NodeId {
        self.last_id += 1;
        while self.nodes.contains_key(&self.last_id) {
            self.last_id += 1;
        }
        self.last_id
    }

    /// Registers `node` and adopts the children its payload names.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::IdCollision`] if the id is taken, [`AstError::ContextMismatch`]
    /// if the node was registered elsewhere, and [`AstError::UnknownNode`] /
    /// [`AstError::AlreadyAttached`] if a named child is not a detached node of this context.
    pub fn register(&mut self, mut node: Node) -> Result<NodeRef, AstError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(AstError::IdCollision { id });
        }
        if let Some(found) = node.context.filter(|found| *found != self.id) {
            return Err(AstError::ContextMismatch {
                id,
                expected: self.id,
                found,
            });
        }
        let children = node.children();
        for child in &children {
            let Some(child_node) = self.nodes.get(child) else {
                return Err(AstError::UnknownNode { id: *child });
            };
            if let Some(parent) = child_node.parent {
                return Err(AstError::AlreadyAttached { id: *child, parent });
            }
        }

        node.context = Some(self.id);
        self.nodes.insert(id, node);
        for child in children {
            self.set_parent(child, Some(id));
        }
        self.last_id = self.last_id.max(id);
        if let Some(journal) = self.journal.last_mut() {
            journal.registered.push(id);
        }
        trace!(id, "registered node");
        Ok(self.node_ref(id))
    }

    /// Removes a detached node from the registry and hands it back.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for an unregistered id and
    /// [`AstError::AlreadyAttached`] while the node still has a parent.
    pub fn unregister(&mut self, id: NodeId) -> Result<Node, AstError> {
        let node = self.locate(id).ok_or(AstError::UnknownNode { id })?;
        if let Some(parent) = node.parent {
            return Err(AstError::AlreadyAttached { id, parent });
        }
        let mut node = self.take(id).ok_or(AstError::UnknownNode { id })?;
        for child in node.children() {
            self.set_parent(child, None);
        }
        node.context = None;
        Ok(node)
    }

    /// Detaches `id` from its parent and unregisters it with all its descendants.
    ///
    /// # Errors
    ///
    /// Fails if the node is unknown or occupies a mandatory slot of its parent.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<usize, AstError> {
        let parent = self.locate(id).ok_or(AstError::UnknownNode { id })?.parent;
        if let Some(parent) = parent {
            self.remove_child(parent, id)?;
        }
        let subtree = self.walk(id);
        let removed = subtree.len();
        for node in subtree {
            self.take(node);
        }
        Ok(removed)
    }

    #[must_use]
    pub fn locate(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn locate_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    #[must_use]
    pub fn locate_as<T: NodePayload>(&self, id: NodeId) -> Option<&T> {
        self.locate(id).and_then(Node::payload::<T>)
    }

    pub fn locate_as_mut<T: NodePayload>(&mut self, id: NodeId) -> Option<&mut T> {
        self.locate_mut(id).and_then(Node::payload_mut::<T>)
    }

    /// Identity membership: the handle names this context and a live node in it.
    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        node.context == self.id && self.nodes.contains_key(&node.id)
    }

    #[must_use]
    pub fn node_ref(&self, id: NodeId) -> NodeRef {
        NodeRef {
            context: self.id,
            id,
        }
    }

    /// Root units ordered by their source-list index.
    #[must_use]
    pub fn source_units(&self) -> Vec<NodeId> {
        let mut units: Vec<(i64, NodeId)> = self
            .nodes
            .values()
            .filter(|node| node.parent.is_none())
            .filter_map(|node| {
                node.payload::<SourceUnit>()
                    .map(|unit| (unit.source_list_index, node.id))
            })
            .collect();
        units.sort_unstable();
        units.into_iter().map(|(_, id)| id).collect()
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.locate(id).map(Node::children).unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.locate(id).and_then(Node::parent)
    }

    /// Pre-order traversal of the subtree rooted at `root`, `root` included.
    #[must_use]
    pub fn walk(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.locate(id) else {
                continue;
            };
            result.push(id);
            stack.extend(node.children().into_iter().rev());
        }
        result
    }

    /// Nodes matching `predicate`, ordered by id.
    pub fn filter_nodes<F: Fn(&Node) -> bool>(&self, predicate: F) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().filter(|node| predicate(node)).collect();
        nodes.sort_unstable_by_key(|node| node.id);
        nodes
    }

    #[must_use]
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.filter_nodes(|node| node.kind() == kind)
            .into_iter()
            .map(|node| node.id)
            .collect()
    }

    #[must_use]
    pub fn closest_parent_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(candidate) = current {
            let node = self.locate(candidate)?;
            if node.kind() == kind {
                return Some(candidate);
            }
            current = node.parent;
        }
        None
    }

    /// Resolves a cross-reference id; the builtin sentinel and dangling ids resolve to nothing.
    #[must_use]
    pub fn resolve(&self, reference: NodeId) -> Option<&Node> {
        if reference < 0 {
            return None;
        }
        self.locate(reference)
    }

    /// Follows the `referenced_declaration` of an identifier-like node.
    #[must_use]
    pub fn referenced_declaration(&self, id: NodeId) -> Option<&Node> {
        let reference = self.locate(id)?.data.referenced_declaration()?;
        self.resolve(reference)
    }

    /// Looks `name` up in the export table of `unit`.
    #[must_use]
    pub fn resolve_export(&self, unit: NodeId, name: &str) -> Option<&Node> {
        let reference = *self.locate_as::<SourceUnit>(unit)?.exported_symbols.get(name)?;
        self.resolve(reference)
    }

    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|sibling| *sibling == id)?;
        position.checked_sub(1).map(|index| siblings[index])
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|sibling| *sibling == id)?;
        siblings.get(position + 1).copied()
    }

    /// Adds `child` as the last child of `parent`. Only kinds whose last field is
    /// a child list accept it.
    ///
    /// # Errors
    ///
    /// As [`Context::insert_at_beginning`], except that [`AstError::NoChildList`] is
    /// returned when the last field of the kind is not a child list.
    pub fn append_child(&mut self, parent: NodeId, child: NodeRef) -> Result<(), AstError> {
        self.check_attachable(parent, child)?;
        let node = self.node_mut(parent)?;
        let kind = node.kind();
        node.data
            .trailing_child_list_mut()
            .ok_or(AstError::NoChildList { id: parent, kind })?
            .push(child.id);
        self.set_parent(child.id, Some(parent));
        Ok(())
    }

    /// Adds `child` as the first child of `parent`. Only kinds whose first field is
    /// a child list accept it.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::ContextMismatch`] for a foreign node, [`AstError::UnknownNode`],
    /// [`AstError::AlreadyAttached`] or [`AstError::CyclicAttachment`] when the child
    /// cannot be attached, and [`AstError::NoChildList`] when the first field of the kind
    /// is not a child list.
    pub fn insert_at_beginning(&mut self, parent: NodeId, child: NodeRef) -> Result<(), AstError> {
        self.check_attachable(parent, child)?;
        let node = self.node_mut(parent)?;
        let kind = node.kind();
        node.data
            .leading_child_list_mut()
            .ok_or(AstError::NoChildList { id: parent, kind })?
            .insert(0, child.id);
        self.set_parent(child.id, Some(parent));
        Ok(())
    }

    /// Detaches `child` from `parent`; the child stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::NotAChild`] if `child` is not a current child and
    /// [`AstError::RequiredChild`] if it occupies a mandatory slot.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeRef, AstError> {
        let node = self.node_mut(parent)?;
        let kind = node.kind();
        match node.data.detach_child_id(child) {
            Detach::Detached => {
                self.set_parent(child, None);
                Ok(self.node_ref(child))
            }
            Detach::Required => Err(AstError::RequiredChild {
                parent,
                child,
                kind,
            }),
            Detach::Missing => Err(AstError::NotAChild { parent, child }),
        }
    }

    /// Puts `new` in the position `old` occupies under `parent`.
    ///
    /// # Errors
    ///
    /// Attachment errors as for [`Context::insert_at_beginning`], [`AstError::NotAChild`]
    /// if `old` is not a current child, and [`AstError::KindMismatch`] when a
    /// documentation slot would receive a non-documentation node.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new: NodeRef,
        old: NodeId,
    ) -> Result<(), AstError> {
        if new.context == self.id && new.id == old {
            return Ok(());
        }
        self.check_attachable(parent, new)?;
        let new_kind = self.node(new.id)?.kind();
        let node = self.node_mut(parent)?;
        let doc_slot_holds_old = node
            .data
            .documentation_slot()
            .is_some_and(|doc| *doc == Some(Documentation::Node(old)));
        if doc_slot_holds_old && new_kind != NodeKind::StructuredDocumentation {
            return Err(AstError::KindMismatch {
                id: new.id,
                expected: NodeKind::StructuredDocumentation,
                found: new_kind,
            });
        }
        if !node.data.replace_child_id(old, new.id) {
            return Err(AstError::NotAChild { parent, child: old });
        }
        self.set_parent(old, None);
        self.set_parent(new.id, Some(parent));
        Ok(())
    }

    /// Starts journaling registrations so they can be undone with [`Context::rollback`].
    /// Transactions nest.
    pub fn begin_transaction(&mut self) {
        self.journal.push(Journal {
            registered: Vec::new(),
            last_id: self.last_id,
        });
    }

    /// Keeps everything registered since the matching [`Context::begin_transaction`].
    pub fn commit(&mut self) {
        if let Some(journal) = self.journal.pop()
            && let Some(outer) = self.journal.last_mut()
        {
            outer.registered.extend(journal.registered);
        }
    }

    /// Unregisters everything registered since the matching [`Context::begin_transaction`]
    /// and restores the id counter.
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.pop() else {
            return;
        };
        let mut discarded = 0usize;
        for id in journal.registered.iter().rev() {
            if self.take(*id).is_some() {
                discarded += 1;
            }
        }
        let remaining: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in remaining {
            if let Some(parent) = self.nodes.get(&id).and_then(|node| node.parent)
                && !self.nodes.contains_key(&parent)
            {
                self.set_parent(id, None);
            }
        }
        self.last_id = journal.last_id;
        warn!(discarded, "rolled back context transaction");
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, AstError> {
        self.locate(id).ok_or(AstError::UnknownNode { id })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, AstError> {
        self.locate_mut(id).ok_or(AstError::UnknownNode { id })
    }

    fn take(&mut self, id: NodeId) -> Option<Node> {
        let mut node = self.nodes.remove(&id)?;
        node.context = None;
        node.parent = None;
        Some(node)
    }

    pub(crate) fn check_attachable(&self, parent: NodeId, child: NodeRef) -> Result<(), AstError> {
        if child.context != self.id {
            return Err(AstError::ContextMismatch {
                id: child.id,
                expected: self.id,
                found: child.context,
            });
        }
        self.node(parent)?;
        let node = self.node(child.id)?;
        if let Some(current) = node.parent {
            return Err(AstError::AlreadyAttached {
                id: child.id,
                parent: current,
            });
        }
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child.id {
                return Err(AstError::CyclicAttachment {
                    parent,
                    child: child.id,
                });
            }
            ancestor = self.parent(id);
        }
        Ok(())
    }
}
