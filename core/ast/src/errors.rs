//! Error types for the AST crate.
//!
//! This module defines structured errors for raw record conversion, identity
//! registration and tree mutation.

use thiserror::Error;

use crate::context::ContextId;
use crate::node_kind::NodeKind;
use crate::nodes::NodeId;
use crate::reader::AstFormat;

/// Errors raised while building or editing an AST graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// No processor is registered for the record's kind tag in the detected format.
    #[error("unsupported node kind `{kind}` in {format} format")]
    UnsupportedNodeKind { kind: String, format: AstFormat },

    /// A required field is absent or has the wrong shape.
    #[error("malformed `{kind}` record: {reason}")]
    MalformedRecord { kind: String, reason: String },

    /// Two nodes resolve to the same id within one context.
    #[error("id {id} is already registered in this context")]
    IdCollision { id: NodeId },

    /// A mutation tried to attach a node owned by another context.
    #[error("node #{id} belongs to context {found}, not to context {expected}")]
    ContextMismatch {
        id: NodeId,
        expected: ContextId,
        found: ContextId,
    },

    /// The node passed to `remove_child` / `replace_child` is not a child of the target.
    #[error("node #{child} is not a child of node #{parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// The id does not name a node registered in the context.
    #[error("node #{id} is not registered in this context")]
    UnknownNode { id: NodeId },

    /// The child occupies a mandatory slot and can only be replaced.
    #[error("node #{child} is a required child of {kind} #{parent} and cannot be removed")]
    RequiredChild {
        parent: NodeId,
        child: NodeId,
        kind: NodeKind,
    },

    /// The kind does not start or end with the variable-length child list the
    /// insertion needs.
    #[error("{kind} #{id} has no child list at that end")]
    NoChildList { id: NodeId, kind: NodeKind },

    /// The node being attached already has a parent.
    #[error("node #{id} is already attached to node #{parent}")]
    AlreadyAttached { id: NodeId, parent: NodeId },

    /// Attaching the node would make it its own ancestor.
    #[error("attaching node #{child} under node #{parent} would create a cycle")]
    CyclicAttachment { parent: NodeId, child: NodeId },

    /// The slot only accepts nodes of a particular kind.
    #[error("expected a {expected} node, found {found} #{id}")]
    KindMismatch {
        id: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },

    /// The node kind carries no documentation of the requested flavour.
    #[error("{kind} #{id} does not support {flavour} documentation")]
    DocumentationUnsupported {
        id: NodeId,
        kind: NodeKind,
        flavour: &'static str,
    },

    /// Raw input is nested deeper than the configured guard.
    #[error("raw record nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

impl AstError {
    pub(crate) fn malformed(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        AstError::MalformedRecord {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}
