//! Uniform access to preceding and dangling documentation.
//!
//! Most documentable kinds hold their documentation in a dedicated slot.
//! Contracts and blocks keep `StructuredDocumentation` nodes in their child
//! list instead, next to a plain-text fallback; for those the owner's source
//! offset decides whether a documentation child precedes the owner or dangles
//! at its end.

use crate::{
    context::{Context, NodeRef},
    errors::AstError,
    node_kind::NodeKind,
    nodes::{Documentation, Node, NodeData, NodeId},
};

const PRECEDING: &str = "preceding";
const DANGLING: &str = "dangling";

/// Strips comment markers from a raw `///` run or `/** */` block. Text
/// without a leading marker is already clean and is only trimmed.
#[must_use]
pub fn extract_documentation_text(block: &str) -> String {
    let block = block.trim_start();
    let replacers: &[&str] = if block.starts_with("///") {
        &["/// ", "///"]
    } else if block.starts_with("/**") {
        &["/**", "*/", "* ", "*"]
    } else {
        return block.trim_end().to_string();
    };
    block
        .split('\n')
        .map(|line| {
            replacers
                .iter()
                .fold(line.trim_start().to_string(), |line, replacer| {
                    line.replacen(replacer, "", 1)
                })
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn container_doc_strings(data: &NodeData) -> Option<(&Option<String>, &Option<String>)> {
    match data {
        NodeData::ContractDefinition(contract) => {
            Some((&contract.doc_string, &contract.dangling_doc_string))
        }
        NodeData::Block(block) => Some((&block.doc_string, &block.dangling_doc_string)),
        NodeData::UncheckedBlock(block) => Some((&block.doc_string, &block.dangling_doc_string)),
        _ => None,
    }
}

fn container_doc_strings_mut(
    data: &mut NodeData,
) -> Option<(&mut Option<String>, &mut Option<String>)> {
    match data {
        NodeData::ContractDefinition(contract) => {
            Some((&mut contract.doc_string, &mut contract.dangling_doc_string))
        }
        NodeData::Block(block) => Some((&mut block.doc_string, &mut block.dangling_doc_string)),
        NodeData::UncheckedBlock(block) => {
            Some((&mut block.doc_string, &mut block.dangling_doc_string))
        }
        _ => None,
    }
}

impl Context {
    /// Documentation preceding `id`, in whichever form the node holds it.
    #[must_use]
    pub fn documentation(&self, id: NodeId) -> Option<Documentation> {
        let node = self.locate(id)?;
        if let Some(slot) = node.data.documentation_slot() {
            return slot.clone();
        }
        let (doc_string, _) = container_doc_strings(&node.data)?;
        if let Some(text) = doc_string {
            return Some(Documentation::Text(text.clone()));
        }
        node.children()
            .into_iter()
            .find(|child| self.is_documentation_at(*child, |offset| offset <= node.src.offset))
            .map(Documentation::Node)
    }

    /// Documentation trailing after the last ordinary child of a contract or block.
    #[must_use]
    pub fn dangling_documentation(&self, id: NodeId) -> Option<Documentation> {
        let node = self.locate(id)?;
        let (_, dangling) = container_doc_strings(&node.data)?;
        if let Some(text) = dangling {
            return Some(Documentation::Text(text.clone()));
        }
        node.children()
            .into_iter()
            .rev()
            .find(|child| self.is_documentation_at(*child, |offset| offset > node.src.offset))
            .map(Documentation::Node)
    }

    /// Sets (or with `None` clears) plain-text preceding documentation, detaching
    /// a structured documentation node if one was attached.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::DocumentationUnsupported`] for kinds without documentation.
    pub fn set_documentation_text(
        &mut self,
        id: NodeId,
        text: Option<String>,
    ) -> Result<(), AstError> {
        let old = self.documentation_owner(id, PRECEDING)?;
        if let Some(Documentation::Node(old)) = old {
            self.remove_child(id, old)?;
        }
        let node = self.node_mut(id)?;
        if let Some((doc_string, _)) = container_doc_strings_mut(&mut node.data) {
            *doc_string = text;
        } else if let Some(slot) = node.data.documentation_slot_mut() {
            *slot = text.map(Documentation::Text);
        }
        Ok(())
    }

    /// Attaches a `StructuredDocumentation` node as preceding documentation,
    /// replacing whatever documentation the owner had.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::DocumentationUnsupported`] for kinds without documentation,
    /// [`AstError::KindMismatch`] when `doc` is not a documentation node, and the
    /// attachment errors of [`Context::append_child`].
    pub fn attach_documentation(&mut self, id: NodeId, doc: NodeRef) -> Result<(), AstError> {
        let old = self.documentation_owner(id, PRECEDING)?;
        self.check_documentation_node(id, doc)?;
        let node = self.node_mut(id)?;
        if let Some((doc_string, _)) = container_doc_strings_mut(&mut node.data) {
            *doc_string = None;
            return match old {
                Some(Documentation::Node(old)) => self.replace_child(id, doc, old),
                _ => self.insert_at_beginning(id, doc),
            };
        }
        if let Some(slot) = node.data.documentation_slot_mut() {
            *slot = Some(Documentation::Node(doc.id));
        }
        if let Some(Documentation::Node(old)) = old {
            self.set_parent(old, None);
        }
        self.set_parent(doc.id, Some(id));
        Ok(())
    }

    /// Sets (or clears) plain-text dangling documentation of a contract or block.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::DocumentationUnsupported`] for kinds that are not containers.
    pub fn set_dangling_documentation_text(
        &mut self,
        id: NodeId,
        text: Option<String>,
    ) -> Result<(), AstError> {
        let old = self.dangling_owner(id)?;
        if let Some(Documentation::Node(old)) = old {
            self.remove_child(id, old)?;
        }
        let node = self.node_mut(id)?;
        if let Some((_, dangling)) = container_doc_strings_mut(&mut node.data) {
            *dangling = text;
        }
        Ok(())
    }

    /// Attaches a `StructuredDocumentation` node as dangling documentation.
    ///
    /// # Errors
    ///
    /// As for [`Context::attach_documentation`].
    pub fn attach_dangling_documentation(
        &mut self,
        id: NodeId,
        doc: NodeRef,
    ) -> Result<(), AstError> {
        let old = self.dangling_owner(id)?;
        self.check_documentation_node(id, doc)?;
        let node = self.node_mut(id)?;
        if let Some((_, dangling)) = container_doc_strings_mut(&mut node.data) {
            *dangling = None;
        }
        match old {
            Some(Documentation::Node(old)) => self.replace_child(id, doc, old),
            _ => self.append_child(id, doc),
        }
    }

    fn is_documentation_at(&self, id: NodeId, accepts: impl Fn(i64) -> bool) -> bool {
        self.locate(id).is_some_and(|child: &Node| {
            child.kind() == NodeKind::StructuredDocumentation && accepts(child.src.offset)
        })
    }

    fn documentation_owner(
        &self,
        id: NodeId,
        flavour: &'static str,
    ) -> Result<Option<Documentation>, AstError> {
        let node = self.node(id)?;
        let kind = node.kind();
        if !kind.has_documentation_slot() && !kind.is_documentation_container() {
            return Err(AstError::DocumentationUnsupported { id, kind, flavour });
        }
        Ok(self.documentation(id))
    }

    fn dangling_owner(&self, id: NodeId) -> Result<Option<Documentation>, AstError> {
        let kind = self.node(id)?.kind();
        if !kind.is_documentation_container() {
            return Err(AstError::DocumentationUnsupported {
                id,
                kind,
                flavour: DANGLING,
            });
        }
        Ok(self.dangling_documentation(id))
    }

    fn check_documentation_node(&self, owner: NodeId, doc: NodeRef) -> Result<(), AstError> {
        self.check_attachable(owner, doc)?;
        let found = self.node(doc.id)?.kind();
        if found != NodeKind::StructuredDocumentation {
            return Err(AstError::KindMismatch {
                id: doc.id,
                expected: NodeKind::StructuredDocumentation,
                found,
            });
        }
        Ok(())
    }
}
