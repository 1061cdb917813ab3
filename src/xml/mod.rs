//! Minimal arena-based XML tree used to read and rewrite MSBuild-style files.
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Detached nodes
//! stay in the arena but are no longer reachable from the document node, which
//! keeps removal cheap and keeps every previously handed-out id valid.
//!
//! ## Main Parts
//!
//! - [`Document`] - The tree plus navigation and mutation helpers
//! - [`parse`] - Loading a tree from text with `quick-xml`
//! - [`write`] - Serializing a tree with stable two-space indentation
//!
//! Whitespace-only text is dropped on load and indentation is regenerated on
//! save, so loading and saving a file the tool wrote before is a fixed point.

pub mod parse;
pub mod write;

use std::{fs, path::Path};

use thiserror::Error;

/// Errors raised while loading an XML document.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The underlying parser rejected the input.
    #[error("{0}")]
    Syntax(#[from] quick_xml::Error),

    /// An attribute value holds an invalid entity or character reference.
    #[error("{0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// An attribute could not be decoded.
    #[error("{0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document contains no root element.
    #[error("missing root element")]
    MissingRoot,

    /// The document contains more than one top-level element.
    #[error("more than one root element (found `{0}`)")]
    MultipleRoots(String),

    /// Non-whitespace text appears outside the root element.
    #[error("text outside the root element")]
    TextOutsideRoot,

    /// The input ended before the named element was closed.
    #[error("element `{0}` is never closed")]
    Unclosed(String),

    /// Reading the file failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Index of a node inside a [`Document`] arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct NodeId(usize);

/// A single `name="value"` pair, kept in document order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// The payload of a node.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// Synthetic container for top-level nodes. Exactly one per document.
    Document,
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An editable XML document.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

const DOCUMENT_NODE: NodeId = NodeId(0);

impl Document {
    fn empty() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Create a document holding a single empty root element.
    #[must_use]
    pub fn with_root(name: &str) -> Self {
        let mut document = Self::empty();
        document.append_element(DOCUMENT_NODE, name);
        document
    }

    /// Load and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Io`] if the file cannot be read, or any parse error
    /// reported by [`Document::parse`].
    pub fn load(path: &Path) -> Result<Self, XmlError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a document from text.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed markup, a missing root element or more
    /// than one root element.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        parse::parse_document(text)
    }

    /// Serialize the document and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_xml_string())
    }

    /// Serialize the document without an XML declaration.
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        write::write_document(self)
    }

    /// The document's root element.
    ///
    /// A document built through [`Document::parse`] or
    /// [`Document::with_root`] always has one.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.node(DOCUMENT_NODE)
            .children
            .iter()
            .copied()
            .find(|&child| self.is_element(child))
            .unwrap_or(DOCUMENT_NODE)
    }

    // ── Navigation ──────────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub(crate) const fn document_node() -> NodeId {
        DOCUMENT_NODE
    }

    /// The payload of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Children of a node, in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    #[must_use]
    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Comment(_))
    }

    /// Qualified name of an element, or `None` for other node kinds.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Element name with any namespace prefix removed.
    #[must_use]
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id)
            .map(|name| name.rsplit_once(':').map_or(name, |(_, local)| local))
    }

    /// Whether `id` is an element with the given local name.
    #[must_use]
    pub fn has_name(&self, id: NodeId, local_name: &str) -> bool {
        self.local_name(id) == Some(local_name)
    }

    /// Value of the named attribute.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|attribute| attribute.name == name)
                .map(|attribute| attribute.value.as_str()),
            _ => None,
        }
    }

    /// Element children of `id`, in document order.
    #[must_use]
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// Element children of `id` with the given local name.
    #[must_use]
    pub fn child_elements_named(&self, id: NodeId, local_name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.has_name(child, local_name))
            .collect()
    }

    /// First element child of `id` with the given local name.
    #[must_use]
    pub fn first_child_named(&self, id: NodeId, local_name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.has_name(child, local_name))
    }

    /// All descendant elements of `id` with the given local name, in document order.
    #[must_use]
    pub fn descendants_named(&self, id: NodeId, local_name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = pending.pop() {
            if self.has_name(current, local_name) {
                found.push(current);
            }
            pending.extend(self.children(current).iter().rev().copied());
        }

        found
    }

    /// Whether `id` has at least one element child.
    #[must_use]
    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|&child| self.is_element(child))
    }

    /// Concatenated text content of `id` and its descendants.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(id, &mut text);
        text
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(value) | NodeKind::CData(value) => out.push_str(value),
            NodeKind::Element { .. } | NodeKind::Document => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            NodeKind::Comment(_) | NodeKind::ProcessingInstruction(_) => {}
        }
    }

    /// The sibling immediately before `id`, if any.
    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        position.checked_sub(1).map(|before| siblings[before])
    }

    // ── Mutation ────────────────────────────────────────────────────────

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.node_mut(parent).children.push(id);
        id
    }

    /// Append an empty element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push_node(
            parent,
            NodeKind::Element {
                name: name.to_string(),
                attributes: Vec::new(),
            },
        )
    }

    /// Append an element with the given attributes as the last child of `parent`.
    pub fn append_element_with(
        &mut self,
        parent: NodeId,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> NodeId {
        let id = self.append_element(parent, name);
        for (attribute, value) in attributes {
            self.set_attribute(id, attribute, value);
        }
        id
    }

    /// Append a text node as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_node(parent, NodeKind::Text(text.to_string()))
    }

    /// Append a comment as the last child of `parent`.
    ///
    /// `text` is written verbatim between `<!--` and `-->`.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_node(parent, NodeKind::Comment(text.to_string()))
    }

    pub(crate) fn append_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        self.push_node(parent, kind)
    }

    /// Set (or replace) an attribute on an element. Ignored for other node kinds.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(id).kind {
            match attributes.iter_mut().find(|attribute| attribute.name == name) {
                Some(existing) => existing.value = value.to_string(),
                None => attributes.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Detach `id` from its parent. Detaching an already detached node is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&child| child != id);
        }
    }

    /// Detach `id` together with the comment directly in front of it, if any.
    pub fn remove_with_preceding_comment(&mut self, id: NodeId) {
        if let Some(previous) = self.previous_sibling(id)
            && self.is_comment(previous)
        {
            self.remove(previous);
        }
        self.remove(id);
    }

    /// Remove every child of `parent` matched by `is_generated`, each with its
    /// preceding comment.
    ///
    /// Matches are collected first and removed last-to-first, so a comment that
    /// precedes a run of generated blocks is only taken by the first block.
    /// Returns the number of removed blocks.
    pub fn remove_generated(
        &mut self,
        parent: NodeId,
        is_generated: impl Fn(&Self, NodeId) -> bool,
    ) -> usize {
        let matches: Vec<NodeId> = self
            .children(parent)
            .iter()
            .copied()
            .filter(|&child| is_generated(self, child))
            .collect();

        for &block in matches.iter().rev() {
            self.remove_with_preceding_comment(block);
        }

        matches.len()
    }
}
