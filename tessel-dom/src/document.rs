use std::collections::HashMap;

use crate::host::{HostTree, NodeId, PropValue};
use crate::is_void_element;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(String),
    Text(String),
    Comment(String),
    Fragment,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    properties: HashMap<String, PropValue>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            properties: HashMap::new(),
        }
    }
}

/// Counters of host mutations since the document was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    pub created: usize,
    pub inserted: usize,
    pub removed: usize,
    pub attribute_writes: usize,
    pub property_writes: usize,
    pub text_writes: usize,
}

/// Arena-backed in-memory node tree.
///
/// Nodes are never freed: a removed node stays valid and detached, so a
/// document that keeps re-rendering regions grows with every replaced node.
/// `NodeId`s are only meaningful for the document that created them; passing
/// one from another document panics if it is out of range.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    stats: MutationStats,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> MutationStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn attributes(&self, node: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.nodes[node.0]
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Concatenated data of every descendant text node.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            NodeKind::Text(data) => out.push_str(data),
            NodeKind::Comment(_) => {}
            NodeKind::Element(_) | NodeKind::Fragment => {
                for &child in self.children(node) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Serialized children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialized `node` itself; a fragment serializes as its children.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            NodeKind::Text(data) => out.push_str(&html_escape::encode_text(data)),
            NodeKind::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
            NodeKind::Fragment => out.push_str(&self.inner_html(node)),
            NodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in self.attributes(node) {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                out.push_str(&self.inner_html(node));
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData::new(kind));
        self.stats.created += 1;
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }
}

impl HostTree for Document {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(tag.to_string()))
    }

    fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeKind::Text(data.to_string()))
    }

    fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeKind::Comment(data.to_string()))
    }

    fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes[node.0]
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.stats.attribute_writes += 1;
        let attributes = &mut self.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let attributes = &mut self.nodes[node.0].attributes;
        let before = attributes.len();
        attributes.retain(|(k, _)| k != name);
        if attributes.len() != before {
            self.stats.attribute_writes += 1;
        }
    }

    fn property(&self, node: NodeId, name: &str) -> Option<PropValue> {
        self.nodes[node.0].properties.get(name).cloned()
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: PropValue) {
        self.stats.property_writes += 1;
        self.nodes[node.0]
            .properties
            .insert(name.to_string(), value);
    }

    fn set_text(&mut self, node: NodeId, data: &str) {
        match &mut self.nodes[node.0].kind {
            NodeKind::Text(current) | NodeKind::Comment(current) => {
                self.stats.text_writes += 1;
                current.clear();
                current.push_str(data);
            }
            NodeKind::Element(_) | NodeKind::Fragment => {}
        }
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let moved = if self.nodes[child.0].kind == NodeKind::Fragment {
            std::mem::take(&mut self.nodes[child.0].children)
        } else {
            self.detach(child);
            vec![child]
        };
        let mut at = reference
            .and_then(|r| self.nodes[parent.0].children.iter().position(|&c| c == r))
            .unwrap_or(self.nodes[parent.0].children.len());
        for node in moved {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(at, node);
            self.stats.inserted += 1;
            at += 1;
        }
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.0].parent == Some(parent) {
            self.detach(child);
            self.stats.removed += 1;
        }
    }

    fn clone_node(&mut self, node: NodeId, deep: bool) -> NodeId {
        let kind = self.nodes[node.0].kind.clone();
        let attributes = self.nodes[node.0].attributes.clone();
        let copy = self.alloc(kind);
        self.nodes[copy.0].attributes = attributes;
        if deep {
            for child in self.nodes[node.0].children.clone() {
                let child_copy = self.clone_node(child, true);
                self.insert_before(copy, child_copy, None);
            }
        }
        copy
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].children.first().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let at = siblings.iter().position(|&c| c == node)?;
        siblings.get(at + 1).copied()
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[node.0].children.get(index).copied()
    }
}
