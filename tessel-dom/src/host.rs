use std::fmt;

use crate::document::{Document, NodeKind};

/// Handle to a node owned by a [`HostTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Child indices from a fragment root down to one node.
pub type NodePath = Vec<usize>;

/// A value assigned to an element property (as opposed to a string attribute).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Node(NodeId),
    List(Vec<PropValue>),
}

/// The DOM subset the patcher needs.
///
/// `insert_before` follows DOM semantics: inserting a fragment moves its
/// children (leaving it empty) and inserting an attached node detaches it from
/// its old parent first.
pub trait HostTree {
    fn create_element(&mut self, tag: &str) -> NodeId;
    fn create_text(&mut self, data: &str) -> NodeId;
    fn create_comment(&mut self, data: &str) -> NodeId;
    fn create_fragment(&mut self) -> NodeId;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn property(&self, node: NodeId, name: &str) -> Option<PropValue>;
    fn set_property(&mut self, node: NodeId, name: &str, value: PropValue);

    /// Replace the data of a text or comment node.
    fn set_text(&mut self, node: NodeId, data: &str);

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>);
    fn remove_child(&mut self, parent: NodeId, child: NodeId);
    fn clone_node(&mut self, node: NodeId, deep: bool) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    fn clear_children(&mut self, parent: NodeId) {
        while let Some(child) = self.first_child(parent) {
            self.remove_child(parent, child);
        }
    }

    /// Walk `path` from `root`; an empty path resolves to `root` itself.
    fn resolve_path(&self, root: NodeId, path: &[usize]) -> Option<NodeId> {
        path.iter()
            .try_fold(root, |node, &index| self.child_at(node, index))
    }

    /// Deep-clone `node` of another document into this host.
    ///
    /// Attributes are copied, properties are not (same as `cloneNode`).
    fn import(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = match source.kind(node) {
            NodeKind::Element(tag) => {
                let element = self.create_element(tag);
                for (name, value) in source.attributes(node) {
                    self.set_attribute(element, name, value);
                }
                element
            }
            NodeKind::Text(data) => self.create_text(data),
            NodeKind::Comment(data) => self.create_comment(data),
            NodeKind::Fragment => self.create_fragment(),
        };
        for &child in source.children(node) {
            let imported = self.import(source, child);
            self.append_child(copy, imported);
        }
        copy
    }
}
