use tessel_dom::{Document, NodeId, NodePath};

/// Whether a binding writes an HTML attribute or an element property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Attribute,
    Property,
}

/// A fully literal `.name="value"` attribute, applied as a property on every
/// instance.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProperty {
    pub path: NodePath,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributePart {
    Literal(String),
    Placeholder(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicAttribute {
    pub path: NodePath,
    pub name: String,
    pub kind: BindingKind,
    pub parts: Vec<AttributePart>,
}

impl DynamicAttribute {
    /// Index of the placeholder when the value is exactly one placeholder.
    pub fn single_placeholder(&self) -> Option<usize> {
        match self.parts.as_slice() {
            [AttributePart::Placeholder(index)] => Some(*index),
            _ => None,
        }
    }
}

/// A content region: `path` addresses the start marker, the end marker is its
/// next sibling.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicFragment {
    pub path: NodePath,
    pub placeholder: usize,
}

/// Compiled template, shared by every instance of the same static text.
#[derive(Debug)]
pub struct Template {
    document: Document,
    root: NodeId,
    node_properties: Vec<NodeProperty>,
    dynamic_attributes: Vec<DynamicAttribute>,
    dynamic_fragments: Vec<DynamicFragment>,
    placeholder_count: usize,
}

impl Template {
    pub(crate) fn new(
        document: Document,
        root: NodeId,
        node_properties: Vec<NodeProperty>,
        dynamic_attributes: Vec<DynamicAttribute>,
        dynamic_fragments: Vec<DynamicFragment>,
        placeholder_count: usize,
    ) -> Self {
        Self {
            document,
            root,
            node_properties,
            dynamic_attributes,
            dynamic_fragments,
            placeholder_count,
        }
    }

    /// The inert document holding the static fragment.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The static fragment inside [`Template::document`].
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_properties(&self) -> &[NodeProperty] {
        &self.node_properties
    }

    pub fn dynamic_attributes(&self) -> &[DynamicAttribute] {
        &self.dynamic_attributes
    }

    pub fn dynamic_fragments(&self) -> &[DynamicFragment] {
        &self.dynamic_fragments
    }

    pub fn placeholder_count(&self) -> usize {
        self.placeholder_count
    }

    /// Serialized static fragment, markers included.
    pub fn static_html(&self) -> String {
        self.document.inner_html(self.root)
    }
}
