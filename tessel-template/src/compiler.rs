use std::borrow::Cow;

use tessel_dom::{Document, HostTree, NodeId, NodePath};

use crate::ast::{Attribute, TemplateNode, ValueFragment};
use crate::template::{
    AttributePart, BindingKind, DynamicAttribute, DynamicFragment, NodeProperty, Template,
};

/// Attribute name prefix that marks an element property binding.
pub const PROPERTY_PREFIX: char = '.';

fn decode(raw: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(raw)
}

/// Compile a node tree into its static fragment and binding tables.
///
/// Placeholder indices are handed out in document order; an element's
/// attributes come before its children.
pub fn compile_nodes(nodes: &[TemplateNode]) -> Template {
    let mut compiler = Compiler::default();
    let root = compiler.document.create_fragment();
    compiler.compile_children(nodes, root, &mut Vec::new());
    Template::new(
        compiler.document,
        root,
        compiler.properties,
        compiler.attributes,
        compiler.fragments,
        compiler.next_placeholder,
    )
}

#[derive(Default)]
struct Compiler {
    document: Document,
    properties: Vec<NodeProperty>,
    attributes: Vec<DynamicAttribute>,
    fragments: Vec<DynamicFragment>,
    next_placeholder: usize,
}

impl Compiler {
    fn next_placeholder(&mut self) -> usize {
        let index = self.next_placeholder;
        self.next_placeholder += 1;
        index
    }

    fn compile_children(&mut self, nodes: &[TemplateNode], parent: NodeId, path: &mut NodePath) {
        for node in nodes {
            // position in the produced fragment, not in `nodes`: a placeholder
            // takes two slots
            let index = self.document.children(parent).len();
            match node {
                TemplateNode::Text(raw) => {
                    let text = self.document.create_text(&decode(raw));
                    self.document.append_child(parent, text);
                }
                TemplateNode::Comment(raw) => {
                    let comment = self.document.create_comment(&decode(raw));
                    self.document.append_child(parent, comment);
                }
                TemplateNode::Element(element) => {
                    let node = self.document.create_element(&element.name);
                    self.document.append_child(parent, node);
                    path.push(index);
                    for attribute in &element.attributes {
                        self.compile_attribute(node, attribute, path);
                    }
                    self.compile_children(&element.children, node, path);
                    path.pop();
                }
                TemplateNode::Placeholder => {
                    let start = self.document.create_comment("");
                    let end = self.document.create_comment("");
                    self.document.append_child(parent, start);
                    self.document.append_child(parent, end);
                    let mut marker_path = path.clone();
                    marker_path.push(index);
                    let placeholder = self.next_placeholder();
                    self.fragments.push(DynamicFragment {
                        path: marker_path,
                        placeholder,
                    });
                }
            }
        }
    }

    fn compile_attribute(&mut self, element: NodeId, attribute: &Attribute, path: &NodePath) {
        let (kind, name) = match attribute.name.strip_prefix(PROPERTY_PREFIX) {
            Some(name) => (BindingKind::Property, name),
            None => (BindingKind::Attribute, attribute.name.as_str()),
        };

        let literal = attribute
            .value
            .iter()
            .all(|fragment| matches!(fragment, ValueFragment::Literal(_)));
        if literal {
            let value: String = attribute
                .value
                .iter()
                .filter_map(|fragment| match fragment {
                    ValueFragment::Literal(raw) => Some(decode(raw)),
                    ValueFragment::Placeholder => None,
                })
                .collect();
            match kind {
                BindingKind::Attribute => self.document.set_attribute(element, name, &value),
                BindingKind::Property => self.properties.push(NodeProperty {
                    path: path.clone(),
                    name: name.to_string(),
                    value,
                }),
            }
            return;
        }

        let parts = attribute
            .value
            .iter()
            .map(|fragment| match fragment {
                ValueFragment::Literal(raw) => AttributePart::Literal(decode(raw).into_owned()),
                ValueFragment::Placeholder => AttributePart::Placeholder(self.next_placeholder()),
            })
            .collect();
        self.attributes.push(DynamicAttribute {
            path: path.clone(),
            name: name.to_string(),
            kind,
            parts,
        });
    }
}
