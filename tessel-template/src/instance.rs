use std::rc::Rc;

use tessel_dom::{HostTree, NodeId, NodePath, PropValue};
use tracing::trace;

use crate::error::PatchError;
use crate::template::{AttributePart, BindingKind, DynamicAttribute, Template};
use crate::value::{SharedInstance, Value};

fn locate(host: &dyn HostTree, root: NodeId, path: &NodePath) -> Result<NodeId, PatchError> {
    host.resolve_path(root, path)
        .ok_or_else(|| PatchError::MissingNode { path: path.clone() })
}

/// What currently sits between the markers of a content region.
#[derive(Debug)]
enum Content {
    Empty,
    Text { node: NodeId, data: String },
    Instance(Box<TemplateInstance>),
    Shared(SharedInstance),
    // whatever sat between the markers right after insertion
    Nodes(Vec<NodeId>),
}

impl Content {
    /// Append the nodes this content occupies to `parent`, in document order.
    fn gather_into(&self, host: &mut dyn HostTree, parent: NodeId) {
        match self {
            Content::Empty => {}
            Content::Text { node, .. } => host.append_child(parent, *node),
            Content::Instance(instance) => instance.gather_into(host, parent),
            Content::Shared(shared) => shared.borrow().gather_into(host, parent),
            Content::Nodes(nodes) => {
                for &node in nodes {
                    host.append_child(parent, node);
                }
            }
        }
    }
}

#[derive(Debug)]
struct Region {
    path: NodePath,
    placeholder: usize,
    start: NodeId,
    end: NodeId,
    content: Content,
}

impl Region {
    fn update(&mut self, host: &mut dyn HostTree, value: &Value) -> Result<(), PatchError> {
        // the same shared instance is left alone only while it still sits here
        if let (Content::Shared(current), Value::Instance(next)) = (&self.content, value) {
            let first = next.borrow().nodes().first().copied();
            if Rc::ptr_eq(current, next)
                && first.is_none_or(|node| self.held(&*host).contains(&node))
            {
                return Ok(());
            }
        }

        match (&mut self.content, value) {
            (Content::Instance(instance), Value::Template(result))
                if Rc::ptr_eq(instance.template(), result.template()) =>
            {
                return instance.set_placeholder_values(host, result.values());
            }
            (Content::Text { node, data }, value) if value.is_text_like() => {
                let text = value.to_text();
                if *data != text {
                    host.set_text(*node, &text);
                    *data = text;
                }
                return Ok(());
            }
            _ => {}
        }

        self.clear(host)?;
        let (node, content) = render_value(host, value)?;
        let parent = host
            .parent(self.end)
            .ok_or_else(|| PatchError::DetachedMarker {
                path: self.path.clone(),
            })?;
        host.insert_before(parent, node, Some(self.end));
        self.content = match content {
            Content::Nodes(_) => Content::Nodes(self.held(&*host)),
            content => content,
        };
        Ok(())
    }

    /// Nodes strictly between the two markers.
    fn held(&self, host: &dyn HostTree) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut current = host.next_sibling(self.start);
        while let Some(node) = current {
            if node == self.end {
                break;
            }
            nodes.push(node);
            current = host.next_sibling(node);
        }
        nodes
    }

    /// Remove every node strictly between the two markers.
    fn clear(&mut self, host: &mut dyn HostTree) -> Result<(), PatchError> {
        self.content = Content::Empty;
        let parent = host
            .parent(self.start)
            .ok_or_else(|| PatchError::DetachedMarker {
                path: self.path.clone(),
            })?;
        while let Some(node) = host.next_sibling(self.start) {
            if node == self.end {
                return Ok(());
            }
            host.remove_child(parent, node);
        }
        Err(PatchError::MissingEndMarker {
            path: self.path.clone(),
        })
    }
}

/// A live clone of a [`Template`] with its binding sites resolved.
///
/// Created once per mount site (or nested content region) and patched with
/// [`TemplateInstance::set_placeholder_values`] on every render after that.
#[derive(Debug)]
pub struct TemplateInstance {
    template: Rc<Template>,
    fragment: NodeId,
    nodes: Vec<NodeId>,
    // parallel to `template.dynamic_attributes()`
    elements: Vec<NodeId>,
    regions: Vec<Region>,
}

impl TemplateInstance {
    /// Clone the static fragment into `host` and resolve its binding tables.
    pub fn new(template: Rc<Template>, host: &mut dyn HostTree) -> Result<Self, PatchError> {
        let fragment = host.import(template.document(), template.root());

        let mut nodes = Vec::new();
        let mut child = host.first_child(fragment);
        while let Some(node) = child {
            nodes.push(node);
            child = host.next_sibling(node);
        }

        for property in template.node_properties() {
            let element = locate(host, fragment, &property.path)?;
            host.set_property(
                element,
                &property.name,
                PropValue::Str(property.value.clone()),
            );
        }

        let elements = template
            .dynamic_attributes()
            .iter()
            .map(|binding| locate(host, fragment, &binding.path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut regions = Vec::with_capacity(template.dynamic_fragments().len());
        for binding in template.dynamic_fragments() {
            let start = locate(host, fragment, &binding.path)?;
            let end = host
                .next_sibling(start)
                .ok_or_else(|| PatchError::MissingEndMarker {
                    path: binding.path.clone(),
                })?;
            regions.push(Region {
                path: binding.path.clone(),
                placeholder: binding.placeholder,
                start,
                end,
                content: Content::Empty,
            });
        }

        trace!(
            attributes = elements.len(),
            regions = regions.len(),
            "template instance created"
        );
        Ok(Self {
            template,
            fragment,
            nodes,
            elements,
            regions,
        })
    }

    pub fn template(&self) -> &Rc<Template> {
        &self.template
    }

    /// The fragment the instance was cloned into. Empty once its nodes have
    /// been inserted somewhere else.
    pub fn fragment(&self) -> NodeId {
        self.fragment
    }

    /// Top-level nodes of the clone, markers included.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Write `values` into every binding site. A missing value counts as
    /// [`Value::Undefined`].
    pub fn set_placeholder_values(
        &mut self,
        host: &mut dyn HostTree,
        values: &[Value],
    ) -> Result<(), PatchError> {
        let undefined = Value::Undefined;
        let value_at = |index: usize| values.get(index).unwrap_or(&undefined);

        for (binding, &element) in self.template.dynamic_attributes().iter().zip(&self.elements) {
            apply_attribute(host, element, binding, &value_at);
        }
        for region in &mut self.regions {
            let value = value_at(region.placeholder);
            region.update(host, value)?;
        }
        Ok(())
    }

    /// Move the instance's nodes, and whatever regions hold between them, into
    /// a fresh fragment.
    ///
    /// Works whether the nodes are still attached somewhere or were detached
    /// one by one when an enclosing region was cleared.
    pub fn gather(&self, host: &mut dyn HostTree) -> NodeId {
        let fragment = host.create_fragment();
        self.gather_into(host, fragment);
        fragment
    }

    fn gather_into(&self, host: &mut dyn HostTree, parent: NodeId) {
        for &node in &self.nodes {
            host.append_child(parent, node);
            if let Some(region) = self.regions.iter().find(|region| region.start == node) {
                region.content.gather_into(host, parent);
            }
        }
    }
}

fn apply_attribute<'v>(
    host: &mut dyn HostTree,
    element: NodeId,
    binding: &DynamicAttribute,
    value_at: &impl Fn(usize) -> &'v Value,
) {
    let name = binding.name.as_str();
    let joined = || -> String {
        binding
            .parts
            .iter()
            .map(|part| match part {
                AttributePart::Literal(text) => text.clone(),
                AttributePart::Placeholder(index) => value_at(*index).to_text(),
            })
            .collect()
    };

    match (binding.kind, binding.single_placeholder()) {
        (BindingKind::Property, single) => {
            let next = match single {
                Some(index) => value_at(index).to_prop(),
                None => PropValue::Str(joined()),
            };
            if host.property(element, name).as_ref() != Some(&next) {
                host.set_property(element, name, next);
            }
        }
        (BindingKind::Attribute, Some(index)) if value_at(index).is_removal_sentinel() => {
            if host.attribute(element, name).is_some() {
                host.remove_attribute(element, name);
            }
        }
        (BindingKind::Attribute, _) => {
            let next = joined();
            if host.attribute(element, name).as_deref() != Some(next.as_str()) {
                host.set_attribute(element, name, &next);
            }
        }
    }
}

/// Render `value` into a single insertable node (possibly a fragment).
fn render_value(host: &mut dyn HostTree, value: &Value) -> Result<(NodeId, Content), PatchError> {
    match value {
        Value::Node(node) => Ok((*node, Content::Nodes(Vec::new()))),
        Value::List(items) => {
            let fragment = host.create_fragment();
            for item in items {
                let (node, _) = render_value(host, item)?;
                host.append_child(fragment, node);
            }
            Ok((fragment, Content::Nodes(Vec::new())))
        }
        Value::Template(result) => {
            let mut instance = TemplateInstance::new(Rc::clone(result.template()), host)?;
            instance.set_placeholder_values(host, result.values())?;
            Ok((instance.fragment(), Content::Instance(Box::new(instance))))
        }
        Value::Instance(shared) => {
            let fragment = shared.borrow().gather(host);
            Ok((fragment, Content::Shared(Rc::clone(shared))))
        }
        scalar => {
            let data = scalar.to_text();
            let node = host.create_text(&data);
            Ok((node, Content::Text { node, data }))
        }
    }
}

/// Render any value into a node ready for insertion.
pub fn materialize(host: &mut dyn HostTree, value: &Value) -> Result<NodeId, PatchError> {
    render_value(host, value).map(|(node, _)| node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile_template;
    use tessel_dom::Document;

    #[test]
    fn missing_values_are_undefined() {
        let template = Rc::new(compile_template(&["<p title=", ">", "</p>"]).unwrap());
        let mut doc = Document::new();
        let mut instance = TemplateInstance::new(template, &mut doc).unwrap();
        instance.set_placeholder_values(&mut doc, &[]).unwrap();
        let p = instance.nodes()[0];
        assert_eq!(doc.attribute(p, "title"), None);
        assert_eq!(doc.inner_html(instance.fragment()), "<p><!----><!----></p>");
    }

    #[test]
    fn gather_collects_region_content_between_top_level_nodes() {
        let template = Rc::new(compile_template(&["", "<b></b>"]).unwrap());
        let mut doc = Document::new();
        let mut instance = TemplateInstance::new(template, &mut doc).unwrap();
        instance
            .set_placeholder_values(&mut doc, &[Value::from("x")])
            .unwrap();
        let gathered = instance.gather(&mut doc);
        assert_eq!(doc.inner_html(gathered), "<!---->x<!----><b></b>");
        assert!(doc.children(instance.fragment()).is_empty());
    }
}
