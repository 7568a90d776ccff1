//! Mount-site registry: renders UI values into host containers.
//!
//! Each container owns at most one [`TemplateInstance`]. It is reused while the
//! static template stays the same and replaced (container cleared first) when
//! it changes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tessel_dom::{HostTree, NodeId};
use tessel_template::{PatchError, TemplateInstance, TemplateResult, Value, materialize};
use tracing::{debug, trace};

/// Render target the scheduler hands component output to.
pub trait Renderer {
    fn backend_name(&self) -> &'static str;

    /// Render `ui` into `container`, patching the previous rendering when
    /// possible.
    fn render(&mut self, container: NodeId, ui: &Value) -> Result<(), PatchError>;

    /// Forget the mount site and clear the container.
    fn unmount(&mut self, container: NodeId);
}

#[derive(Debug, Default)]
struct MountSite {
    instance: Option<TemplateInstance>,
}

/// [`Renderer`] over any [`HostTree`], shared with whoever owns the tree.
pub struct TemplateRenderer<H: HostTree + 'static> {
    host: Rc<RefCell<H>>,
    sites: HashMap<NodeId, MountSite>,
}

impl<H: HostTree + 'static> TemplateRenderer<H> {
    pub fn new(host: Rc<RefCell<H>>) -> Self {
        Self {
            host,
            sites: HashMap::new(),
        }
    }

    pub fn host(&self) -> &Rc<RefCell<H>> {
        &self.host
    }

    /// The instance currently mounted in `container`, if its UI is a template.
    pub fn instance(&self, container: NodeId) -> Option<&TemplateInstance> {
        self.sites.get(&container)?.instance.as_ref()
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    fn render_template(
        host: &mut H,
        site: &mut MountSite,
        container: NodeId,
        result: &TemplateResult,
    ) -> Result<(), PatchError> {
        if let Some(instance) = site
            .instance
            .as_mut()
            .filter(|instance| Rc::ptr_eq(instance.template(), result.template()))
        {
            trace!(%container, "patching mounted instance");
            return instance.set_placeholder_values(host, result.values());
        }

        if site.instance.take().is_some() {
            debug!(%container, "template changed, replacing instance");
        }
        host.clear_children(container);
        let mut instance = TemplateInstance::new(Rc::clone(result.template()), host)?;
        instance.set_placeholder_values(host, result.values())?;
        host.append_child(container, instance.fragment());
        site.instance = Some(instance);
        Ok(())
    }
}

impl<H: HostTree + 'static> Renderer for TemplateRenderer<H> {
    fn backend_name(&self) -> &'static str {
        "template"
    }

    fn render(&mut self, container: NodeId, ui: &Value) -> Result<(), PatchError> {
        let mut host = self.host.borrow_mut();
        let site = self.sites.entry(container).or_default();
        match ui {
            Value::Template(result) => Self::render_template(&mut host, site, container, result),
            other => {
                if site.instance.take().is_some() {
                    debug!(%container, "non-template UI, dropping instance");
                }
                host.clear_children(container);
                if !other.is_nullish() {
                    let node = materialize(&mut *host, other)?;
                    host.append_child(container, node);
                }
                Ok(())
            }
        }
    }

    fn unmount(&mut self, container: NodeId) {
        if self.sites.remove(&container).is_some() {
            debug!(%container, "released mount site");
            self.host.borrow_mut().clear_children(container);
        }
    }
}
