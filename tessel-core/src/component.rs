use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tessel_dom::NodeId;
use tessel_template::Value;
use tracing::trace;

use crate::error::{Phase, SchemaError, UpdateError};
use crate::scheduler;

/// Committed property values, keyed by declared name.
pub type Props = BTreeMap<String, Value>;

/// Observed attribute values; `None` means the attribute was removed.
pub type Attrs = BTreeMap<String, Option<String>>;

/// Authored component behavior.
///
/// Observed property and attribute names are declared up front; writes to
/// anything else are rejected or ignored by [`Element`].
pub trait Component: 'static {
    const TAG: &'static str;
    const PROPERTIES: &'static [&'static str] = &[];
    const ATTRIBUTES: &'static [&'static str] = &[];

    fn render(&self, props: &Props, attrs: &Attrs) -> anyhow::Result<Value>;

    /// Called with the merged values about to be committed. Not called on the
    /// first render.
    fn before_update(&self, _next_props: &Props, _next_attrs: &Attrs) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called with the values from before the update, children first. Not
    /// called on the first render.
    fn after_update(&self, _prev_props: &Props, _prev_attrs: &Attrs) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Committed state as it was before an update.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub props: Rc<Props>,
    pub attrs: Rc<Attrs>,
}

#[derive(Default)]
struct UpdateRecord {
    props: Rc<Props>,
    attrs: Rc<Attrs>,
    pending_props: Props,
    pending_attrs: Attrs,
}

impl UpdateRecord {
    fn merged(&self) -> (Props, Attrs) {
        let mut props = (*self.props).clone();
        props.extend(self.pending_props.clone());
        let mut attrs = (*self.attrs).clone();
        attrs.extend(self.pending_attrs.clone());
        (props, attrs)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            props: Rc::clone(&self.props),
            attrs: Rc::clone(&self.attrs),
        }
    }
}

/// A component bound to a mount point.
pub struct Element<C: Component> {
    component: C,
    mount_point: NodeId,
    record: RefCell<UpdateRecord>,
    connected: Cell<bool>,
    rendered: Cell<bool>,
}

impl<C: Component> Element<C> {
    pub fn new(component: C, mount_point: NodeId) -> Rc<Self> {
        Rc::new(Self {
            component,
            mount_point,
            record: RefCell::new(UpdateRecord::default()),
            connected: Cell::new(false),
            rendered: Cell::new(false),
        })
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn mount_point(&self) -> NodeId {
        self.mount_point
    }

    /// Committed properties.
    pub fn props(&self) -> Rc<Props> {
        Rc::clone(&self.record.borrow().props)
    }

    /// Committed attributes.
    pub fn attrs(&self) -> Rc<Attrs> {
        Rc::clone(&self.record.borrow().attrs)
    }

    /// Committed value of one property.
    pub fn prop(&self, name: &str) -> Option<Value> {
        self.record.borrow().props.get(name).cloned()
    }

    /// Stage a property write and request an update.
    pub fn set_prop(self: &Rc<Self>, name: &str, value: impl Into<Value>) -> Result<(), SchemaError> {
        if !C::PROPERTIES.iter().any(|declared| *declared == name) {
            return Err(SchemaError::UnknownProperty {
                component: C::TAG,
                name: name.to_string(),
            });
        }
        self.record
            .borrow_mut()
            .pending_props
            .insert(name.to_string(), value.into());
        self.request_update();
        Ok(())
    }

    /// Stage an attribute change. Returns `false`, and does nothing, for
    /// attributes the component does not observe.
    pub fn set_attribute(self: &Rc<Self>, name: &str, value: Option<&str>) -> bool {
        if !C::ATTRIBUTES.iter().any(|observed| *observed == name) {
            return false;
        }
        self.record
            .borrow_mut()
            .pending_attrs
            .insert(name.to_string(), value.map(str::to_string));
        self.request_update();
        true
    }

    /// Mark as connected and request the first update.
    pub fn connect(self: &Rc<Self>) {
        if !self.connected.replace(true) {
            trace!(component = C::TAG, mount_point = %self.mount_point, "connected");
            self.request_update();
        }
    }

    /// Mark as disconnected and release the mount site.
    pub fn disconnect(&self) {
        if self.connected.replace(false) {
            trace!(component = C::TAG, mount_point = %self.mount_point, "disconnected");
            scheduler::release(self.mount_point);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub fn has_rendered(&self) -> bool {
        self.rendered.get()
    }

    fn request_update(self: &Rc<Self>) {
        let this: Rc<dyn Scheduled> = self.clone();
        scheduler::request_update(this);
    }
}

/// Scheduler-facing side of an [`Element`].
pub(crate) trait Scheduled {
    fn tag(&self) -> &'static str;
    fn mount_point(&self) -> NodeId;
    fn is_connected(&self) -> bool;
    fn mark_rendered(&self);

    /// Merge pending deltas, run `before_update` (after the first render),
    /// commit and render. Returns the UI and, unless this is the first render,
    /// the committed state from before the update.
    fn update(&self) -> Result<(Value, Option<Snapshot>), UpdateError>;

    fn after_update(&self, previous: &Snapshot) -> Result<(), UpdateError>;
}

impl<C: Component> Scheduled for Element<C> {
    fn tag(&self) -> &'static str {
        C::TAG
    }

    fn mount_point(&self) -> NodeId {
        self.mount_point
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn mark_rendered(&self) {
        self.rendered.set(true);
    }

    fn update(&self) -> Result<(Value, Option<Snapshot>), UpdateError> {
        let (next_props, next_attrs) = self.record.borrow().merged();
        let first = !self.rendered.get();

        if !first {
            self.component
                .before_update(&next_props, &next_attrs)
                .map_err(|err| UpdateError::lifecycle(C::TAG, Phase::BeforeUpdate, err))?;
        }

        // commit
        let (previous, staged_props, staged_attrs) = {
            let mut record = self.record.borrow_mut();
            let previous = record.snapshot();
            record.props = Rc::new(next_props);
            record.attrs = Rc::new(next_attrs);
            (
                previous,
                std::mem::take(&mut record.pending_props),
                std::mem::take(&mut record.pending_attrs),
            )
        };

        let committed = self.record.borrow().snapshot();
        match self.component.render(&committed.props, &committed.attrs) {
            Ok(ui) => Ok((ui, (!first).then_some(previous))),
            Err(err) => {
                // keep the deltas for the next attempt; newer writes win
                let mut record = self.record.borrow_mut();
                record.props = previous.props;
                record.attrs = previous.attrs;
                let newer_props = std::mem::replace(&mut record.pending_props, staged_props);
                let newer_attrs = std::mem::replace(&mut record.pending_attrs, staged_attrs);
                record.pending_props.extend(newer_props);
                record.pending_attrs.extend(newer_attrs);
                Err(UpdateError::lifecycle(C::TAG, Phase::Render, err))
            }
        }
    }

    fn after_update(&self, previous: &Snapshot) -> Result<(), UpdateError> {
        self.component
            .after_update(&previous.props, &previous.attrs)
            .map_err(|err| UpdateError::lifecycle(C::TAG, Phase::AfterUpdate, err))
    }
}
