use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use tessel_dom::NodeId;
use tessel_renderer::Renderer;
use tracing::{debug, error, trace, warn};

use crate::component::{Scheduled, Snapshot};
use crate::error::UpdateError;

thread_local! {
    static RENDERER: RefCell<Option<Box<dyn Renderer>>> = RefCell::new(None);

    // Components waiting for the next drain, deduplicated by pointer.
    static PENDING: RefCell<Vec<Rc<dyn Scheduled>>> = RefCell::new(Vec::new());
    static QUEUED: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());

    static FLUSH_SCHEDULED: Cell<bool> = Cell::new(false);
    static IS_FLUSHING: Cell<bool> = Cell::new(false);
}

fn ptr_id(component: &Rc<dyn Scheduled>) -> usize {
    Rc::as_ptr(component) as *const () as usize
}

/// Install the render target. Updates requested before the first renderer was
/// installed are flushed right away.
pub fn set_renderer(renderer: Box<dyn Renderer>) -> Result<(), UpdateError> {
    debug!(backend = renderer.backend_name(), "renderer installed");
    let previous = RENDERER.with(|slot| slot.borrow_mut().replace(renderer));
    if previous.is_none() && pending_count() > 0 {
        return flush();
    }
    Ok(())
}

/// Remove the render target. Later requests queue until one is installed.
pub fn clear_renderer() -> Option<Box<dyn Renderer>> {
    FLUSH_SCHEDULED.with(|f| f.set(false));
    RENDERER.with(|slot| slot.borrow_mut().take())
}

pub fn has_renderer() -> bool {
    RENDERER.with(|slot| slot.borrow().is_some())
}

/// Whether a flush is waiting for the next [`tick`].
pub fn is_flush_scheduled() -> bool {
    FLUSH_SCHEDULED.with(Cell::get)
}

/// Number of components waiting for an update.
pub fn pending_count() -> usize {
    PENDING.with(|pending| pending.borrow().len())
}

pub(crate) fn request_update(component: Rc<dyn Scheduled>) {
    let id = ptr_id(&component);
    let inserted = QUEUED.with(|queued| queued.borrow_mut().insert(id));
    if !inserted {
        return;
    }
    trace!(component = component.tag(), "update requested");
    PENDING.with(|pending| pending.borrow_mut().push(component));

    // during a flush the running drain loop picks the request up
    if !IS_FLUSHING.with(Cell::get) && has_renderer() {
        FLUSH_SCHEDULED.with(|f| f.set(true));
    }
}

/// Run the flush scheduled by earlier requests, if any. This is the
/// "next tick" that batches synchronous writes into one flush.
pub fn tick() -> Result<(), UpdateError> {
    if FLUSH_SCHEDULED.with(|f| f.replace(false)) {
        flush()
    } else {
        Ok(())
    }
}

/// Drain the pending set until it stays empty, then replay `after_update`
/// in reverse render order.
///
/// Does nothing when called from inside a running flush, or when no renderer
/// is installed (requests stay queued).
pub fn flush() -> Result<(), UpdateError> {
    if IS_FLUSHING.with(|f| f.replace(true)) {
        return Ok(());
    }
    FLUSH_SCHEDULED.with(|f| f.set(false));
    let result = if has_renderer() {
        drain()
    } else {
        Ok(())
    };
    IS_FLUSHING.with(|f| f.set(false));

    // requests raised by `after_update`, or left over by an aborted flush
    if pending_count() > 0 && has_renderer() {
        FLUSH_SCHEDULED.with(|f| f.set(true));
    }
    result
}

fn take_pending() -> Vec<Rc<dyn Scheduled>> {
    QUEUED.with(|queued| queued.borrow_mut().clear());
    PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()))
}

fn requeue(components: impl Iterator<Item = Rc<dyn Scheduled>>) {
    for component in components {
        request_update(component);
    }
}

type Rendered = (Rc<dyn Scheduled>, Option<Snapshot>);

fn drain() -> Result<(), UpdateError> {
    let mut stack: Vec<Rendered> = Vec::new();
    let mut rounds = 0usize;

    loop {
        let batch = take_pending();
        if batch.is_empty() {
            break;
        }
        rounds += 1;
        trace!(round = rounds, components = batch.len(), "draining updates");

        let mut batch = batch.into_iter();
        while let Some(component) = batch.next() {
            if !component.is_connected() {
                warn!(component = component.tag(), "skipping update of disconnected component");
                continue;
            }
            match update_one(&component) {
                Ok(previous) => stack.push((component, previous)),
                Err(err) => {
                    error!(component = component.tag(), error = %err, "update failed, aborting flush");
                    requeue(batch);
                    for (rendered, _) in stack {
                        rendered.mark_rendered();
                    }
                    return Err(err);
                }
            }
        }
    }

    debug!(rendered = stack.len(), rounds, "flush rendered components");
    while let Some((component, previous)) = stack.pop() {
        let result = match &previous {
            Some(previous) => component.after_update(previous),
            None => Ok(()),
        };
        component.mark_rendered();
        if let Err(err) = result {
            error!(component = component.tag(), error = %err, "after_update failed, aborting flush");
            for (rendered, _) in stack {
                rendered.mark_rendered();
            }
            return Err(err);
        }
    }
    Ok(())
}

fn update_one(component: &Rc<dyn Scheduled>) -> Result<Option<Snapshot>, UpdateError> {
    let (ui, previous) = component.update()?;
    RENDERER.with(|slot| match slot.borrow_mut().as_mut() {
        Some(renderer) => renderer.render(component.mount_point(), &ui),
        None => Ok(()),
    })?;
    Ok(previous)
}

/// Drop whatever the renderer keeps for `mount_point`.
pub(crate) fn release(mount_point: NodeId) {
    RENDERER.with(|slot| match slot.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(renderer) = slot.as_mut() {
                renderer.unmount(mount_point);
            }
        }
        Err(_) => warn!(%mount_point, "renderer busy, mount site not released"),
    });
}
