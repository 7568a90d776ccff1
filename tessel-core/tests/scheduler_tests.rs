use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::bail;
use tessel_core::{
    Attrs, Component, Element, Phase, Props, SchemaError, Value, flush, is_flush_scheduled,
    pending_count, set_renderer, tick,
};
use tessel_dom::{Document, HostTree, NodeId};
use tessel_renderer::TemplateRenderer;

type Log = Rc<RefCell<Vec<String>>>;

fn install(doc: &Rc<RefCell<Document>>) {
    set_renderer(Box::new(TemplateRenderer::new(Rc::clone(doc)))).unwrap();
}

fn container(doc: &Rc<RefCell<Document>>, tag: &str) -> NodeId {
    doc.borrow_mut().create_element(tag)
}

struct Child {
    log: Log,
}

impl Component for Child {
    const TAG: &'static str = "x-child";
    const PROPERTIES: &'static [&'static str] = &["label"];

    fn render(&self, props: &Props, _attrs: &Attrs) -> anyhow::Result<Value> {
        self.log.borrow_mut().push("B.render".into());
        let label = props.get("label").cloned().unwrap_or_default();
        Ok(tessel_core::tpl(&["<span>", "</span>"], vec![label])?)
    }

    fn before_update(&self, _next: &Props, _attrs: &Attrs) -> anyhow::Result<()> {
        self.log.borrow_mut().push("B.before".into());
        Ok(())
    }

    fn after_update(&self, _prev: &Props, _attrs: &Attrs) -> anyhow::Result<()> {
        self.log.borrow_mut().push("B.after".into());
        Ok(())
    }
}

struct Parent {
    log: Log,
    child: Rc<Element<Child>>,
}

impl Component for Parent {
    const TAG: &'static str = "x-parent";
    const PROPERTIES: &'static [&'static str] = &["title"];
    const ATTRIBUTES: &'static [&'static str] = &["theme"];

    fn render(&self, props: &Props, attrs: &Attrs) -> anyhow::Result<Value> {
        self.log.borrow_mut().push("A.render".into());
        let title = props.get("title").cloned().unwrap_or_default();
        self.child.set_prop("label", title.clone())?;
        self.child.connect();
        let theme = attrs.get("theme").cloned().flatten();
        Ok(tessel_core::tpl(&["<h1 class=", ">", "</h1>"], vec![theme.into(), title])?)
    }

    fn before_update(&self, _next: &Props, _attrs: &Attrs) -> anyhow::Result<()> {
        self.log.borrow_mut().push("A.before".into());
        Ok(())
    }

    fn after_update(&self, _prev: &Props, _attrs: &Attrs) -> anyhow::Result<()> {
        self.log.borrow_mut().push("A.after".into());
        Ok(())
    }
}

fn tree(doc: &Rc<RefCell<Document>>) -> (Log, Rc<Element<Parent>>, Rc<Element<Child>>) {
    let log: Log = Rc::default();
    let child = Element::new(Child { log: log.clone() }, container(doc, "x-child"));
    let parent = Element::new(
        Parent {
            log: log.clone(),
            child: child.clone(),
        },
        container(doc, "x-parent"),
    );
    (log, parent, child)
}

#[test]
fn first_mount_renders_once_without_update_hooks() {
    let doc = Rc::new(RefCell::new(Document::new()));
    install(&doc);
    let (log, parent, child) = tree(&doc);

    parent.set_prop("title", "hi").unwrap();
    parent.connect();
    assert!(is_flush_scheduled());
    tick().unwrap();

    assert_eq!(*log.borrow(), vec!["A.render", "B.render"]);
    assert!(parent.has_rendered() && child.has_rendered());
    assert_eq!(
        doc.borrow().inner_html(child.mount_point()),
        "<span><!---->hi<!----></span>"
    );
    assert!(!is_flush_scheduled());
}

#[test]
fn cascade_replays_after_update_children_first() {
    let doc = Rc::new(RefCell::new(Document::new()));
    install(&doc);
    let (log, parent, _child) = tree(&doc);
    parent.connect();
    flush().unwrap();
    log.borrow_mut().clear();

    parent.set_prop("title", "next").unwrap();
    flush().unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["A.before", "A.render", "B.before", "B.render", "B.after", "A.after"]
    );
}

#[test]
fn writes_in_one_block_are_batched() {
    let doc = Rc::new(RefCell::new(Document::new()));
    install(&doc);
    let (log, parent, child) = tree(&doc);
    parent.connect();
    tick().unwrap();
    log.borrow_mut().clear();

    parent.set_prop("title", "one").unwrap();
    parent.set_prop("title", "two").unwrap();
    assert!(parent.set_attribute("theme", Some("dark")));
    assert!(!parent.set_attribute("hidden", Some("")));
    assert_eq!(pending_count(), 1);
    tick().unwrap();

    let renders = log.borrow().iter().filter(|e| *e == "A.render").count();
    assert_eq!(renders, 1);
    assert_eq!(parent.prop("title"), Some(Value::from("two")));
    assert_eq!(
        doc.borrow().inner_html(parent.mount_point()),
        r#"<h1 class="dark"><!---->two<!----></h1>"#
    );
    assert_eq!(child.prop("label"), Some(Value::from("two")));
}

#[test]
fn undeclared_property_is_rejected() {
    let doc = Rc::new(RefCell::new(Document::new()));
    let (_log, parent, _child) = tree(&doc);
    assert_eq!(
        parent.set_prop("nope", 1).unwrap_err(),
        SchemaError::UnknownProperty {
            component: "x-parent",
            name: "nope".into()
        }
    );
    assert_eq!(pending_count(), 0);
}

#[test]
fn updates_queue_until_a_renderer_is_installed() {
    let doc = Rc::new(RefCell::new(Document::new()));
    let (log, parent, _child) = tree(&doc);
    parent.connect();
    assert!(!is_flush_scheduled());
    flush().unwrap();
    assert!(log.borrow().is_empty());
    assert_eq!(pending_count(), 1);

    install(&doc);
    assert_eq!(*log.borrow(), vec!["A.render", "B.render"]);
    assert_eq!(pending_count(), 0);
}

#[test]
fn disconnected_components_are_skipped() {
    let doc = Rc::new(RefCell::new(Document::new()));
    install(&doc);
    let (log, parent, _child) = tree(&doc);
    parent.connect();
    tick().unwrap();
    log.borrow_mut().clear();

    parent.set_prop("title", "late").unwrap();
    parent.disconnect();
    tick().unwrap();
    assert!(log.borrow().is_empty());
    assert!(doc.borrow().children(parent.mount_point()).is_empty());
}

struct Flaky {
    fail: Cell<bool>,
    renders: Cell<u32>,
}

impl Component for Flaky {
    const TAG: &'static str = "x-flaky";
    const PROPERTIES: &'static [&'static str] = &["n"];

    fn render(&self, props: &Props, _attrs: &Attrs) -> anyhow::Result<Value> {
        if self.fail.get() {
            bail!("render exploded");
        }
        self.renders.set(self.renders.get() + 1);
        Ok(props.get("n").cloned().unwrap_or_default())
    }
}

#[test]
fn render_error_aborts_the_flush_and_keeps_deltas() {
    let doc = Rc::new(RefCell::new(Document::new()));
    install(&doc);
    let flaky = Element::new(
        Flaky {
            fail: Cell::new(true),
            renders: Cell::new(0),
        },
        container(&doc, "x-flaky"),
    );
    let (_log, parent, _child) = tree(&doc);

    flaky.set_prop("n", 7).unwrap();
    flaky.connect();
    parent.connect();
    let err = tick().unwrap_err();
    assert_eq!(err.phase(), Some(Phase::Render));
    assert_eq!(err.to_string(), "<x-flaky> render failed");
    assert!(!flaky.has_rendered());
    assert_eq!(flaky.prop("n"), None);

    // the rest of the batch went back to the queue
    assert!(!parent.has_rendered());
    assert_eq!(pending_count(), 1);
    assert!(is_flush_scheduled());
    tick().unwrap();
    assert!(parent.has_rendered());

    flaky.component().fail.set(false);
    flaky.set_prop("n", 8).unwrap();
    tick().unwrap();
    assert_eq!(flaky.component().renders.get(), 1);
    assert_eq!(flaky.prop("n"), Some(Value::from(8)));
    assert_eq!(doc.borrow().text_content(flaky.mount_point()), "8");
}

struct Level {
    name: &'static str,
    log: Log,
    child: Option<Rc<Element<Level>>>,
}

impl Component for Level {
    const TAG: &'static str = "x-level";
    const PROPERTIES: &'static [&'static str] = &["depth"];

    fn render(&self, props: &Props, _attrs: &Attrs) -> anyhow::Result<Value> {
        self.log.borrow_mut().push(format!("{}.render", self.name));
        let depth = props.get("depth").cloned().unwrap_or_default();
        if let Some(child) = &self.child {
            child.set_prop("depth", depth.clone())?;
            child.connect();
        }
        Ok(depth)
    }

    fn before_update(&self, _next: &Props, _attrs: &Attrs) -> anyhow::Result<()> {
        self.log.borrow_mut().push(format!("{}.before", self.name));
        Ok(())
    }

    fn after_update(&self, _prev: &Props, _attrs: &Attrs) -> anyhow::Result<()> {
        self.log.borrow_mut().push(format!("{}.after", self.name));
        Ok(())
    }
}

#[test]
fn three_level_cascade_unwinds_innermost_first() {
    let doc = Rc::new(RefCell::new(Document::new()));
    install(&doc);
    let log: Log = Rc::default();
    let level = |name, child| {
        Element::new(
            Level {
                name,
                log: log.clone(),
                child,
            },
            container(&doc, "x-level"),
        )
    };
    let c = level("C", None);
    let b = level("B", Some(c.clone()));
    let a = level("A", Some(b.clone()));

    a.connect();
    flush().unwrap();
    assert_eq!(*log.borrow(), vec!["A.render", "B.render", "C.render"]);
    log.borrow_mut().clear();

    a.set_prop("depth", 3).unwrap();
    flush().unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            "A.before", "A.render", "B.before", "B.render", "C.before", "C.render", "C.after",
            "B.after", "A.after",
        ]
    );
    assert_eq!(doc.borrow().text_content(c.mount_point()), "3");
}

struct Relay {
    target: Rc<Element<Flaky>>,
}

impl Component for Relay {
    const TAG: &'static str = "x-relay";
    const PROPERTIES: &'static [&'static str] = &["v"];

    fn render(&self, props: &Props, _attrs: &Attrs) -> anyhow::Result<Value> {
        Ok(props.get("v").cloned().unwrap_or_default())
    }

    fn after_update(&self, _prev: &Props, _attrs: &Attrs) -> anyhow::Result<()> {
        self.target.set_prop("n", 99)?;
        Ok(())
    }
}

#[test]
fn requests_from_after_update_schedule_the_next_flush() {
    let doc = Rc::new(RefCell::new(Document::new()));
    install(&doc);
    let target = Element::new(
        Flaky {
            fail: Cell::new(false),
            renders: Cell::new(0),
        },
        container(&doc, "x-flaky"),
    );
    let relay = Element::new(
        Relay {
            target: target.clone(),
        },
        container(&doc, "x-relay"),
    );
    target.connect();
    relay.connect();
    tick().unwrap();
    assert_eq!(target.component().renders.get(), 1);

    relay.set_prop("v", 1).unwrap();
    tick().unwrap();
    assert_eq!(target.component().renders.get(), 1);
    assert_eq!(pending_count(), 1);
    assert!(is_flush_scheduled());

    tick().unwrap();
    assert_eq!(target.component().renders.get(), 2);
    assert_eq!(target.prop("n"), Some(Value::from(99)));
    assert_eq!(doc.borrow().text_content(target.mount_point()), "99");
    assert!(!is_flush_scheduled());
}
