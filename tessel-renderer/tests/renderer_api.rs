use std::cell::RefCell;
use std::rc::Rc;

use tessel_dom::{Document, HostTree, NodeId};
use tessel_renderer::{Renderer, TemplateRenderer};
use tessel_template::{Value, html, tpl};

fn setup() -> (TemplateRenderer<Document>, NodeId) {
    let mut doc = Document::new();
    let container = doc.create_element("main");
    (TemplateRenderer::new(Rc::new(RefCell::new(doc))), container)
}

fn counter(count: i32) -> Value {
    tpl(&["<p class=\"count\">", "</p>"], vec![count.into()]).unwrap()
}

#[test]
fn same_template_is_patched_not_rebuilt() {
    let (mut renderer, main) = setup();
    renderer.render(main, &counter(1)).unwrap();
    let p = renderer.host().borrow().children(main)[0];
    let created = renderer.host().borrow().stats().created;

    renderer.render(main, &counter(2)).unwrap();
    let doc = renderer.host().borrow();
    assert_eq!(doc.children(main)[0], p);
    assert_eq!(doc.stats().created, created);
    assert_eq!(doc.inner_html(main), r#"<p class="count"><!---->2<!----></p>"#);
}

#[test]
fn template_change_clears_and_replaces() {
    let (mut renderer, main) = setup();
    renderer.render(main, &counter(1)).unwrap();
    renderer
        .render(main, &html("<h1>{}</h1>", vec!["title".into()]).unwrap())
        .unwrap();
    assert_eq!(
        renderer.host().borrow().inner_html(main),
        "<h1><!---->title<!----></h1>"
    );

    renderer.render(main, &counter(3)).unwrap();
    assert_eq!(
        renderer.host().borrow().inner_html(main),
        r#"<p class="count"><!---->3<!----></p>"#
    );
    assert_eq!(renderer.site_count(), 1);
}

#[test]
fn plain_values_replace_the_container_contents() {
    let (mut renderer, main) = setup();
    renderer.render(main, &counter(1)).unwrap();
    renderer.render(main, &"plain".into()).unwrap();
    assert!(renderer.instance(main).is_none());
    assert_eq!(renderer.host().borrow().inner_html(main), "plain");

    renderer.render(main, &Value::Null).unwrap();
    assert!(renderer.host().borrow().children(main).is_empty());
}

#[test]
fn unmount_releases_the_site() {
    let (mut renderer, main) = setup();
    renderer.render(main, &counter(1)).unwrap();
    assert!(renderer.instance(main).is_some());
    renderer.unmount(main);
    assert_eq!(renderer.site_count(), 0);
    assert!(renderer.host().borrow().children(main).is_empty());

    // a later render starts from a fresh instance
    renderer.render(main, &counter(5)).unwrap();
    assert_eq!(renderer.host().borrow().text_content(main), "5");
}

#[test]
fn backend_name_is_stable() {
    let (renderer, _) = setup();
    assert_eq!(renderer.backend_name(), "template");
}
