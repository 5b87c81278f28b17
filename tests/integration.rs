//! Integration tests for gilt-dom.
//!
//! These tests exercise the public API from outside the crate, verifying that
//! the reconciler, dispatcher, event bindings, views, and routing work
//! together correctly.

use std::collections::HashMap;
use std::sync::Arc;

use gilt_dom::bus::{Bus, ViewUpdate};
use gilt_dom::dispatch::{AppRender, Command, Dispatched, Dispatcher, Tree, ViewRender};
use gilt_dom::dom::{Document, Dom, Mutation, NodeId, Selector};
use gilt_dom::event::{EventBindings, EventPayload, EventRecord, NullSink, ViewScope};
use gilt_dom::markup::parse_markup;
use gilt_dom::reconcile::reconcile;
use gilt_dom::route::RouteWatcher;
use gilt_dom::testing::{tree_to_string, Harness};
use gilt_dom::vdom::{EventBinding, VNode};
use gilt_dom::view::{View, Visibility};
use pretty_assertions::assert_eq;

fn body_with(markup: &str) -> (Document, NodeId) {
    let mut doc = Document::new();
    let body = doc.body();
    if !markup.is_empty() {
        let vnode = parse_markup(markup).unwrap();
        for node in doc.dom.realize(&vnode) {
            doc.dom.append(body, node);
        }
    }
    (doc, body)
}

fn patch(dom: &mut Dom, body: NodeId, markup: &str) -> Vec<Mutation> {
    let vnode = parse_markup(markup).unwrap();
    dom.record_mutations(true);
    reconcile(dom, &vnode, body, false);
    dom.take_mutations()
}

// ---------------------------------------------------------------------------
// Reconciliation scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_bootstrap_appends_without_replace() {
    let (mut doc, body) = body_with("");
    let mutations = patch(&mut doc.dom, body, r#"<div uid="1"><span uid="2">hi</span></div>"#);

    assert!(!mutations.iter().any(|m| matches!(m, Mutation::Replace { .. })));
    insta::assert_snapshot!(tree_to_string(&doc.dom, body), @r#"
    body
      div uid=1
        span uid=2
          "hi"
    "#);
}

#[test]
fn test_equal_hash_is_untouched() {
    let (mut doc, body) = body_with(r#"<div uid="1" hash="A">x</div>"#);
    let mutations = patch(&mut doc.dom, body, r#"<div uid="1" hash="A">y</div>"#);
    assert!(mutations.is_empty());
    assert_eq!(doc.dom.text_content(body), "x");
}

#[test]
fn test_changed_hash_patches_in_place() {
    let (mut doc, body) = body_with(r#"<div uid="1" hash="A"><span>old</span></div>"#);
    let div = doc.dom.query_selector_all(body, &Selector::tag_uid("div", "1"))[0];

    patch(&mut doc.dom, body, r#"<div uid="1" hash="B"><span>new</span></div>"#);

    assert_eq!(doc.dom.query_selector_all(body, &Selector::tag_uid("div", "1")), vec![div]);
    assert_eq!(doc.dom.get(div).and_then(|d| d.hash()), Some("B"));
    assert_eq!(doc.dom.text_content(div), "new");
}

#[test]
fn test_anonymous_without_equal_sibling_is_appended() {
    let (mut doc, body) = body_with("<p>a</p>");
    let mutations = patch(&mut doc.dom, body, "<p>b</p>");

    assert!(!mutations.iter().any(|m| matches!(m, Mutation::Replace { .. })));
    assert_eq!(doc.dom.children(body).len(), 2);
    assert_eq!(doc.dom.text_content(body), "ab");
}

#[test]
fn test_repeated_reconcile_is_idempotent() {
    let markup = r#"<main uid="m" hash="1"><ul uid="l" hash="2"><li>a</li><li>b</li></ul></main>"#;
    let (mut doc, body) = body_with("");
    patch(&mut doc.dom, body, markup);
    let first = tree_to_string(&doc.dom, body);

    for _ in 0..3 {
        let mutations = patch(&mut doc.dom, body, markup);
        assert!(mutations.iter().all(|m| !m.is_structural()));
    }
    assert_eq!(tree_to_string(&doc.dom, body), first);
}

// ---------------------------------------------------------------------------
// Event bindings
// ---------------------------------------------------------------------------

#[test]
fn test_unbind_then_bind_restores_listener_set() {
    let (mut doc, body) = body_with(r#"<button uid="a">A</button><button uid="b">B</button>"#);
    let vnode = VNode::fragment(Vec::<VNode>::new())
        .with_event(EventBinding::new("click", Selector::tag_uid("button", "a")))
        .with_event(EventBinding::new("click", Selector::tag_uid("button", "b")).capture());

    let mut bindings = EventBindings::new(Arc::new(NullSink));
    let scope = ViewScope::view("v");
    assert_eq!(bindings.bind(&mut doc.dom, &scope, &vnode, body), 2);

    for _ in 0..3 {
        assert_eq!(bindings.unbind(&mut doc.dom, &scope), 2);
        assert_eq!(doc.dom.total_listeners(), 0);
        assert_eq!(bindings.bind(&mut doc.dom, &scope, &vnode, body), 2);
    }
    assert_eq!(doc.dom.listener_count(body), 2);
}

#[tokio::test]
async fn test_fired_event_reaches_channel_sink() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<EventRecord>();
    let dispatcher = Dispatcher::new(Arc::new(tx));
    dispatcher
        .render_app(&AppRender::new("app").with_body_view(ViewRender::new(
            "v1",
            "app",
            Tree::new(r#"<div uid="v1"><button uid="go">Go</button></div>"#)
                .with_event(EventBinding::new("click", Selector::tag_uid("button", "go"))),
        )))
        .unwrap();

    let button = dispatcher.query(&Selector::tag_uid("button", "go"))[0];
    dispatcher.fire(gilt_dom::dom::DomEvent::basic("click", button));

    let record = rx.recv().await.unwrap();
    assert_eq!(record.kind, "click");
    assert!(record.meta.target.markup.contains("Go"));
    assert_eq!(record.payload, EventPayload::Basic);
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_render_view_before_app_is_ignored() {
    let harness = Harness::new();
    let outcome = harness
        .render_view(&ViewRender::new("V1", "X", Tree::new(r#"<div uid="V1">x</div>"#)))
        .unwrap();
    assert!(matches!(outcome, Dispatched::Ignored(_)));
    assert_eq!(harness.body_html(), "");
}

#[test]
fn test_json_commands_end_to_end() {
    let mut harness = Harness::new();
    let app = Command::render_app(
        AppRender::new("app").with_body_view(ViewRender::new(
            "counter",
            "app",
            Tree::new(r#"<div uid="counter" hash="0"><span>0</span><button uid="inc">+</button></div>"#)
                .with_event(EventBinding::new("click", Selector::tag_uid("button", "inc"))),
        )),
    );
    let json = app.to_json().unwrap();
    assert_eq!(harness.dispatcher().dispatch_json(&json).unwrap(), Dispatched::Rendered);

    let update = r#"{"Command":"RenderView","View":{"ViewID":"counter","AppID":"app","Tree":{
        "Markup":"<div uid=\"counter\" hash=\"1\"><span>1</span><button uid=\"inc\">+</button></div>",
        "Events":[{"Event":"click","EventSelector":"button[uid=inc]"}]}}}"#;
    harness.dispatcher().dispatch_json(update).unwrap();

    assert!(harness.body_html().contains("<span>1</span>"));
    harness.click(&Selector::tag_uid("button", "inc"));
    assert_eq!(harness.drain_events().len(), 1);
}

// ---------------------------------------------------------------------------
// Views and routing
// ---------------------------------------------------------------------------

#[test]
fn test_sync_hides_partner() {
    let bus = Bus::new();
    let a = View::new(&bus, || VNode::element("nav"));
    let b = View::new(&bus, || VNode::element("aside"));
    a.sync(&b);

    let updates = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen = Arc::clone(&updates);
    bus.subscribe(move |m: &ViewUpdate| seen.lock().unwrap().push(m.id.clone()));

    a.hide();
    assert_eq!(b.visibility(), Visibility::Hidden);
    assert!(updates.lock().unwrap().iter().any(|id| id == b.uuid()));
    assert_eq!(a.render().tag(), "nav");
    assert_eq!(b.render().tag(), "aside");
}

#[test]
fn test_route_matching_shows_and_hides() {
    let bus = Bus::new();
    let watcher = RouteWatcher::new(&bus);
    let view = View::new(&bus, || VNode::element("section"));
    watcher.attach(&view, "/users/:id").unwrap();
    watcher.attach(&view, "/about").unwrap();

    watcher.navigate("/users/42");
    assert_eq!(view.visibility(), Visibility::Shown);
    assert_eq!(view.params(), HashMap::from([("id".to_owned(), "42".to_owned())]));

    watcher.navigate("/contact");
    assert_eq!(view.visibility(), Visibility::Hidden);

    watcher.navigate("/about");
    assert_eq!(view.visibility(), Visibility::Shown);
}

#[test]
fn test_routed_view_renders_into_document() {
    let harness = Harness::new();
    harness.render_app(&AppRender::new("app")).unwrap();
    let watcher = RouteWatcher::new(harness.bus());
    let profile = harness.view("profile", || VNode::element("section").with_child(VNode::text("user")));
    harness.mount(&profile, "app");
    watcher.attach(&profile, "/users/:id").unwrap();

    watcher.navigate("/users/7");
    assert!(harness.body_html().contains("display: block;"));

    watcher.navigate("/");
    assert!(harness.body_html().contains("display: none;"));
    assert_eq!(
        harness
            .dispatcher()
            .query(&Selector::tag_uid("section", "profile"))
            .len(),
        1
    );
}
