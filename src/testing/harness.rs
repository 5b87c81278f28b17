//! Harness: a headless document driven through the dispatcher.
//!
//! The `Harness` owns a [`Dispatcher`] whose event records land on an
//! in-memory channel, plus a [`Bus`] for views. Tests render, fire host
//! events by selector, and read back what the sink received.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::snapshot::tree_to_string;
use crate::bus::Bus;
use crate::config::EngineConfig;
use crate::dispatch::{AppRender, CommandSink, DispatchError, Dispatched, Dispatcher, ViewRender};
use crate::dom::events::{DomEvent, EventDetail, Modifiers};
use crate::dom::node::NodeId;
use crate::dom::query::Selector;
use crate::event::EventRecord;
use crate::view::View;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A headless dispatcher for testing.
///
/// # Examples
///
/// ```
/// use gilt_dom::dispatch::{AppRender, Tree};
/// use gilt_dom::dom::Selector;
/// use gilt_dom::event::EventPayload;
/// use gilt_dom::vdom::EventBinding;
/// use gilt_dom::testing::Harness;
///
/// let mut harness = Harness::new();
/// harness
///     .render_app(&AppRender::new("app").with_body_resource(
///         Tree::new(r#"<button uid="go">Go</button>"#)
///             .with_event(EventBinding::new("click", Selector::tag_uid("button", "go"))),
///     ))
///     .unwrap();
///
/// assert!(harness.click(&Selector::tag_uid("button", "go")));
/// let records = harness.drain_events();
/// assert_eq!(records.len(), 1);
/// assert!(matches!(records[0].payload, EventPayload::Mouse { .. }));
/// ```
pub struct Harness {
    dispatcher: Arc<Dispatcher>,
    events: UnboundedReceiver<EventRecord>,
    bus: Bus,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        Self {
            dispatcher: Arc::new(Dispatcher::with_config(config, Arc::new(tx))),
            events,
            bus: Bus::new(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The dispatcher as a command sink, for mounting views.
    pub fn sink(&self) -> Arc<dyn CommandSink> {
        Arc::clone(&self.dispatcher) as Arc<dyn CommandSink>
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render_app(&self, app: &AppRender) -> Result<Dispatched, DispatchError> {
        self.dispatcher.render_app(app)
    }

    pub fn render_view(&self, view: &ViewRender) -> Result<Dispatched, DispatchError> {
        self.dispatcher.render_view(view)
    }

    /// A view built on the harness bus.
    pub fn view(&self, uid: &str, renderer: impl crate::view::Render + 'static) -> View {
        View::builder(&self.bus)
            .with_config(self.dispatcher.config().clone())
            .with_uid(uid)
            .with_renderer(renderer)
            .build()
    }

    /// Mount `view` on this harness's dispatcher under `app_id`.
    pub fn mount(&self, view: &View, app_id: &str) {
        view.mount(app_id, self.sink());
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// First live node matching `selector`.
    pub fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.dispatcher.query(selector).into_iter().next()
    }

    /// Fire `kind` at the first node matching `selector`.
    ///
    /// Returns `false` if nothing matched or a listener prevented the
    /// default action.
    pub fn fire(&self, kind: &str, selector: &Selector, detail: EventDetail) -> bool {
        match self.find(selector) {
            Some(target) => self.dispatcher.fire(DomEvent::new(kind, target, detail)),
            None => false,
        }
    }

    /// Simulate a primary-button click at the origin.
    pub fn click(&self, selector: &Selector) -> bool {
        let found = self.find(selector).is_some();
        self.fire(
            "click",
            selector,
            EventDetail::Mouse {
                client_x: 0.0,
                client_y: 0.0,
                button: 0,
                modifiers: Modifiers::default(),
            },
        );
        found
    }

    /// Simulate typing `value` into an input.
    pub fn input(&self, selector: &Selector, value: &str) -> bool {
        self.fire(
            "input",
            selector,
            EventDetail::Input {
                value: value.to_owned(),
            },
        )
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Every event record delivered so far.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        let mut out = Vec::new();
        while let Ok(record) = self.events.try_recv() {
            out.push(record);
        }
        out
    }

    pub fn head_html(&self) -> String {
        self.dispatcher.head_html()
    }

    pub fn body_html(&self) -> String {
        self.dispatcher.body_html()
    }

    /// Outline of the live body.
    pub fn body_tree(&self) -> String {
        self.dispatcher
            .inspect(|state| tree_to_string(&state.document.dom, state.document.body()))
    }
}
