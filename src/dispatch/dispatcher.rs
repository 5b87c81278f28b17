//! The dispatcher: one render command at a time against the live document.
//!
//! All state lives behind a single mutex, so a render (parse, unbind,
//! reconcile, rebind) never interleaves with another render or with host
//! event delivery through [`Dispatcher::fire`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::command::{AppRender, Command, Tree, ViewRender};
use super::{DispatchError, Dispatched, ViewNotActive};
use crate::config::EngineConfig;
use crate::dom::events::DomEvent;
use crate::dom::node::NodeId;
use crate::dom::query::Selector;
use crate::dom::{Document, Dom};
use crate::event::{AppEventRegistry, EventSink, ViewScope};
use crate::markup::parse_markup;
use crate::reconcile::Reconciler;
use crate::vdom::{EventBinding, VNode};

/// Everything a render mutates.
pub struct RenderState {
    pub document: Document,
    pub registry: AppEventRegistry,
    pub active_app: Option<String>,
}

/// A parsed unit of an application render.
struct Piece {
    scope: ViewScope,
    node: VNode,
    events: Vec<EventBinding>,
}

fn parse_tree(scope: ViewScope, tree: &Tree) -> Result<Piece, DispatchError> {
    let node = parse_markup(&tree.markup).map_err(|source| DispatchError::MalformedMarkup {
        scope: scope.to_string(),
        source,
    })?;
    Ok(Piece {
        scope,
        node,
        events: tree.events.clone(),
    })
}

/// Serializes render commands onto one live document.
pub struct Dispatcher {
    state: Mutex<RenderState>,
    config: EngineConfig,
    reconciler: Reconciler,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// A dispatcher over an empty document, sending fired events to `sink`.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(EngineConfig::default(), sink)
    }

    pub fn with_config(config: EngineConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: Mutex::new(RenderState {
                document: Document::new(),
                registry: AppEventRegistry::new(sink),
                active_app: None,
            }),
            reconciler: Reconciler::new(&config),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RenderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Execute one command.
    pub fn dispatch(&self, command: Command) -> Result<Dispatched, DispatchError> {
        match command {
            Command::RenderApp { app } => self.render_app(&app),
            Command::RenderView { view } => self.render_view(&view),
        }
    }

    /// Decode and execute one JSON command. Unknown commands are logged and
    /// returned as [`DispatchError::UnknownCommand`].
    pub fn dispatch_json(&self, json: &str) -> Result<Dispatched, DispatchError> {
        let command = Command::from_json(json).inspect_err(|err| {
            if let DispatchError::UnknownCommand(name) = err {
                warn!(command = %name, "unknown command ignored");
            }
        })?;
        self.dispatch(command)
    }

    /// Replace head and body with a fresh application render.
    ///
    /// Every piece of markup is parsed before anything is touched, so a
    /// malformed piece leaves the previous state intact.
    pub fn render_app(&self, app: &AppRender) -> Result<Dispatched, DispatchError> {
        let mut head = Vec::new();
        for tree in &app.head_resources {
            head.push(parse_tree(ViewScope::Head, tree)?);
        }
        for view in &app.head {
            head.push(parse_tree(ViewScope::view(&view.view_id), &view.tree)?);
        }
        let mut body = Vec::new();
        for view in &app.body {
            body.push(parse_tree(ViewScope::view(&view.view_id), &view.tree)?);
        }
        for tree in &app.body_resources {
            body.push(parse_tree(ViewScope::Body, tree)?);
        }

        let mut guard = self.lock();
        let state = &mut *guard;
        let (head_node, body_node) = (state.document.head(), state.document.body());
        let dom = &mut state.document.dom;

        let mut unbound = 0;
        if let Some(previous) = state.active_app.take() {
            if previous != app.app_id {
                unbound += state.registry.reset(dom, &previous);
            }
        }
        unbound += state.registry.reset(dom, &app.app_id);
        state.active_app = Some(app.app_id.clone());

        let kept_head = self.clear_region(dom, head_node);
        let kept_body = self.clear_region(dom, body_node);

        let bindings = state.registry.app(&app.app_id);
        let mut bound = 0;
        for (container, pieces) in [(head_node, &head), (body_node, &body)] {
            for piece in pieces {
                for node in dom.realize(&piece.node) {
                    dom.append(container, node);
                }
                bound += bindings.bind_all(dom, &piece.scope, &piece.events, container);
            }
        }

        debug!(
            app = %app.app_id,
            unbound,
            bound,
            kept = kept_head + kept_body,
            "RenderApp"
        );
        Ok(Dispatched::Rendered)
    }

    /// Remove every direct child of `region` not marked as externally owned.
    /// Returns how many were kept.
    fn clear_region(&self, dom: &mut Dom, region: NodeId) -> usize {
        let marker = self.config.external_marker.as_str();
        let children = dom.children(region).to_vec();
        let mut kept = 0;
        for child in children {
            if dom.get(child).is_some_and(|data| data.attr(marker).is_some()) {
                kept += 1;
            } else {
                dom.remove(child);
            }
        }
        kept
    }

    /// Patch one view into the body.
    ///
    /// Ignored unless the view's application is the active one.
    pub fn render_view(&self, view: &ViewRender) -> Result<Dispatched, DispatchError> {
        let scope = ViewScope::view(&view.view_id);
        let piece = parse_tree(scope, &view.tree)?;

        let mut guard = self.lock();
        let state = &mut *guard;
        if state.active_app.as_deref() != Some(view.app_id.as_str()) {
            let ignored = ViewNotActive {
                view_id: view.view_id.clone(),
                app_id: view.app_id.clone(),
                active: state.active_app.clone(),
            };
            debug!(%ignored, "RenderView ignored");
            return Ok(Dispatched::Ignored(ignored));
        }

        let body = state.document.body();
        let dom = &mut state.document.dom;
        let bindings = state.registry.app(&view.app_id);
        let unbound = bindings.unbind(dom, &piece.scope);
        let report = self.reconciler.reconcile(dom, &piece.node, body);
        let bound = bindings.bind_all(dom, &piece.scope, &piece.events, body);

        debug!(
            view = %view.view_id,
            unbound,
            bound,
            appended = report.appended,
            replaced = report.replaced,
            patched = report.patched,
            "RenderView"
        );
        Ok(Dispatched::Rendered)
    }

    // ── Host events ──────────────────────────────────────────────────

    /// Deliver a host event to the live document. Returns `false` if a
    /// listener prevented the default action.
    pub fn fire(&self, mut event: DomEvent) -> bool {
        let state = self.lock();
        state.document.dom.dispatch_event(&mut event)
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Run `f` against the current state.
    pub fn inspect<R>(&self, f: impl FnOnce(&RenderState) -> R) -> R {
        f(&self.lock())
    }

    pub fn active_app(&self) -> Option<String> {
        self.lock().active_app.clone()
    }

    /// Nodes anywhere in the document matching `selector`.
    pub fn query(&self, selector: &Selector) -> Vec<NodeId> {
        self.inspect(|state| {
            let doc = &state.document;
            doc.dom.query_selector_all(doc.html(), selector)
        })
    }

    pub fn head_html(&self) -> String {
        self.inspect(|state| state.document.dom.inner_html(state.document.head()))
    }

    pub fn body_html(&self) -> String {
        self.inspect(|state| state.document.dom.inner_html(state.document.body()))
    }

    /// Listeners recorded for `scope` of application `app_id`.
    pub fn listener_count(&self, app_id: &str, scope: &ViewScope) -> usize {
        self.inspect(|state| {
            state
                .registry
                .get(app_id)
                .map_or(0, |bindings| bindings.listener_count(scope))
        })
    }
}
