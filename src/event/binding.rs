//! Scoped listener bookkeeping.
//!
//! [`EventBindings`] realizes [`EventBinding`] descriptors as delegated
//! listeners on a container node and records the handles per [`ViewScope`],
//! so one scope can be torn down without touching the others.
//! [`AppEventRegistry`] keeps one [`EventBindings`] per application id.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::record::EventRecord;
use super::sink::EventSink;
use crate::dom::events::{listener, ListenerFn, ListenerId};
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::vdom::{EventBinding, VNode};

// ---------------------------------------------------------------------------
// ViewScope
// ---------------------------------------------------------------------------

/// Isolation boundary for listener lifecycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewScope {
    /// Resources rendered into the document head.
    Head,
    /// Resources rendered into the document body.
    Body,
    /// One view, by view id.
    View(String),
}

impl ViewScope {
    pub fn view(id: impl Into<String>) -> Self {
        Self::View(id.into())
    }
}

impl fmt::Display for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("head"),
            Self::Body => f.write_str("body"),
            Self::View(id) => write!(f, "view:{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Delegated listener
// ---------------------------------------------------------------------------

/// The callback realized for one descriptor bound under `container`.
///
/// When fired, every node under `container` currently matching the selector
/// is compared with the event target; on a hit the flags are applied
/// (prevent-default, stop-immediate, stop) and a record is sent.
pub fn delegate(container: NodeId, binding: EventBinding, sink: Arc<dyn EventSink>) -> ListenerFn {
    listener(move |dom, event| {
        for candidate in dom.query_selector_all(container, &binding.selector) {
            if candidate != event.target {
                continue;
            }
            if binding.prevent_default {
                event.prevent_default();
            }
            if binding.stop_immediate_propagation {
                event.stop_immediate_propagation();
            }
            if binding.stop_propagation {
                event.stop_propagation();
            }
            sink.send(EventRecord::capture(dom, event, &binding));
        }
    })
}

// ---------------------------------------------------------------------------
// EventBindings
// ---------------------------------------------------------------------------

/// Realized listeners of one application, grouped by scope.
pub struct EventBindings {
    sink: Arc<dyn EventSink>,
    scopes: HashMap<ViewScope, Vec<ListenerId>>,
}

impl fmt::Debug for EventBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBindings")
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl EventBindings {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            scopes: HashMap::new(),
        }
    }

    /// Realize every descriptor declared in `vnode` (and its descendants) as
    /// a listener on `container`, recorded under `scope`.
    ///
    /// Returns how many listeners were added.
    pub fn bind(&mut self, dom: &mut Dom, scope: &ViewScope, vnode: &VNode, container: NodeId) -> usize {
        self.bind_all(dom, scope, &vnode.collect_events(), container)
    }

    /// Realize an explicit list of descriptors under `scope`.
    pub fn bind_all(
        &mut self,
        dom: &mut Dom,
        scope: &ViewScope,
        bindings: &[EventBinding],
        container: NodeId,
    ) -> usize {
        let handles = self.scopes.entry(scope.clone()).or_default();
        let mut added = 0;
        for binding in bindings {
            let callback = delegate(container, binding.clone(), Arc::clone(&self.sink));
            if let Some(id) = dom.add_listener(container, binding.event.as_str(), binding.use_capture, callback) {
                handles.push(id);
                added += 1;
            }
        }
        trace!(%scope, added, "bound");
        added
    }

    /// Remove every listener recorded under `scope`. Idempotent.
    pub fn unbind(&mut self, dom: &mut Dom, scope: &ViewScope) -> usize {
        let Some(handles) = self.scopes.remove(scope) else {
            return 0;
        };
        let removed = handles.into_iter().filter(|&id| dom.remove_listener(id)).count();
        trace!(%scope, removed, "unbound");
        removed
    }

    /// Remove every listener of every scope.
    pub fn unbind_all(&mut self, dom: &mut Dom) -> usize {
        let scopes: Vec<ViewScope> = self.scopes.keys().cloned().collect();
        scopes.iter().map(|scope| self.unbind(dom, scope)).sum()
    }

    /// Number of listeners recorded under `scope`.
    pub fn listener_count(&self, scope: &ViewScope) -> usize {
        self.scopes.get(scope).map_or(0, Vec::len)
    }

    /// Scopes that currently hold at least one listener.
    pub fn scopes(&self) -> impl Iterator<Item = &ViewScope> {
        self.scopes
            .iter()
            .filter(|(_, handles)| !handles.is_empty())
            .map(|(scope, _)| scope)
    }
}

// ---------------------------------------------------------------------------
// AppEventRegistry
// ---------------------------------------------------------------------------

/// Event bindings for every application, keyed by application id.
///
/// An entry is replaced wholesale on each full application render; view
/// scopes inside it are created on first use.
pub struct AppEventRegistry {
    sink: Arc<dyn EventSink>,
    apps: HashMap<String, EventBindings>,
}

impl fmt::Debug for AppEventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppEventRegistry")
            .field("apps", &self.apps)
            .finish_non_exhaustive()
    }
}

impl AppEventRegistry {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            apps: HashMap::new(),
        }
    }

    /// The bindings of `app_id`, created if missing.
    pub fn app(&mut self, app_id: &str) -> &mut EventBindings {
        let sink = &self.sink;
        self.apps
            .entry(app_id.to_owned())
            .or_insert_with(|| EventBindings::new(Arc::clone(sink)))
    }

    pub fn get(&self, app_id: &str) -> Option<&EventBindings> {
        self.apps.get(app_id)
    }

    /// Unbind everything `app_id` holds and start it over empty.
    pub fn reset(&mut self, dom: &mut Dom, app_id: &str) -> usize {
        let removed = self
            .apps
            .get_mut(app_id)
            .map_or(0, |bindings| bindings.unbind_all(dom));
        self.apps
            .insert(app_id.to_owned(), EventBindings::new(Arc::clone(&self.sink)));
        removed
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
