//! Live listeners and host event propagation.
//!
//! [`Dom::dispatch_event`] delivers a [`DomEvent`] the way a browser does:
//! capture listeners from the root down to the target's parent, every listener
//! on the target itself, then non-capture listeners from the parent back up
//! to the root.

use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;

use super::node::NodeId;
use super::tree::Dom;

new_key_type! {
    /// Handle to a listener realized against a live node.
    pub struct ListenerId;
}

/// Listener callback. Receives the live tree and the event being delivered.
pub type ListenerFn = Arc<dyn Fn(&Dom, &mut DomEvent) + Send + Sync>;

/// Wrap a closure as a [`ListenerFn`].
pub fn listener<F>(f: F) -> ListenerFn
where
    F: Fn(&Dom, &mut DomEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) struct Listener {
    pub(crate) node: NodeId,
    pub(crate) kind: String,
    pub(crate) capture: bool,
    pub(crate) callback: ListenerFn,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("node", &self.node)
            .field("kind", &self.kind)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// DomEvent
// ---------------------------------------------------------------------------

/// Keyboard/pointer modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Host-specific detail carried by an event. A finite set of shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    Mouse {
        client_x: f64,
        client_y: f64,
        button: i16,
        modifiers: Modifiers,
    },
    Keyboard {
        key: String,
        code: String,
        repeat: bool,
        modifiers: Modifiers,
    },
    Input {
        value: String,
    },
    Focus,
    Wheel {
        delta_x: f64,
        delta_y: f64,
        delta_z: f64,
    },
    Basic,
}

/// Propagation phase the event is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// An event travelling through the live tree.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub kind: String,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub phase: Phase,
    pub detail: EventDetail,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_stopped: bool,
}

impl DomEvent {
    pub fn new(kind: impl Into<String>, target: NodeId, detail: EventDetail) -> Self {
        Self {
            kind: kind.into(),
            target,
            current_target: None,
            phase: Phase::None,
            detail,
            default_prevented: false,
            propagation_stopped: false,
            immediate_stopped: false,
        }
    }

    /// A plain event with no detail.
    pub fn basic(kind: impl Into<String>, target: NodeId) -> Self {
        Self::new(kind, target, EventDetail::Basic)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

// ---------------------------------------------------------------------------
// Listener table and dispatch
// ---------------------------------------------------------------------------

impl Dom {
    /// Register a listener for `kind` events on `node`.
    ///
    /// Returns `None` if `node` does not exist.
    pub fn add_listener(
        &mut self,
        node: NodeId,
        kind: impl Into<String>,
        capture: bool,
        callback: ListenerFn,
    ) -> Option<ListenerId> {
        if !self.contains(node) {
            return None;
        }
        let id = self.listeners.insert(Listener {
            node,
            kind: kind.into(),
            capture,
            callback,
        });
        match self.node_listeners.get_mut(node) {
            Some(list) => list.push(id),
            None => {
                self.node_listeners.insert(node, vec![id]);
            }
        }
        Some(id)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(list) = self.node_listeners.get_mut(listener.node) {
            list.retain(|&l| l != id);
        }
        true
    }

    /// Number of listeners attached to `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.node_listeners.get(node).map_or(0, Vec::len)
    }

    /// Number of live listeners in the whole tree.
    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// The propagation path from `start` up to the root (inclusive).
    ///
    /// Returns `[start, parent, grandparent, ..., root]`, or an empty vec if
    /// `start` does not exist.
    pub fn bubble_path(&self, start: NodeId) -> Vec<NodeId> {
        if !self.contains(start) {
            return Vec::new();
        }
        let mut path = vec![start];
        path.extend(self.ancestors(start));
        path
    }

    /// Deliver `event` to the listeners along its propagation path.
    ///
    /// Returns `true` unless a listener prevented the default action.
    pub fn dispatch_event(&self, event: &mut DomEvent) -> bool {
        let path = self.bubble_path(event.target);
        let Some((&target, ancestors)) = path.split_first() else {
            return true;
        };

        for &node in ancestors.iter().rev() {
            if self.invoke(node, Phase::Capturing, event) {
                return !event.default_prevented;
            }
        }
        if self.invoke(target, Phase::AtTarget, event) {
            return !event.default_prevented;
        }
        for &node in ancestors {
            if self.invoke(node, Phase::Bubbling, event) {
                break;
            }
        }

        event.current_target = None;
        event.phase = Phase::None;
        !event.default_prevented
    }

    /// Run the listeners of `node` for one phase. Returns `true` when
    /// propagation was stopped.
    fn invoke(&self, node: NodeId, phase: Phase, event: &mut DomEvent) -> bool {
        let callbacks: Vec<ListenerFn> = self
            .node_listeners
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.listeners.get(id))
            .filter(|l| l.kind == event.kind)
            .filter(|l| match phase {
                Phase::Capturing => l.capture,
                Phase::Bubbling => !l.capture,
                Phase::AtTarget | Phase::None => true,
            })
            .map(|l| Arc::clone(&l.callback))
            .collect();

        event.current_target = Some(node);
        event.phase = phase;
        for callback in callbacks {
            callback(self, event);
            if event.immediate_stopped {
                break;
            }
        }
        event.propagation_stopped
    }
}
