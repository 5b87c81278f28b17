//! EventBinding: a declarative listener descriptor.
//!
//! A binding owns no live resource. The event binding manager realizes it as a
//! delegated listener on a container node (see [`crate::event::binding`]).

use serde::{Deserialize, Serialize};

use crate::dom::query::Selector;

/// Descriptor pairing a selector and an event kind with behavior flags.
///
/// Serialized with the field names used by the command wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    /// Host event kind, e.g. `"click"`.
    #[serde(rename = "Event")]
    pub event: String,
    /// Which nodes under the bound container this binding reacts to.
    #[serde(rename = "EventSelector")]
    pub selector: Selector,
    #[serde(rename = "UseCapture", default)]
    pub use_capture: bool,
    #[serde(rename = "PreventDefault", default)]
    pub prevent_default: bool,
    #[serde(rename = "StopPropagation", default)]
    pub stop_propagation: bool,
    #[serde(rename = "StopImmediatePropagation", default)]
    pub stop_immediate_propagation: bool,
}

impl EventBinding {
    /// A bubbling binding with no behavior flags.
    pub fn new(event: impl Into<String>, selector: Selector) -> Self {
        Self {
            event: event.into(),
            selector,
            use_capture: false,
            prevent_default: false,
            stop_propagation: false,
            stop_immediate_propagation: false,
        }
    }

    /// Listen during the capture phase (builder).
    pub fn capture(mut self) -> Self {
        self.use_capture = true;
        self
    }

    /// Prevent the host default action (builder).
    pub fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    /// Stop propagation after the current node (builder).
    pub fn stop_propagation(mut self) -> Self {
        self.stop_propagation = true;
        self
    }

    /// Stop propagation immediately (builder).
    pub fn stop_immediate_propagation(mut self) -> Self {
        self.stop_immediate_propagation = true;
        self
    }
}
