//! Normalized event records delivered to the application-facing sink.
//!
//! Host events are mapped onto a fixed set of payload shapes
//! ([`EventPayload`]) instead of being cloned field by field.

use serde::Serialize;

use crate::dom::events::{DomEvent, EventDetail, Modifiers};
use crate::dom::tree::Dom;
use crate::vdom::EventBinding;

/// One fired binding, ready to cross the host boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Host event kind, e.g. `"click"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub meta: EventMeta,
    #[serde(rename = "data")]
    pub payload: EventPayload,
}

/// The binding that fired and the node it fired for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMeta {
    #[serde(flatten)]
    pub binding: EventBinding,
    #[serde(rename = "Target")]
    pub target: TargetInfo,
}

/// Identity of the event target at the time it fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetInfo {
    #[serde(rename = "TagName")]
    pub tag: String,
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "UID", skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "OuterHTML")]
    pub markup: String,
}

/// Structural payload, one variant per supported host event family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum EventPayload {
    Mouse {
        client_x: f64,
        client_y: f64,
        button: i16,
        alt_key: bool,
        ctrl_key: bool,
        shift_key: bool,
        meta_key: bool,
    },
    Keyboard {
        key: String,
        code: String,
        repeat: bool,
        alt_key: bool,
        ctrl_key: bool,
        shift_key: bool,
        meta_key: bool,
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

impl From<&EventDetail> for EventPayload {
    fn from(detail: &EventDetail) -> Self {
        match detail {
            EventDetail::Mouse {
                client_x,
                client_y,
                button,
                modifiers,
            } => {
                let Modifiers {
                    alt,
                    ctrl,
                    shift,
                    meta,
                } = *modifiers;
                EventPayload::Mouse {
                    client_x: *client_x,
                    client_y: *client_y,
                    button: *button,
                    alt_key: alt,
                    ctrl_key: ctrl,
                    shift_key: shift,
                    meta_key: meta,
                }
            }
            EventDetail::Keyboard {
                key,
                code,
                repeat,
                modifiers,
            } => EventPayload::Keyboard {
                key: key.clone(),
                code: code.clone(),
                repeat: *repeat,
                alt_key: modifiers.alt,
                ctrl_key: modifiers.ctrl,
                shift_key: modifiers.shift,
                meta_key: modifiers.meta,
            },
            EventDetail::Input { value } => EventPayload::Input {
                value: value.clone(),
            },
            EventDetail::Focus => EventPayload::Focus,
            EventDetail::Wheel {
                delta_x,
                delta_y,
                delta_z,
            } => EventPayload::Wheel {
                delta_x: *delta_x,
                delta_y: *delta_y,
                delta_z: *delta_z,
            },
            EventDetail::Basic => EventPayload::Basic,
        }
    }
}

impl EventRecord {
    /// Build the record for `binding` firing on `event`.
    pub fn capture(dom: &Dom, event: &DomEvent, binding: &EventBinding) -> Self {
        let target = dom
            .get(event.target)
            .map(|data| TargetInfo {
                tag: data.tag().to_owned(),
                id: data.id().map(str::to_owned),
                uid: data.uid().map(str::to_owned),
                markup: dom.outer_html(event.target),
            })
            .unwrap_or_default();
        Self {
            kind: event.kind.clone(),
            meta: EventMeta {
                binding: binding.clone(),
                target,
            },
            payload: EventPayload::from(&event.detail),
        }
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
