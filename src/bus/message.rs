//! Message trait and built-in notifications.
//!
//! The [`Message`] trait is object-safe and supports downcasting via `Any`.
//! Built-in messages: [`ViewUpdate`], [`ViewState`], [`LocationChanged`],
//! [`PathMatched`].

use std::any::Any;
use std::collections::HashMap;

use crate::route::Location;

// ---------------------------------------------------------------------------
// Message trait
// ---------------------------------------------------------------------------

/// Object-safe message trait.
///
/// All messages must implement `as_any` for downcasting and `message_name`
/// for debug/logging purposes.
pub trait Message: Send + 'static {
    /// Upcast to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Human-readable name for this message type.
    fn message_name(&self) -> &str;
}

impl dyn Message {
    /// Attempt to downcast to a concrete message type.
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

// ---------------------------------------------------------------------------
// Built-in messages
// ---------------------------------------------------------------------------

/// A view (by uuid or uid) wants to be rendered again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewUpdate {
    pub id: String,
}

impl Message for ViewUpdate {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn message_name(&self) -> &str {
        "ViewUpdate"
    }
}

/// A view became shown (`on == true`) or hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub id: String,
    pub on: bool,
}

impl Message for ViewState {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn message_name(&self) -> &str {
        "ViewState"
    }
}

/// The application navigated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChanged(pub Location);

impl Message for LocationChanged {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn message_name(&self) -> &str {
        "LocationChanged"
    }
}

/// A watched pattern of view `id` matched the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatched {
    pub id: String,
    pub params: HashMap<String, String>,
    /// The part of the target the pattern did not consume.
    pub remainder: String,
    pub location: Location,
}

impl Message for PathMatched {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn message_name(&self) -> &str {
        "PathMatched"
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names() {
        assert_eq!(ViewUpdate { id: "a".into() }.message_name(), "ViewUpdate");
        assert_eq!(
            ViewState {
                id: "a".into(),
                on: true
            }
            .message_name(),
            "ViewState"
        );
        assert_eq!(
            LocationChanged(Location::parse("/")).message_name(),
            "LocationChanged"
        );
    }

    #[test]
    fn downcast_ref_success() {
        let boxed: Box<dyn Message> = Box::new(ViewUpdate { id: "v".into() });
        let update = boxed.downcast_ref::<ViewUpdate>();
        assert_eq!(update.map(|u| u.id.as_str()), Some("v"));
    }

    #[test]
    fn downcast_ref_wrong_type() {
        let boxed: Box<dyn Message> = Box::new(ViewUpdate { id: "v".into() });
        assert!(boxed.downcast_ref::<ViewState>().is_none());
    }
}
