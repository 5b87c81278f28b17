//! Views: renderable units with a shown/hidden state machine.
//!
//! - [`View`]: shared handle; renders, shows, hides, binds, syncs and mounts.
//! - [`Render`]: anything that produces a [`VNode`](crate::vdom::VNode).
//! - [`Visibility`]: the shown/hidden decoration strategy.

pub mod handle;
pub mod visibility;

pub use handle::{Render, View, ViewBuilder};
pub use visibility::Visibility;
