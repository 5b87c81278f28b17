//! Virtual tree: immutable node descriptions and event descriptors.

pub mod binding;
pub mod node;
pub mod style;

pub use binding::EventBinding;
pub use node::{VKind, VNode};
