//! Headless testing helpers: Harness, snapshot outlines.
//!
//! Use the [`Harness`] to drive a [`Dispatcher`](crate::dispatch::Dispatcher)
//! without a host page and collect the event records it emits. Use
//! [`tree_to_string`] and [`vnode_tree_to_string`] to capture trees as plain
//! text for snapshot-style assertions.

pub mod harness;
pub mod snapshot;

pub use harness::Harness;
pub use snapshot::{tree_to_string, vnode_tree_to_string};
