//! # gilt-dom
//!
//! Virtual-tree reconciliation, delegated event binding, and view
//! synchronization for declarative UI rendered into a live document.
//!
//! A platform bridge sends render commands; gilt-dom applies them to a
//! retained, slotmap-backed document, diffing by node identity (`uid`, content
//! `hash`, or `id`) so matched nodes are patched in place instead of rebuilt.
//! Event descriptors are realized as delegated listeners on container nodes,
//! and fired events are serialized into records for the bridge.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: Slotmap-backed document arena, selectors, event propagation
//! - **[`markup`]**: Logos tokenizer, markup parser and serializer
//! - **[`vdom`]**: Virtual nodes, event descriptors, inline style helpers
//! - **[`reconcile`]**: Identity resolution and the diff/patch engine
//! - **[`event`]**: Delegated listeners, per-app binding registry, event records
//! - **[`dispatch`]**: `RenderApp`/`RenderView` commands and the single-writer dispatcher
//! - **[`bus`]**: Typed synchronous publish/subscribe
//! - **[`view`]**: Views with a shown/hidden state machine, bind and sync
//! - **[`route`]**: Locations, path patterns, and the route watcher
//! - **[`config`]**: Reserved attribute names and engine defaults
//! - **[`testing`]**: Headless harness and snapshot outlines

// Foundation
pub mod config;
pub mod dom;
pub mod markup;
pub mod vdom;

// Core systems
pub mod reconcile;
pub mod event;
pub mod dispatch;

// Views and routing
pub mod bus;
pub mod route;
pub mod view;

// Testing
pub mod testing;

pub use config::EngineConfig;
pub use dispatch::{Command, Dispatcher};
pub use view::View;
