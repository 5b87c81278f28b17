//! Live document arena: slotmap-backed tree, queries, listeners, journal.

pub mod document;
pub mod events;
pub mod journal;
pub mod node;
pub mod query;
pub mod tree;

pub use document::Document;
pub use events::{listener, DomEvent, EventDetail, ListenerFn, ListenerId, Modifiers, Phase};
pub use journal::Mutation;
pub use node::{Attributes, NodeData, NodeId};
pub use query::{Selector, SelectorError};
pub use tree::Dom;
