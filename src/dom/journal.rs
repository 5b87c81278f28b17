//! Mutation journal: an opt-in record of every change made to a [`Dom`](super::Dom).
//!
//! Recording is off by default. Tests and diagnostics turn it on with
//! [`Dom::record_mutations`](super::Dom::record_mutations) and drain it with
//! [`Dom::take_mutations`](super::Dom::take_mutations).

use super::node::NodeId;

/// One recorded change to the live tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// `node` (and its subtree) was attached as the last child of `parent`.
    Append { parent: NodeId, node: NodeId },
    /// `node` was attached as child number `index` of `parent`.
    Insert { parent: NodeId, node: NodeId, index: usize },
    /// `new` took the slot of `old`, which was removed with its subtree.
    Replace { parent: NodeId, old: NodeId, new: NodeId },
    /// `node` was removed with its subtree.
    Remove { parent: NodeId, node: NodeId },
    /// `node` was moved to child number `index` of `parent`.
    Move { parent: NodeId, node: NodeId, index: usize },
    /// An attribute value changed.
    SetAttribute { node: NodeId, name: String },
    /// A text node's content changed.
    SetText { node: NodeId },
}

impl Mutation {
    /// Whether this mutation changed the shape of the tree.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Mutation::SetAttribute { .. } | Mutation::SetText { .. })
    }
}

#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: Option<Vec<Mutation>>,
}

impl Journal {
    pub(crate) fn set_recording(&mut self, on: bool) {
        match (on, self.entries.is_some()) {
            (true, false) => self.entries = Some(Vec::new()),
            (false, true) => self.entries = None,
            _ => {}
        }
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.entries.is_some()
    }

    pub(crate) fn push(&mut self, mutation: Mutation) {
        if let Some(entries) = &mut self.entries {
            entries.push(mutation);
        }
    }

    pub(crate) fn take(&mut self) -> Vec<Mutation> {
        self.entries.as_mut().map(std::mem::take).unwrap_or_default()
    }
}
