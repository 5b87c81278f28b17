//! Tree operations: realize, attach, replace, remove, move, walk.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::events::{Listener, ListenerId};
use super::journal::{Journal, Mutation};
use super::node::{NodeData, NodeId};
use crate::vdom::{VKind, VNode};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The live tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Listeners realized against a node live in a second arena and are dropped
/// together with the node.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
    pub(crate) listeners: SlotMap<ListenerId, Listener>,
    pub(crate) node_listeners: SecondaryMap<NodeId, Vec<ListenerId>>,
    journal: Journal,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
            listeners: SlotMap::with_key(),
            node_listeners: SecondaryMap::new(),
            journal: Journal::default(),
        }
    }

    // ── Construction ─────────────────────────────────────────────────

    /// Insert a root-level node (no parent).
    ///
    /// If no root has been set yet, this node becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.alloc(data);
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a new node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.alloc(data);
        self.append(parent, id);
        id
    }

    /// Build detached live nodes for `vnode`.
    ///
    /// A fragment yields one node per child; anything else yields exactly one.
    /// The returned nodes have no parent until passed to [`append`](Self::append),
    /// [`insert_at`](Self::insert_at) or [`replace`](Self::replace).
    pub fn realize(&mut self, vnode: &VNode) -> Vec<NodeId> {
        match &vnode.kind {
            VKind::Fragment => vnode
                .children
                .iter()
                .flat_map(|child| self.realize(child))
                .collect(),
            VKind::Text(text) => vec![self.alloc(NodeData::Text(text.clone()))],
            VKind::Element { tag, attrs } => {
                let id = self.alloc(NodeData::Element {
                    tag: tag.clone(),
                    attrs: attrs.clone(),
                });
                for child in &vnode.children {
                    for kid in self.realize(child) {
                        self.link(id, kid, None);
                    }
                }
                vec![id]
            }
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> usize {
        self.parent.insert(child, parent);
        let siblings = self
            .children
            .get_mut(parent)
            .expect("parent must have children vec");
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, child);
        index
    }

    fn unlink(&mut self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent.remove(node)?;
        let siblings = self.children.get_mut(parent)?;
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.remove(index);
        Some((parent, index))
    }

    // ── Attachment ───────────────────────────────────────────────────

    /// Attach a detached node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, node: NodeId) {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        debug_assert!(self.parent(node).is_none(), "node is already attached");
        self.link(parent, node, None);
        self.journal.push(Mutation::Append { parent, node });
    }

    /// Attach a detached node as child number `index` of `parent` (clamped).
    pub fn insert_at(&mut self, parent: NodeId, index: usize, node: NodeId) {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        debug_assert!(self.parent(node).is_none(), "node is already attached");
        let index = self.link(parent, node, Some(index));
        self.journal.push(Mutation::Insert { parent, node, index });
    }

    /// Put the detached node `new` into the slot of `old`, then remove `old`
    /// and its subtree.
    ///
    /// Returns `false` (and changes nothing) if `old` has no parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some((parent, index)) = self.unlink(old) else {
            return false;
        };
        self.link(parent, new, Some(index));
        self.drop_subtree(old);
        self.journal.push(Mutation::Replace { parent, old, new });
        true
    }

    /// Move an attached node to child number `index` of `parent` (clamped).
    pub fn move_to(&mut self, node: NodeId, parent: NodeId, index: usize) {
        debug_assert!(self.nodes.contains_key(node), "node does not exist");
        self.unlink(node);
        let index = self.link(parent, node, Some(index));
        self.journal.push(Mutation::Move { parent, node, index });
    }

    /// Remove a node and all its descendants recursively.
    ///
    /// Listeners realized against any removed node are dropped as well.
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        if let Some((parent, _)) = self.unlink(id) {
            self.journal.push(Mutation::Remove { parent, node: id });
        }
        self.drop_subtree(id)
    }

    fn drop_subtree(&mut self, id: NodeId) -> Option<NodeData> {
        if self.root == Some(id) {
            self.root = None;
        }

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            if let Some(handles) = self.node_listeners.remove(current) {
                for handle in handles {
                    self.listeners.remove(handle);
                }
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Remove every direct text child of `node`. Returns how many were removed.
    pub fn clear_text_children(&mut self, node: NodeId) -> usize {
        let texts: Vec<NodeId> = self
            .children(node)
            .iter()
            .copied()
            .filter(|&c| self.nodes.get(c).is_some_and(NodeData::is_text))
            .collect();
        for &text in &texts {
            self.remove(text);
        }
        texts.len()
    }

    // ── Content ──────────────────────────────────────────────────────

    /// Set an attribute on an element. Returns `true` if the value changed.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(NodeData::Element { attrs, .. }) = self.nodes.get_mut(node) else {
            return false;
        };
        if attrs.get(name) == Some(value) {
            return false;
        }
        attrs.set(name, value);
        self.journal.push(Mutation::SetAttribute {
            node,
            name: name.to_ascii_lowercase(),
        });
        true
    }

    /// Replace the content of a text node. Returns `true` if it changed.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> bool {
        let Some(NodeData::Text(content)) = self.nodes.get_mut(node) else {
            return false;
        };
        if content == text {
            return false;
        }
        text.clone_into(content);
        self.journal.push(Mutation::SetText { node });
        true
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        self.walk_depth_first(node)
            .into_iter()
            .filter_map(|id| self.nodes.get(id).and_then(NodeData::as_text))
            .collect()
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Whether `id` has at least one non-text child.
    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|&c| self.nodes.get(c).is_some_and(NodeData::is_element))
    }

    /// Position of `id` among its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Every node below `id` in pre-order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut all = self.walk_depth_first(id);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    // ── Access ───────────────────────────────────────────────────────

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Explicitly set the root node.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    // ── Journal ──────────────────────────────────────────────────────

    /// Turn mutation recording on or off. Turning it off discards pending entries.
    pub fn record_mutations(&mut self, on: bool) {
        self.journal.set_recording(on);
    }

    pub fn is_recording_mutations(&self) -> bool {
        self.journal.is_recording()
    }

    /// Drain the mutations recorded since the last call.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        self.journal.take()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
