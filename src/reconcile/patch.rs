//! Diff and patch: reconcile a virtual subtree onto a live container.
//!
//! The reconciler walks the virtual children in order, resolves each one with
//! [`resolve`](super::resolve::resolve) and applies the outcome to the live
//! tree. Matched framework-managed nodes are patched in place and recursed
//! into; `id` matches are replaced wholesale and everything else is appended.

use std::collections::HashSet;
use std::slice;

use tracing::{trace, warn};

use super::resolve::{identity_selector, is_anonymous, resolve, Resolution};
use super::{DuplicateIdentity, ReconcileReport};
use crate::config::EngineConfig;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::vdom::{VKind, VNode};

/// Reconciles virtual trees onto live containers.
#[derive(Debug, Clone)]
pub struct Reconciler {
    removed_marker: String,
    force_replace: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Reconciler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            removed_marker: config.removed_marker.clone(),
            force_replace: false,
        }
    }

    /// Replace every matched node wholesale instead of patching it.
    pub fn with_force_replace(mut self, force: bool) -> Self {
        self.force_replace = force;
        self
    }

    /// Reconcile `vnode` onto the children of `container`.
    ///
    /// A fragment contributes its children; any other node is treated as a
    /// one-element list.
    pub fn reconcile(&self, dom: &mut Dom, vnode: &VNode, container: NodeId) -> ReconcileReport {
        let mut pass = Pass {
            reconciler: self,
            dom,
            claimed: HashSet::new(),
            report: ReconcileReport::default(),
        };
        pass.children(top_level(vnode), container);
        pass.report
    }
}

fn top_level(vnode: &VNode) -> &[VNode] {
    match vnode.kind {
        VKind::Fragment => &vnode.children,
        _ => slice::from_ref(vnode),
    }
}

/// State of one reconcile call.
struct Pass<'a> {
    reconciler: &'a Reconciler,
    dom: &'a mut Dom,
    claimed: HashSet<NodeId>,
    report: ReconcileReport,
}

impl Pass<'_> {
    fn children(&mut self, vnodes: &[VNode], container: NodeId) {
        if self.dom.children(container).is_empty() {
            trace!(count = vnodes.len(), "bootstrap: append all");
            for vnode in vnodes {
                self.append(container, vnode);
            }
            return;
        }

        for (index, vnode) in vnodes.iter().enumerate() {
            let resolution = resolve(self.dom, container, vnode, index, &self.claimed);
            trace!(index, tag = vnode.tag(), ?resolution, "resolved");
            self.apply(container, vnode, resolution);
        }
    }

    fn apply(&mut self, container: NodeId, vnode: &VNode, resolution: Resolution) {
        match resolution {
            Resolution::Append => {
                if self.is_removed(vnode) {
                    trace!(tag = vnode.tag(), "tombstone without a live match");
                    return;
                }
                self.append(container, vnode);
            }
            Resolution::SetText(live) => {
                if let Some(text) = vnode.as_text() {
                    self.dom.set_text(live, text);
                }
                self.claimed.insert(live);
            }
            Resolution::InsertBefore(live) => {
                let index = self.dom.index_of(live).unwrap_or(0);
                for (offset, node) in self.dom.realize(vnode).into_iter().enumerate() {
                    self.dom.insert_at(container, index + offset, node);
                    self.claimed.insert(node);
                    self.report.appended += 1;
                }
            }
            Resolution::Reuse(live) => {
                self.claimed.insert(live);
                self.report.unchanged += 1;
            }
            Resolution::Replace(live) => {
                self.replace(live, vnode);
            }
            Resolution::Matched(targets) => self.matched(vnode, targets),
        }
    }

    fn matched(&mut self, vnode: &VNode, targets: Vec<NodeId>) {
        if targets.len() > 1 {
            let selector = identity_selector(vnode)
                .map(|s| s.to_string())
                .unwrap_or_default();
            warn!(%selector, count = targets.len(), "duplicate live identity");
            self.report.duplicates.push(DuplicateIdentity {
                selector,
                count: targets.len(),
            });
        }

        let mut placed: Option<NodeId> = None;
        for target in targets {
            if !self.dom.contains(target) {
                // Removed together with an earlier match's subtree.
                continue;
            }
            if self.is_removed(vnode) {
                self.dom.remove(target);
                self.report.removed += 1;
                continue;
            }
            let hash_equal = !self.reconciler.force_replace
                && vnode
                    .hash()
                    .is_some_and(|hash| self.hash_of(target).as_deref() == Some(hash));
            if hash_equal {
                self.claimed.insert(target);
                self.report.unchanged += 1;
                continue;
            }
            if self.reconciler.force_replace || self.dom.children(target).is_empty() {
                if let Some(new) = self.replace(target, vnode) {
                    // Only one realized copy may stay live.
                    if let Some(previous) = placed.replace(new) {
                        self.dom.remove(previous);
                    }
                }
                continue;
            }
            self.patch(target, vnode);
        }
    }

    /// Patch a matched node that has children.
    ///
    /// The node's hash changed, so its direct text and any anonymous child
    /// with no deep-equal counterpart in `vnode` are stale and dropped before
    /// the children are reconciled.
    fn patch(&mut self, target: NodeId, vnode: &VNode) {
        self.claimed.insert(target);
        self.report.patched += 1;
        self.dom.clear_text_children(target);
        self.drop_stale_anonymous(target, &vnode.children);
        if let Some(attrs) = vnode.attrs() {
            for (name, value) in attrs.iter() {
                self.dom.set_attr(target, name, value);
            }
        }
        if self.dom.children(target).is_empty() {
            for child in &vnode.children {
                self.append(target, child);
            }
        } else {
            self.children(&vnode.children, target);
        }
    }

    fn drop_stale_anonymous(&mut self, target: NodeId, vnodes: &[VNode]) {
        let stale: Vec<NodeId> = self
            .dom
            .children(target)
            .iter()
            .copied()
            .filter(|&live| {
                is_anonymous(self.dom, live)
                    && !vnodes.iter().any(|v| self.dom.equals_vnode(live, v))
            })
            .collect();
        for live in stale {
            self.dom.remove(live);
            self.report.removed += 1;
        }
    }

    fn append(&mut self, container: NodeId, vnode: &VNode) {
        for node in self.dom.realize(vnode) {
            self.dom.append(container, node);
            self.claimed.insert(node);
            self.report.appended += 1;
        }
    }

    /// Replace `live` with the realized form of `vnode`. Returns the node now
    /// in `live`'s slot.
    fn replace(&mut self, live: NodeId, vnode: &VNode) -> Option<NodeId> {
        let parent = self.dom.parent(live)?;
        let mut realized = self.dom.realize(vnode).into_iter();
        let first = realized.next()?;
        if !self.dom.replace(live, first) {
            self.dom.remove(first);
            return None;
        }
        self.claimed.insert(first);
        self.report.replaced += 1;
        let mut index = self.dom.index_of(first).unwrap_or(0);
        for extra in realized {
            index += 1;
            self.dom.insert_at(parent, index, extra);
            self.claimed.insert(extra);
        }
        Some(first)
    }

    fn is_removed(&self, vnode: &VNode) -> bool {
        vnode.is_removed(&self.reconciler.removed_marker)
    }

    fn hash_of(&self, node: NodeId) -> Option<String> {
        self.dom.get(node).and_then(|d| d.hash()).map(str::to_owned)
    }
}
