//! Identity resolution: map one virtual child onto the live children of a
//! container.

use std::collections::HashSet;

use crate::dom::node::{NodeData, NodeId, ATTR_HASH};
use crate::dom::query::Selector;
use crate::dom::tree::Dom;
use crate::vdom::VNode;

/// How a virtual child relates to the live tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No counterpart; realize and append.
    Append,
    /// Non-blank text whose positional counterpart is a text node.
    SetText(NodeId),
    /// Non-blank text whose positional counterpart is an element; insert
    /// before it.
    InsertBefore(NodeId),
    /// Anonymous element with a deep-equal live sibling; keep it.
    Reuse(NodeId),
    /// Replace the live node wholesale.
    Replace(NodeId),
    /// Framework-managed element; each live match is patched.
    Matched(Vec<NodeId>),
}

/// The selector that identifies a framework-managed element: tag plus `uid`,
/// or tag plus `hash` when no `uid` is set. `None` for anything else.
pub fn identity_selector(vnode: &VNode) -> Option<Selector> {
    if !vnode.is_element() {
        return None;
    }
    match (vnode.uid(), vnode.hash()) {
        (Some(uid), _) => Some(Selector::tag_uid(vnode.tag(), uid)),
        (None, Some(hash)) => Some(Selector::tag(vnode.tag()).with_attr(ATTR_HASH, hash)),
        (None, None) => None,
    }
}

/// Resolve `vnode`, the child at `index` of the virtual list, against the
/// children of `container`.
///
/// `claimed` holds live nodes already used during this pass; they are never
/// handed out twice for anonymous matches.
pub fn resolve(
    dom: &Dom,
    container: NodeId,
    vnode: &VNode,
    index: usize,
    claimed: &HashSet<NodeId>,
) -> Resolution {
    if vnode.is_text() {
        return resolve_text(dom, container, vnode, index);
    }

    if let Some(selector) = identity_selector(vnode) {
        let found = dom.query_selector_all(container, &selector);
        return if found.is_empty() {
            Resolution::Append
        } else {
            Resolution::Matched(found)
        };
    }

    if let Some(id) = vnode.id() {
        return match dom.query_by_id(container, id) {
            Some(live) => Resolution::Replace(live),
            None => Resolution::Append,
        };
    }

    resolve_anonymous(dom, container, vnode, claimed)
}

fn resolve_text(dom: &Dom, container: NodeId, vnode: &VNode, index: usize) -> Resolution {
    if vnode.is_blank_text() {
        return Resolution::Append;
    }
    match dom.children(container).get(index) {
        Some(&live) if dom.get(live).is_some_and(NodeData::is_text) => Resolution::SetText(live),
        Some(&live) => Resolution::InsertBefore(live),
        None => Resolution::Append,
    }
}

/// Anonymous elements are only reused when a live sibling is deep-equal.
fn resolve_anonymous(
    dom: &Dom,
    container: NodeId,
    vnode: &VNode,
    claimed: &HashSet<NodeId>,
) -> Resolution {
    dom.children(container)
        .iter()
        .find(|&&live| !claimed.contains(&live) && dom.equals_vnode(live, vnode))
        .map_or(Resolution::Append, |&equal| Resolution::Reuse(equal))
}

/// Whether `live` is an element with no `id`, `uid` or `hash`.
pub(super) fn is_anonymous(dom: &Dom, live: NodeId) -> bool {
    dom.get(live).is_some_and(|data| {
        data.is_element() && data.id().is_none() && data.uid().is_none() && data.hash().is_none()
    })
}
