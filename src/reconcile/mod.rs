//! Reconciliation: identity resolution plus diff and patch.
//!
//! [`reconcile`] mutates a live container in place until it reflects a
//! virtual subtree. Nodes carrying `uid` or `hash` are patched incrementally;
//! nodes without identity attributes are reused when structurally equal and
//! otherwise appended. A matched pair whose `hash` values agree is skipped
//! along with its whole subtree.

pub mod patch;
pub mod resolve;

pub use patch::Reconciler;
pub use resolve::Resolution;

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::vdom::VNode;

/// Several live nodes matched one identity selector.
///
/// Not fatal: each match is still reconciled and only one realized copy is
/// left in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{count} live nodes match `{selector}`")]
pub struct DuplicateIdentity {
    pub selector: String,
    pub count: usize,
}

/// Summary of one reconcile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Nodes realized and attached (append or positional insert).
    pub appended: usize,
    /// Live nodes replaced wholesale.
    pub replaced: usize,
    /// Matched nodes patched in place.
    pub patched: usize,
    /// Live nodes deleted by a tombstone.
    pub removed: usize,
    /// Matches left untouched (equal hash or deep-equal anonymous node).
    pub unchanged: usize,
    pub duplicates: Vec<DuplicateIdentity>,
}

/// Reconcile `vnode` onto `container` with the default configuration.
pub fn reconcile(
    dom: &mut Dom,
    vnode: &VNode,
    container: NodeId,
    force_replace: bool,
) -> ReconcileReport {
    Reconciler::default()
        .with_force_replace(force_replace)
        .reconcile(dom, vnode, container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::journal::Mutation;
    use crate::dom::node::NodeData;
    use crate::markup::{parse_markup, vnode_to_html};
    use crate::EngineConfig;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn body_with(markup: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let body = dom.insert(NodeData::element("body"));
        if !markup.is_empty() {
            reconcile(&mut dom, &parse_markup(markup).unwrap(), body, false);
        }
        dom.record_mutations(true);
        (dom, body)
    }

    fn apply(dom: &mut Dom, body: NodeId, markup: &str) -> ReconcileReport {
        reconcile(dom, &parse_markup(markup).unwrap(), body, false)
    }

    // ── Bootstrap ────────────────────────────────────────────────────

    #[test]
    fn empty_container_appends_everything() {
        let (mut dom, body) = body_with("");
        let report = apply(&mut dom, body, r#"<div uid="1"><span uid="2">hi</span></div>"#);

        assert_eq!(dom.inner_html(body), r#"<div uid="1"><span uid="2">hi</span></div>"#);
        assert_eq!(report.appended, 1);
        assert_eq!(report.replaced, 0);
        let mutations = dom.take_mutations();
        assert!(mutations.iter().all(|m| matches!(m, Mutation::Append { .. })));
        assert_eq!(mutations.len(), 1);
    }

    // ── Hash short-circuit ───────────────────────────────────────────

    #[test]
    fn equal_hash_skips_subtree() {
        let (mut dom, body) = body_with(r#"<div uid="1" hash="A">x</div>"#);
        let report = apply(&mut dom, body, r#"<div uid="1" hash="A">y</div>"#);

        assert_eq!(dom.text_content(body), "x");
        assert_eq!(report.unchanged, 1);
        assert!(dom.take_mutations().is_empty());
    }

    #[test]
    fn unchanged_hashed_tree_is_idempotent() {
        let markup = concat!(
            r#"<header uid="h" hash="1"><h1>Title</h1></header>"#,
            r#"<main uid="m" hash="2"><p uid="p" hash="3">body</p></main>"#,
            r#"<footer hash="4"><small>f</small></footer>"#,
        );
        let (mut dom, body) = body_with(markup);
        let before = dom.inner_html(body);
        let total = dom.len();

        for _ in 0..3 {
            let report = apply(&mut dom, body, markup);
            assert_eq!(report.unchanged, 3);
        }

        assert!(dom.take_mutations().is_empty());
        assert_eq!(dom.inner_html(body), before);
        assert_eq!(dom.len(), total);
    }

    #[test]
    fn hash_only_nodes_are_not_appended_twice() {
        let (mut dom, body) = body_with(r#"<section hash="a">one</section>"#);
        apply(&mut dom, body, r#"<section hash="a">one</section>"#);
        apply(&mut dom, body, r#"<section hash="a">one</section>"#);
        assert_eq!(dom.children(body).len(), 1);
    }

    // ── In-place patch ───────────────────────────────────────────────

    #[test]
    fn changed_hash_patches_in_place() {
        let (mut dom, body) = body_with(r#"<div uid="1" hash="A"><span>old</span></div>"#);
        let div = dom.children(body)[0];

        let report = apply(&mut dom, body, r#"<div uid="1" hash="B"><span>new</span></div>"#);

        assert_eq!(dom.children(body), &[div], "matched node keeps its identity");
        assert_eq!(dom.get(div).unwrap().hash(), Some("B"));
        assert_eq!(dom.text_content(div), "new");
        assert_eq!(dom.children(div).len(), 1);
        assert_eq!(report.patched, 1);
    }

    #[test]
    fn text_only_children_are_rebuilt() {
        let (mut dom, body) = body_with(r#"<p uid="1" hash="A">old</p>"#);
        let p = dom.children(body)[0];
        apply(&mut dom, body, r#"<p uid="1" hash="B">new <b>bold</b></p>"#);
        assert_eq!(dom.inner_html(p), "new <b>bold</b>");
    }

    #[test]
    fn stale_attributes_survive_patch() {
        let (mut dom, body) = body_with(r#"<div uid="1" hash="A" class="x"><i></i></div>"#);
        apply(&mut dom, body, r#"<div uid="1" hash="B" title="t"><i></i></div>"#);
        let div = dom.children(body)[0];
        let data = dom.get(div).unwrap();
        assert_eq!(data.attr("class"), Some("x"));
        assert_eq!(data.attr("title"), Some("t"));
    }

    #[test]
    fn childless_match_is_replaced() {
        let (mut dom, body) = body_with(r#"<div uid="1"></div>"#);
        let old = dom.children(body)[0];
        let report = apply(&mut dom, body, r#"<div uid="1"><b>x</b></div>"#);
        assert!(!dom.contains(old));
        assert_eq!(report.replaced, 1);
        assert_eq!(dom.inner_html(body), r#"<div uid="1"><b>x</b></div>"#);
    }

    #[test]
    fn force_replace_swaps_matches() {
        let (mut dom, body) = body_with(r#"<div uid="1" hash="A"><b>x</b></div>"#);
        let old = dom.children(body)[0];
        let report = reconcile(
            &mut dom,
            &parse_markup(r#"<div uid="1" hash="A"><b>y</b></div>"#).unwrap(),
            body,
            true,
        );
        assert!(!dom.contains(old));
        assert_eq!(report.replaced, 1);
        assert_eq!(dom.text_content(body), "y");
    }

    #[test]
    fn nested_uid_nodes_patch_recursively() {
        let (mut dom, body) = body_with(
            r#"<ul uid="list" hash="1"><li uid="a" hash="a1">A</li><li uid="b" hash="b1">B</li></ul>"#,
        );
        let ul = dom.children(body)[0];
        let a = dom.children(ul)[0];
        let report = apply(
            &mut dom,
            body,
            r#"<ul uid="list" hash="2"><li uid="a" hash="a1">A</li><li uid="b" hash="b2">B!</li><li uid="c">C</li></ul>"#,
        );
        assert_eq!(dom.children(ul)[0], a);
        assert_eq!(dom.text_content(ul), "AB!C");
        assert_eq!(report.patched, 2);
        assert_eq!(report.unchanged, 1);
    }

    // ── Identity paths ───────────────────────────────────────────────

    #[test]
    fn id_nodes_replace_wholesale() {
        let (mut dom, body) = body_with(r#"<nav id="menu"><a>one</a></nav>"#);
        let old = dom.children(body)[0];
        apply(&mut dom, body, r#"<nav id="menu"><a>two</a></nav>"#);
        assert!(!dom.contains(old));
        assert_eq!(dom.text_content(body), "two");
        assert_eq!(dom.children(body).len(), 1);
    }

    #[test]
    fn anonymous_equal_nodes_are_kept() {
        let (mut dom, body) = body_with("<p>a</p><p>b</p>");
        let report = apply(&mut dom, body, "<p>a</p><p>b</p>");
        assert_eq!(report.unchanged, 2);
        assert!(dom.take_mutations().is_empty());
    }

    #[test]
    fn anonymous_changed_content_appends() {
        let (mut dom, body) = body_with("<p>a</p>");
        let old = dom.children(body)[0];
        let report = apply(&mut dom, body, "<p>b</p>");

        assert_eq!(dom.children(body).len(), 2);
        assert_eq!(dom.children(body)[0], old);
        assert_eq!(dom.inner_html(body), "<p>a</p><p>b</p>");
        assert_eq!(report.replaced, 0);
        assert_eq!(report.appended, 1);
    }

    #[test]
    fn patch_drops_stale_anonymous_children() {
        let (mut dom, body) =
            body_with(r#"<ul uid="l" hash="1"><li>keep</li><li>drop</li><li uid="x">x</li></ul>"#);
        let ul = dom.children(body)[0];
        let keep = dom.children(ul)[0];

        let report = apply(&mut dom, body, r#"<ul uid="l" hash="2"><li>keep</li><li uid="x">x</li></ul>"#);

        assert_eq!(dom.children(ul)[0], keep);
        assert_eq!(dom.text_content(ul), "keepx");
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn text_updates_positionally() {
        let (mut dom, body) = body_with("hello<p>x</p>");
        apply(&mut dom, body, "goodbye<p>x</p>");
        assert_eq!(dom.inner_html(body), "goodbye<p>x</p>");
        assert_eq!(dom.take_mutations(), vec![Mutation::SetText { node: dom.children(body)[0] }]);
    }

    #[test]
    fn blank_text_is_always_appended() {
        let (mut dom, body) = body_with("<p>x</p>");
        apply(&mut dom, body, "<p>x</p>\n");
        assert_eq!(dom.children(body).len(), 2);
        apply(&mut dom, body, "<p>x</p>\n");
        assert_eq!(dom.children(body).len(), 3);
    }

    // ── Tombstones and duplicates ────────────────────────────────────

    #[test]
    fn tombstone_removes_match() {
        let (mut dom, body) = body_with(r#"<div uid="1">x</div><div uid="2">y</div>"#);
        let report = apply(&mut dom, body, r#"<div uid="1" noderemoved></div>"#);
        assert_eq!(report.removed, 1);
        assert_eq!(dom.inner_html(body), r#"<div uid="2">y</div>"#);

        // Nothing left to remove: the tombstone is not appended.
        apply(&mut dom, body, r#"<div uid="1" noderemoved></div>"#);
        assert_eq!(dom.children(body).len(), 1);
    }

    #[test]
    fn custom_tombstone_marker() {
        let (mut dom, body) = body_with(r#"<div uid="1">x</div>"#);
        let config = EngineConfig::default().with_removed_marker("data-gone");
        Reconciler::new(&config).reconcile(
            &mut dom,
            &parse_markup(r#"<div uid="1" data-gone="1"></div>"#).unwrap(),
            body,
        );
        assert!(dom.children(body).is_empty());
    }

    #[test]
    #[traced_test]
    fn duplicate_uid_is_reported_and_collapsed() {
        let mut dom = Dom::new();
        let body = dom.insert(NodeData::element("body"));
        for _ in 0..2 {
            let node = dom.realize(&VNode::element("div").with_attr("uid", "dup"))[0];
            dom.append(body, node);
        }

        let report = apply(&mut dom, body, r#"<div uid="dup"><b>one</b></div>"#);

        assert_eq!(
            report.duplicates,
            vec![DuplicateIdentity {
                selector: "div[uid=dup]".into(),
                count: 2,
            }]
        );
        assert_eq!(dom.query_by_attr(body, "uid", "dup").len(), 1);
        assert!(logs_contain("duplicate live identity"));
    }

    #[test]
    fn patched_tree_snapshot() {
        let (mut dom, body) = body_with(r#"<div uid="1" hash="A"><span>old</span></div>"#);
        let next = parse_markup(r#"<div uid="1" hash="B"><span>new</span></div>"#).unwrap();
        apply(&mut dom, body, &vnode_to_html(&next));
        insta::assert_snapshot!(dom.inner_html(body), @r#"<div uid="1" hash="B"><span>new</span></div>"#);
    }
}
