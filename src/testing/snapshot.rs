//! Snapshot rendering helpers.
//!
//! Functions for turning live and virtual trees into indented outlines
//! suitable for `insta` snapshots and plain assertions.

use std::fmt::Write;

use crate::dom::node::{NodeData, NodeId};
use crate::dom::Dom;
use crate::vdom::{VKind, VNode};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Outline the live subtree rooted at `node`.
///
/// One line per node, two spaces of indent per level. Elements print their
/// tag followed by `name=value` attributes in order; text nodes print their
/// content quoted. Whitespace-only text is skipped.
///
/// # Examples
///
/// ```
/// use gilt_dom::dom::Document;
/// use gilt_dom::markup::parse_markup;
/// use gilt_dom::testing::tree_to_string;
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let vnode = parse_markup(r#"<p class="x">hi</p>"#).unwrap();
/// for node in doc.dom.realize(&vnode) {
///     doc.dom.append(body, node);
/// }
/// assert_eq!(tree_to_string(&doc.dom, body), "body\n  p class=x\n    \"hi\"");
/// ```
pub fn tree_to_string(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_live(dom, node, 0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

/// Outline a virtual tree the same way as [`tree_to_string`]. Fragments
/// print as `#fragment`.
pub fn vnode_tree_to_string(node: &VNode) -> String {
    let mut out = String::new();
    write_virtual(node, 0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_element<'a>(tag: &str, attrs: impl Iterator<Item = (&'a str, &'a str)>, out: &mut String) {
    out.push_str(tag);
    for (name, value) in attrs {
        let _ = write!(out, " {name}={value}");
    }
    out.push('\n');
}

fn write_text(text: &str, out: &mut String) {
    let _ = writeln!(out, "{:?}", text);
}

fn write_live(dom: &Dom, node: NodeId, depth: usize, out: &mut String) {
    let Some(data) = dom.get(node) else { return };
    match data {
        NodeData::Text(text) if text.trim().is_empty() => return,
        NodeData::Text(text) => {
            indent(depth, out);
            write_text(text, out);
        }
        NodeData::Element { .. } => {
            indent(depth, out);
            let attrs = data.attrs().into_iter().flat_map(|a| a.iter());
            write_element(data.tag(), attrs, out);
        }
    }
    for &child in dom.children(node) {
        write_live(dom, child, depth + 1, out);
    }
}

fn write_virtual(node: &VNode, depth: usize, out: &mut String) {
    if node.is_blank_text() {
        return;
    }
    indent(depth, out);
    match &node.kind {
        VKind::Text(text) => write_text(text, out),
        VKind::Fragment => out.push_str("#fragment\n"),
        VKind::Element { tag, attrs } => write_element(tag, attrs.iter(), out),
    }
    for child in &node.children {
        write_virtual(child, depth + 1, out);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;

    #[test]
    fn live_outline() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("body"));
        let vnode = parse_markup(r#"<div uid="a"><span>x</span> <b>y</b></div>"#).unwrap();
        for node in dom.realize(&vnode) {
            dom.append(root, node);
        }
        insta::assert_snapshot!(tree_to_string(&dom, root), @r#"
        body
          div uid=a
            span
              "x"
            b
              "y"
        "#);
    }

    #[test]
    fn virtual_outline() {
        let node = VNode::fragment([
            VNode::element("ul").with_child(VNode::element("li").with_attr("id", "1")),
            VNode::text("  "),
            VNode::text("end"),
        ]);
        insta::assert_snapshot!(vnode_tree_to_string(&node), @r#"
        #fragment
          ul
            li id=1
          "end"
        "#);
    }

    #[test]
    fn missing_node_is_empty() {
        let dom = Dom::new();
        let mut other = Dom::new();
        let stray = other.insert(NodeData::element("p"));
        assert_eq!(tree_to_string(&dom, stray), "");
    }
}
