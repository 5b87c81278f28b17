//! Markup writer: serialize virtual and live trees back to HTML.

use super::parser::VOID_ELEMENTS;
use crate::dom::node::{Attributes, NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::vdom::{VKind, VNode};

/// Escape text content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn write_open(out: &mut String, tag: &str, attrs: &Attributes) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
}

fn write_close(out: &mut String, tag: &str) {
    if !VOID_ELEMENTS.contains(&tag) {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

/// Serialize a virtual node. Fragments serialize as their children.
pub fn vnode_to_html(node: &VNode) -> String {
    let mut out = String::new();
    write_vnode(&mut out, node);
    out
}

fn write_vnode(out: &mut String, node: &VNode) {
    match &node.kind {
        VKind::Text(text) => out.push_str(&escape_text(text)),
        VKind::Fragment => node.children.iter().for_each(|c| write_vnode(out, c)),
        VKind::Element { tag, attrs } => {
            write_open(out, tag, attrs);
            node.children.iter().for_each(|c| write_vnode(out, c));
            write_close(out, tag);
        }
    }
}

impl Dom {
    /// Serialize `node` and its subtree (`outerHTML`).
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    /// Serialize the children of `node` (`innerHTML`).
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_node(&mut out, child);
        }
        out
    }

    fn write_node(&self, out: &mut String, node: NodeId) {
        match self.get(node) {
            Some(NodeData::Text(text)) => out.push_str(&escape_text(text)),
            Some(NodeData::Element { tag, attrs }) => {
                write_open(out, tag, attrs);
                for &child in self.children(node) {
                    self.write_node(out, child);
                }
                write_close(out, tag);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;

    #[test]
    fn escapes_text_and_attrs() {
        let node = VNode::element("a")
            .with_attr("title", "say \"hi\" & <go>")
            .with_child(VNode::text("1 < 2"));
        insta::assert_snapshot!(
            vnode_to_html(&node),
            @r#"<a title="say &quot;hi&quot; &amp; &lt;go&gt;">1 &lt; 2</a>"#
        );
    }

    #[test]
    fn void_elements_have_no_close() {
        let node = VNode::element("p").with_child(VNode::element("br"));
        assert_eq!(vnode_to_html(&node), "<p><br></p>");
    }

    #[test]
    fn parse_write_is_stable() {
        let src = r#"<div uid="1" hash="a"><span>hi &amp; bye</span><input disabled=""></div>"#;
        let frag = parse_markup(src).unwrap();
        assert_eq!(vnode_to_html(&frag), src);
    }

    #[test]
    fn live_outer_and_inner_html() {
        let mut dom = Dom::new();
        let body = dom.insert(NodeData::element("body"));
        let frag = parse_markup(r#"<ul id="l"><li>a</li><li>b</li></ul>"#).unwrap();
        for node in dom.realize(&frag) {
            dom.append(body, node);
        }
        assert_eq!(
            dom.inner_html(body),
            r#"<ul id="l"><li>a</li><li>b</li></ul>"#
        );
        assert_eq!(
            dom.outer_html(body),
            r#"<body><ul id="l"><li>a</li><li>b</li></ul></body>"#
        );
    }
}
