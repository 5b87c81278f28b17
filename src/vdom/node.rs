//! VNode: the immutable description of a node to render.

use crate::dom::node::{Attributes, ATTR_HASH, ATTR_ID, ATTR_UID};

use super::binding::EventBinding;

/// What kind of node a [`VNode`] describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VKind {
    /// A parentless list of nodes; only its children are rendered.
    Fragment,
    /// An element with a lower-cased tag name.
    Element { tag: String, attrs: Attributes },
    /// A text node.
    Text(String),
}

/// A virtual node with its children and the event descriptors it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VNode {
    pub kind: VKind,
    pub children: Vec<VNode>,
    pub events: Vec<EventBinding>,
}

impl VNode {
    /// A fragment holding `children`.
    pub fn fragment(children: impl IntoIterator<Item = VNode>) -> Self {
        Self {
            kind: VKind::Fragment,
            children: children.into_iter().collect(),
            events: Vec::new(),
        }
    }

    /// An element with no attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: VKind::Element {
                tag: tag.into().to_ascii_lowercase(),
                attrs: Attributes::new(),
            },
            children: Vec::new(),
            events: Vec::new(),
        }
    }

    /// A text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: VKind::Text(content.into()),
            children: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Set an attribute (builder). No-op unless this is an element.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a child (builder).
    pub fn with_child(mut self, child: VNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append children (builder).
    pub fn with_children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Declare an event binding on this node (builder).
    pub fn with_event(mut self, binding: EventBinding) -> Self {
        self.events.push(binding);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if let VKind::Element { attrs, .. } = &mut self.kind {
            attrs.set(name, value);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs().and_then(|a| a.get(name))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn attrs(&self) -> Option<&Attributes> {
        match &self.kind {
            VKind::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Tag name; empty for text nodes and fragments.
    pub fn tag(&self) -> &str {
        match &self.kind {
            VKind::Element { tag, .. } => tag,
            _ => "",
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, VKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, VKind::Text(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.kind, VKind::Fragment)
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            VKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// A text node that is empty or whitespace-only.
    pub fn is_blank_text(&self) -> bool {
        self.as_text().is_some_and(|t| t.trim().is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr(ATTR_ID)
    }

    pub fn uid(&self) -> Option<&str> {
        self.attr(ATTR_UID)
    }

    pub fn hash(&self) -> Option<&str> {
        self.attr(ATTR_HASH)
    }

    /// Whether this node is a tombstone under the given marker attribute.
    pub fn is_removed(&self, marker: &str) -> bool {
        self.is_element() && self.has_attr(marker)
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        if let VKind::Text(t) = &self.kind {
            out.push_str(t);
        }
        for child in &self.children {
            child.push_text(out);
        }
    }

    /// All event bindings declared on this node and its descendants, pre-order.
    pub fn collect_events(&self) -> Vec<EventBinding> {
        let mut out = Vec::new();
        self.push_events(&mut out);
        out
    }

    fn push_events(&self, out: &mut Vec<EventBinding>) {
        out.extend(self.events.iter().cloned());
        for child in &self.children {
            child.push_events(out);
        }
    }

    /// The first element in this subtree, including `self`.
    pub fn first_element_mut(&mut self) -> Option<&mut VNode> {
        if self.is_element() {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.first_element_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::query::Selector;

    #[test]
    fn element_builder() {
        let node = VNode::element("DIV")
            .with_attr("uid", "1")
            .with_child(VNode::text("hi"));
        assert_eq!(node.tag(), "div");
        assert_eq!(node.uid(), Some("1"));
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.text_content(), "hi");
    }

    #[test]
    fn tombstone_marker() {
        let node = VNode::element("li").with_attr("noderemoved", "");
        assert!(node.is_removed("noderemoved"));
        assert!(!node.is_removed("gone"));
        assert!(!VNode::text("noderemoved").is_removed("noderemoved"));
    }

    #[test]
    fn attrs_on_text_are_ignored() {
        let node = VNode::text("x").with_attr("id", "a");
        assert!(node.attr("id").is_none());
        assert!(node.attrs().is_none());
    }

    #[test]
    fn blank_text_detection() {
        assert!(VNode::text("").is_blank_text());
        assert!(VNode::text(" \n\t").is_blank_text());
        assert!(!VNode::text(" a ").is_blank_text());
        assert!(!VNode::element("p").is_blank_text());
    }

    #[test]
    fn collect_events_pre_order() {
        let sel = Selector::parse("button").unwrap();
        let tree = VNode::fragment([VNode::element("div")
            .with_event(EventBinding::new("click", sel.clone()))
            .with_child(VNode::element("button").with_event(EventBinding::new("keydown", sel)))]);
        let kinds: Vec<_> = tree
            .collect_events()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(kinds, vec!["click", "keydown"]);
    }

    #[test]
    fn first_element_skips_fragment_and_text() {
        let mut tree = VNode::fragment([VNode::text(" "), VNode::element("section")]);
        assert_eq!(tree.first_element_mut().map(|n| n.tag().to_owned()).as_deref(), Some("section"));
    }
}
