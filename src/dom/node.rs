//! Node types: NodeId, Attributes, NodeData.

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a live node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Attribute carrying caller-level identity.
pub const ATTR_ID: &str = "id";
/// Attribute carrying framework-managed structural identity.
pub const ATTR_UID: &str = "uid";
/// Attribute carrying the change-detection fingerprint of a subtree.
pub const ATTR_HASH: &str = "hash";
/// Inline style attribute.
pub const ATTR_STYLE: &str = "style";

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Ordered attribute list. Names are stored lower-cased.
///
/// Order is preserved for serialization but ignored for equality checks
/// (see [`Attributes::same_set`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of an attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present (with any value).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set an attribute, overwriting the value in place if it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order-insensitive comparison.
    pub fn same_set(&self, other: &Attributes) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

// ---------------------------------------------------------------------------
// NodeData
// ---------------------------------------------------------------------------

/// Data associated with a single live node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// An element with a lower-cased tag name.
    Element { tag: String, attrs: Attributes },
    /// A text node.
    Text(String),
}

impl NodeData {
    /// Create an element with no attributes.
    pub fn element(tag: impl Into<String>) -> Self {
        NodeData::Element {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Attributes::new(),
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        NodeData::Text(content.into())
    }

    /// Set an attribute (builder). No-op on text nodes.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeData::Element { attrs, .. } = &mut self {
            attrs.set(name, value);
        }
        self
    }

    /// Tag name; empty for text nodes.
    pub fn tag(&self) -> &str {
        match self {
            NodeData::Element { tag, .. } => tag,
            NodeData::Text(_) => "",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeData::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Element { .. })
    }

    /// Attribute lookup. Always `None` for text nodes.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            NodeData::Element { attrs, .. } => attrs.get(name),
            NodeData::Text(_) => None,
        }
    }

    pub fn attrs(&self) -> Option<&Attributes> {
        match self {
            NodeData::Element { attrs, .. } => Some(attrs),
            NodeData::Text(_) => None,
        }
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

    /// Text content of a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeData::Text(t) => Some(t),
            NodeData::Element { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_lowercases_tag() {
        let data = NodeData::element("DIV");
        assert_eq!(data.tag(), "div");
        assert!(data.is_element());
    }

    #[test]
    fn text_has_empty_tag() {
        let data = NodeData::text("hi");
        assert_eq!(data.tag(), "");
        assert_eq!(data.as_text(), Some("hi"));
        assert!(data.attr("id").is_none());
    }

    #[test]
    fn identity_accessors() {
        let data = NodeData::element("li")
            .with_attr("id", "a")
            .with_attr("uid", "7")
            .with_attr("hash", "h1");
        assert_eq!(data.id(), Some("a"));
        assert_eq!(data.uid(), Some("7"));
        assert_eq!(data.hash(), Some("h1"));
    }

    #[test]
    fn with_attr_on_text_is_noop() {
        let data = NodeData::text("x").with_attr("id", "a");
        assert_eq!(data, NodeData::text("x"));
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut attrs = Attributes::new();
        attrs.set("class", "a");
        attrs.set("id", "x");
        attrs.set("CLASS", "b");
        assert_eq!(attrs.iter().collect::<Vec<_>>(), vec![("class", "b"), ("id", "x")]);
    }

    #[test]
    fn remove_returns_old_value() {
        let mut attrs: Attributes = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(attrs.remove("a").as_deref(), Some("1"));
        assert!(attrs.remove("a").is_none());
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn same_set_ignores_order() {
        let a: Attributes = [("x", "1"), ("y", "2")].into_iter().collect();
        let b: Attributes = [("y", "2"), ("x", "1")].into_iter().collect();
        let c: Attributes = [("y", "2"), ("x", "3")].into_iter().collect();
        assert!(a.same_set(&b));
        assert!(!a.same_set(&c));
    }

    #[test]
    fn node_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<NodeId>();
    }
}
