//! DOM queries: selectors, attribute lookups, structural equality.
//!
//! Queries are scoped to the subtree below a given node and never match the
//! node itself, mirroring `querySelectorAll` on a container.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{NodeData, NodeId, ATTR_ID, ATTR_UID};
use super::tree::Dom;
use crate::vdom::{VKind, VNode};

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("invalid tag name '{0}'")]
    InvalidTag(String),
    #[error("unclosed attribute predicate in '{0}'")]
    Unclosed(String),
    #[error("unexpected character '{ch}' at byte {position}")]
    Unexpected { ch: char, position: usize },
}

/// A compound selector: optional tag name plus attribute predicates.
///
/// Supported forms: `*`, `tag`, `tag[uid=value]`, `[name]`, `[name="value"]`,
/// `tag#id`, and any concatenation of predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    tag: Option<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Matches every element.
    pub fn any() -> Self {
        Self {
            tag: None,
            attrs: Vec::new(),
        }
    }

    /// Matches elements with the given tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into().to_ascii_lowercase()),
            attrs: Vec::new(),
        }
    }

    /// The framework identity selector `tag[uid=value]`.
    pub fn tag_uid(tag: impl Into<String>, uid: impl Into<String>) -> Self {
        Self::tag(tag).with_attr(ATTR_UID, uid)
    }

    /// Add an `[name=value]` predicate (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs
            .push((name.into().to_ascii_lowercase(), Some(value.into())));
        self
    }

    /// Add an `[name]` presence predicate (builder).
    pub fn with_attr_present(mut self, name: impl Into<String>) -> Self {
        self.attrs.push((name.into().to_ascii_lowercase(), None));
        self
    }

    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }

        let head_end = s.find(['[', '#']).unwrap_or(s.len());
        let head = &s[..head_end];
        let tag = match head {
            "" | "*" => None,
            name if name.chars().all(is_name_char) => Some(name.to_ascii_lowercase()),
            name => return Err(SelectorError::InvalidTag(name.to_owned())),
        };

        let mut attrs = Vec::new();
        let mut pos = head_end;
        while pos < s.len() {
            let rest = &s[pos..];
            if let Some(after) = rest.strip_prefix('#') {
                let len = after.find(['[', '#']).unwrap_or(after.len());
                attrs.push((ATTR_ID.to_owned(), Some(after[..len].to_owned())));
                pos += 1 + len;
            } else if let Some(after) = rest.strip_prefix('[') {
                let close = after
                    .find(']')
                    .ok_or_else(|| SelectorError::Unclosed(s.to_owned()))?;
                let inner = &after[..close];
                let predicate = match inner.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_ascii_lowercase(),
                        Some(unquote(value.trim()).to_owned()),
                    ),
                    None => (inner.trim().to_ascii_lowercase(), None),
                };
                attrs.push(predicate);
                pos += close + 2;
            } else {
                let ch = rest.chars().next().unwrap_or(' ');
                return Err(SelectorError::Unexpected { ch, position: pos });
            }
        }

        Ok(Self { tag, attrs })
    }

    /// Whether a live node satisfies this selector. Text nodes never match.
    pub fn matches(&self, data: &NodeData) -> bool {
        let NodeData::Element { tag, attrs } = data else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            Some(v) => attrs.get(name) == Some(v.as_str()),
            None => attrs.contains(name),
        })
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None if self.attrs.is_empty() => f.write_str("*")?,
            None => {}
        }
        for (name, value) in &self.attrs {
            match value {
                Some(v) if v.chars().all(is_name_char) && !v.is_empty() => {
                    write!(f, "[{name}={v}]")?
                }
                Some(v) => write!(f, "[{name}=\"{v}\"]")?,
                None => write!(f, "[{name}]")?,
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Selector::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Dom {
    /// All nodes below `root` (pre-order) matching `selector`.
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.query_all(root, |data| selector.matches(data))
    }

    /// All nodes below `root` whose attribute `name` equals `value`.
    pub fn query_by_attr(&self, root: NodeId, name: &str, value: &str) -> Vec<NodeId> {
        self.query_all(root, |data| data.attr(name) == Some(value))
    }

    /// The first node below `root` with the given `id` attribute.
    pub fn query_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.query_by_attr(root, ATTR_ID, id).into_iter().next()
    }

    /// All nodes below `root` matching an arbitrary predicate.
    pub fn query_all(&self, root: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.nodes.get(id).is_some_and(&predicate))
            .collect()
    }

    /// Deep structural equality between a live node and a virtual node.
    ///
    /// Compares kind, tag, the attribute *set*, and children in order. Event
    /// descriptors are not part of the live tree and are ignored.
    pub fn equals_vnode(&self, node: NodeId, vnode: &VNode) -> bool {
        let Some(data) = self.nodes.get(node) else {
            return false;
        };
        let same_node = match (data, &vnode.kind) {
            (NodeData::Text(live), VKind::Text(virt)) => live == virt,
            (
                NodeData::Element { tag, attrs },
                VKind::Element {
                    tag: vtag,
                    attrs: vattrs,
                },
            ) => tag == vtag && attrs.same_set(vattrs),
            _ => false,
        };
        if !same_node {
            return false;
        }
        let kids = self.children(node);
        kids.len() == vnode.children.len()
            && kids
                .iter()
                .zip(&vnode.children)
                .all(|(&kid, vkid)| self.equals_vnode(kid, vkid))
    }
}
