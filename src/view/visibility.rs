//! Shown/Hidden decoration applied to a view's rendered root.

use std::fmt;

use crate::vdom::style::{get_property, set_property};
use crate::vdom::VNode;

const DISPLAY: &str = "display";

/// Whether a view is rendered visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Shown,
    Hidden,
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        self == Self::Shown
    }

    /// Rewrite the `display` property of `root` for this state.
    ///
    /// Only `display` is touched; every other attribute and inline style
    /// declaration set by the view's own markup is kept.
    pub fn decorate(self, root: &mut VNode) {
        if !root.is_element() {
            return;
        }
        let display = get_property(root, DISPLAY);
        match self {
            Self::Hidden => {
                if !display.as_deref().is_some_and(|d| d.contains("none")) {
                    set_property(root, DISPLAY, "none");
                }
            }
            Self::Shown => match display {
                Some(d) if d.contains("none") => set_property(root, DISPLAY, "block"),
                Some(_) => {}
                None => set_property(root, DISPLAY, "block"),
            },
        }
    }
}

impl From<bool> for Visibility {
    fn from(on: bool) -> Self {
        if on {
            Self::Shown
        } else {
            Self::Hidden
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(style: Option<&str>) -> VNode {
        let node = VNode::element("div").with_attr("class", "card");
        match style {
            Some(s) => node.with_attr("style", s),
            None => node,
        }
    }

    #[test]
    fn hidden_keeps_other_declarations() {
        let mut node = div(Some("color: red;"));
        Visibility::Hidden.decorate(&mut node);
        assert_eq!(node.attr("style"), Some("color: red; display: none;"));
        assert_eq!(node.attr("class"), Some("card"));
    }

    #[test]
    fn hidden_is_idempotent() {
        let mut node = div(Some("display: none;"));
        Visibility::Hidden.decorate(&mut node);
        assert_eq!(node.attr("style"), Some("display: none;"));
    }

    #[test]
    fn shown_restores_block() {
        let mut node = div(Some("display: none; color: red;"));
        Visibility::Shown.decorate(&mut node);
        assert_eq!(node.attr("style"), Some("display: block; color: red;"));
    }

    #[test]
    fn shown_keeps_explicit_display() {
        let mut node = div(Some("display: flex;"));
        Visibility::Shown.decorate(&mut node);
        assert_eq!(node.attr("style"), Some("display: flex;"));

        let mut bare = div(None);
        Visibility::Shown.decorate(&mut bare);
        assert_eq!(bare.attr("style"), Some("display: block;"));
    }

    #[test]
    fn text_roots_are_left_alone() {
        let mut text = VNode::text("hi");
        Visibility::Hidden.decorate(&mut text);
        assert_eq!(text, VNode::text("hi"));
    }
}
