//! Inline style helpers: read and rewrite single `style` properties.

use crate::dom::node::ATTR_STYLE;

use super::node::VNode;

/// Parse an inline style string into `(property, value)` pairs.
pub fn parse_inline(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.trim().to_owned()))
        })
        .collect()
}

/// Render `(property, value)` pairs back into an inline style string.
pub fn render_inline(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(k, v)| format!("{k}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read one property from a node's inline style.
pub fn get_property(node: &VNode, property: &str) -> Option<String> {
    let style = node.attr(ATTR_STYLE)?;
    parse_inline(style)
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(property))
        .map(|(_, v)| v)
}

/// Set one property on a node's inline style, keeping every other declaration.
pub fn set_property(node: &mut VNode, property: &str, value: &str) {
    let mut decls = node.attr(ATTR_STYLE).map(parse_inline).unwrap_or_default();
    match decls.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(property)) {
        Some(decl) => decl.1 = value.to_owned(),
        None => decls.push((property.to_ascii_lowercase(), value.to_owned())),
    }
    node.set_attr(ATTR_STYLE, render_inline(&decls));
}
