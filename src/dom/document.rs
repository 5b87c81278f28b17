//! Document: a live tree with a fixed `html` root and `head`/`body` regions.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

/// The live document the dispatcher renders into.
pub struct Document {
    pub dom: Dom,
    html: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Document {
    /// Create `<html><head></head><body></body></html>`.
    pub fn new() -> Self {
        let mut dom = Dom::new();
        let html = dom.insert(NodeData::element("html"));
        let head = dom.insert_child(html, NodeData::element("head"));
        let body = dom.insert_child(html, NodeData::element("body"));
        Self {
            dom,
            html,
            head,
            body,
        }
    }

    pub fn html(&self) -> NodeId {
        self.html
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
