//! Markup parser: tokens → [`VNode`] fragment.
//!
//! Uses the logos-based tokenizer from [`crate::markup::tokenizer`] and a
//! stack of open elements. The parser is strict: every non-void element must
//! be closed by a matching tag.

use super::tokenizer::{tokenize, MarkupToken, Spanned};
use crate::vdom::VNode;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Errors from markup parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("closing tag </{found}> at byte {position} does not match open <{expected}>")]
    MismatchedClose {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("closing tag </{tag}> at byte {position} has no open element")]
    StrayClose { tag: String, position: usize },
    #[error("element <{tag}> opened at byte {position} is never closed")]
    UnclosedElement { tag: String, position: usize },
    #[error("comment opened at byte {position} is never closed")]
    UnterminatedComment { position: usize },
    #[error("tag opened at byte {position} is never terminated")]
    UnterminatedTag { position: usize },
    #[error("attribute syntax error at byte {position}: {message}")]
    AttributeSyntax { position: usize, message: String },
}

impl MarkupError {
    /// Byte offset in the source where the problem was detected.
    pub fn position(&self) -> usize {
        match self {
            MarkupError::MismatchedClose { position, .. }
            | MarkupError::StrayClose { position, .. }
            | MarkupError::UnclosedElement { position, .. }
            | MarkupError::UnterminatedComment { position }
            | MarkupError::UnterminatedTag { position }
            | MarkupError::AttributeSyntax { position, .. } => *position,
        }
    }
}

/// Parse a markup string into a fragment.
pub fn parse_markup(input: &str) -> Result<VNode, MarkupError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        cursor: 0,
        stack: vec![(VNode::fragment(Vec::new()), 0)],
    };
    parser.run()?;
    parser.finish()
}

/// Stack-based parser state. Each stack entry is an open node and the byte
/// offset where it was opened.
struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
    stack: Vec<(VNode, usize)>,
}

impl Parser {
    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn current(&mut self) -> &mut VNode {
        &mut self
            .stack
            .last_mut()
            .expect("fragment root is never popped")
            .0
    }

    fn run(&mut self) -> Result<(), MarkupError> {
        while let Some(Spanned { token, span }) = self.advance() {
            match token {
                MarkupToken::Text(text) => {
                    self.current().children.push(VNode::text(text));
                }
                MarkupToken::OpenStart(tag) => {
                    let mut node = VNode::element(tag.as_str());
                    let self_closing = self.parse_attributes(&mut node, span.start)?;
                    if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
                        self.current().children.push(node);
                    } else {
                        self.stack.push((node, span.start));
                    }
                }
                MarkupToken::Close(tag) => self.close(&tag, span.start)?,
                MarkupToken::Attr { .. } | MarkupToken::OpenEnd { .. } => {
                    return Err(MarkupError::AttributeSyntax {
                        position: span.start,
                        message: "attribute outside of a tag".into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Read attribute tokens into `node`. Returns whether the tag self-closed.
    fn parse_attributes(&mut self, node: &mut VNode, start: usize) -> Result<bool, MarkupError> {
        loop {
            match self.advance() {
                Some(Spanned {
                    token: MarkupToken::Attr { name, value },
                    ..
                }) => node.set_attr(name, value.unwrap_or_default()),
                Some(Spanned {
                    token: MarkupToken::OpenEnd { self_closing },
                    ..
                }) => return Ok(self_closing),
                _ => return Err(MarkupError::UnterminatedTag { position: start }),
            }
        }
    }

    fn close(&mut self, tag: &str, position: usize) -> Result<(), MarkupError> {
        if VOID_ELEMENTS.contains(&tag) {
            // `</br>` and friends carry no content; tolerate them.
            return Ok(());
        }
        if self.stack.len() == 1 {
            return Err(MarkupError::StrayClose {
                tag: tag.to_owned(),
                position,
            });
        }
        let open_tag = self.current().tag().to_owned();
        if open_tag != tag {
            return Err(MarkupError::MismatchedClose {
                expected: open_tag,
                found: tag.to_owned(),
                position,
            });
        }
        let (node, _) = self.stack.pop().expect("checked above");
        self.current().children.push(node);
        Ok(())
    }

    fn finish(mut self) -> Result<VNode, MarkupError> {
        if self.stack.len() > 1 {
            let (node, position) = self.stack.swap_remove(1);
            return Err(MarkupError::UnclosedElement {
                tag: node.tag().to_owned(),
                position,
            });
        }
        Ok(self.stack.pop().map(|(node, _)| node).unwrap_or_else(|| VNode::fragment(Vec::new())))
    }
}
