//! Markup codec: logos tokenizer, strict parser, HTML writer.

pub mod parser;
pub mod tokenizer;
pub mod writer;

pub use parser::{parse_markup, MarkupError};
pub use writer::vnode_to_html;
