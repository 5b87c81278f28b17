//! logos-based markup tokenizer.
//!
//! Two lexers cooperate through [`Lexer::morph`]:
//! - [`Content`] scans text, tag openings, closing tags, comments, doctypes.
//! - [`TagToken`] scans the inside of an opening tag up to `>` or `/>`.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `/>` as [`TagToken::SelfClose`] beats [`TagToken::Slash`])
//! 2. For equal length matches, earlier-defined variants win

use std::ops::Range;

use logos::{Lexer, Logos};

use super::parser::MarkupError;

/// Elements whose content is raw text (no nested markup).
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Content-mode token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    /// `<tag`: the start of an opening tag.
    #[regex(r"<[a-zA-Z][a-zA-Z0-9:_-]*")]
    OpenTag,

    /// `</tag>`
    #[regex(r"</[a-zA-Z][a-zA-Z0-9:_-]*[ \t\r\n\f]*>")]
    CloseTag,

    /// `<!-- ... -->`; the callback consumes through the terminator.
    #[token("<!--", comment)]
    Comment,

    /// `<!DOCTYPE ...>` and other declarations.
    #[regex(r"<![a-zA-Z][^>]*>")]
    Declaration,

    /// `<? ... ?>` processing instructions.
    #[regex(r"<\?[^>]*>")]
    Instruction,

    /// Everything up to the next `<`.
    #[regex(r"[^<]+")]
    Text,
}

fn comment(lex: &mut Lexer<Content>) -> bool {
    match lex.remainder().find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            true
        }
        None => false,
    }
}

/// Tag-mode token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TagToken {
    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// A `/` not followed by `>`. Inside an unquoted value it joins the
    /// surrounding words; elsewhere it is ignored.
    #[token("/")]
    Slash,

    /// Attribute name or a slash-free piece of an unquoted value.
    #[regex(r#"[^ \t\r\n\f"'=<>`/]+"#)]
    Word,
}

/// A markup token with decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken {
    /// Text with entities decoded (raw for `script`/`style` bodies).
    Text(String),
    /// `<name`: lower-cased tag name.
    OpenStart(String),
    /// `name`, `name=value`, `name="value"`: lower-cased name, decoded value.
    Attr { name: String, value: Option<String> },
    /// `>` or `/>` closing an opening tag.
    OpenEnd { self_closing: bool },
    /// `</name>`: lower-cased tag name.
    Close(String),
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: MarkupToken,
    pub span: Range<usize>,
}

/// Tokenize markup into spanned tokens. Comments and declarations are dropped.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, MarkupError> {
    let mut out = Vec::new();
    let mut lex = Content::lexer(input);

    while let Some(result) = lex.next() {
        let span = lex.span();
        match result {
            Ok(Content::Text) => out.push(Spanned {
                token: MarkupToken::Text(decode_entities(lex.slice())),
                span,
            }),
            Ok(Content::CloseTag) => {
                let name = lex.slice()[2..]
                    .trim_end_matches('>')
                    .trim_end()
                    .to_ascii_lowercase();
                out.push(Spanned {
                    token: MarkupToken::Close(name),
                    span,
                });
            }
            Ok(Content::Comment | Content::Declaration | Content::Instruction) => {}
            Ok(Content::OpenTag) => {
                let name = lex.slice()[1..].to_ascii_lowercase();
                out.push(Spanned {
                    token: MarkupToken::OpenStart(name.clone()),
                    span: span.clone(),
                });

                let mut tag_lex: Lexer<TagToken> = lex.morph();
                let self_closing = lex_attributes(&mut tag_lex, span.start, &mut out)?;
                lex = tag_lex.morph();

                if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    let start = lex.span().end;
                    let end = find_raw_end(lex.remainder(), &name).ok_or_else(|| {
                        MarkupError::UnclosedElement {
                            tag: name.clone(),
                            position: span.start,
                        }
                    })?;
                    if end > 0 {
                        out.push(Spanned {
                            token: MarkupToken::Text(lex.remainder()[..end].to_owned()),
                            span: start..start + end,
                        });
                    }
                    lex.bump(end);
                }
            }
            Err(()) => {
                let slice = lex.slice();
                if slice.starts_with("<!--") {
                    return Err(MarkupError::UnterminatedComment {
                        position: span.start,
                    });
                }
                // A `<` that does not open a tag is literal text.
                out.push(Spanned {
                    token: MarkupToken::Text(slice.to_owned()),
                    span,
                });
            }
        }
    }

    Ok(merge_text(out))
}

/// Consume attribute tokens up to the end of an opening tag.
///
/// Returns whether the tag was self-closing.
fn lex_attributes(
    lex: &mut Lexer<TagToken>,
    tag_start: usize,
    out: &mut Vec<Spanned>,
) -> Result<bool, MarkupError> {
    let mut pending: Option<(String, Range<usize>)> = None;
    let mut expecting_value = false;

    loop {
        let Some(result) = lex.next() else {
            return Err(MarkupError::UnterminatedTag {
                position: tag_start,
            });
        };
        let span = lex.span();
        let token = result.map_err(|()| MarkupError::AttributeSyntax {
            position: span.start,
            message: format!("unexpected '{}'", lex.slice()),
        })?;

        match token {
            TagToken::End | TagToken::SelfClose => {
                if expecting_value {
                    return Err(MarkupError::AttributeSyntax {
                        position: span.start,
                        message: "missing attribute value".into(),
                    });
                }
                flush_attr(&mut pending, None, out);
                out.push(Spanned {
                    token: MarkupToken::OpenEnd {
                        self_closing: token == TagToken::SelfClose,
                    },
                    span,
                });
                return Ok(token == TagToken::SelfClose);
            }
            TagToken::Eq => {
                if pending.is_none() || expecting_value {
                    return Err(MarkupError::AttributeSyntax {
                        position: span.start,
                        message: "'=' without attribute name".into(),
                    });
                }
                expecting_value = true;
            }
            TagToken::DoubleQuoted | TagToken::SingleQuoted => {
                if !expecting_value {
                    return Err(MarkupError::AttributeSyntax {
                        position: span.start,
                        message: "quoted value without attribute name".into(),
                    });
                }
                let slice = lex.slice();
                let value = decode_entities(&slice[1..slice.len() - 1]);
                flush_attr(&mut pending, Some(value), out);
                expecting_value = false;
            }
            TagToken::Word | TagToken::Slash if expecting_value => {
                let raw = unquoted_value(lex, span.end);
                flush_attr(&mut pending, Some(decode_entities(&raw)), out);
                expecting_value = false;
            }
            TagToken::Word => {
                flush_attr(&mut pending, None, out);
                pending = Some((lex.slice().to_ascii_lowercase(), span));
            }
            TagToken::Slash => flush_attr(&mut pending, None, out),
        }
    }
}

/// Extend an unquoted value through directly adjacent words and slashes.
///
/// A trailing `/>` is left for the caller as the self-closing marker.
fn unquoted_value(lex: &mut Lexer<TagToken>, mut end: usize) -> String {
    let mut raw = lex.slice().to_owned();
    loop {
        let mut ahead = lex.clone();
        match ahead.next() {
            Some(Ok(TagToken::Word | TagToken::Slash)) if ahead.span().start == end => {
                raw.push_str(ahead.slice());
                end = ahead.span().end;
                *lex = ahead;
            }
            _ => return raw,
        }
    }
}

fn flush_attr(
    pending: &mut Option<(String, Range<usize>)>,
    value: Option<String>,
    out: &mut Vec<Spanned>,
) {
    if let Some((name, span)) = pending.take() {
        out.push(Spanned {
            token: MarkupToken::Attr { name, value },
            span,
        });
    }
}

/// Byte offset of `</name` (case-insensitive) in `rest`.
fn find_raw_end(rest: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    let lower = rest.to_ascii_lowercase();
    lower.find(&needle)
}

/// Join adjacent text tokens (a literal `<` splits text in two).
fn merge_text(tokens: Vec<Spanned>) -> Vec<Spanned> {
    let mut merged: Vec<Spanned> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if let (
            Some(Spanned {
                token: MarkupToken::Text(prev),
                span: prev_span,
            }),
            MarkupToken::Text(next),
        ) = (merged.last_mut(), &tok.token)
        {
            prev.push_str(next);
            prev_span.end = tok.span.end;
            continue;
        }
        merged.push(tok);
    }
    merged
}

/// Decode the named and numeric character references used in practice.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let ch = match &rest[1..end] {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                ent if ent.starts_with("#x") || ent.starts_with("#X") => {
                    u32::from_str_radix(&ent[2..], 16).ok().and_then(char::from_u32)
                }
                ent if ent.starts_with('#') => ent[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: tokenize and return just the tokens.
    fn tokens(input: &str) -> Vec<MarkupToken> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    fn attr(name: &str, value: Option<&str>) -> MarkupToken {
        MarkupToken::Attr {
            name: name.into(),
            value: value.map(Into::into),
        }
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            tokens("<div>hi</div>"),
            vec![
                MarkupToken::OpenStart("div".into()),
                MarkupToken::OpenEnd { self_closing: false },
                MarkupToken::Text("hi".into()),
                MarkupToken::Close("div".into()),
            ]
        );
    }

    #[test]
    fn test_attribute_forms() {
        assert_eq!(
            tokens(r#"<input ID="a" uid='b' hash=c disabled/>"#),
            vec![
                MarkupToken::OpenStart("input".into()),
                attr("id", Some("a")),
                attr("uid", Some("b")),
                attr("hash", Some("c")),
                attr("disabled", None),
                MarkupToken::OpenEnd { self_closing: true },
            ]
        );
    }

    #[test]
    fn test_unquoted_path_value() {
        assert_eq!(
            tokens("<a href=/users/42>x</a>")[1],
            attr("href", Some("/users/42"))
        );
    }

    #[test]
    fn test_unquoted_value_slashes() {
        assert_eq!(
            tokens("<a href=/ title=a//b/ rel=x>")[1..4].to_vec(),
            vec![
                attr("href", Some("/")),
                attr("title", Some("a//b/")),
                attr("rel", Some("x")),
            ]
        );
        assert_eq!(
            tokens("<img src=/a.png/>")[1..].to_vec(),
            vec![
                attr("src", Some("/a.png")),
                MarkupToken::OpenEnd { self_closing: true },
            ]
        );
    }

    #[test]
    fn test_stray_slash_is_ignored() {
        assert_eq!(
            tokens("<input disabled / checked>")[1..].to_vec(),
            vec![
                attr("disabled", None),
                attr("checked", None),
                MarkupToken::OpenEnd { self_closing: false },
            ]
        );
    }

    #[test]
    fn test_nested_identity_markup() {
        assert_eq!(
            tokens(r#"<div uid="1"><span uid="2">hi</span></div>"#),
            vec![
                MarkupToken::OpenStart("div".into()),
                attr("uid", Some("1")),
                MarkupToken::OpenEnd { self_closing: false },
                MarkupToken::OpenStart("span".into()),
                attr("uid", Some("2")),
                MarkupToken::OpenEnd { self_closing: false },
                MarkupToken::Text("hi".into()),
                MarkupToken::Close("span".into()),
                MarkupToken::Close("div".into()),
            ]
        );
    }

    #[test]
    fn test_self_closing_without_space() {
        assert_eq!(
            tokens("<br/>"),
            vec![
                MarkupToken::OpenStart("br".into()),
                MarkupToken::OpenEnd { self_closing: true },
            ]
        );
    }

    #[test]
    fn test_comments_and_doctype_dropped() {
        assert_eq!(
            tokens("<!DOCTYPE html><!-- note --><p></p>"),
            vec![
                MarkupToken::OpenStart("p".into()),
                MarkupToken::OpenEnd { self_closing: false },
                MarkupToken::Close("p".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_comment() {
        assert!(matches!(
            tokenize("<p></p><!-- open"),
            Err(MarkupError::UnterminatedComment { position: 7 })
        ));
    }

    #[test]
    fn test_unterminated_tag() {
        assert!(matches!(
            tokenize("<div class='x'"),
            Err(MarkupError::UnterminatedTag { position: 0 })
        ));
    }

    #[test]
    fn test_stray_equals() {
        assert!(matches!(
            tokenize("<div =x>"),
            Err(MarkupError::AttributeSyntax { .. })
        ));
    }

    #[test]
    fn test_literal_less_than() {
        assert_eq!(tokens("a < b"), vec![MarkupToken::Text("a < b".into())]);
    }

    #[test]
    fn test_entities() {
        assert_eq!(
            tokens("&lt;b&gt; &amp; &#65;&#x42; &unknown; &"),
            vec![MarkupToken::Text("<b> & AB &unknown; &".into())]
        );
    }

    #[test]
    fn test_script_body_is_raw() {
        assert_eq!(
            tokens("<script>if (a<b && c) {}</script>"),
            vec![
                MarkupToken::OpenStart("script".into()),
                MarkupToken::OpenEnd { self_closing: false },
                MarkupToken::Text("if (a<b && c) {}".into()),
                MarkupToken::Close("script".into()),
            ]
        );
    }

    #[test]
    fn test_close_tag_with_whitespace() {
        assert_eq!(tokens("</DIV >"), vec![MarkupToken::Close("div".into())]);
    }

    #[test]
    fn test_spans() {
        let toks = tokenize("<p>x</p>").unwrap();
        assert_eq!(toks[0].span, 0..2);
        assert_eq!(toks[2].span, 3..4);
        assert_eq!(toks[3].span, 4..8);
    }
}
