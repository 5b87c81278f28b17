//! Path patterns: `/users/:id`, `/files/*`, `/about`.

use std::collections::HashMap;
use std::fmt;

/// Errors from [`PathPattern::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),
    #[error("pattern `{0}` has a parameter without a name")]
    UnnamedParam(String),
    #[error("pattern `{0}` has `*` before its last segment")]
    RestNotLast(String),
}

/// A successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    pub params: HashMap<String, String>,
    /// What a trailing `*` consumed, with a leading `/`; empty otherwise.
    pub remainder: String,
}

/// Decides whether a candidate path belongs to a route.
pub trait PathMatcher: Send + Sync {
    /// `Some` with extracted parameters and remainder when `candidate` matches.
    fn validate(&self, candidate: &str) -> Option<PathMatch>;

    /// The source pattern, for logging and deduplication.
    fn pattern(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Rest,
}

/// Segment-wise path pattern.
///
/// `:name` captures one segment, a final `*` captures the rest, anything
/// else must match literally. Trailing slashes are ignored on both sides.
///
/// ```
/// use gilt_dom::route::{PathMatcher, PathPattern};
///
/// let pattern = PathPattern::parse("/users/:id").unwrap();
/// let found = pattern.validate("/users/42").unwrap();
/// assert_eq!(found.params["id"], "42");
/// assert!(pattern.validate("/users").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let source = pattern.trim();
        if !source.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(source.to_owned()));
        }
        let raw: Vec<&str> = split(source).collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (i, part) in raw.iter().enumerate() {
            let segment = match *part {
                "*" if i + 1 == raw.len() => Segment::Rest,
                "*" => return Err(PatternError::RestNotLast(source.to_owned())),
                p if p.starts_with(':') => {
                    let name = &p[1..];
                    if name.is_empty() {
                        return Err(PatternError::UnnamedParam(source.to_owned()));
                    }
                    Segment::Param(name.to_owned())
                }
                p => Segment::Literal(p.to_owned()),
            };
            segments.push(segment);
        }
        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    /// Names of the captured parameters, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl PathMatcher for PathPattern {
    fn validate(&self, candidate: &str) -> Option<PathMatch> {
        let parts: Vec<&str> = split(candidate.split(['?', '#']).next().unwrap_or_default()).collect();
        let mut found = PathMatch::default();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest => {
                    if i < parts.len() {
                        found.remainder = format!("/{}", parts[i..].join("/"));
                    }
                    return Some(found);
                }
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    found.params.insert(name.clone(), (*value).to_owned());
                }
            }
        }
        (parts.len() == self.segments.len()).then_some(found)
    }

    fn pattern(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
