//! Location: a parsed navigation target.

use std::collections::HashMap;
use std::fmt;

/// The current navigation target, split into its routing-relevant parts.
///
/// `target` is what patterns are matched against: the path, or the hash
/// fragment when the location was parsed for hash routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub host: String,
    pub path: String,
    /// Fragment including its leading `#`, or empty.
    pub hash: String,
    pub target: String,
    /// Parameters carried along from an outer match.
    pub params: HashMap<String, String>,
}

impl Location {
    /// Parse a URL or bare path, routing on the path.
    ///
    /// ```
    /// use gilt_dom::route::Location;
    ///
    /// let loc = Location::parse("https://example.com/users/42/#tab");
    /// assert_eq!(loc.host, "example.com");
    /// assert_eq!(loc.target, "/users/42");
    /// assert_eq!(loc.to_string(), "/users/42#tab");
    /// ```
    pub fn parse(url: &str) -> Self {
        Self::split(url, false)
    }

    /// Parse a URL or bare path, routing on the hash fragment.
    pub fn parse_hash(url: &str) -> Self {
        Self::split(url, true)
    }

    fn split(url: &str, use_hash: bool) -> Self {
        let url = url.trim();
        let (before_hash, hash) = match url.find('#') {
            Some(i) => (&url[..i], url[i..].trim().to_owned()),
            None => (url, String::new()),
        };
        let before_query = before_hash.split('?').next().unwrap_or_default();

        let (host, path) = match before_query.find("://") {
            Some(i) => {
                let rest = &before_query[i + 3..];
                match rest.find('/') {
                    Some(j) => (rest[..j].to_owned(), rest[j..].to_owned()),
                    None => (rest.to_owned(), "/".to_owned()),
                }
            }
            None if before_query.is_empty() => (String::new(), "/".to_owned()),
            None => (String::new(), before_query.to_owned()),
        };

        let target = if use_hash {
            normalize(hash.trim_start_matches('#'))
        } else {
            normalize(&path)
        };

        Self {
            host,
            path,
            hash,
            target,
            params: HashMap::new(),
        }
    }
}

/// Leading slash, no trailing slash, `/` for the root.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.trim_end_matches('/');
        if path.is_empty() && self.hash.is_empty() {
            return f.write_str("/");
        }
        write!(f, "{path}{}", self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path() {
        let loc = Location::parse("/about/");
        assert_eq!(loc.host, "");
        assert_eq!(loc.path, "/about/");
        assert_eq!(loc.target, "/about");
        assert_eq!(loc.to_string(), "/about");
    }

    #[test]
    fn query_is_ignored() {
        let loc = Location::parse("http://localhost:8080/search?q=x#top");
        assert_eq!(loc.host, "localhost:8080");
        assert_eq!(loc.path, "/search");
        assert_eq!(loc.hash, "#top");
    }

    #[test]
    fn root_and_empty() {
        assert_eq!(Location::parse("").target, "/");
        assert_eq!(Location::parse("http://h").target, "/");
        assert_eq!(Location::parse("/").to_string(), "/");
    }

    #[test]
    fn hash_routing() {
        let loc = Location::parse_hash("/app#/users/7");
        assert_eq!(loc.target, "/users/7");
        assert_eq!(loc.to_string(), "/app#/users/7");
        assert_eq!(Location::parse_hash("/app").target, "/");
    }
}
