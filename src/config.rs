//! Engine configuration.

/// Reserved attribute names and defaults used across the engine.
///
/// ```
/// use gilt_dom::EngineConfig;
///
/// let config = EngineConfig::default().with_external_marker("data-keep");
/// assert_eq!(config.external_marker, "data-keep");
/// assert_eq!(config.removed_marker, "noderemoved");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Tombstone attribute: a virtual node carrying it deletes its live match.
    pub removed_marker: String,
    /// Direct children of `head`/`body` carrying this attribute survive a
    /// full application render.
    pub external_marker: String,
    /// Tag used to wrap the output of a view with several renderers.
    pub wrapper_tag: String,
    /// Length of the random uid given to views created without one.
    pub uid_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            removed_marker: "noderemoved".into(),
            external_marker: "data-external".into(),
            wrapper_tag: "div".into(),
            uid_length: 8,
        }
    }
}

impl EngineConfig {
    pub fn with_removed_marker(mut self, name: impl Into<String>) -> Self {
        self.removed_marker = name.into().to_ascii_lowercase();
        self
    }

    pub fn with_external_marker(mut self, name: impl Into<String>) -> Self {
        self.external_marker = name.into().to_ascii_lowercase();
        self
    }

    pub fn with_wrapper_tag(mut self, tag: impl Into<String>) -> Self {
        self.wrapper_tag = tag.into().to_ascii_lowercase();
        self
    }

    /// Set the random uid length. Clamped to `1..=26` (the length of a ULID).
    pub fn with_uid_length(mut self, len: usize) -> Self {
        self.uid_length = len.clamp(1, 26);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.removed_marker, "noderemoved");
        assert_eq!(config.external_marker, "data-external");
        assert_eq!(config.wrapper_tag, "div");
        assert_eq!(config.uid_length, 8);
    }

    #[test]
    fn builders_normalize() {
        let config = EngineConfig::default()
            .with_removed_marker("NodeRemoved")
            .with_wrapper_tag("SECTION")
            .with_uid_length(100);
        assert_eq!(config.removed_marker, "noderemoved");
        assert_eq!(config.wrapper_tag, "section");
        assert_eq!(config.uid_length, 26);
    }
}
