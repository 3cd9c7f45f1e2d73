// src/endpoint.rs
// =============================================================================
// The one piece of plain data everything else passes around: a named
// streaming URL with the group it was listed under.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Group label used when the source list does not provide one.
pub const DEFAULT_GROUP: &str = "uncategorized";

/// A single channel from a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    #[serde(default = "default_group")]
    pub group: String,
}

impl Endpoint {
    /// Creates an endpoint in the default group
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            group: DEFAULT_GROUP.to_string(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_group() {
        let endpoint = Endpoint::new("News", "http://example.com/news.m3u8");
        assert_eq!(endpoint.group, "uncategorized");
    }

    #[test]
    fn test_missing_group_deserializes_to_default() {
        let endpoint: Endpoint =
            serde_json::from_str(r#"{"name":"A","url":"http://a"}"#).unwrap();
        assert_eq!(endpoint.group, DEFAULT_GROUP);
    }
}
