//! `[document]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[document]` section in pagehouse.toml - how page uris and urls are built.
///
/// # Example
/// ```toml
/// [document]
/// root = "/"
/// domain = "https://example.com"
/// ext = ".html"
/// omit_index = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DocumentConfig {
    /// Prefix of every document uri.
    #[serde(default = "defaults::document::root")]
    #[educe(Default = defaults::document::root())]
    pub root: String,

    /// Prefix of every document url, prepended to the uri.
    #[serde(default = "defaults::document::domain")]
    #[educe(Default = defaults::document::domain())]
    pub domain: String,

    /// Extension appended to the slug.
    #[serde(default = "defaults::document::ext")]
    #[educe(Default = defaults::document::ext())]
    pub ext: String,

    /// Drop `index` + ext from uris, producing directory style uris.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub omit_index: bool,

    /// Slug treated as the directory index.
    #[serde(default = "defaults::document::index")]
    #[educe(Default = defaults::document::index())]
    pub index: String,
}

#[cfg(test)]
mod tests {
    use super::super::Settings;

    #[test]
    fn test_document_defaults() {
        let config: Settings = toml::from_str("").unwrap();
        assert_eq!(config.document.root, "/");
        assert_eq!(config.document.domain, "");
        assert_eq!(config.document.ext, ".html");
        assert!(!config.document.omit_index);
        assert_eq!(config.document.index, "index");
    }

    #[test]
    fn test_document_full() {
        let config: Settings = toml::from_str(
            r#"
            [document]
            root = "/docs/"
            domain = "https://example.com"
            ext = ""
            omit_index = true
            index = "home"
        "#,
        )
        .unwrap();
        assert_eq!(config.document.root, "/docs/");
        assert_eq!(config.document.domain, "https://example.com");
        assert_eq!(config.document.ext, "");
        assert!(config.document.omit_index);
        assert_eq!(config.document.index, "home");
    }
}
