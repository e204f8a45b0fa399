//! Routable page identity.
//!
//! A [`Document`] is derived once per data source from its path and the
//! `[document]` config section:
//!
//! ```text
//! source  data/blog/post1.json
//! root    data
//! dir     blog
//! slug    post1
//! ref     blog/post1
//! uri     /blog/post1.html        document.root + dir/ + slug + document.ext
//! url     https://x.io/blog/post1.html
//! ```
//!
//! With `omit_index`, a slug equal to `document.index` contributes nothing to
//! the uri, so `blog/index` becomes `/blog/`.

use crate::{
    config::{Config, DocumentConfig},
    error::{EngineError, Result},
    io::rel_path,
};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::Path;

/// Documents of a run, keyed by reference.
pub type DocumentIndex = FxHashMap<String, Document>;

/// Identity of one page. Every field is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    source: String,
    root: String,
    slug: String,
    dir: String,
    #[serde(rename = "ref")]
    reference: String,
    uri: String,
    url: String,
}

impl Document {
    /// Build the document for a source path or bare reference.
    pub fn new(source: &str, config: &Config) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(EngineError::Configuration(
                "document reference must not be empty".into(),
            ));
        }

        let path = Path::new(source);
        let slug = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                EngineError::Configuration(format!("no page name in reference: {source}"))
            })?;

        let root = config.paths.data_location();
        let parent = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = rel_path(&parent, &root);
        let reference = if dir.is_empty() {
            slug.clone()
        } else {
            format!("{dir}/{slug}")
        };

        let uri = compose_uri(&dir, &slug, &config.document);
        let url = format!("{}{uri}", config.document.domain);

        Ok(Self {
            source: source.to_owned(),
            root,
            slug,
            dir,
            reference,
            uri,
            url,
        })
    }

    /// Uri of an auxiliary file (an image, a download) relative to `root`.
    pub fn uri_from(src: &str, root: &str, config: &Config) -> String {
        let rel = rel_path(src, root);
        format!("{}{}", config.document.root, rel.trim_start_matches('/'))
    }

    /// Url of an auxiliary file relative to `root`.
    pub fn url_from(src: &str, root: &str, config: &Config) -> String {
        format!(
            "{}{}",
            config.document.domain,
            Self::uri_from(src, root, config)
        )
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Page reference, unique within a run.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Field by its serialized name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "source" => Some(&self.source),
            "root" => Some(&self.root),
            "slug" => Some(&self.slug),
            "dir" => Some(&self.dir),
            "ref" => Some(&self.reference),
            "uri" => Some(&self.uri),
            "url" => Some(&self.url),
            _ => None,
        }
    }

    /// Plain object form attached to compiled pages.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "source": self.source,
            "root": self.root,
            "slug": self.slug,
            "dir": self.dir,
            "ref": self.reference,
            "uri": self.uri,
            "url": self.url,
        })
    }
}

fn compose_uri(dir: &str, slug: &str, document: &DocumentConfig) -> String {
    let mut uri = document.root.clone();
    if !dir.is_empty() {
        uri.push_str(dir);
        uri.push('/');
    }
    if !(document.omit_index && slug == document.index) {
        uri.push_str(slug);
        uri.push_str(&document.ext);
    }
    uri
}
