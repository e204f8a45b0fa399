//! Rendering boundary.
//!
//! The engine does not implement a template language. A [`Renderer`] turns a
//! template file and a compiled page into html; this module decides which
//! template a page uses and how its documents are written.
//!
//! # Template lookup
//!
//! ```text
//! templates/<page[template_property]>   explicit choice
//! templates/<reference>                 per page
//! templates/<default_template>          fallback
//! ```
//!
//! Template hooks may edit the list. The first candidate whose
//! `<candidate><template_ext>` file exists wins.

use crate::{config::Config, io::DataSource};
use serde_json::Value;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

pub trait Renderer {
    fn render(&self, template: &Path, data: &Value) -> anyhow::Result<String>;
}

impl<F> Renderer for F
where
    F: Fn(&Path, &Value) -> anyhow::Result<String>,
{
    fn render(&self, template: &Path, data: &Value) -> anyhow::Result<String> {
        self(template, data)
    }
}

/// Template candidates for a page, without extension, most specific first.
pub fn template_candidates(config: &Config, reference: &str, data: &Value) -> Vec<PathBuf> {
    let templates = config.paths.templates_dir();
    let mut candidates = Vec::with_capacity(3);
    if let Some(explicit) = data
        .get(&config.render.template_property)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
    {
        candidates.push(templates.join(explicit));
    }
    candidates.push(templates.join(reference));
    candidates.push(templates.join(&config.render.default_template));
    candidates
}

/// First candidate with an existing template file, extension appended.
pub fn find_template(candidates: &[PathBuf], ext: &str, source: &dyn DataSource) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|candidate| with_suffix(candidate, ext))
        .find(|path| source.exists(path))
}

/// Append `suffix` to the file name, `a/b` + `.twig` is `a/b.twig`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Whether the html of this page is minified.
pub fn wants_minify(config: &Config, data: &Value) -> bool {
    config.render.minify
        || data
            .get(&config.render.minify_property)
            .is_some_and(|flag| match flag {
                Value::Bool(b) => *b,
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                _ => true,
            })
}

/// Minify HTML content using `minify_html` crate.
pub fn minify(html: &str) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html.as_bytes(), &cfg)
}
