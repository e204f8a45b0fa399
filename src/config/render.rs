//! `[render]` section configuration.
//!
//! Template lookup and document output settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// Kind of document written to the target directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Rendered template output.
    Html,
    /// Compiled page data (default, needs no renderer).
    #[default]
    Json,
}

impl OutputKind {
    /// File extension without the dot.
    pub const fn ext(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// `[render]` section in pagehouse.toml.
///
/// # Example
/// ```toml
/// [render]
/// default_template = "__page"
/// template_ext = ".twig"
/// minify = true
/// output = "html"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Template used when neither the page nor its reference names one.
    #[serde(default = "defaults::render::default_template")]
    #[educe(Default = defaults::render::default_template())]
    pub default_template: String,

    /// Template file extension.
    #[serde(default = "defaults::render::template_ext")]
    #[educe(Default = defaults::render::template_ext())]
    pub template_ext: String,

    /// Page property naming its template.
    #[serde(default = "defaults::render::template_property")]
    #[educe(Default = defaults::render::template_property())]
    pub template_property: String,

    /// Minify every html document.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Page property enabling minification for that page only.
    #[serde(default = "defaults::render::minify_property")]
    #[educe(Default = defaults::render::minify_property())]
    pub minify_property: String,

    /// Documents written by the build.
    #[serde(default = "defaults::render::output")]
    #[educe(Default = defaults::render::output())]
    pub output: OutputKind,
}

#[cfg(test)]
mod tests {
    use super::super::Settings;
    use super::*;

    #[test]
    fn test_render_defaults() {
        let config: Settings = toml::from_str("").unwrap();
        assert_eq!(config.render.default_template, "__page");
        assert_eq!(config.render.template_ext, ".twig");
        assert_eq!(config.render.template_property, "__template");
        assert!(!config.render.minify);
        assert_eq!(config.render.output, OutputKind::Json);
    }

    #[test]
    fn test_output_kind_parse() {
        let config: Settings = toml::from_str(
            r#"
            [render]
            output = "html"
        "#,
        )
        .unwrap();
        assert_eq!(config.render.output, OutputKind::Html);
        assert_eq!(config.render.output.ext(), "html");
    }

    #[test]
    fn test_output_kind_invalid() {
        let result: Result<Settings, _> = toml::from_str(
            r#"
            [render]
            output = "pdf"
        "#,
        );
        assert!(result.is_err());
    }
}
