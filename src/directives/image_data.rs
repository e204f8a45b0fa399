//! `imageData:key[:prop[:root[:inline]]]`
//!
//! Replaces image paths with image objects:
//!
//! ```json
//! { "src": "img/a.png", "type": "png", "width": 640, "height": 480,
//!   "uri": "/img/a.png", "url": "https://x.io/img/a.png" }
//! ```
//!
//! On an array, each element's `prop` (default `image`) is replaced;
//! otherwise the value itself. `root` is stripped from the path when
//! building `uri` and `url`. With `inline` set to `inline`, `true` or
//! `base64` the file is embedded as a data uri under `data`.
//!
//! Dimension probing and mime detection are optional capabilities. Without
//! them the object only carries the extension as `type`, and inlined data
//! falls back to `image/<ext>`.

use super::{Context, Directive, DirectiveCall};
use crate::{document::Document, io::is_url};
use anyhow::{Context as _, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use std::path::Path;

/// Reads the pixel size of an image file.
pub trait ImageProber {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)>;
}

/// Guesses the mime type of an image file.
pub trait MimeDetector {
    fn mime_type(&self, path: &Path) -> Option<String>;
}

/// Both capabilities backed by the `image` crate.
struct ImageCrate;

impl ImageProber for ImageCrate {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        image::image_dimensions(path)
            .with_context(|| format!("cannot read image size of {}", path.display()))
    }
}

impl MimeDetector for ImageCrate {
    fn mime_type(&self, path: &Path) -> Option<String> {
        image::ImageFormat::from_path(path)
            .ok()
            .map(|format| format.to_mime_type().to_owned())
    }
}

pub struct ImageData {
    prober: Option<Box<dyn ImageProber>>,
    mime: Option<Box<dyn MimeDetector>>,
}

impl ImageData {
    pub fn new(prober: Option<Box<dyn ImageProber>>, mime: Option<Box<dyn MimeDetector>>) -> Self {
        Self { prober, mime }
    }

    pub fn with_image_crate() -> Self {
        Self::new(Some(Box::new(ImageCrate)), Some(Box::new(ImageCrate)))
    }

    fn image_object(
        &self,
        src: &str,
        root: &str,
        inline: bool,
        context: &Context<'_>,
    ) -> Result<Value> {
        let config = context.config;
        let path = config.paths.root.join(src.trim_start_matches('/'));
        let ext = Path::new(src)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let mut object = Map::new();
        object.insert("src".into(), src.into());
        object.insert("type".into(), ext.clone().into());

        match &self.prober {
            Some(prober) => {
                let (width, height) = prober.dimensions(&path)?;
                object.insert("width".into(), width.into());
                object.insert("height".into(), height.into());
            }
            None => context
                .reporter
                .warn(format!("imageData: no image prober available, {src} has no size")),
        }

        object.insert("uri".into(), Document::uri_from(src, root, config).into());
        object.insert("url".into(), Document::url_from(src, root, config).into());

        if inline {
            let mime = match self.mime.as_ref().and_then(|m| m.mime_type(&path)) {
                Some(mime) => mime,
                None => {
                    context.reporter.warn(format!(
                        "imageData: no mime type detected for {src}, using image/{ext}"
                    ));
                    format!("image/{ext}")
                }
            };
            let bytes = context.source.read_bytes(&path)?;
            object.insert(
                "data".into(),
                format!("data:{mime};base64,{}", STANDARD.encode(bytes)).into(),
            );
        }

        Ok(Value::Object(object))
    }
}

impl Directive for ImageData {
    fn apply(&self, call: &mut DirectiveCall<'_>) -> Result<()> {
        let prop = call.arg(0).unwrap_or("image");
        let root = call.arg(1).unwrap_or("");
        let inline = matches!(call.arg(2), Some("inline" | "true" | "base64"));
        let context = call.context;

        match call.value_mut() {
            Some(Value::Array(items)) => {
                for item in items.iter_mut().filter_map(Value::as_object_mut) {
                    if let Some(src) = image_src(item.get(prop)) {
                        let object = self.image_object(&src, root, inline, context)?;
                        item.insert(prop.to_owned(), object);
                    }
                }
            }
            value => {
                if let Some(src) = image_src(value.as_deref()) {
                    let object = self.image_object(&src, root, inline, context)?;
                    call.parent.insert(call.key.to_owned(), object);
                }
            }
        }
        Ok(())
    }
}

/// Local image path held by `value`.
fn image_src(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|src| !src.is_empty() && !is_url(src))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use serde_json::json;
    use std::fs;

    struct FixedSize;

    impl ImageProber for FixedSize {
        fn dimensions(&self, _: &Path) -> Result<(u32, u32)> {
            Ok((640, 480))
        }
    }

    fn fixture(root: &Path) -> Fixture {
        let root = root.to_path_buf();
        Fixture::with("index", move |c| {
            c.paths.root = root;
            c.document.domain = "https://x.io".into();
        })
    }

    #[test]
    fn test_scalar_with_prober() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = fixture(dir.path());
        let directive = ImageData::new(Some(Box::new(FixedSize)), None);
        let mut parent = json!({"hero": "img/a.png"});

        fixture.apply(&directive, &mut parent, "hero", &[]).unwrap();
        assert_eq!(
            parent["hero"],
            json!({
                "src": "img/a.png",
                "type": "png",
                "width": 640,
                "height": 480,
                "uri": "/img/a.png",
                "url": "https://x.io/img/a.png"
            })
        );
    }

    #[test]
    fn test_array_elements_and_root() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = fixture(dir.path());
        let directive = ImageData::new(Some(Box::new(FixedSize)), None);
        let mut parent = json!({"cards": [
            {"pic": "assets/b.jpg"},
            {"pic": "https://cdn.x.io/c.jpg"},
            {"title": "none"}
        ]});

        fixture
            .apply(&directive, &mut parent, "cards", &["pic", "assets"])
            .unwrap();
        assert_eq!(parent["cards"][0]["pic"]["uri"], "/b.jpg");
        assert_eq!(parent["cards"][1]["pic"], "https://cdn.x.io/c.jpg");
        assert!(parent["cards"][2].get("pic").is_none());
    }

    #[test]
    fn test_without_prober_reports_extension() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = fixture(dir.path());
        let directive = ImageData::new(None, None);
        let mut parent = json!({"hero": "img/a.GIF"});

        fixture.apply(&directive, &mut parent, "hero", &[]).unwrap();
        assert_eq!(parent["hero"]["type"], "gif");
        assert!(parent["hero"].get("width").is_none());
        assert_eq!(fixture.reporter.warnings(), 1);
    }

    #[test]
    fn test_inline_falls_back_to_extension_mime() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/a.png"), b"abc").unwrap();
        let fixture = fixture(dir.path());
        let directive = ImageData::new(Some(Box::new(FixedSize)), None);
        let mut parent = json!({"hero": "img/a.png"});

        fixture
            .apply(&directive, &mut parent, "hero", &["", "", "inline"])
            .unwrap();
        assert_eq!(parent["hero"]["data"], "data:image/png;base64,YWJj");
        assert_eq!(fixture.reporter.warnings(), 1);
    }

    #[test]
    fn test_image_crate_mime() {
        assert_eq!(
            ImageCrate.mime_type(Path::new("a.jpg")).as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(ImageCrate.mime_type(Path::new("a.unknown")), None);
    }

    #[test]
    fn test_image_crate_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = fixture(dir.path());
        let mut parent = json!({"hero": "img/missing.png"});
        let result = fixture.apply(&ImageData::with_image_crate(), &mut parent, "hero", &[]);
        assert!(result.is_err());
    }
}
