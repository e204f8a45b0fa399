//! End-to-end generation runs against sites on disk.

use pagehouse::{
    ConfigBuilder, DataSource, EngineError, FsSource, Generator, OutputKind, Plugin, HookKind,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

// ============================================================================
// Fixtures
// ============================================================================

struct Site {
    dir: tempfile::TempDir,
}

impl Site {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        Self { dir }
    }

    fn page(&self, reference: &str, content: Value) -> &Self {
        self.write(&format!("data/{reference}.json"), &content.to_string())
    }

    fn fragment(&self, name: &str, content: Value) -> &Self {
        self.write(&format!("fragments/{name}.json"), &content.to_string())
    }

    fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    fn config(&self) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        config.paths.root = self.dir.path().to_path_buf();
        config.report.silent = true;
        config
    }

    fn build(&self) -> Generator {
        let mut generator = Generator::builder(self.config()).build().unwrap();
        generator.load(&[], None).unwrap();
        generator
    }
}

/// Compiled page without its document.
fn data(generator: &Generator, reference: &str) -> Value {
    let mut page = generator.page(reference).unwrap().clone();
    page.as_object_mut().unwrap().remove("document");
    page
}

/// Filesystem source recording every text read.
#[derive(Default)]
struct Counting {
    inner: FsSource,
    reads: Rc<RefCell<Vec<PathBuf>>>,
}

impl DataSource for Counting {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn read_text(&self, path: &Path) -> pagehouse::Result<String> {
        self.reads.borrow_mut().push(path.to_path_buf());
        self.inner.read_text(path)
    }

    fn read_bytes(&self, path: &Path) -> pagehouse::Result<Vec<u8>> {
        self.inner.read_bytes(path)
    }

    fn remote_json(&self, url: &str) -> pagehouse::Result<Value> {
        self.inner.remote_json(url)
    }

    fn write(&self, path: &Path, content: &[u8]) -> pagehouse::Result<()> {
        self.inner.write(path, content)
    }

    fn file_list(&self, dir: &Path, ext: &str) -> pagehouse::Result<Vec<PathBuf>> {
        self.inner.file_list(dir, ext)
    }
}

// ============================================================================
// Fragments
// ============================================================================

#[test]
fn sibling_keys_override_fragment_keys() {
    let site = Site::new();
    site.page("index", json!({"__fragment": "base", "title": "Home"}))
        .fragment("base", json!({"title": "Default", "layout": "page"}));

    let generator = site.build();
    assert_eq!(
        data(&generator, "index"),
        json!({"title": "Home", "layout": "page"})
    );
}

#[test]
fn fragment_loaded_once_and_copied() {
    let site = Site::new();
    site.page("a", json!({"__fragment": "tags", "__directives": ["sort:tags"]}))
        .page("b", json!({"__fragment": "tags"}))
        .fragment("tags", json!({"tags": ["b", "a"]}));

    let source = Counting::default();
    let reads = Rc::clone(&source.reads);
    let mut generator = Generator::builder(site.config())
        .source(source)
        .build()
        .unwrap();
    generator.load(&[], None).unwrap();

    assert_eq!(data(&generator, "a")["tags"], json!(["a", "b"]));
    assert_eq!(data(&generator, "b")["tags"], json!(["b", "a"]));
    let fragment_reads = reads
        .borrow()
        .iter()
        .filter(|path| path.ends_with("fragments/tags.json"))
        .count();
    assert_eq!(fragment_reads, 1);
}

#[test]
fn missing_fragment_strict_and_lenient() {
    let site = Site::new();
    site.page("index", json!({"__fragment": "gone", "title": "Home"}));

    let mut generator = Generator::builder(site.config()).build().unwrap();
    let err = generator.load(&[], None).unwrap_err();
    assert!(matches!(err, EngineError::Resolution(_)));

    let mut config = site.config();
    config.report.strict = false;
    let mut generator = Generator::builder(config).build().unwrap();
    generator.load(&[], None).unwrap();
    let page = data(&generator, "index");
    assert_eq!(page["title"], "Home");
    assert_eq!(page["__error"].as_array().map(Vec::len), Some(1));
    assert_eq!(generator.reporter().errors(), 1);
}

// ============================================================================
// Directives
// ============================================================================

#[test]
fn nav_entry_of_current_page_is_active() {
    let site = Site::new();
    site.page(
        "a",
        json!({"nav": [{"uri": "/a.html"}, {"uri": "/b.html"}], "__directives": ["isDocValue:nav"]}),
    );

    let generator = site.build();
    let nav = &generator.page("a").unwrap()["nav"];
    assert_eq!(nav[0]["active"], true);
    assert!(nav[1].get("active").is_none());
    assert_eq!(generator.directive_stats().get("isDocValue"), 1);
}

#[test]
fn nav_entry_matches_extensionless_uri() {
    let site = Site::new();
    site.page(
        "a",
        json!({"nav": [{"uri": "/a"}, {"uri": "/b"}], "__directives": ["isDocValue:nav"]}),
    );

    let mut config = site.config();
    config.document.ext = String::new();
    let mut generator = Generator::builder(config).build().unwrap();
    generator.load(&[], None).unwrap();

    let page = generator.page("a").unwrap();
    assert_eq!(page["document"]["uri"], "/a");
    assert_eq!(page["nav"][0]["active"], true);
    assert!(page["nav"][1].get("active").is_none());
}

#[test]
fn unknown_directive_warns_or_logs() {
    let site = Site::new();
    site.page("index", json!({"x": 1, "__directives": ["missing:x"]}));

    let generator = site.build();
    assert_eq!(data(&generator, "index")["x"], 1);
    assert_eq!(generator.reporter().warnings(), 1);
    assert_eq!(generator.reporter().infos(), 0);

    let mut config = site.config();
    config.resolve.ignore_directives = true;
    let mut generator = Generator::builder(config).build().unwrap();
    generator.load(&[], None).unwrap();
    assert_eq!(generator.reporter().warnings(), 0);
    assert_eq!(generator.reporter().infos(), 1);
}

#[test]
fn directives_run_in_listed_order() {
    let site = Site::new();
    site.page(
        "index",
        json!({"x": "", "y": "", "__directives": ["a:x", "b:x", "a:y"]}),
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let (seen_a, seen_b) = (Rc::clone(&seen), Rc::clone(&seen));
    let mut generator = Generator::builder(site.config())
        .directive_fn("a", move |call| {
            let before = call.value().cloned().unwrap_or(Value::Null);
            seen_a.borrow_mut().push(format!("a:{}={before}", call.key));
            if let Some(Value::String(s)) = call.value_mut() {
                s.push('a');
            }
            Ok(())
        })
        .directive_fn("b", move |call| {
            seen_b.borrow_mut().push(format!("b:{}", call.key));
            if let Some(Value::String(s)) = call.value_mut() {
                s.push('b');
            }
            Ok(())
        })
        .build()
        .unwrap();
    generator.load(&[], None).unwrap();

    assert_eq!(*seen.borrow(), vec![r#"a:x="""#, "b:x", r#"a:y="""#]);
    assert_eq!(
        data(&generator, "index"),
        json!({"x": "ab", "y": "a", "__directives": ["a:x", "b:x", "a:y"]})
    );
    assert_eq!(generator.directive_stats().get("a"), 2);
}

#[test]
fn failing_directive_lenient_is_not_counted() {
    let site = Site::new();
    site.page("index", json!({"x": 1, "__directives": ["boom:x"]}));

    let mut config = site.config();
    config.report.strict = false;
    let mut generator = Generator::builder(config)
        .directive_fn("boom", |_| anyhow::bail!("exploded"))
        .build()
        .unwrap();
    generator.load(&[], None).unwrap();
    assert_eq!(generator.directive_stats().get("boom"), 0);
    assert_eq!(generator.reporter().errors(), 1);

    let mut generator = Generator::builder(site.config())
        .directive_fn("boom", |_| anyhow::bail!("exploded"))
        .build()
        .unwrap();
    let err = generator.load(&[], None).unwrap_err();
    assert!(err.chain().ends_with("exploded"));
}

// ============================================================================
// Documents and pages
// ============================================================================

#[test]
fn omit_index_uris() {
    let site = Site::new();
    site.page("blog/index", json!({"title": "Blog"}))
        .page("blog/post1", json!({"title": "Post"}));

    let mut config = site.config();
    config.document.omit_index = true;
    config.document.domain = "https://x.io".into();
    let mut generator = Generator::builder(config).build().unwrap();
    generator.load(&[], None).unwrap();
    assert_eq!(generator.document("blog/index").unwrap().uri(), "/blog/");
    assert_eq!(generator.document("blog/post1").unwrap().uri(), "/blog/post1.html");
    assert_eq!(
        generator.page("blog/post1").unwrap()["document"]["url"],
        "https://x.io/blog/post1.html"
    );

    let generator = site.build();
    assert_eq!(
        generator.document("blog/index").unwrap().uri(),
        "/blog/index.html"
    );
}

#[test]
fn plain_tree_is_unchanged() {
    let site = Site::new();
    let source = json!({
        "title": "Home",
        "list": [1, {"a": [true, null]}, "x"],
        "nested": {"deep": {"n": 1.5}}
    });
    site.page("index", source.clone());

    let generator = site.build();
    assert_eq!(data(&generator, "index"), source);
}

#[test]
fn empty_page_is_rejected_when_lenient() {
    let site = Site::new();
    site.page("index", json!({}));

    let mut config = site.config();
    config.report.strict = false;
    let mut generator = Generator::builder(config).build().unwrap();
    let err = generator.load(&[], None).unwrap_err();
    assert!(matches!(err, EngineError::Resolution(_)));
}

#[test]
fn collecting_twice_is_idempotent() {
    let site = Site::new();
    site.page(
        "index",
        json!({"__fragment": "base", "tags": ["b", "c", "a"], "__directives": ["sort:tags:desc"]}),
    )
    .fragment("base", json!({"layout": "page", "__fragment": "meta"}))
    .fragment("meta", json!({"lang": "en"}));

    let mut generator = site.build();
    let first = generator.pages().clone();
    generator.load(&[], None).unwrap();
    assert_eq!(generator.pages(), &first);
    assert_eq!(
        data(&generator, "index"),
        json!({
            "lang": "en",
            "layout": "page",
            "tags": ["c", "b", "a"],
            "__directives": ["sort:tags:desc"]
        })
    );
}

#[test]
fn limit_filters_without_warnings() {
    let site = Site::new();
    site.page("index", json!({"title": "Home"}))
        .page("about", json!({"title": "About"}));

    let mut generator = Generator::builder(site.config()).build().unwrap();
    let summary = generator.load(&["about".into()], None).unwrap();
    assert_eq!((summary.collected, summary.skipped), (1, 1));
    assert!(generator.page("index").is_none());
    assert!(generator.document("index").is_some());
    assert_eq!(generator.reporter().warnings(), 0);
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn writes_json_and_html_documents() {
    let site = Site::new();
    site.page("index", json!({"title": "Home"}))
        .page("blog/post1", json!({"title": "Post", "__template": "post"}))
        .write("templates/__page.twig", "")
        .write("templates/post.twig", "");

    let reordered = Plugin::new("reorder", &[HookKind::Template]).on_template(
        |candidates, templates, reference, _| {
            if reference == "index" {
                candidates.insert(0, templates.join("post"));
            }
            Ok(())
        },
    );
    let mut generator = Generator::builder(site.config())
        .plugin(reordered)
        .build()
        .unwrap();
    generator.load(&[], None).unwrap();

    let target = site.dir.path().join("dist");
    assert_eq!(generator.write_documents(&target, OutputKind::Json).unwrap(), 2);
    let written: Value =
        serde_json::from_str(&fs::read_to_string(target.join("index.json")).unwrap()).unwrap();
    assert_eq!(written["document"]["ref"], "index");

    let renderer = |template: &Path, data: &Value| -> anyhow::Result<String> {
        Ok(format!(
            "{}|{}",
            template.file_name().unwrap().to_string_lossy(),
            data["document"]["uri"].as_str().unwrap_or_default()
        ))
    };
    assert_eq!(generator.render_pages(&renderer).unwrap(), 2);
    assert_eq!(generator.write_documents(&target, OutputKind::Html).unwrap(), 2);
    assert_eq!(
        fs::read_to_string(target.join("index.html")).unwrap(),
        "post.twig|/index.html"
    );
    assert_eq!(
        fs::read_to_string(target.join("blog/post1.html")).unwrap(),
        "post.twig|/blog/post1.html"
    );
}
