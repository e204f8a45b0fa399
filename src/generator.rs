//! Generation facade.
//!
//! ```text
//! GeneratorBuilder ──► build() ──► Generator
//!   config builder       │           │
//!   data source          │           ├── load() / collect() ──► pages
//!   plugins              │           ├── render_pages()     ──► html
//!   directives           │           └── write_documents()  ──► target/<ref>.<ext>
//!                        │
//!                        └── builtins, extra directives, setup hooks, freeze
//! ```
//!
//! Setup hooks are the last point where options or directives can change.
//! After `build()` the config is an immutable [`Config`] and the registry is
//! owned by the generator.

use crate::{
    collector::{CollectSummary, Collected, Collector, DOCUMENT_PROPERTY},
    config::{Config, ConfigBuilder, OutputKind},
    directives::{
        Context, Directive, DirectiveCall, DirectiveRegistry, DirectiveStats, register_builtins,
    },
    document::{Document, DocumentIndex},
    error::{EngineError, Result},
    fragments::FragmentStore,
    io::{DataSource, FsSource, is_url},
    plugins::{Plugin, Plugins},
    render::{Renderer, find_template, minify, template_candidates, wants_minify},
    report::Reporter,
};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

type Registration = Box<dyn FnOnce(&mut DirectiveRegistry) -> Result<()>>;

// ============================================================================
// Builder
// ============================================================================

pub struct GeneratorBuilder {
    config: ConfigBuilder,
    source: Option<Box<dyn DataSource>>,
    plugins: Vec<Plugin>,
    directives: Vec<Registration>,
}

impl GeneratorBuilder {
    pub fn new(config: ConfigBuilder) -> Self {
        Self {
            config,
            source: None,
            plugins: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Replace the default filesystem source.
    pub fn source(mut self, source: impl DataSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Register an extra directive next to the built-ins.
    pub fn directive(mut self, name: &str, directive: impl Directive + 'static) -> Self {
        let name = name.to_owned();
        self.directives
            .push(Box::new(move |registry: &mut DirectiveRegistry| {
                registry.register(&name, directive)
            }));
        self
    }

    pub fn directive_fn<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&mut DirectiveCall<'_>) -> anyhow::Result<()> + 'static,
    {
        self.directive(name, f)
    }

    /// Register plugins and directives, run setup hooks and freeze the config.
    pub fn build(self) -> Result<Generator> {
        let Self {
            mut config,
            source,
            plugins: list,
            directives,
        } = self;

        let mut plugins = Plugins::new();
        for plugin in list {
            plugins.register(plugin)?;
        }

        let mut registry = DirectiveRegistry::new(
            config.resolve.directive_prefix.clone(),
            &config.resolve.allowed_directives,
        );
        register_builtins(&mut registry, &config.resolve.builtin_directives)?;
        for register in directives {
            register(&mut registry)?;
        }

        let setup = Reporter::new(&config.report);
        plugins.run_setup(&mut config, &mut registry, &setup)?;
        registry.set_prefix(&config.resolve.directive_prefix);

        let config = config
            .build()
            .map_err(|err| EngineError::Configuration(err.to_string()))?;
        let reporter = Reporter::new(&config.report);
        let fragments = FragmentStore::new(config.paths.fragments_location());

        Ok(Generator {
            reporter,
            source: source.unwrap_or_else(|| Box::new(FsSource::new())),
            registry,
            plugins,
            fragments,
            documents: DocumentIndex::default(),
            pages: BTreeMap::new(),
            rendered: BTreeMap::new(),
            stats: DirectiveStats::default(),
            config,
        })
    }
}

// ============================================================================
// Generator
// ============================================================================

pub struct Generator {
    config: Config,
    reporter: Reporter,
    source: Box<dyn DataSource>,
    registry: DirectiveRegistry,
    plugins: Plugins,
    fragments: FragmentStore,
    documents: DocumentIndex,
    pages: BTreeMap<String, Value>,
    rendered: BTreeMap<String, String>,
    stats: DirectiveStats,
}

impl Generator {
    pub fn builder(config: ConfigBuilder) -> GeneratorBuilder {
        GeneratorBuilder::new(config)
    }

    /// Collect every data source in `sources`, keeping only `limit` references
    /// when the list is non-empty.
    ///
    /// Documents for all sources are built before the first page is resolved,
    /// so directives can look up any page of the run. The fragment cache and
    /// directive statistics start fresh.
    pub fn collect(&mut self, sources: &[String], limit: &[String]) -> Result<CollectSummary> {
        let mut documents = DocumentIndex::default();
        let mut order = Vec::with_capacity(sources.len());
        for source in sources {
            let document = Document::new(source, &self.config)?;
            let reference = document.reference().to_owned();
            if documents.insert(reference.clone(), document).is_some() {
                return Err(EngineError::Configuration(format!(
                    "duplicate page reference: {reference}"
                )));
            }
            order.push(reference);
        }

        self.documents = documents;
        self.pages.clear();
        self.rendered.clear();
        self.fragments.clear();
        self.stats = DirectiveStats::default();

        let context = Context {
            config: &self.config,
            documents: &self.documents,
            reporter: &self.reporter,
            source: &*self.source,
        };
        let mut collector = Collector::new(
            &context,
            &self.registry,
            &self.plugins,
            &mut self.fragments,
            &mut self.stats,
        );

        let mut summary = CollectSummary::default();
        let mut pages = BTreeMap::new();
        for reference in &order {
            let collected = collector.collect(&self.documents[reference], limit)?;
            summary.record(&collected);
            if let Collected::Page(page) = collected {
                pages.insert(page.reference, page.data);
            }
        }

        if pages.is_empty() && limit.is_empty() {
            return Err(EngineError::Resolution(format!(
                "No pages collected from {} sources",
                sources.len()
            )));
        }
        self.pages = pages;

        self.reporter.status(
            "collect",
            format!(
                "{} pages, {} skipped, {} failed",
                summary.collected, summary.skipped, summary.failed
            ),
        );
        Ok(summary)
    }

    /// [`collect`](Self::collect) with sources discovered under `paths.data`
    /// unless given explicitly.
    ///
    /// Explicit sources are paths or urls; a bare reference such as
    /// `blog/post1` is looked up as `<data>/blog/post1.json`.
    pub fn load(&mut self, limit: &[String], sources: Option<Vec<String>>) -> Result<CollectSummary> {
        let sources = match sources {
            Some(sources) => sources.iter().map(|s| self.source_location(s)).collect(),
            None => self.discover()?,
        };
        self.collect(&sources, limit)
    }

    fn source_location(&self, source: &str) -> String {
        if is_url(source) || source.ends_with(".json") {
            return source.to_owned();
        }
        let data = self.config.paths.data_location();
        format!("{}/{}.json", data.trim_end_matches('/'), source.trim_matches('/'))
    }

    /// `.json` files below the data directory, fragments excluded.
    fn discover(&self) -> Result<Vec<String>> {
        let data = self.config.paths.data_location();
        if is_url(&data) {
            return Err(EngineError::Configuration(format!(
                "remote data location needs explicit sources: {data}"
            )));
        }

        let fragments = self.fragments.location();
        let fragments = (!is_url(fragments)).then(|| PathBuf::from(fragments));
        let files = self.source.file_list(Path::new(&data), "json")?;
        Ok(files
            .into_iter()
            .filter(|file| fragments.as_ref().is_none_or(|dir| !file.starts_with(dir)))
            .map(|file| file.to_string_lossy().into_owned())
            .collect())
    }

    pub fn document(&self, reference: &str) -> Option<&Document> {
        self.documents.get(reference)
    }

    /// Compiled data of a collected page.
    pub fn page(&self, reference: &str) -> Option<&Value> {
        self.pages.get(reference)
    }

    /// Compiled pages, sorted by reference.
    pub fn pages(&self) -> &BTreeMap<String, Value> {
        &self.pages
    }

    /// Html of a rendered page.
    pub fn rendered(&self, reference: &str) -> Option<&str> {
        self.rendered.get(reference).map(String::as_str)
    }

    pub fn directive_stats(&self) -> &DirectiveStats {
        &self.stats
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Render every collected page, returning how many were rendered.
    pub fn render_pages(&mut self, renderer: &dyn Renderer) -> Result<usize> {
        let templates = self.config.paths.templates_dir();
        let mut rendered = BTreeMap::new();

        for (reference, data) in &self.pages {
            let has_document = data.get(DOCUMENT_PROPERTY).is_some_and(Value::is_object)
                || self.documents.contains_key(reference);
            if !has_document {
                self.reporter.error(EngineError::Resolution(format!(
                    "Page has no document: {reference}"
                )))?;
                continue;
            }

            let mut candidates = template_candidates(&self.config, reference, data);
            self.plugins
                .run_template(&mut candidates, &templates, reference, data, &self.reporter)?;
            let Some(template) =
                find_template(&candidates, &self.config.render.template_ext, &*self.source)
            else {
                self.reporter.error(EngineError::Resolution(format!(
                    "No template found for page: {reference}"
                )))?;
                continue;
            };
            self.reporter
                .info(format!("{reference} -> {}", template.display()));

            let mut html = match renderer.render(&template, data) {
                Ok(html) => html,
                Err(err) => {
                    self.reporter.error(EngineError::io(
                        template.clone(),
                        err.context(format!("Failed to render {reference}")),
                    ))?;
                    continue;
                }
            };
            self.plugins.run_html(reference, &mut html, &self.reporter)?;
            rendered.insert(reference.clone(), html);
        }

        let count = rendered.len();
        self.rendered = rendered;
        Ok(count)
    }

    /// Write one document per page to `target/<reference>.<ext>`.
    ///
    /// Json documents hold the compiled page data, html documents the output
    /// of the last [`render_pages`](Self::render_pages).
    pub fn write_documents(&self, target: &Path, kind: OutputKind) -> Result<usize> {
        let mut written = 0;
        match kind {
            OutputKind::Json => {
                for (reference, data) in &self.pages {
                    let path = target.join(format!("{reference}.{}", kind.ext()));
                    let content =
                        serde_json::to_vec_pretty(data).map_err(|err| EngineError::io(&path, err))?;
                    written += usize::from(self.write_one(&path, &content)?);
                }
            }
            OutputKind::Html => {
                for (reference, html) in &self.rendered {
                    let path = target.join(format!("{reference}.{}", kind.ext()));
                    let content = match self.pages.get(reference) {
                        Some(data) if wants_minify(&self.config, data) => minify(html),
                        _ => html.as_bytes().to_vec(),
                    };
                    written += usize::from(self.write_one(&path, &content)?);
                }
            }
        }
        Ok(written)
    }

    fn write_one(&self, path: &Path, content: &[u8]) -> Result<bool> {
        match self.source.write(path, content) {
            Ok(()) => {
                self.reporter.info(format!("wrote {}", path.display()));
                Ok(true)
            }
            Err(err) => {
                self.reporter.error(err)?;
                Ok(false)
            }
        }
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("plugins", &self.plugins)
            .field("pages", &self.pages.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
