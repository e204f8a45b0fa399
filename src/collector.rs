//! Page collection: one data source in, one compiled page out.
//!
//! ```text
//! Document ──► limit? ──► doc hooks ──► load json ──► resolve ──► + document ──► data hooks
//!              (skip)                   (io error)                (empty: error)
//! ```
//!
//! With loader hooks registered the default path is bypassed: every loader
//! sees the source and fills the page slot itself.

use crate::{
    directives::{Context, DirectiveRegistry, DirectiveStats},
    document::Document,
    error::{EngineError, Result},
    fragments::FragmentStore,
    plugins::{HookKind, Plugins},
    resolver::Resolver,
};
use serde_json::Value;

/// Property of compiled pages holding their document.
pub const DOCUMENT_PROPERTY: &str = "document";

/// A compiled page and its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub reference: String,
    pub data: Value,
}

/// Outcome of collecting one source.
#[derive(Debug)]
pub enum Collected {
    Page(LoadedPage),
    /// Filtered out by the limit list, or nothing loaded.
    Skipped,
    /// Data could not be loaded, run is lenient.
    Failed,
}

/// Counts of one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub collected: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CollectSummary {
    pub fn record(&mut self, collected: &Collected) {
        match collected {
            Collected::Page(_) => self.collected += 1,
            Collected::Skipped => self.skipped += 1,
            Collected::Failed => self.failed += 1,
        }
    }
}

pub struct Collector<'r, 'c> {
    context: &'r Context<'c>,
    registry: &'r DirectiveRegistry,
    plugins: &'r Plugins,
    fragments: &'r mut FragmentStore,
    stats: &'r mut DirectiveStats,
}

impl<'r, 'c> Collector<'r, 'c> {
    pub fn new(
        context: &'r Context<'c>,
        registry: &'r DirectiveRegistry,
        plugins: &'r Plugins,
        fragments: &'r mut FragmentStore,
        stats: &'r mut DirectiveStats,
    ) -> Self {
        Self {
            context,
            registry,
            plugins,
            fragments,
            stats,
        }
    }

    pub fn collect(&mut self, document: &Document, limit: &[String]) -> Result<Collected> {
        if self.plugins.has(HookKind::Loader) {
            return self.collect_with_loaders(document, limit);
        }

        let reference = document.reference();
        if !limit.is_empty() && !limit.iter().any(|r| r == reference) {
            return Ok(Collected::Skipped);
        }

        let reporter = self.context.reporter;
        self.plugins.run_doc(reference, document, reporter)?;

        let raw = match self.context.source.load_json(document.source()) {
            Ok(raw) => raw,
            Err(err) => {
                reporter.error(err)?;
                return Ok(Collected::Failed);
            }
        };

        let mut resolver = Resolver::new(self.context, self.registry, self.fragments, self.stats);
        let mut data = resolver.resolve_page(&raw, document)?;
        if !page_has_content(&data) {
            return Err(EngineError::Resolution(format!(
                "Page data is empty: {reference}"
            )));
        }
        // Array roots carry no document property.
        if let Value::Object(map) = &mut data {
            map.insert(DOCUMENT_PROPERTY.to_owned(), document.to_value());
        }

        self.plugins.run_data(reference, &mut data, reporter)?;

        Ok(Collected::Page(LoadedPage {
            reference: reference.to_owned(),
            data,
        }))
    }

    fn collect_with_loaders(&self, document: &Document, limit: &[String]) -> Result<Collected> {
        let mut slot = None;
        self.plugins
            .run_loader(document.source(), limit, self.context, &mut slot)?;

        match slot {
            Some(page) if page_has_content(&page.data) => Ok(Collected::Page(page)),
            Some(page) => Err(EngineError::Resolution(format!(
                "Page data is empty: {}",
                page.reference
            ))),
            None => {
                if limit.is_empty() {
                    self.context.reporter.warn(format!(
                        "No page data loaded from: {}",
                        document.source()
                    ));
                }
                Ok(Collected::Skipped)
            }
        }
    }
}

fn page_has_content(data: &Value) -> bool {
    match data {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}
