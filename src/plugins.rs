//! Plugins: named bundles of hook handlers.
//!
//! A [`Plugin`] declares the hooks it provides as capabilities and supplies
//! one handler per capability:
//!
//! ```ignore
//! let plugin = Plugin::new("stamp", &[HookKind::Data])
//!     .on_data(|reference, data| {
//!         data["stamp"] = reference.into();
//!         Ok(())
//!     });
//! ```
//!
//! | Hook       | Runs                                  | May change              |
//! |------------|---------------------------------------|-------------------------|
//! | `setup`    | once, before the config is frozen     | config, directives      |
//! | `doc`      | per page, before its data is loaded   | nothing                 |
//! | `data`     | per page, after its tree is compiled  | page data               |
//! | `template` | per page, before template lookup      | template candidates     |
//! | `html`     | per page, after rendering             | rendered html           |
//! | `loader`   | per source, replacing the default     | the loaded page         |
//!
//! Registrants of one hook run in registration order. A failing handler is
//! raised through the reporter and not counted.

use crate::{
    collector::LoadedPage,
    config::ConfigBuilder,
    directives::{Context, DirectiveRegistry},
    document::Document,
    error::{EngineError, Result},
    report::Reporter,
};
use anyhow::Result as HookResult;
use serde_json::Value;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookKind {
    Setup,
    Doc,
    Data,
    Template,
    Html,
    Loader,
}

impl HookKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Doc => "doc",
            Self::Data => "data",
            Self::Template => "template",
            Self::Html => "html",
            Self::Loader => "loader",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type SetupHook = Box<dyn Fn(&mut ConfigBuilder, &mut DirectiveRegistry) -> HookResult<()>>;
pub type DocHook = Box<dyn Fn(&str, &Document) -> HookResult<()>>;
pub type DataHook = Box<dyn Fn(&str, &mut Value) -> HookResult<()>>;
/// `(candidates, templates dir, reference, page data)`
pub type TemplateHook = Box<dyn Fn(&mut Vec<PathBuf>, &Path, &str, &Value) -> HookResult<()>>;
pub type HtmlHook = Box<dyn Fn(&str, &mut String) -> HookResult<()>>;
/// `(source, limit, context, slot)`, the slot holds whatever earlier loaders produced.
pub type LoaderHook =
    Box<dyn Fn(&str, &[String], &Context<'_>, &mut Option<LoadedPage>) -> HookResult<()>>;

/// One typed handler.
pub enum Hook {
    Setup(SetupHook),
    Doc(DocHook),
    Data(DataHook),
    Template(TemplateHook),
    Html(HtmlHook),
    Loader(LoaderHook),
}

impl Hook {
    pub const fn kind(&self) -> HookKind {
        match self {
            Self::Setup(_) => HookKind::Setup,
            Self::Doc(_) => HookKind::Doc,
            Self::Data(_) => HookKind::Data,
            Self::Template(_) => HookKind::Template,
            Self::Html(_) => HookKind::Html,
            Self::Loader(_) => HookKind::Loader,
        }
    }
}

// ============================================================================
// Plugin
// ============================================================================

pub struct Plugin {
    name: String,
    capabilities: BTreeSet<HookKind>,
    handlers: BTreeMap<HookKind, Hook>,
}

impl Plugin {
    pub fn new(name: impl Into<String>, capabilities: &[HookKind]) -> Self {
        Self {
            name: name.into(),
            capabilities: capabilities.iter().copied().collect(),
            handlers: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> impl Iterator<Item = HookKind> + '_ {
        self.capabilities.iter().copied()
    }

    /// Set the handler for its hook kind, replacing an earlier one.
    pub fn handler(mut self, hook: Hook) -> Self {
        self.handlers.insert(hook.kind(), hook);
        self
    }

    pub fn on_setup<F>(self, f: F) -> Self
    where
        F: Fn(&mut ConfigBuilder, &mut DirectiveRegistry) -> HookResult<()> + 'static,
    {
        self.handler(Hook::Setup(Box::new(f)))
    }

    pub fn on_doc<F>(self, f: F) -> Self
    where
        F: Fn(&str, &Document) -> HookResult<()> + 'static,
    {
        self.handler(Hook::Doc(Box::new(f)))
    }

    pub fn on_data<F>(self, f: F) -> Self
    where
        F: Fn(&str, &mut Value) -> HookResult<()> + 'static,
    {
        self.handler(Hook::Data(Box::new(f)))
    }

    pub fn on_template<F>(self, f: F) -> Self
    where
        F: Fn(&mut Vec<PathBuf>, &Path, &str, &Value) -> HookResult<()> + 'static,
    {
        self.handler(Hook::Template(Box::new(f)))
    }

    pub fn on_html<F>(self, f: F) -> Self
    where
        F: Fn(&str, &mut String) -> HookResult<()> + 'static,
    {
        self.handler(Hook::Html(Box::new(f)))
    }

    pub fn on_loader<F>(self, f: F) -> Self
    where
        F: Fn(&str, &[String], &Context<'_>, &mut Option<LoadedPage>) -> HookResult<()> + 'static,
    {
        self.handler(Hook::Loader(Box::new(f)))
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

// ============================================================================
// Registry
// ============================================================================

struct Registrant {
    plugin: String,
    hook: Hook,
}

/// Registered plugins, handlers grouped by hook.
#[derive(Default)]
pub struct Plugins {
    names: Vec<String>,
    hooks: BTreeMap<HookKind, Vec<Registrant>>,
}

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handlers of every declared capability.
    ///
    /// Handlers for hooks the plugin does not declare are dropped.
    pub fn register(&mut self, plugin: Plugin) -> Result<()> {
        let Plugin {
            name,
            capabilities,
            mut handlers,
        } = plugin;

        if name.trim().is_empty() {
            return Err(EngineError::Configuration(
                "plugin name must not be empty".into(),
            ));
        }
        if self.exists(&name) {
            return Err(EngineError::Configuration(format!(
                "plugin `{name}` already registered"
            )));
        }
        if capabilities.is_empty() {
            return Err(EngineError::Configuration(format!(
                "plugin `{name}` declares no capabilities"
            )));
        }
        if let Some(missing) = capabilities.iter().find(|kind| !handlers.contains_key(*kind)) {
            return Err(EngineError::Configuration(format!(
                "plugin `{name}` declares `{missing}` without a handler"
            )));
        }

        for kind in &capabilities {
            if let Some(hook) = handlers.remove(kind) {
                self.hooks.entry(*kind).or_default().push(Registrant {
                    plugin: name.clone(),
                    hook,
                });
            }
        }
        self.names.push(name);
        Ok(())
    }

    /// Whether any plugin handles `kind`.
    pub fn has(&self, kind: HookKind) -> bool {
        self.hooks.get(&kind).is_some_and(|list| !list.is_empty())
    }

    /// Whether a plugin named `name` is registered.
    pub fn exists(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Plugin names in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn run_setup(
        &self,
        config: &mut ConfigBuilder,
        registry: &mut DirectiveRegistry,
        reporter: &Reporter,
    ) -> Result<usize> {
        self.run(HookKind::Setup, reporter, |hook| match hook {
            Hook::Setup(f) => Some(f(config, registry)),
            _ => None,
        })
    }

    pub fn run_doc(&self, reference: &str, document: &Document, reporter: &Reporter) -> Result<usize> {
        self.run(HookKind::Doc, reporter, |hook| match hook {
            Hook::Doc(f) => Some(f(reference, document)),
            _ => None,
        })
    }

    pub fn run_data(&self, reference: &str, data: &mut Value, reporter: &Reporter) -> Result<usize> {
        self.run(HookKind::Data, reporter, |hook| match hook {
            Hook::Data(f) => Some(f(reference, data)),
            _ => None,
        })
    }

    pub fn run_template(
        &self,
        candidates: &mut Vec<PathBuf>,
        templates: &Path,
        reference: &str,
        data: &Value,
        reporter: &Reporter,
    ) -> Result<usize> {
        self.run(HookKind::Template, reporter, |hook| match hook {
            Hook::Template(f) => Some(f(candidates, templates, reference, data)),
            _ => None,
        })
    }

    pub fn run_html(&self, reference: &str, html: &mut String, reporter: &Reporter) -> Result<usize> {
        self.run(HookKind::Html, reporter, |hook| match hook {
            Hook::Html(f) => Some(f(reference, html)),
            _ => None,
        })
    }

    pub fn run_loader(
        &self,
        source: &str,
        limit: &[String],
        context: &Context<'_>,
        slot: &mut Option<LoadedPage>,
    ) -> Result<usize> {
        self.run(HookKind::Loader, context.reporter, |hook| match hook {
            Hook::Loader(f) => Some(f(source, limit, context, slot)),
            _ => None,
        })
    }

    fn run<F>(&self, kind: HookKind, reporter: &Reporter, mut call: F) -> Result<usize>
    where
        F: FnMut(&Hook) -> Option<HookResult<()>>,
    {
        let mut succeeded = 0;
        for registrant in self.hooks.get(&kind).into_iter().flatten() {
            match call(&registrant.hook) {
                Some(Ok(())) => succeeded += 1,
                Some(Err(err)) => reporter.error(EngineError::directive_with(
                    format!("Failed to run: {}@{kind}", registrant.plugin),
                    err,
                ))?,
                None => {}
            }
        }
        Ok(succeeded)
    }
}

impl fmt::Debug for Plugins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugins")
            .field("names", &self.names)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
