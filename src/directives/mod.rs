//! Directives: small named transformations run on a resolved container.
//!
//! A container lists its directives under the directives property:
//!
//! ```json
//! { "nav": [...], "__directives": ["isDocValue:nav", "sort:tags:desc"] }
//! ```
//!
//! Each entry is `name:property[:arg...]`. The handler receives the
//! container, the property name and the arguments, and may only change
//! `container[property]`.
//!
//! # Registration
//!
//! Handlers are registered under `directive_prefix + name`. Several
//! handlers may share a name; they run in registration order and
//! [`DirectiveRegistry::invoke`] reports how many of them succeeded.

mod image_data;
mod is_doc_value;
mod set_from_doc;
mod sort;
mod tag_attributes;

pub use image_data::{ImageData, ImageProber, MimeDetector};
pub use is_doc_value::IsDocValue;
pub use set_from_doc::SetFromDoc;
pub use sort::Sort;
pub use tag_attributes::TagAttributes;

use crate::{
    config::Config,
    document::{Document, DocumentIndex},
    error::{EngineError, Result},
    io::DataSource,
    report::Reporter,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Names accepted in `resolve.builtin_directives`, besides `"all"`.
pub const BUILTIN_DIRECTIVES: &[&str] = &[
    "setFromDoc",
    "isDocValue",
    "navItemActive",
    "sort",
    "tagAttributes",
    "imageData",
];

/// Run-wide state handed to directives.
pub struct Context<'a> {
    pub config: &'a Config,
    pub documents: &'a DocumentIndex,
    pub reporter: &'a Reporter,
    pub source: &'a dyn DataSource,
}

impl Context<'_> {
    /// Document of a collected page.
    pub fn document(&self, reference: &str) -> Option<&Document> {
        self.documents.get(reference)
    }
}

/// One directive invocation.
pub struct DirectiveCall<'a> {
    /// Property the directive targets.
    pub key: &'a str,
    /// Container holding the property, already resolved.
    pub parent: &'a mut Map<String, Value>,
    /// Document of the page being resolved.
    pub document: &'a Document,
    pub context: &'a Context<'a>,
    pub args: &'a [&'a str],
}

impl<'a> DirectiveCall<'a> {
    /// Current value of the target property.
    pub fn value(&self) -> Option<&Value> {
        self.parent.get(self.key)
    }

    pub fn value_mut(&mut self) -> Option<&mut Value> {
        self.parent.get_mut(self.key)
    }

    /// Positional argument, `None` when absent or empty.
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied().filter(|arg| !arg.is_empty())
    }
}

pub trait Directive {
    fn apply(&self, call: &mut DirectiveCall<'_>) -> anyhow::Result<()>;
}

impl<F> Directive for F
where
    F: Fn(&mut DirectiveCall<'_>) -> anyhow::Result<()>,
{
    fn apply(&self, call: &mut DirectiveCall<'_>) -> anyhow::Result<()> {
        self(call)
    }
}

// ============================================================================
// Registry
// ============================================================================

pub struct DirectiveRegistry {
    prefix: String,
    allowed: Option<FxHashSet<String>>,
    handlers: FxHashMap<String, Vec<Box<dyn Directive>>>,
}

impl DirectiveRegistry {
    /// Registry qualifying names with `prefix`. A non-empty `allowed` list
    /// restricts which names may be registered.
    pub fn new(prefix: impl Into<String>, allowed: &[String]) -> Self {
        Self {
            prefix: prefix.into(),
            allowed: (!allowed.is_empty()).then(|| allowed.iter().cloned().collect()),
            handlers: FxHashMap::default(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Re-key every registration under a new prefix.
    pub fn set_prefix(&mut self, prefix: &str) {
        if prefix == self.prefix {
            return;
        }
        let old = std::mem::take(&mut self.handlers);
        self.handlers = old
            .into_iter()
            .map(|(qualified, handlers)| {
                let name = qualified
                    .strip_prefix(self.prefix.as_str())
                    .unwrap_or(&qualified)
                    .to_owned();
                (format!("{prefix}{name}"), handlers)
            })
            .collect();
        self.prefix = prefix.to_owned();
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.as_ref().is_none_or(|allowed| allowed.contains(name))
    }

    pub fn register(&mut self, name: &str, directive: impl Directive + 'static) -> Result<()> {
        self.check(name)?;
        self.push(name, Box::new(directive));
        Ok(())
    }

    fn push(&mut self, name: &str, directive: Box<dyn Directive>) {
        self.handlers
            .entry(self.qualify(name))
            .or_default()
            .push(directive);
    }

    fn check(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.contains(':') {
            return Err(EngineError::Configuration(format!(
                "invalid directive name: `{name}`"
            )));
        }
        if !self.is_allowed(name) {
            return Err(EngineError::Configuration(format!(
                "directive not allowed: {name}"
            )));
        }
        Ok(())
    }

    /// [`register`](Self::register) for closures.
    pub fn register_fn<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn(&mut DirectiveCall<'_>) -> anyhow::Result<()> + 'static,
    {
        self.register(name, f)
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(&self.qualify(name))
    }

    /// Registered names without prefix, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .handlers
            .keys()
            .map(|q| q.strip_prefix(self.prefix.as_str()).unwrap_or(q))
            .collect();
        names.sort_unstable();
        names
    }

    /// Run every handler registered under `name`, returning how many succeeded.
    ///
    /// A failing handler is raised through the reporter: fatal in strict
    /// mode, logged and not counted otherwise.
    pub fn invoke(&self, name: &str, call: &mut DirectiveCall<'_>) -> Result<usize> {
        let Some(handlers) = self.handlers.get(&self.qualify(name)) else {
            return Ok(0);
        };
        let mut succeeded = 0;
        for handler in handlers {
            match handler.apply(call) {
                Ok(()) => succeeded += 1,
                Err(err) => call.context.reporter.error(EngineError::directive_with(
                    format!("{name}@{} on page {}", call.key, call.document.reference()),
                    err,
                ))?,
            }
        }
        Ok(succeeded)
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

impl std::fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("prefix", &self.prefix)
            .field("names", &self.names())
            .finish()
    }
}

/// Register the built-in directives named in `names`; `"all"` selects every one.
///
/// With `"all"`, built-ins outside the allow-list are skipped. Naming one
/// explicitly that is not allowed is an error.
pub fn register_builtins(registry: &mut DirectiveRegistry, names: &[String]) -> Result<()> {
    let all = names.iter().any(|name| name == "all");
    if let Some(unknown) = names
        .iter()
        .find(|name| *name != "all" && builtin(name).is_none())
    {
        return Err(EngineError::Configuration(format!(
            "unknown built-in directive: {unknown}"
        )));
    }

    for &name in BUILTIN_DIRECTIVES {
        let selected = if all {
            registry.is_allowed(name)
        } else {
            names.iter().any(|n| n == name)
        };
        if let Some(directive) = builtin(name).filter(|_| selected) {
            registry.check(name)?;
            registry.push(name, directive);
        }
    }
    Ok(())
}

fn builtin(name: &str) -> Option<Box<dyn Directive>> {
    let directive: Box<dyn Directive> = match name {
        "setFromDoc" => Box::new(SetFromDoc),
        "isDocValue" => Box::new(IsDocValue::configurable()),
        "navItemActive" => Box::new(IsDocValue::fixed(Value::Bool(true))),
        "sort" => Box::new(Sort),
        "tagAttributes" => Box::new(TagAttributes),
        "imageData" => Box::new(ImageData::with_image_crate()),
        _ => return None,
    };
    Some(directive)
}

// ============================================================================
// Statistics
// ============================================================================

/// Successful invocations per directive name over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveStats(BTreeMap<String, usize>);

impl DirectiveStats {
    pub fn record(&mut self, name: &str, succeeded: usize) {
        *self.0.entry(name.to_owned()).or_default() += succeeded;
    }

    pub fn get(&self, name: &str) -> usize {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Shared helpers for built-ins
// ============================================================================

/// Elements of an array value, or nothing.
pub(crate) fn objects_mut(value: Option<&mut Value>) -> impl Iterator<Item = &mut Map<String, Value>> {
    value
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;
    use serde_json::json;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_register_and_has() {
        let mut registry = DirectiveRegistry::new("", &[]);
        registry.register_fn("upper", |_| Ok(())).unwrap();
        assert!(registry.has("upper"));
        assert!(!registry.has("lower"));
    }

    #[test]
    fn test_allow_list() {
        let mut registry = DirectiveRegistry::new("", &["sort".to_string()]);
        assert!(registry.register_fn("sort", |_| Ok(())).is_ok());
        let err = registry.register_fn("other", |_| Ok(())).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_invalid_names() {
        let mut registry = DirectiveRegistry::new("", &[]);
        assert!(registry.register_fn("", |_| Ok(())).is_err());
        assert!(registry.register_fn("a:b", |_| Ok(())).is_err());
    }

    #[test]
    fn test_prefix_qualifies_names() {
        let mut registry = DirectiveRegistry::new("site.", &[]);
        registry.register_fn("mark", |_| Ok(())).unwrap();
        assert!(registry.has("mark"));
        assert_eq!(registry.names(), vec!["mark"]);

        registry.set_prefix("other_");
        assert!(registry.has("mark"));
        assert_eq!(registry.prefix(), "other_");
    }

    #[test]
    fn test_invoke_runs_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = DirectiveRegistry::new("", &[]);
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            registry
                .register_fn("mark", move |call| {
                    seen.borrow_mut().push(tag);
                    call.parent.insert(call.key.to_owned(), json!(tag));
                    Ok(())
                })
                .unwrap();
        }

        let fixture = Fixture::new("index");
        let context = fixture.context();
        let mut parent = Map::new();
        let mut call = DirectiveCall {
            key: "x",
            parent: &mut parent,
            document: &fixture.document,
            context: &context,
            args: &[],
        };
        assert_eq!(registry.invoke("mark", &mut call).unwrap(), 2);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(parent["x"], "second");
    }

    #[test]
    fn test_failing_handler_lenient_not_counted() {
        let mut registry = DirectiveRegistry::new("", &[]);
        registry.register_fn("flaky", |_| anyhow::bail!("nope")).unwrap();
        registry.register_fn("flaky", |_| Ok(())).unwrap();

        let fixture = Fixture::with("index", |c| c.report.strict = false);
        let context = fixture.context();
        let mut parent = Map::new();
        let mut call = DirectiveCall {
            key: "x",
            parent: &mut parent,
            document: &fixture.document,
            context: &context,
            args: &[],
        };
        assert_eq!(registry.invoke("flaky", &mut call).unwrap(), 1);
        assert_eq!(fixture.reporter.errors(), 1);
    }

    #[test]
    fn test_failing_handler_strict_aborts() {
        let mut registry = DirectiveRegistry::new("", &[]);
        registry.register_fn("flaky", |_| anyhow::bail!("nope")).unwrap();

        let fixture = Fixture::new("index");
        let context = fixture.context();
        let mut parent = Map::new();
        let mut call = DirectiveCall {
            key: "x",
            parent: &mut parent,
            document: &fixture.document,
            context: &context,
            args: &[],
        };
        let err = registry.invoke("flaky", &mut call).unwrap_err();
        assert!(matches!(err, EngineError::Directive { .. }));
        assert!(err.chain().ends_with("nope"));
    }

    #[test]
    fn test_builtins_all() {
        let mut registry = DirectiveRegistry::new("", &[]);
        register_builtins(&mut registry, &["all".to_string()]).unwrap();
        for name in BUILTIN_DIRECTIVES {
            assert!(registry.has(name), "{name}");
        }
    }

    #[test]
    fn test_builtins_all_respects_allow_list() {
        let mut registry = DirectiveRegistry::new("", &["sort".to_string()]);
        register_builtins(&mut registry, &["all".to_string()]).unwrap();
        assert_eq!(registry.names(), vec!["sort"]);
    }

    #[test]
    fn test_builtins_selected_and_unknown() {
        let mut registry = DirectiveRegistry::new("", &[]);
        register_builtins(&mut registry, &["sort".to_string()]).unwrap();
        assert_eq!(registry.names(), vec!["sort"]);

        let result = register_builtins(&mut registry, &["bogus".to_string()]);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = DirectiveStats::default();
        stats.record("sort", 1);
        stats.record("sort", 2);
        stats.record("isDocValue", 0);
        assert_eq!(stats.get("sort"), 3);
        assert_eq!(stats.get("isDocValue"), 0);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.iter().count(), 2);
    }
}
