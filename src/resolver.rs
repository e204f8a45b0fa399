//! Page tree resolution.
//!
//! Turns raw page data into a compiled tree: fragment references are
//! expanded in place and every container runs its directive list once its
//! children are resolved.
//!
//! # Algorithm
//!
//! ```text
//! resolve_mapping(source, target)
//!     │
//!     ├── source[fragment_property] ──► fragment store ──► resolve_mapping(fragment, target)
//!     │                                                    (top-level directives not run)
//!     ├── for key in source
//!     │       ├── mapping  ──► fresh object ──► resolve_mapping
//!     │       ├── list     ──► fresh array, element by element
//!     │       └── scalar   ──► copied
//!     │
//!     └── target[directives_property] ──► registry.invoke per entry
//! ```
//!
//! Sibling keys are copied after the fragment merge, so they override what
//! the fragment provided. A fragment that fails to resolve is recorded in
//! the container's `__error` list and raised through the reporter.

use crate::{
    directives::{Context, DirectiveCall, DirectiveRegistry, DirectiveStats},
    document::Document,
    error::{EngineError, Result},
    fragments::FragmentStore,
};
use serde_json::{Map, Value};

/// Property collecting fragment failures on the container they happened in.
pub const ERROR_PROPERTY: &str = "__error";

/// Resolves page trees against one run's fragments and directives.
pub struct Resolver<'r, 'c> {
    context: &'r Context<'c>,
    registry: &'r DirectiveRegistry,
    fragments: &'r mut FragmentStore,
    stats: &'r mut DirectiveStats,
    /// Fragments currently being expanded, outermost first.
    stack: Vec<String>,
}

impl<'r, 'c> Resolver<'r, 'c> {
    pub fn new(
        context: &'r Context<'c>,
        registry: &'r DirectiveRegistry,
        fragments: &'r mut FragmentStore,
        stats: &'r mut DirectiveStats,
    ) -> Self {
        Self {
            context,
            registry,
            fragments,
            stats,
            stack: Vec::new(),
        }
    }

    /// Compile the root of a page, an object or an array.
    pub fn resolve_page(&mut self, source: &Value, document: &Document) -> Result<Value> {
        if !matches!(source, Value::Object(_) | Value::Array(_)) {
            return Err(EngineError::Resolution(format!(
                "page data of {} must be a JSON object or array",
                document.reference()
            )));
        }
        self.stack.clear();
        self.resolve_value(source, document)
    }

    /// Compile any value into a fresh tree.
    pub fn resolve_value(&mut self, source: &Value, document: &Document) -> Result<Value> {
        match source {
            Value::Object(map) => {
                let mut compiled = Map::new();
                self.resolve_mapping(map, &mut compiled, document, true)?;
                Ok(Value::Object(compiled))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, document))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    fn resolve_mapping(
        &mut self,
        source: &Map<String, Value>,
        target: &mut Map<String, Value>,
        document: &Document,
        run_directives: bool,
    ) -> Result<()> {
        let context = self.context;
        let resolve = &context.config.resolve;
        let marker = resolve
            .fragments
            .then_some(resolve.fragment_property.as_str());

        let expanded = match marker.and_then(|m| source.get(m)) {
            Some(reference) => self.expand_fragment(reference, target, document)?,
            None => false,
        };

        for (key, value) in source {
            if marker == Some(key.as_str()) {
                merge_marker(target, key, value, expanded);
                continue;
            }
            let compiled = self.resolve_value(value, document)?;
            target.insert(key.clone(), compiled);
        }

        if run_directives && resolve.directives {
            self.run_directives(target, document)?;
        }
        Ok(())
    }

    /// Merge the fragment named by `reference` into `target`, returning
    /// whether it was found.
    fn expand_fragment(
        &mut self,
        reference: &Value,
        target: &mut Map<String, Value>,
        document: &Document,
    ) -> Result<bool> {
        let page = document.reference();
        let name = match reference {
            value if !is_truthy(value) => return Ok(false),
            Value::String(name) => name,
            other => {
                self.fail(
                    target,
                    format!("Fragment reference must be a string, got {other} on page {page}"),
                )?;
                return Ok(false);
            }
        };

        if self.stack.iter().any(|open| open == name) {
            let chain = self.stack.join(" -> ");
            self.fail(
                target,
                format!("Circular fragment reference: {chain} -> {name} on page {page}"),
            )?;
            return Ok(false);
        }

        let context = self.context;
        let Some(fragment) = self
            .fragments
            .resolve(name, context.source, context.reporter)
        else {
            self.fail(target, format!("Fragment not found: {name} on page {page}"))?;
            return Ok(false);
        };

        self.stack.push(name.clone());
        match &fragment {
            Value::Object(map) => self.resolve_mapping(map, target, document, false)?,
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    let compiled = self.resolve_value(item, document)?;
                    target.insert(index.to_string(), compiled);
                }
            }
            _ => {
                self.stack.pop();
                self.fail(
                    target,
                    format!("Fragment {name} is not an object or array on page {page}"),
                )?;
                return Ok(false);
            }
        }
        self.stack.pop();
        Ok(true)
    }

    fn run_directives(&mut self, target: &mut Map<String, Value>, document: &Document) -> Result<()> {
        let context = self.context;
        let resolve = &context.config.resolve;
        let Some(Value::Array(entries)) = target.get(&resolve.directives_property) else {
            return Ok(());
        };
        // handlers may rewrite the container, including the list itself
        let entries = entries.clone();

        for entry in &entries {
            let Some(entry) = entry.as_str() else {
                context.reporter.warn(format!(
                    "Directive entry must be a string, got {entry} on page {}",
                    document.reference()
                ));
                continue;
            };
            let mut parts = entry.split(':');
            let name = parts.next().unwrap_or_default();
            let key = parts.next().unwrap_or_default();
            let args: Vec<&str> = parts.collect();

            if !self.registry.has(name) {
                let message = format!(
                    "Directive not defined: {name} on page {}",
                    document.reference()
                );
                if resolve.ignore_directives {
                    context.reporter.info(message);
                } else {
                    context.reporter.warn(message);
                }
                continue;
            }

            if !target.contains_key(key) {
                context.reporter.warn(format!(
                    "Directive {name} targets undefined property `{key}` on page {}",
                    document.reference()
                ));
            }

            let mut call = DirectiveCall {
                key,
                parent: target,
                document,
                context,
                args: &args,
            };
            let succeeded = self.registry.invoke(name, &mut call)?;
            self.stats.record(name, succeeded);
        }
        Ok(())
    }

    /// Record `message` on `target` and raise it.
    fn fail(&self, target: &mut Map<String, Value>, message: String) -> Result<()> {
        push_error(target, &message);
        self.context.reporter.error(EngineError::Resolution(message))
    }
}

/// Copy a literal fragment marker into `target`.
///
/// A marker already present is accumulated into a list. One whose fragment
/// was expanded is consumed.
fn merge_marker(target: &mut Map<String, Value>, key: &str, value: &Value, expanded: bool) {
    let accumulated = match target.get_mut(key) {
        Some(existing) if is_truthy(existing) => {
            match existing {
                Value::Array(list) => list.push(value.clone()),
                other => *other = Value::Array(vec![other.take(), value.clone()]),
            }
            true
        }
        _ => false,
    };
    if !accumulated && !expanded {
        target.insert(key.to_owned(), value.clone());
    }
}

fn push_error(target: &mut Map<String, Value>, message: &str) {
    let errors = target
        .entry(ERROR_PROPERTY)
        .or_insert_with(|| Value::Array(Vec::new()));
    match errors {
        Value::Array(list) => list.push(Value::String(message.to_owned())),
        other => *other = Value::Array(vec![other.take(), Value::String(message.to_owned())]),
    }
}

/// `null`, `false`, `""` and `0` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    }
}
