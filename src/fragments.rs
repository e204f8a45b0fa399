//! Named, reusable JSON snippets.
//!
//! Fragments live as `<name>.json` below the fragments location, which is a
//! local directory or an `http(s)://` base url. Each name is loaded at most
//! once per run; failures are cached as well. Callers always get their own
//! deep copy, never the cached value.

use crate::{
    io::{DataSource, is_url},
    report::Reporter,
};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::path::{Component, Path};

#[derive(Debug)]
pub struct FragmentStore {
    location: String,
    cache: FxHashMap<String, Option<Value>>,
}

impl FragmentStore {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            cache: FxHashMap::default(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Copy of fragment `name`, `None` when it cannot be loaded.
    pub fn resolve(
        &mut self,
        name: &str,
        source: &dyn DataSource,
        reporter: &Reporter,
    ) -> Option<Value> {
        if !self.cache.contains_key(name) {
            let loaded = self.load(name, source, reporter);
            self.cache.insert(name.to_owned(), loaded);
        }
        self.cache.get(name).and_then(Clone::clone)
    }

    /// Whether a load attempt for `name` was already made.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Forget every loaded fragment.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn load(&self, name: &str, source: &dyn DataSource, reporter: &Reporter) -> Option<Value> {
        if !is_valid_name(name) {
            reporter.warn(format!("Invalid fragment name: {name}"));
            return None;
        }
        if is_url(&self.location) {
            let url = format!("{}/{name}.json", self.location.trim_end_matches('/'));
            return match source.remote_json(&url) {
                Ok(value) if is_structured(&value) => Some(value),
                Ok(_) => {
                    reporter.warn(format!("Fragment is empty or not structured: {url}"));
                    None
                }
                Err(err) => {
                    reporter.warn(format!("Failed to fetch fragment: {}", err.chain()));
                    None
                }
            };
        }

        let path = Path::new(&self.location).join(format!("{name}.json"));
        if !source.exists(&path) {
            reporter.info(format!("Fragment not found: {}", path.display()));
            return None;
        }
        match source.read_json(&path) {
            Ok(value) => Some(value),
            Err(err) => {
                reporter.warn(format!("Failed to load fragment: {}", err.chain()));
                None
            }
        }
    }
}

/// Relative name that stays below the fragments location.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Non-empty object or array.
fn is_structured(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}
