//! `isDocValue:key[:compare[:prop[:value]]]` and `navItemActive:key[:compare[:prop]]`
//!
//! Marks entries that point at the page being rendered. For every element
//! of an array (or the object itself, or else the parent container) whose
//! `compare` property equals the same field of the current document, sets
//! `prop` to `value`.
//!
//! Defaults: `compare = uri`, `prop = active`, `value = true`.
//! `navItemActive` always sets `true`.

use super::{Directive, DirectiveCall};
use anyhow::{Result, anyhow};
use serde_json::{Map, Value};

pub struct IsDocValue {
    fixed: Option<Value>,
}

impl IsDocValue {
    /// Value taken from the fourth argument.
    pub const fn configurable() -> Self {
        Self { fixed: None }
    }

    /// Always sets `value`, ignoring a fourth argument.
    pub const fn fixed(value: Value) -> Self {
        Self { fixed: Some(value) }
    }

    fn value(&self, arg: Option<&str>) -> Value {
        match (&self.fixed, arg) {
            (Some(fixed), _) => fixed.clone(),
            (None, Some(raw)) => parse_scalar(raw),
            (None, None) => Value::Bool(true),
        }
    }
}

impl Directive for IsDocValue {
    fn apply(&self, call: &mut DirectiveCall<'_>) -> Result<()> {
        let compare = call.arg(0).unwrap_or("uri").to_owned();
        let prop = call.arg(1).unwrap_or("active").to_owned();
        let value = self.value(call.arg(2));
        let current = call
            .document
            .field(&compare)
            .ok_or_else(|| anyhow!("document has no field `{compare}`"))?;

        let mark = |item: &mut Map<String, Value>| {
            if item.get(&compare).and_then(Value::as_str) == Some(current) {
                item.insert(prop.clone(), value.clone());
            }
        };

        match call.parent.get_mut(call.key) {
            Some(Value::Array(items)) => items
                .iter_mut()
                .filter_map(Value::as_object_mut)
                .for_each(mark),
            Some(Value::Object(item)) => mark(item),
            _ => mark(call.parent),
        }
        Ok(())
    }
}

/// `true`, `false`, `null` and numbers as JSON, anything else as a string.
fn parse_scalar(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if !value.is_object() && !value.is_array() => value,
        _ => Value::String(raw.to_owned()),
    }
}
