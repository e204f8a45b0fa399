//! `sort:key[:prop[:direction]]`
//!
//! - arrays sort by element value, or by the element property `prop`
//! - objects are reordered by key, or by value when `prop` is `value`
//! - `direction` is `asc` (default) or `desc`, and may take the place of
//!   `prop`: `sort:tags:desc`
//!
//! Values of different types order as null, bool, number, string, array,
//! object.

use super::{Directive, DirectiveCall};
use anyhow::Result;
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub struct Sort;

impl Directive for Sort {
    fn apply(&self, call: &mut DirectiveCall<'_>) -> Result<()> {
        let (prop, direction) = match call.arg(0) {
            Some(dir @ ("asc" | "desc")) => (None, Some(dir)),
            prop => (prop, call.arg(1)),
        };
        let descending = match direction {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => {
                call.context.reporter.warn(format!(
                    "sort: unknown direction `{other}` for {}, using asc",
                    call.key
                ));
                false
            }
        };
        let prop = prop.map(str::to_owned);
        let reporter = call.context.reporter;
        let key = call.key;

        match call.value_mut() {
            Some(Value::Array(items)) => {
                match &prop {
                    Some(prop) => items.sort_by(|a, b| compare(a.get(prop), b.get(prop))),
                    None => items.sort_by(|a, b| compare(Some(a), Some(b))),
                }
                if descending {
                    items.reverse();
                }
            }
            Some(Value::Object(map)) => {
                let by_value = prop.as_deref() == Some("value");
                let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
                if by_value {
                    entries.sort_by(|a, b| compare(Some(&a.1), Some(&b.1)));
                } else {
                    entries.sort_by(|a, b| a.0.cmp(&b.0));
                }
                if descending {
                    entries.reverse();
                }
                *map = entries.into_iter().collect::<Map<String, Value>>();
            }
            Some(other) => reporter.warn(format!(
                "sort: can't sort value of type {} at {key}",
                type_name(other)
            )),
            None => reporter.warn(format!("sort: nothing to sort at {key}")),
        }
        Ok(())
    }
}

/// Total order over optional JSON values, missing sorting first.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare(Some(x), Some(y)))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => rank(a).cmp(&rank(b)),
    }
}

const fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
