//! HTML attribute sets.
//!
//! [`HtmlAttributes`] turns a loose attribute description from page data
//! into a serialized attribute string for templates:
//!
//! | Input                       | Result                       |
//! |-----------------------------|------------------------------|
//! | `{"id": "x", "class": "a b"}` | `id="x" class="a b"`       |
//! | `["a", "b"]`                | `class="a b"`                |
//! | `"main"`                    | `id="main"`                  |
//!
//! `class` is always kept as a list. Attributes starting with `__` are
//! stored but never serialized.

use serde_json::{Map, Value, json};
use std::fmt;
use thiserror::Error;

/// Attributes always stored as a list of strings.
const LIST_ATTRIBUTES: &[&str] = &["class"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error("invalid attribute name")]
    InvalidName,
    #[error("invalid class value of type {0}")]
    InvalidClass(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlAttributes {
    data: Map<String, Value>,
}

impl HtmlAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an object, a class list or an id string.
    pub fn from_value(input: &Value) -> Result<Self, AttributeError> {
        let mut attributes = Self::new();
        match input {
            Value::Object(map) => {
                for (name, value) in map {
                    attributes.set(name, value.clone())?;
                }
            }
            Value::Array(_) => attributes.require("class", input.clone()),
            Value::String(id) if !id.is_empty() => attributes.require("id", input.clone()),
            _ => {}
        }
        Ok(attributes)
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<&mut Self, AttributeError> {
        if name.is_empty() {
            return Err(AttributeError::InvalidName);
        }
        let value = if LIST_ATTRIBUTES.contains(&name) {
            match value {
                Value::Array(_) => value,
                Value::String(s) => Value::Array(
                    s.split_whitespace()
                        .map(|part| Value::String(part.to_owned()))
                        .collect(),
                ),
                other => Value::Array(vec![other]),
            }
        } else {
            value
        };
        self.data.insert(name.to_owned(), value);
        Ok(self)
    }

    /// Set `name` only when it is not already present.
    fn require(&mut self, name: &str, value: Value) {
        if !self.has(name) {
            self.data.insert(name.to_owned(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Set and truthy, or set to any string.
    pub fn has(&self, name: &str) -> bool {
        match self.data.get(name) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(_) => true,
        }
    }

    /// Add one class (string) or several (array). Duplicates are ignored.
    pub fn add_class(&mut self, class: &Value) -> Result<&mut Self, AttributeError> {
        match class {
            Value::Null => {}
            Value::String(name) if name.is_empty() => {}
            Value::String(name) => {
                let list = self
                    .data
                    .entry("class")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = list {
                    if !items.iter().any(|item| item.as_str() == Some(name.as_str())) {
                        items.push(Value::String(name.clone()));
                    }
                }
            }
            Value::Array(names) => {
                for name in names {
                    self.add_class(name)?;
                }
            }
            Value::Bool(_) => return Err(AttributeError::InvalidClass("bool")),
            Value::Number(_) => return Err(AttributeError::InvalidClass("number")),
            Value::Object(_) => return Err(AttributeError::InvalidClass("object")),
        }
        Ok(self)
    }

    /// Serialized attribute string.
    pub fn to_html(&self) -> String {
        let mut parts = Vec::with_capacity(self.data.len());
        for (name, value) in &self.data {
            if name.starts_with("__") {
                continue;
            }
            let (output, quote) = match value {
                Value::Null => continue,
                Value::Bool(b) => (b.to_string(), '"'),
                Value::String(s) => (s.clone(), '"'),
                Value::Array(items) if items.iter().all(Value::is_string) => (
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(" "),
                    '"',
                ),
                other => (other.to_string(), '\''),
            };
            if output.is_empty() {
                parts.push(name.clone());
            } else {
                parts.push(format!("{name}={quote}{}{quote}", escape(&output, quote)));
            }
        }
        parts.join(" ")
    }

    /// `{ "attributes": {...}, "html": "..." }`, the form stored in page data.
    pub fn to_value(&self) -> Value {
        json!({
            "attributes": self.data,
            "html": self.to_html(),
        })
    }
}

impl fmt::Display for HtmlAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

fn escape(value: &str, quote: char) -> String {
    let value = value.replace('&', "&amp;");
    match quote {
        '"' => value.replace('"', "&quot;"),
        _ => value.replace('\'', "&#39;"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_input() {
        let attrs = HtmlAttributes::from_value(&json!({"id": "main", "class": "a  b"})).unwrap();
        assert_eq!(attrs.get("class"), Some(&json!(["a", "b"])));
        assert_eq!(attrs.to_html(), r#"id="main" class="a b""#);
    }

    #[test]
    fn test_list_input_is_class() {
        let attrs = HtmlAttributes::from_value(&json!(["btn", "primary"])).unwrap();
        assert_eq!(attrs.to_html(), r#"class="btn primary""#);
    }

    #[test]
    fn test_string_input_is_id() {
        let attrs = HtmlAttributes::from_value(&json!("hero")).unwrap();
        assert_eq!(attrs.to_string(), r#"id="hero""#);
        assert!(HtmlAttributes::from_value(&json!("")).unwrap().to_html().is_empty());
    }

    #[test]
    fn test_value_rendering() {
        let attrs = HtmlAttributes::from_value(&json!({
            "hidden": "",
            "data-on": true,
            "data-cfg": {"a": 1},
            "__private": "x",
            "title": null,
            "alt": "say \"hi\""
        }))
        .unwrap();
        assert_eq!(
            attrs.to_html(),
            r#"hidden data-on="true" data-cfg='{"a":1}' alt="say &quot;hi&quot;""#
        );
    }

    #[test]
    fn test_add_class_dedupes() {
        let mut attrs = HtmlAttributes::new();
        attrs.add_class(&json!("a")).unwrap();
        attrs.add_class(&json!(["a", "b", ""])).unwrap();
        attrs.add_class(&json!(["b", "c", "c"])).unwrap();
        assert_eq!(attrs.get("class"), Some(&json!(["a", "b", "c"])));
        assert_eq!(
            attrs.add_class(&json!(3)).unwrap_err(),
            AttributeError::InvalidClass("number")
        );
    }

    #[test]
    fn test_has() {
        let attrs = HtmlAttributes::from_value(&json!({"a": "", "b": false, "c": 0, "d": 1})).unwrap();
        assert!(attrs.has("a"));
        assert!(!attrs.has("b"));
        assert!(!attrs.has("c"));
        assert!(attrs.has("d"));
        assert!(!attrs.has("e"));
    }

    #[test]
    fn test_invalid_name() {
        let err = HtmlAttributes::from_value(&json!({"": 1})).unwrap_err();
        assert_eq!(err, AttributeError::InvalidName);
    }

    #[test]
    fn test_to_value_shape() {
        let value = HtmlAttributes::from_value(&json!("x")).unwrap().to_value();
        assert_eq!(value, json!({"attributes": {"id": "x"}, "html": "id=\"x\""}));
    }
}
