//! `tagAttributes:key[:read[:write]]`
//!
//! Converts attribute descriptions into [`HtmlAttributes`] objects.
//!
//! - an array of objects: each element's `read` property (default
//!   `attributes`) is converted and stored under `write` (default `read`)
//! - an object, a list of class names or an id string: converted and stored
//!   in `parent[write]`, `write` defaulting to `read`, then to `key`

use super::{Directive, DirectiveCall};
use crate::attributes::HtmlAttributes;
use anyhow::{Context, Result};
use serde_json::Value;

pub struct TagAttributes;

impl Directive for TagAttributes {
    fn apply(&self, call: &mut DirectiveCall<'_>) -> Result<()> {
        let read = call.arg(0);
        let write = call.arg(1);
        let key = call.key;

        match call.value_mut() {
            Some(Value::Array(items)) if !is_class_list(items) => {
                let read = read.unwrap_or("attributes");
                let write = write.unwrap_or(read);
                for item in items.iter_mut().filter_map(Value::as_object_mut) {
                    if let Some(input @ Value::Object(_)) = item.get(read) {
                        let converted = convert(input)?;
                        item.insert(write.to_owned(), converted);
                    }
                }
            }
            Some(input @ (Value::Object(_) | Value::Array(_) | Value::String(_))) => {
                let converted = convert(input)?;
                let write = write.or(read).unwrap_or(key);
                call.parent.insert(write.to_owned(), converted);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Non-empty list of strings, read as class names.
fn is_class_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_string)
}

fn convert(input: &Value) -> Result<Value> {
    let attributes =
        HtmlAttributes::from_value(input).context("failed to construct attributes")?;
    Ok(attributes.to_value())
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_in_place() {
        let fixture = Fixture::new("index");
        let mut parent = json!({"attrs": {"id": "a", "class": "x y"}});
        fixture.apply(&TagAttributes, &mut parent, "attrs", &[]).unwrap();
        assert_eq!(parent["attrs"]["html"], r#"id="a" class="x y""#);
        assert_eq!(parent["attrs"]["attributes"]["class"], json!(["x", "y"]));
    }

    #[test]
    fn test_object_to_other_property() {
        let fixture = Fixture::new("index");
        let mut parent = json!({"attrs": "hero"});
        fixture
            .apply(&TagAttributes, &mut parent, "attrs", &["", "hero_attrs"])
            .unwrap();
        assert_eq!(parent["attrs"], "hero");
        assert_eq!(parent["hero_attrs"]["html"], r#"id="hero""#);
    }

    #[test]
    fn test_class_list() {
        let fixture = Fixture::new("index");
        let mut parent = json!({"classes": ["btn", "wide"]});
        fixture.apply(&TagAttributes, &mut parent, "classes", &[]).unwrap();
        assert_eq!(parent["classes"]["html"], r#"class="btn wide""#);
    }

    #[test]
    fn test_array_elements() {
        let fixture = Fixture::new("index");
        let mut parent = json!({"links": [
            {"attributes": {"href": "/a"}},
            {"attributes": "skip"},
            {"label": "none"}
        ]});
        fixture.apply(&TagAttributes, &mut parent, "links", &[]).unwrap();
        assert_eq!(parent["links"][0]["attributes"]["html"], r#"href="/a""#);
        assert_eq!(parent["links"][1]["attributes"], "skip");
        assert!(parent["links"][2].get("attributes").is_none());
    }

    #[test]
    fn test_array_read_write() {
        let fixture = Fixture::new("index");
        let mut parent = json!({"links": [{"a": {"rel": "next"}}]});
        fixture
            .apply(&TagAttributes, &mut parent, "links", &["a", "attrs"])
            .unwrap();
        assert_eq!(parent["links"][0]["attrs"]["html"], r#"rel="next""#);
        assert_eq!(parent["links"][0]["a"], json!({"rel": "next"}));
    }

    #[test]
    fn test_invalid_input_fails() {
        let fixture = Fixture::new("index");
        let mut parent = json!({"attrs": {"": "x"}});
        assert!(fixture.apply(&TagAttributes, &mut parent, "attrs", &[]).is_err());
    }
}
