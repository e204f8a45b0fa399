//! `setFromDoc:key[:read[:write[:field]]]`
//!
//! Treats a value as a page reference and replaces it with a field of that
//! page's document, typically turning `"blog/post1"` into its uri.
//!
//! - `read` defaults to `uri`, `write` to `read`, `field` to `write`
//! - on an array, every element's `read` property is looked up and the
//!   result is stored in that element's `write` property
//! - otherwise the value itself is looked up and stored in `parent[write]`
//!
//! Absolute urls, absolute paths and `#fragment` links are left alone.

use super::{Context, Directive, DirectiveCall, objects_mut};
use anyhow::{Result, bail};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Scheme (`https:`, `mailto:`), root-absolute path or in-page anchor.
static RE_ABSOLUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.-]*:|/|#)").unwrap());

pub struct SetFromDoc;

impl Directive for SetFromDoc {
    fn apply(&self, call: &mut DirectiveCall<'_>) -> Result<()> {
        let read = call.arg(0).unwrap_or("uri").to_owned();
        let write = call.arg(1).unwrap_or(&read).to_owned();
        let field = call.arg(2).unwrap_or(&write).to_owned();
        let context = call.context;

        if call.value().is_some_and(Value::is_array) {
            for item in objects_mut(call.value_mut()) {
                if let Some(found) = lookup(item.get(&read), &field, context)? {
                    item.insert(write.clone(), Value::String(found));
                }
            }
            return Ok(());
        }

        if let Some(found) = lookup(call.value(), &field, context)? {
            call.parent.insert(write, Value::String(found));
        }
        Ok(())
    }
}

/// Field `field` of the page referenced by `value`.
///
/// `Ok(None)` when nothing should be written.
fn lookup(value: Option<&Value>, field: &str, context: &Context<'_>) -> Result<Option<String>> {
    let reference = match value {
        Some(Value::String(reference)) if !reference.is_empty() => reference,
        Some(Value::Null) | None => return Ok(None),
        Some(other) => {
            context
                .reporter
                .warn(format!("setFromDoc: not a page reference: {other}"));
            return Ok(None);
        }
    };

    if RE_ABSOLUTE.is_match(reference) {
        return Ok(None);
    }

    let Some(document) = context.document(reference) else {
        context
            .reporter
            .warn(format!("setFromDoc: unknown page reference: {reference}"));
        return Ok(None);
    };

    match document.field(field) {
        Some(found) => Ok(Some(found.to_owned())),
        None => bail!("document `{reference}` has no field `{field}`"),
    }
}
