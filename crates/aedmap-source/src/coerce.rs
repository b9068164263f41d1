//! Loose value coercion for raw Airtable cells.
//!
//! Every function here is total: malformed input degrades to the field's
//! default instead of failing the record.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

/// Display format for verification dates, e.g. `"05 Mar 2024"`.
const DATE_DISPLAY_FORMAT: &str = "%d %b %Y";

/// Folds a field name to its comparison key: lowercase with spaces,
/// underscores and hyphens removed (`"Public Access"` → `"publicaccess"`).
pub(crate) fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Looks up the first present, non-null field matching any alias.
///
/// Aliases are given pre-folded and are tried in order, so earlier aliases
/// win when a source carries more than one spelling.
pub(crate) fn lookup<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        fields
            .iter()
            .find(|(key, value)| !value.is_null() && fold_key(key) == *alias)
            .map(|(_, value)| value)
    })
}

/// Text of the first alias whose cell is non-blank after coercion.
///
/// Unlike [`lookup`], an empty string does not shadow a later alias.
pub(crate) fn lookup_text(fields: &Map<String, Value>, aliases: &[&str]) -> String {
    aliases
        .iter()
        .flat_map(|alias| {
            fields
                .iter()
                .filter(move |(key, _)| fold_key(key) == *alias)
                .map(|(_, value)| to_text(Some(value)))
        })
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Coerces a cell to a trimmed string; numbers and booleans are stringified.
pub(crate) fn to_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        // Single-select lookups sometimes arrive as one-element arrays.
        Some(Value::Array(items)) => items.first().map_or_else(String::new, |v| to_text(Some(v))),
        _ => String::new(),
    }
}

/// Coerces a cell to a finite number.
pub(crate) fn to_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerces a cell to a boolean.
///
/// Only `true`, `"true"`, `"yes"`, `"1"` and `1` count as true.
pub(crate) fn to_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1")
        }
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Renders a date cell for display, falling back to the raw text.
pub(crate) fn to_display_date(value: Option<&Value>) -> String {
    let raw = to_text(value);
    if raw.is_empty() {
        return raw;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return ts.format(DATE_DISPLAY_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return date.format(DATE_DISPLAY_FORMAT).to_string();
    }

    raw
}

/// Extracts image URLs from an attachment cell, preserving order.
///
/// Accepts attachment objects (`{"url": ...}`), bare URL strings, or a single
/// URL string; entries without a usable URL are skipped.
pub(crate) fn to_image_urls(value: Option<&Value>) -> Vec<String> {
    let url_of = |item: &Value| -> Option<String> {
        let url = match item {
            Value::String(s) => s.trim(),
            Value::Object(obj) => obj.get("url")?.as_str()?.trim(),
            _ => return None,
        };
        (!url.is_empty()).then(|| url.to_string())
    };

    match value {
        Some(Value::Array(items)) => items.iter().filter_map(url_of).collect(),
        Some(single @ Value::String(_)) => url_of(single).into_iter().collect(),
        _ => Vec::new(),
    }
}
