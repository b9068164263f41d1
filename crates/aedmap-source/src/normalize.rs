//! Normalization from raw [`AirtableRecord`]s to canonical [`Record`]s.
//!
//! This is the only place raw cell types are interpreted. Value coercion is
//! delegated to [`crate::coerce`]; this module maps aliased field names onto
//! the canonical shape.

use aedmap_core::{Record, Status};
use serde_json::{Map, Value};

use crate::coerce::{lookup, lookup_text, to_bool, to_display_date, to_image_urls, to_number};
use crate::types::AirtableRecord;

// Folded aliases, most specific first.
const NAME: &[&str] = &["name"];
const ADDRESS: &[&str] = &["address"];
const PARISH: &[&str] = &["parish"];
const LATITUDE: &[&str] = &["latitude", "lat"];
const LONGITUDE: &[&str] = &["longitude", "lng", "lon", "long"];
const STATUS: &[&str] = &["status"];
const PUBLIC_ACCESS: &[&str] = &["publicaccess"];
const ACCESS_INSTRUCTIONS: &[&str] = &["accessinstructions", "access"];
const LAST_VERIFIED: &[&str] = &["lastverified"];
const IMAGES: &[&str] = &["images", "image", "photos", "attachments"];

/// Normalizes one raw record.
///
/// Returns `None` only when the record has no usable identifier; every other
/// field falls back to its default, and a non-object `fields` reads as empty.
#[must_use]
pub fn normalize_record(raw: &AirtableRecord) -> Option<Record> {
    let id = record_id(&raw.id)?;
    let empty = Map::new();
    let f = raw.fields.as_object().unwrap_or(&empty);

    Some(Record {
        id,
        name: lookup_text(f, NAME),
        address: lookup_text(f, ADDRESS),
        parish: lookup_text(f, PARISH),
        lat: to_number(lookup(f, LATITUDE)),
        lng: to_number(lookup(f, LONGITUDE)),
        status: Status::parse(&lookup_text(f, STATUS)),
        public_access: to_bool(lookup(f, PUBLIC_ACCESS)),
        access_instructions: lookup_text(f, ACCESS_INSTRUCTIONS),
        last_verified: to_display_date(lookup(f, LAST_VERIFIED)),
        images: to_image_urls(lookup(f, IMAGES)),
    })
}

/// String and numeric ids are usable; blanks and anything else are not.
fn record_id(raw: &Value) -> Option<String> {
    let id = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Normalizes a full page set, dropping records without an identifier.
#[must_use]
pub fn normalize_records(raw: &[AirtableRecord]) -> Vec<Record> {
    let records: Vec<Record> = raw.iter().filter_map(normalize_record).collect();

    let dropped = raw.len() - records.len();
    if dropped > 0 {
        tracing::warn!(dropped, kept = records.len(), "dropped records without an id");
    }

    records
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
