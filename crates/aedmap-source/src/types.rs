//! Airtable REST response types for `GET /v0/{base}/{table}`.
//!
//! ## Observed shape
//!
//! Airtable omits empty cells entirely rather than sending `null`, and the
//! field names are whatever the base author typed (`"Public Access"`,
//! `"public_access"`, `"Latitude"`, `"lat"`, ...). Field values are kept as
//! raw JSON here; interpretation happens once, in [`crate::normalize`].
//!
//! Checkbox cells arrive as `true` and are simply absent when unticked.
//! Attachment cells are arrays of objects carrying at least a `url`.
//!
//! ### Pagination
//! A response carries at most 100 records plus an opaque `offset` string when
//! more pages remain. The next request passes that value back as the
//! `offset` query parameter.

use serde::Deserialize;
use serde_json::Value;

/// Top-level response from the list-records endpoint.
#[derive(Debug, Deserialize)]
pub struct AirtableListResponse {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,

    /// Cursor for the next page; absent on the last page.
    #[serde(default)]
    pub offset: Option<String>,
}

/// One raw row from the table.
///
/// Both members stay untyped so one odd row (a numeric id, `"fields": null`)
/// cannot fail the whole page; the normalizer decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirtableRecord {
    /// Airtable record id, normally a string such as `"rec8116cdd76088af"`.
    #[serde(default)]
    pub id: Value,

    /// Cell values keyed by field name; anything but an object reads as empty.
    #[serde(default)]
    pub fields: Value,
}
