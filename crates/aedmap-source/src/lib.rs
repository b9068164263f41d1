pub mod client;
mod coerce;
pub mod error;
pub mod normalize;
mod rate_limit;
pub mod types;

use std::future::Future;

use aedmap_core::Record;

pub use client::AirtableClient;
pub use error::SourceError;
pub use normalize::{normalize_record, normalize_records};
pub use types::{AirtableListResponse, AirtableRecord};

/// Anything that can produce a freshly normalized catalogue.
///
/// Implementations own the whole fetch-and-normalize boundary: callers only
/// ever see canonical [`Record`]s or a classified [`SourceError`].
pub trait RecordSource {
    /// Fetch and normalize the complete catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the catalogue cannot be fetched or parsed.
    fn fetch_records(&self) -> impl Future<Output = Result<Vec<Record>, SourceError>> + Send;
}
