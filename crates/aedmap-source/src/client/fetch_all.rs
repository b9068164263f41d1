//! Multi-page fetch loop for `AirtableClient`.

use std::time::Duration;

use crate::error::SourceError;
use crate::types::AirtableRecord;

use super::AirtableClient;
use super::MAX_PAGES;

impl AirtableClient {
    /// Fetches every record in the table by following the `offset` cursor.
    ///
    /// `inter_request_delay_ms` is the pause between page requests (not
    /// applied before the first page).
    ///
    /// All-or-nothing: if any page fails, records from earlier pages are
    /// discarded and the error is returned, since a partial catalogue would
    /// silently hide units from the map.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`].
    /// Returns [`SourceError::PaginationLimit`] if the number of pages
    /// exceeds [`MAX_PAGES`].
    pub async fn fetch_all_records(
        &self,
        inter_request_delay_ms: u64,
    ) -> Result<Vec<AirtableRecord>, SourceError> {
        let mut all_records: Vec<AirtableRecord> = Vec::new();
        let mut offset: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(SourceError::PaginationLimit {
                    table: self.table.table_name.clone(),
                    max_pages: MAX_PAGES,
                });
            }

            if page_count > 1 && inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }

            let page = self.fetch_page(offset.as_deref()).await?;
            tracing::debug!(
                page = page_count,
                records = page.records.len(),
                has_more = page.offset.is_some(),
                "fetched Airtable page"
            );
            all_records.extend(page.records);

            offset = page.offset.filter(|o| !o.is_empty());
            if offset.is_none() {
                break;
            }
        }

        Ok(all_records)
    }
}
