//! HTTP client for the Airtable list-records endpoint.

mod fetch_all;

use std::time::Duration;

use aedmap_core::{AppConfig, Record};
use reqwest::Client;

use crate::error::SourceError;
use crate::normalize::normalize_records;
use crate::rate_limit::retry_with_backoff;
use crate::types::AirtableListResponse;
use crate::RecordSource;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on a cycling `offset` cursor.
pub(super) const MAX_PAGES: usize = 200;

/// Airtable's own ceiling for `pageSize`.
pub(super) const PAGE_SIZE: u32 = 100;

/// Default wait when a 429 carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Which table to read and the credentials to read it with.
#[derive(Clone)]
pub struct AirtableTable {
    /// API root, e.g. `"https://api.airtable.com/v0"`.
    pub api_url: String,
    pub base_id: String,
    pub table_name: String,
    pub api_key: String,
}

impl std::fmt::Debug for AirtableTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableTable")
            .field("api_url", &self.api_url)
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

/// HTTP client for one Airtable table.
///
/// Maps auth failures (401/403), not-found (404), rate limiting (429) and
/// other non-2xx responses to typed errors. Transient errors are retried with
/// exponential back-off up to `max_retries` additional attempts.
pub struct AirtableClient {
    pub(super) client: Client,
    pub(super) table: AirtableTable,
    pub(super) max_retries: u32,
    /// Base delay for exponential back-off: `backoff_base_ms * 2^(attempt-1)`.
    pub(super) backoff_base_ms: u64,
}

impl AirtableClient {
    /// Creates a client with the configured timeout, `User-Agent` and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        table: AirtableTable,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            table,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let table = AirtableTable {
            api_url: config.airtable_api_url.clone(),
            base_id: config.airtable_base_id.clone(),
            table_name: config.airtable_table_name.clone(),
            api_key: config.airtable_api_key.clone(),
        };
        Self::new(
            table,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Fetches one page of records, with automatic retry on transient errors.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Unauthorized`]: HTTP 401/403 (not retried).
    /// - [`SourceError::NotFound`]: HTTP 404 (not retried).
    /// - [`SourceError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`SourceError::UnexpectedStatus`]: any other non-2xx status (5xx retried).
    /// - [`SourceError::Http`]: network failure after all retries exhausted.
    /// - [`SourceError::Deserialize`]: body is not a valid list response.
    pub async fn fetch_page(
        &self,
        offset: Option<&str>,
    ) -> Result<AirtableListResponse, SourceError> {
        let url = Self::records_url(&self.table, PAGE_SIZE, offset)?;
        let table_name = self.table.table_name.clone();

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            let table_name = table_name.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .bearer_auth(&self.table.api_key)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(SourceError::Unauthorized {
                        status: status.as_u16(),
                        url,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(SourceError::NotFound { url });
                }

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    return Err(SourceError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<AirtableListResponse>(&body).map_err(|e| {
                    SourceError::Deserialize {
                        context: format!("records page from table {table_name}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Builds the list-records URL for the table, page size and optional cursor.
    ///
    /// Base id and table name are pushed as path segments, so spaces and
    /// other reserved characters are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidApiUrl`] if `api_url` cannot serve as a
    /// URL base.
    fn records_url(
        table: &AirtableTable,
        page_size: u32,
        offset: Option<&str>,
    ) -> Result<String, SourceError> {
        let invalid = |reason: String| SourceError::InvalidApiUrl {
            api_url: table.api_url.clone(),
            reason,
        };

        let mut url = reqwest::Url::parse(table.api_url.trim_end_matches('/'))
            .map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_owned()))?
            .pop_if_empty()
            .push(&table.base_id)
            .push(&table.table_name);

        url.query_pairs_mut()
            .append_pair("pageSize", &page_size.to_string());
        if let Some(cursor) = offset {
            url.query_pairs_mut().append_pair("offset", cursor);
        }

        Ok(url.to_string())
    }
}

impl RecordSource for AirtableClient {
    async fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        let raw = self.fetch_all_records(0).await?;
        let records = normalize_records(&raw);
        tracing::info!(
            table = %self.table.table_name,
            fetched = raw.len(),
            loaded = records.len(),
            "catalogue fetched"
        );
        Ok(records)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
