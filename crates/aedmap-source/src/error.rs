use thiserror::Error;

/// Failures at the remote data source boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Airtable rejected the API key ({status}) for {url}")]
    Unauthorized { status: u16, url: String },

    #[error("table not found: {url}")]
    NotFound { url: String },

    #[error("rate limited by Airtable (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("pagination limit reached for table {table}: exceeded {max_pages} pages")]
    PaginationLimit { table: String, max_pages: usize },

    #[error("invalid Airtable API URL \"{api_url}\": {reason}")]
    InvalidApiUrl { api_url: String, reason: String },
}
