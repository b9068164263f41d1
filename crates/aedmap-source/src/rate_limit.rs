//! Retry with exponential back-off for the Airtable client.
//!
//! Transient failures (429, network errors, 5xx) are retried; anything that
//! a retry cannot fix is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` is worth retrying after a back-off delay.
///
/// Retriable:
/// - [`SourceError::RateLimited`]: Airtable allows 5 requests/second per base.
/// - [`SourceError::Http`]: connection reset, timeout, TLS hiccup.
/// - [`SourceError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (auth, 404, bad JSON, pagination guard) is final.
pub(crate) fn is_retriable(err: &SourceError) -> bool {
    match err {
        SourceError::RateLimited { .. } | SourceError::Http(_) => true,
        SourceError::UnexpectedStatus { status, .. } => *status >= 500,
        SourceError::Deserialize { .. }
        | SourceError::Unauthorized { .. }
        | SourceError::NotFound { .. }
        | SourceError::PaginationLimit { .. }
        | SourceError::InvalidApiUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The sleep before retry `n` is `backoff_base_ms * 2^(n-1)` ± 25 % jitter,
/// capped at 30 s. With `max_retries = 3` the operation runs at most 4 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(20));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient Airtable error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
