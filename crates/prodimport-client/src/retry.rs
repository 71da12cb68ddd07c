//! Retry utilities for admin API calls.
//!
//! Transient failures are retried with exponential backoff. What counts as
//! transient depends on whether the request is safe to repeat: a create call
//! that may already have reached the backend must not be replayed on a 5xx or
//! timeout, or the product could be created twice.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Whether a request can be repeated without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Idempotency {
    /// Reads and token exchanges.
    Idempotent,
    /// Creates; only retried when the request provably never reached the server.
    NonIdempotent,
}

/// Returns `true` if `err` represents a transient condition worth retrying.
///
/// Always retriable:
/// - [`ClientError::RateLimited`]: HTTP 429, the server has asked us to back off.
/// - [`ClientError::Http`] connect failures: the request was never sent.
///
/// Retriable for idempotent requests only:
/// - [`ClientError::Http`] timeouts and other transport failures.
/// - [`ClientError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (401, other 4xx, parse failures) is returned immediately.
pub(crate) fn is_retriable(err: &ClientError, idempotency: Idempotency) -> bool {
    let idempotent = idempotency == Idempotency::Idempotent;
    match err {
        ClientError::RateLimited { .. } => true,
        ClientError::Http(e) => e.is_connect() || (idempotent && (e.is_timeout() || e.is_request())),
        ClientError::UnexpectedStatus { status, .. } => idempotent && *status >= 500,
        ClientError::Deserialize { .. }
        | ClientError::Unauthorized { .. }
        | ClientError::PaginationLimit { .. }
        | ClientError::InvalidBaseUrl { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds.
/// With `max_retries = 3` the operation is attempted at most 4 times total.
/// Non-retriable errors are returned immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    idempotency: Idempotency,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err, idempotency) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient admin API error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
