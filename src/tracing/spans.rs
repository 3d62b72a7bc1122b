//! Span creation helpers for web3-query operations.
//!
//! Telemetry is kept apart from business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here and the
//! operation runs its future inside it.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use reqwest::Method;
use tracing::{Level, Span};

/// Create span for a single orchestrated query.
///
/// Parent: paginate, batch_window or none
/// Children: date_to_block, execute_request
#[inline]
pub(crate) fn query(method: &Method, template: &str) -> Span {
    tracing::span!(
        Level::INFO,
        "web3q.query",
        method = %method,
        endpoint = %template,
    )
}

/// Create span for the retry loop around one resolved request.
///
/// Parent: query
/// Children: http_request spans (one per attempt)
#[inline]
pub(crate) fn execute_request(method: &Method, path: &str) -> Span {
    tracing::debug_span!(
        "web3q.execute_request",
        method = %method,
        path = %path,
        attempts = tracing::field::Empty,
    )
}

/// Create span for resolving a date to a block number.
///
/// Parent: query
#[inline]
pub(crate) fn date_to_block(chain: &str, date: &str) -> Span {
    tracing::debug_span!("web3q.date_to_block", chain = %chain, date = %date)
}

/// Create span for a cursor-driven pagination run.
///
/// Parent: None (root span for this operation)
/// Children: query spans (one per page)
#[inline]
pub(crate) fn paginate(template: &str, max_results: Option<usize>) -> Span {
    tracing::span!(
        Level::INFO,
        "web3q.paginate",
        endpoint = %template,
        max_results = ?max_results,
        pages = tracing::field::Empty,
    )
}

/// Create span for a windowed batch run.
///
/// Parent: None (root span for this operation)
/// Children: batch_window spans
#[inline]
pub(crate) fn batch_query(template: &str, items: usize, concurrency: usize) -> Span {
    tracing::span!(
        Level::INFO,
        "web3q.batch_query",
        endpoint = %template,
        items = items,
        concurrency = concurrency,
        failed = tracing::field::Empty,
    )
}

/// Create span for one window of concurrent batch items.
///
/// Parent: batch_query
/// Children: query spans (one per item attempt)
#[inline]
pub(crate) fn batch_window(start: usize, len: usize) -> Span {
    tracing::debug_span!("web3q.batch_window", start = start, len = len)
}

/// Create span for a cross-chain token search.
///
/// Parent: None (root span for this operation)
#[inline]
pub(crate) fn search_token(query: &str, chains: usize) -> Span {
    tracing::span!(
        Level::INFO,
        "web3q.search_token",
        query = %query,
        chains = chains,
    )
}

/// Create span for a Streams API call.
///
/// Parent: None (root span for this operation)
/// Children: execute_request
#[inline]
pub(crate) fn streams_query(method: &Method, template: &str) -> Span {
    tracing::span!(
        Level::INFO,
        "web3q.streams_query",
        method = %method,
        endpoint = %template,
    )
}
