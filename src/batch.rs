//! Windowed fan-out over many addresses.
//!
//! Items run in sequential windows of `concurrency`; every item in a window
//! runs concurrently. An item that is rate limited (HTTP 429) is retried with
//! the same backoff as the request executor. Any other failure is recorded
//! immediately. Results keep input order.

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn, Instrument};

use crate::client::{QueryOptions, Web3Client};
use crate::endpoint::Endpoint;
use crate::errors::QueryError;
use crate::response::ApiResponse;
use crate::tracing::spans;

/// Outcome of a batch run, aligned with the input items.
///
/// For every index exactly one of `results[i]` and `errors[i]` is `Some`.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successful responses by input index
    pub results: Vec<Option<ApiResponse>>,
    /// Failures by input index
    pub errors: Vec<Option<QueryError>>,
    /// Number of failed items
    pub failed: usize,
}

impl BatchResult {
    fn with_len(len: usize) -> Self {
        Self {
            results: std::iter::repeat_with(|| None).take(len).collect(),
            errors: std::iter::repeat_with(|| None).take(len).collect(),
            failed: 0,
        }
    }

    fn record(&mut self, index: usize, outcome: Result<ApiResponse, QueryError>) {
        match outcome {
            Ok(response) => self.results[index] = Some(response),
            Err(error) => {
                self.errors[index] = Some(error);
                self.failed += 1;
            }
        }
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of items that succeeded.
    pub fn succeeded(&self) -> usize {
        self.len() - self.failed
    }
}

/// Result of one item plus the last backoff delay it slept, if any.
struct ItemOutcome {
    result: Result<ApiResponse, QueryError>,
    last_delay: Option<Duration>,
}

impl Web3Client {
    /// Run `endpoint` once per item, with each item substituted as the address.
    ///
    /// `concurrency` defaults to [`crate::ClientConfig::batch_concurrency`];
    /// zero is treated as one. Never fails as a whole: per-item errors are
    /// reported in [`BatchResult::errors`].
    pub async fn batch_query<S: AsRef<str> + Sync>(
        &self,
        endpoint: impl Into<Endpoint>,
        items: &[S],
        options: QueryOptions,
        concurrency: Option<usize>,
    ) -> BatchResult {
        let endpoint = endpoint.into();
        let concurrency = concurrency
            .unwrap_or(self.config().batch_concurrency)
            .max(1);

        if items.is_empty() {
            return BatchResult::default();
        }

        let span = spans::batch_query(endpoint.template(), items.len(), concurrency);
        let current = span.clone();

        async move {
            let base_delay = self.config().retry.base_delay;
            let mut batch = BatchResult::with_len(items.len());
            let mut window_delay = base_delay;
            let windows = items.len().div_ceil(concurrency);

            for (window_index, window) in items.chunks(concurrency).enumerate() {
                if window_index > 0 {
                    tokio::time::sleep(window_delay).await;
                }

                let start = window_index * concurrency;
                let outcomes = join_all(
                    window
                        .iter()
                        .map(|item| self.run_item(&endpoint, item.as_ref(), &options)),
                )
                .instrument(spans::batch_window(start, window.len()))
                .await;

                let window_ok = outcomes.iter().all(|outcome| outcome.result.is_ok());
                let slowest = outcomes.iter().filter_map(|outcome| outcome.last_delay).max();
                window_delay = match (window_ok, slowest) {
                    (false, Some(delay)) => delay,
                    _ => base_delay,
                };

                for (offset, outcome) in outcomes.into_iter().enumerate() {
                    batch.record(start + offset, outcome.result);
                }
                debug!(
                    window = window_index + 1,
                    windows,
                    failed = batch.failed,
                    "Batch window complete"
                );
            }

            current.record("failed", batch.failed);
            batch
        }
        .instrument(span)
        .await
    }

    async fn run_item(&self, endpoint: &Endpoint, item: &str, options: &QueryOptions) -> ItemOutcome {
        let retry = &self.config().retry;
        let mut attempt = 0u32;
        let mut last_delay = None;

        loop {
            let result = self
                .query(endpoint.clone(), options.clone().address(item))
                .await;

            match result {
                Err(error) if error.is_rate_limited() && attempt < retry.max_retries => {
                    let delay = retry.backoff(attempt);
                    warn!(
                        item,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis(),
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    last_delay = Some(delay);
                    attempt += 1;
                }
                result => {
                    if let Err(error) = &result {
                        warn!(item, error = %error, "Batch item failed");
                    }
                    return ItemOutcome { result, last_delay };
                }
            }
        }
    }
}
