// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request execution with a deadline and exponential-backoff retry.
//!
//! The backoff formula is:
//!
//! ```text
//! delay = min(base_delay * 2^attempt, max_delay)
//! ```
//!
//! With the defaults (3 retries, 100ms base, 5s cap) a request that keeps
//! failing transiently is attempted 4 times, pausing 100ms, 200ms and 400ms
//! between attempts.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn, Instrument};

use super::{HttpRequest, HttpResponse, RateLimiter, Transport};
use crate::config::constants::{DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES};
use crate::errors::{ApiError, QueryError, TimeoutError, TransportErrorKind};
use crate::metrics::Metrics;
use crate::response::ApiResponse;
use crate::tracing::spans;

/// Configuration for retry behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial request).
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryConfig {
    /// Default delays with a specific number of retries.
    ///
    /// ```rust
    /// use web3_query::transport::RetryConfig;
    ///
    /// let config = RetryConfig::with_max_retries(0);
    /// assert_eq!(config.max_retries, 0);
    /// ```
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Delay to wait after the failure of attempt number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self)
    }
}

/// Calculates the backoff duration for a given attempt.
///
/// Uses exponential backoff: `min(base_delay * 2^attempt, max_delay)`
fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let multiplier = 2u64.saturating_pow(attempt);
    let delay_ms = config
        .base_delay
        .as_millis()
        .saturating_mul(multiplier as u128);
    let capped_delay_ms = delay_ms.min(config.max_delay.as_millis()) as u64;
    Duration::from_millis(capped_delay_ms)
}

/// Sends requests through a [`Transport`] with a per-attempt deadline,
/// status classification, metrics and retry of transient failures.
///
/// Cloning is cheap; clones share the transport and the metrics counters.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    retry: RetryConfig,
    timeout: Duration,
    metrics: Metrics,
    limiter: Option<RateLimiter>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Create an executor over `transport`.
    pub fn new(
        transport: Arc<dyn Transport>,
        retry: RetryConfig,
        timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            transport,
            retry,
            timeout,
            metrics,
            limiter: None,
        }
    }

    /// Wait for a token from `limiter` before every attempt.
    ///
    /// The wait is not counted against the per-attempt deadline and a
    /// request is only counted in the metrics once it leaves the limiter.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Counters updated by this executor.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Retry policy in effect.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Execute `request`, retrying timeouts and transient transport failures.
    ///
    /// A 4xx/5xx response is returned as [`QueryError::Api`] without retry.
    /// When retries are exhausted the last error is returned unchanged.
    pub async fn execute(&self, request: &HttpRequest) -> Result<ApiResponse, QueryError> {
        let span = spans::execute_request(&request.method, request.url.path());
        let current = span.clone();

        async move {
            let mut attempt = 0u32;
            loop {
                current.record("attempts", attempt + 1);

                match self.attempt(request).await {
                    Ok(response) => {
                        if attempt > 0 {
                            debug!(attempt = attempt, "Request succeeded after retry");
                        }
                        return Ok(response);
                    }
                    Err(error) => {
                        if !error.is_transient() {
                            debug!(error = %error, "Non-retryable error, not retrying");
                            return Err(error);
                        }

                        if attempt >= self.retry.max_retries {
                            warn!(
                                error = %error,
                                attempts = attempt + 1,
                                "Max retries exceeded"
                            );
                            return Err(error);
                        }

                        let delay = calculate_backoff(attempt, &self.retry);
                        warn!(
                            error = %error,
                            attempt = attempt + 1,
                            max_retries = self.retry.max_retries,
                            delay_ms = delay.as_millis(),
                            "Retryable error, backing off"
                        );

                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// One network attempt, counted in the metrics.
    async fn attempt(&self, request: &HttpRequest) -> Result<ApiResponse, QueryError> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
        self.metrics.record_request();

        let outcome = match tokio::time::timeout(self.timeout, self.transport.send(request)).await
        {
            Err(_elapsed) => Err(TimeoutError::new(self.timeout).into()),
            Ok(Err(e)) if e.kind == TransportErrorKind::TimedOut => {
                Err(TimeoutError::new(self.timeout).into())
            }
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(response)) => classify_response(response),
        };

        if let Err(error) = &outcome {
            self.metrics.record_error();
            if matches!(error, QueryError::Timeout(_)) {
                self.metrics.record_timeout();
            }
            if error.is_rate_limited() {
                self.metrics.record_rate_limit();
            }
        }

        outcome
    }
}

/// Turn a raw response into a body or an [`ApiError`] by status.
fn classify_response(response: HttpResponse) -> Result<ApiResponse, QueryError> {
    let body = ApiResponse::from_body(response.body);
    if response.status >= 400 {
        Err(ApiError::new(response.status, body).into())
    } else {
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use reqwest::Method;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedTransport {
        response: Result<HttpResponse, TransportError>,
        calls: AtomicU32,
    }

    impl FixedTransport {
        fn new(response: Result<HttpResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            url: "http://localhost/api/0xabc/balance".parse().unwrap(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.base_delay, Duration::from_millis(100));
        assert_eq!(config.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_calculate_backoff() {
        let config = RetryConfig::default();

        assert_eq!(calculate_backoff(0, &config), Duration::from_millis(100));
        assert_eq!(calculate_backoff(1, &config), Duration::from_millis(200));
        assert_eq!(calculate_backoff(2, &config), Duration::from_millis(400));
        assert_eq!(calculate_backoff(5, &config), Duration::from_millis(3200));
        // 100ms * 2^6 = 6400ms, capped at 5000ms
        assert_eq!(calculate_backoff(6, &config), Duration::from_millis(5000));
    }

    #[test]
    fn test_calculate_backoff_overflow_protection() {
        let config = RetryConfig {
            max_retries: 100,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        };

        assert_eq!(calculate_backoff(50, &config), Duration::from_secs(60));
        assert_eq!(config.backoff(u32::MAX), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_success_returns_parsed_body() {
        let transport = FixedTransport::new(Ok(HttpResponse::new(200, r#"{"balance":"1"}"#)));
        let executor = RequestExecutor::new(
            transport.clone(),
            fast_retry(),
            Duration::from_secs(1),
            Metrics::new(),
        );

        let response = executor.execute(&request()).await.unwrap();
        assert_eq!(response.as_json().unwrap()["balance"], "1");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(executor.metrics().snapshot().requests, 1);
        assert_eq!(executor.metrics().snapshot().errors, 0);
    }

    #[tokio::test]
    async fn test_rate_limited_status_is_not_retried() {
        let transport = FixedTransport::new(Ok(HttpResponse::new(429, "Too Many Requests")));
        let executor = RequestExecutor::new(
            transport.clone(),
            fast_retry(),
            Duration::from_secs(1),
            Metrics::new(),
        );

        let err = executor.execute(&request()).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.to_string(), "API Error 429: Too Many Requests");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        let snapshot = executor.metrics().snapshot();
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.rate_limits, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_exhausts_retries() {
        let transport = FixedTransport::new(Err(TransportError::host_not_found("dns error")));
        let executor = RequestExecutor::new(
            transport.clone(),
            fast_retry(),
            Duration::from_secs(1),
            Metrics::new(),
        );

        let err = executor.execute(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::Transport(ref e) if e.kind == TransportErrorKind::HostNotFound
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
        assert_eq!(executor.metrics().snapshot().errors, 4);
    }

    #[tokio::test]
    async fn test_transport_timeout_becomes_timeout_error() {
        let transport = FixedTransport::new(Err(TransportError::new(
            TransportErrorKind::TimedOut,
            "operation timed out",
        )));
        let executor = RequestExecutor::new(
            transport,
            RetryConfig::with_max_retries(0),
            Duration::from_secs(30),
            Metrics::new(),
        );

        let err = executor.execute(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Request timeout after 30 seconds");
        assert_eq!(executor.metrics().snapshot().timeouts, 1);
    }
}
