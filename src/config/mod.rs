//! Configuration for web3-query operations
//!
//! This module provides a flexible configuration system for controlling
//! the client's endpoints, timeouts, retry policy, pagination and batching.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use web3_query::ClientConfig;
//!
//! // 30s timeout, 3 retries from 100ms up to 5s, 100 items per page
//! let config = ClientConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use web3_query::ClientConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ClientConfigBuilder::new()
//!     .request_timeout(Duration::from_secs(10))
//!     .batch_concurrency(10)
//!     .rate_limit(25, Duration::from_secs(1))
//!     .build();
//! ```

use std::time::Duration;

use crate::transport::RetryConfig;

pub mod constants;

use constants::{
    DEFAULT_BATCH_CONCURRENCY, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT,
    EVM_BASE_URL, SOLANA_BASE_URL, STREAMS_BASE_URL,
};

/// Client-side request throttle: at most `requests` per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per period
    pub requests: u32,
    /// Length of the period
    pub period: Duration,
}

/// Configuration for a [`crate::Web3Client`]
///
/// Use [`ClientConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for EVM endpoints
    pub evm_base_url: String,

    /// Base URL for Solana endpoints
    pub solana_base_url: String,

    /// Base URL for Streams endpoints
    pub streams_base_url: String,

    /// Deadline for each request attempt
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Retry policy for transient failures
    pub retry: RetryConfig,

    /// Page size requested by the paginator
    /// Default: 100
    pub page_size: u32,

    /// Maximum pages fetched by a single paginate call
    /// Default: 1000
    pub max_pages: usize,

    /// Items in flight per batch window
    /// Default: 5
    pub batch_concurrency: usize,

    /// Optional client-side throttle
    /// Default: None
    pub rate_limit: Option<RateLimit>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::minimal()
    }
}

impl ClientConfig {
    /// Production endpoints, standard retry policy, no client-side throttle
    pub fn minimal() -> Self {
        Self {
            evm_base_url: EVM_BASE_URL.to_string(),
            solana_base_url: SOLANA_BASE_URL.to_string(),
            streams_base_url: STREAMS_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            rate_limit: None,
        }
    }
}

/// Builder for [`ClientConfig`]
///
/// # Example
///
/// ```rust
/// use web3_query::ClientConfigBuilder;
/// use std::time::Duration;
///
/// let config = ClientConfigBuilder::new()
///     .evm_base_url("http://localhost:8080/api/v2.2")
///     .max_retries(5)
///     .page_size(50)
///     .build();
/// assert_eq!(config.retry.max_retries, 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the EVM base URL
    pub fn evm_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.evm_base_url = url.into();
        self
    }

    /// Override the Solana base URL
    pub fn solana_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.solana_base_url = url.into();
        self
    }

    /// Override the Streams base URL
    pub fn streams_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.streams_base_url = url.into();
        self
    }

    /// Set the per-attempt request deadline
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Replace the whole retry policy
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the number of retries after the initial attempt
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    /// Set the first backoff delay
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.retry.base_delay = delay;
        self
    }

    /// Set the backoff cap
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.retry.max_delay = delay;
        self
    }

    /// Set the default page size
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Set the paginator's page cap
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the default batch window size
    pub fn batch_concurrency(mut self, concurrency: usize) -> Self {
        self.config.batch_concurrency = concurrency;
        self
    }

    /// Throttle to `requests` per `period`
    pub fn rate_limit(mut self, requests: u32, period: Duration) -> Self {
        self.config.rate_limit = Some(RateLimit { requests, period });
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay, Duration::from_millis(100));
        assert_eq!(config.retry.max_delay, Duration::from_millis(5000));
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_pages, 1000);
        assert_eq!(config.batch_concurrency, 5);
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfigBuilder::new()
            .request_timeout(Duration::from_secs(5))
            .max_retries(1)
            .base_delay(Duration::from_millis(10))
            .max_delay(Duration::from_millis(40))
            .rate_limit(10, Duration::from_secs(1))
            .build();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.base_delay, Duration::from_millis(10));
        assert_eq!(config.retry.max_delay, Duration::from_millis(40));
        assert_eq!(
            config.rate_limit,
            Some(RateLimit {
                requests: 10,
                period: Duration::from_secs(1)
            })
        );
    }

    #[test]
    fn test_base_url_overrides() {
        let config = ClientConfigBuilder::new()
            .evm_base_url("http://localhost:1/evm")
            .solana_base_url("http://localhost:1/sol")
            .streams_base_url("http://localhost:1/streams")
            .build();

        assert_eq!(config.evm_base_url, "http://localhost:1/evm");
        assert_eq!(config.solana_base_url, "http://localhost:1/sol");
        assert_eq!(config.streams_base_url, "http://localhost:1/streams");
    }
}
