// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer for the query client.
//!
//! Everything that touches the network goes through the [`Transport`] trait.
//! The production implementation is [`ReqwestTransport`]; decorators add
//! behavior around any transport. [`LoggingTransport`] records each request
//! in a tracing span.
//!
//! The [`RequestExecutor`] sits on top, applying the per-attempt deadline,
//! classifying responses, counting metrics and retrying transient failures.
//! Given a [`RateLimiter`] it waits for a token before each attempt, outside
//! the deadline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::{sync::Arc, time::Duration};
//! use web3_query::transport::{
//!     LoggingTransport, RateLimiter, ReqwestTransport, RequestExecutor, RetryConfig,
//! };
//! use web3_query::Metrics;
//!
//! let http = ReqwestTransport::new(Duration::from_secs(30))?;
//! let transport = Arc::new(LoggingTransport::new(http));
//!
//! let executor = RequestExecutor::new(
//!     transport,
//!     RetryConfig::default(),
//!     Duration::from_secs(30),
//!     Metrics::new(),
//! )
//! .with_rate_limiter(RateLimiter::per_second(25));
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::errors::TransportError;

mod http;
mod logging;
mod rate_limit;
mod retry;

pub use http::ReqwestTransport;
pub use logging::LoggingTransport;
pub use rate_limit::RateLimiter;
pub use retry::{RequestExecutor, RetryConfig};

/// A fully resolved outbound request.
///
/// Sensitive header values (the API key) are marked as such and print as
/// `Sensitive` in `Debug` output.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Complete URL including query string
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Serialized JSON body, if any
    pub body: Option<Vec<u8>>,
}

/// Raw response as received from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response from a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends a single request and returns the raw response.
///
/// Implementations report failures that happen before a response arrives as
/// [`TransportError`]; any HTTP status, including 4xx/5xx, is a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}
