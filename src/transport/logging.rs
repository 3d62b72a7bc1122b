// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request/response logging decorator.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, trace, warn, Instrument};

use super::{HttpRequest, HttpResponse, Transport};
use crate::errors::TransportError;

/// Wraps each request in an `http_request` span and logs timing and failures.
///
/// Payload logging is off by default. Headers are never logged.
#[derive(Clone, Debug)]
pub struct LoggingTransport<T> {
    inner: T,
    /// Whether to log request bodies (can be verbose)
    log_requests: bool,
    /// Whether to log response bodies (can be verbose)
    log_responses: bool,
}

impl<T> LoggingTransport<T> {
    /// Log timing and errors only.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            log_requests: false,
            log_responses: false,
        }
    }

    /// Also log request bodies at trace level.
    pub fn with_request_logging(mut self) -> Self {
        self.log_requests = true;
        self
    }

    /// Also log response bodies at trace level.
    pub fn with_response_logging(mut self) -> Self {
        self.log_responses = true;
        self
    }

    /// Log both request and response bodies.
    pub fn verbose(self) -> Self {
        self.with_request_logging().with_response_logging()
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let span = tracing::info_span!(
            "http_request",
            method = %request.method,
            path = %request.url.path(),
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        let current = span.clone();

        async move {
            let start = Instant::now();

            match (&request.body, self.log_requests) {
                (Some(body), true) => {
                    trace!(body = %String::from_utf8_lossy(body), "HTTP request")
                }
                _ => debug!("HTTP request: {} {}", request.method, request.url.path()),
            }

            let result = self.inner.send(request).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            current.record("duration_ms", duration_ms);

            match &result {
                Ok(response) => {
                    current.record("status", response.status);
                    if self.log_responses {
                        trace!(body = %response.body, duration_ms, "HTTP response");
                    } else {
                        debug!(status = response.status, duration_ms, "HTTP response");
                    }
                }
                Err(e) => warn!(error = %e, duration_ms, "HTTP transport error"),
            }

            result
        }
        .instrument(span)
        .await
    }
}
