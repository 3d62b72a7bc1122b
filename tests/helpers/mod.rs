// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for web3-query integration tests
//!
//! Provides a scripted [`Transport`] so the client can be exercised without
//! any network access.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use web3_query::transport::{HttpRequest, HttpResponse, Transport};
use web3_query::{ClientConfig, ClientConfigBuilder, StaticCredentials, TransportError, Web3Client};

pub const TEST_API_KEY: &str = "test-key";
pub const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
pub const WSOL: &str = "So11111111111111111111111111111111111111112";

/// What the mock does with one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this response
    Respond(HttpResponse),
    /// Fail at the transport level
    Fail(TransportError),
    /// Never answer (until the executor's deadline drops the future)
    Hang,
    /// Wait, then apply the inner reply
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Reply::Respond(HttpResponse::new(200, value.to_string()))
    }

    pub fn status(status: u16, body: &str) -> Self {
        Reply::Respond(HttpResponse::new(status, body))
    }

    pub fn refused() -> Self {
        Reply::Fail(TransportError::connection_refused("Connection refused (os error 111)"))
    }

    pub fn after(self, delay: Duration) -> Self {
        Reply::Delayed(delay, Box::new(self))
    }
}

type Handler = Box<dyn Fn(&HttpRequest) -> Reply + Send + Sync>;

/// Mock transport that replays scripted replies and records every request
///
/// Replies are taken from the script in order. When the script runs out the
/// fallback reply (if any) is used for every further request.
///
/// # Example
///
/// ```rust,ignore
/// let transport = MockTransport::new()
///     .then(Reply::refused())
///     .then(Reply::json(json!({ "balance": "1" })));
///
/// let client = client_for(&transport);
/// ```
pub struct MockTransport {
    script: Mutex<VecDeque<Reply>>,
    fallback: Option<Reply>,
    handler: Option<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            handler: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append a reply to the script
    pub fn then(self, reply: Reply) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    /// Reply used once the script is exhausted
    pub fn always(mut self, reply: Reply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Compute each reply from the request instead of a script
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Reply + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Number of requests received
    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Copies of every request received, in arrival order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    fn next_reply(&self, request: &HttpRequest) -> Reply {
        if let Some(handler) = &self.handler {
            return handler(request);
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Reply::Fail(TransportError::other("mock script exhausted")))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut reply = self.next_reply(request);

        loop {
            match reply {
                Reply::Respond(response) => return Ok(response),
                Reply::Fail(error) => return Err(error),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    return Err(TransportError::other("mock hung"));
                }
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

/// Configuration with fast retries so failure paths finish quickly
pub fn fast_config() -> ClientConfig {
    ClientConfigBuilder::new()
        .base_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(8))
        .request_timeout(Duration::from_secs(5))
        .build()
}

/// Client over `transport` with the fast configuration
pub fn client_for(transport: &Arc<MockTransport>) -> Web3Client {
    client_with(fast_config(), transport)
}

/// Client over `transport` with an explicit configuration
pub fn client_with(config: ClientConfig, transport: &Arc<MockTransport>) -> Web3Client {
    Web3Client::with_transport(config, StaticCredentials::new(TEST_API_KEY), transport.clone())
}

/// Value of the first query parameter named `key`
pub fn query_param(request: &HttpRequest, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Request body parsed as JSON
pub fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().expect("request has no body"))
        .expect("request body is not JSON")
}
