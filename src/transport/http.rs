// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! `reqwest`-backed transport.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, Transport};
use crate::errors::{TransportError, TransportErrorKind};

/// Production transport over HTTPS.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose client enforces `timeout` per request.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::other(error_chain(&e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(HttpResponse { status, body })
    }
}

/// Map a `reqwest` failure onto the transport error taxonomy.
fn classify(error: reqwest::Error) -> TransportError {
    let message = error_chain(&error);
    let kind = if error.is_timeout() {
        TransportErrorKind::TimedOut
    } else {
        match io_error_kind(&error) {
            Some(std::io::ErrorKind::ConnectionRefused) => TransportErrorKind::ConnectionRefused,
            Some(std::io::ErrorKind::TimedOut) => TransportErrorKind::TimedOut,
            _ if error.is_connect() && message.contains("dns error") => {
                TransportErrorKind::HostNotFound
            }
            _ => TransportErrorKind::Other,
        }
    };
    TransportError::new(kind, message)
}

fn io_error_kind(error: &(dyn StdError + 'static)) -> Option<std::io::ErrorKind> {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = err.source();
    }
    None
}

fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}
