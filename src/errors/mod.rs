//! Error types for the web3-query library.
//!
//! This module provides strongly-typed errors for all public APIs in web3-query.
//! It follows a hybrid approach:
//!
//! - **Concern-specific errors** for fine-grained handling ([`ValidationError`],
//!   [`ApiError`], [`TimeoutError`], [`TransportError`], [`CredentialsError`])
//! - **Unified error type** ([`QueryError`]) returned by every client operation
//!
//! # Retry classification
//!
//! | Error                     | Retried by executor | Retried by batch runner |
//! |---------------------------|---------------------|-------------------------|
//! | [`ValidationError`]       | no                  | no                      |
//! | [`ApiError`] (429)        | no                  | yes                     |
//! | [`ApiError`] (other)      | no                  | no                      |
//! | [`TimeoutError`]          | yes                 | no                      |
//! | [`TransportError`] (transient kinds) | yes      | no                      |
//! | [`CredentialsError`]      | no                  | no                      |
//!
//! Exhausted retries return the last observed error unchanged.
//!
//! # Examples
//!
//! ```rust,ignore
//! use web3_query::{QueryError, QueryOptions, Web3Client};
//!
//! async fn example(client: &Web3Client) {
//!     match client.query("/:address/balance", QueryOptions::new().address("0x...")).await {
//!         Ok(response) => println!("{response}"),
//!         Err(QueryError::Validation(e)) => eprintln!("Bad input: {e}"),
//!         Err(QueryError::Api(e)) if e.is_rate_limited() => eprintln!("Slow down"),
//!         Err(e) => eprintln!("Request failed: {e}"),
//!     }
//! }
//! ```

mod api;
mod credentials;
mod transport;
mod validation;

pub use api::{ApiError, RATE_LIMIT_STATUS};
pub use credentials::CredentialsError;
pub use transport::{TimeoutError, TransportError, TransportErrorKind};
pub use validation::ValidationError;

/// Unified error type for all web3-query operations.
///
/// All concern-specific error types convert into `QueryError` via `From`
/// implementations, so `?` propagates them naturally.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Caller supplied malformed or unsupported input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The remote service returned a 4xx/5xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request exceeded its deadline.
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// The request failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API key could not be located or read.
    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    /// The response did not have the shape the operation requires.
    #[error("Unexpected response: {details}")]
    UnexpectedResponse {
        /// What was missing or malformed
        details: String,
    },
}

impl QueryError {
    /// Create an `UnexpectedResponse` error with details.
    pub fn unexpected_response(details: impl Into<String>) -> Self {
        QueryError::UnexpectedResponse {
            details: details.into(),
        }
    }

    /// Whether the request executor should retry after this error.
    ///
    /// Only timeouts and transient transport failures qualify; API errors,
    /// including 429, are never retried at the executor layer.
    pub fn is_transient(&self) -> bool {
        match self {
            QueryError::Timeout(_) => true,
            QueryError::Transport(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether the remote service rejected the request for rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, QueryError::Api(e) if e.is_rate_limited())
    }

    /// HTTP status code, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::Api(e) => Some(e.status),
            _ => None,
        }
    }
}
