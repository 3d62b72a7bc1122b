//! Error type for non-success responses from the remote API.

use crate::response::ApiResponse;

/// HTTP status the API uses to signal rate limiting.
pub const RATE_LIMIT_STATUS: u16 = 429;

/// The remote service answered with a 4xx or 5xx status.
///
/// Carries the status code and the response body, parsed as JSON when possible
/// and raw text otherwise.
///
/// # Examples
///
/// ```rust
/// use web3_query::{ApiError, ApiResponse};
/// use serde_json::json;
///
/// let error = ApiError::new(404, ApiResponse::Json(json!({ "message": "Not found" })));
/// assert_eq!(error.status, 404);
/// assert!(error.to_string().contains("Not found"));
/// assert!(!error.is_rate_limited());
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("API Error {status}: {body}")]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Parsed (or raw) response body
    pub body: ApiResponse,
}

impl ApiError {
    /// Create an API error from a status code and body.
    pub fn new(status: u16, body: ApiResponse) -> Self {
        Self { status, body }
    }

    /// Whether the service rejected the request for exceeding its rate limit.
    pub fn is_rate_limited(&self) -> bool {
        self.status == RATE_LIMIT_STATUS
    }
}
