//! Well-known endpoints and defaults
//!
//! This module centralizes the base URLs, header names and numeric defaults
//! used throughout the web3-query crate.

use std::time::Duration;

/// Base URL of the EVM data API.
pub const EVM_BASE_URL: &str = "https://deep-index.moralis.io/api/v2.2";

/// Base URL of the Solana gateway.
pub const SOLANA_BASE_URL: &str = "https://solana-gateway.moralis.io";

/// Base URL of the Streams API.
pub const STREAMS_BASE_URL: &str = "https://streams.moralis.io/api/v2.2";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Credential file searched for by [`crate::credentials::EnvFileCredentials`].
pub const CREDENTIAL_FILE_NAME: &str = ".env";

/// Entry in the credential file holding the API key.
pub const API_KEY_ENV_VAR: &str = "MORALIS_API_KEY";

/// Deadline for a single request attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after the initial attempt for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Page size requested by the paginator when the caller sets none.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Hard cap on pages fetched by one paginate call.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Items in flight per batch window.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;
