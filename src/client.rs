// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Query orchestration.
//!
//! [`Web3Client`] turns a logical endpoint plus [`QueryOptions`] into one fully
//! resolved request:
//!
//! 1. Detect the blockchain family from the address and chain/network hints
//! 2. For EVM requests against the default base URL, validate chain support,
//!    resolve `from_date`/`to_date` into block numbers and append `chain`
//! 3. Otherwise substitute the Solana network and, for non-GET requests with a
//!    JSON body, merge query parameters into the body
//! 4. Attach the API key and `Accept: application/json`, then hand the request
//!    to the [`RequestExecutor`]
//!
//! # Example
//!
//! ```rust,ignore
//! use web3_query::{ClientConfig, EnvFileCredentials, QueryOptions, Web3Client};
//!
//! let client = Web3Client::new(ClientConfig::default(), EnvFileCredentials::new("."))?;
//!
//! let balance = client
//!     .query(
//!         "/:address/balance",
//!         QueryOptions::new()
//!             .address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
//!             .chain("polygon"),
//!     )
//!     .await?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, Instrument};
use url::Url;

use crate::chain::{validate_evm_chain, ChainId};
use crate::config::constants::API_KEY_HEADER;
use crate::config::ClientConfig;
use crate::credentials::CredentialProvider;
use crate::detect::{detect_blockchain, BlockchainContext, DetectionHints};
use crate::endpoint::Endpoint;
use crate::errors::{QueryError, ValidationError};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::response::ApiResponse;
use crate::tracing::spans;
use crate::transport::{
    HttpRequest, LoggingTransport, RateLimiter, ReqwestTransport, RequestExecutor, Transport,
};

/// Caller options for a single query.
///
/// Every field is optional. Use the fluent setters or fill the public fields
/// directly.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Wallet or token address; substituted for `:address` and `:walletAddress`
    pub address: Option<String>,
    /// Chain name or hex id (`eth`, `polygon`, `0x89`, `solana`, ...)
    pub chain: Option<String>,
    /// Solana network (`mainnet`, `devnet`)
    pub network: Option<String>,
    /// Query parameters; arrays become repeated keys
    pub params: Map<String, Value>,
    /// Extra path placeholder values
    pub path_params: BTreeMap<String, String>,
    /// JSON request body
    pub body: Option<Value>,
    /// Base URL override; skips EVM chain validation
    pub base_url: Option<String>,
    /// Start date, resolved to `from_block` unless `from_block` is set
    pub from_date: Option<String>,
    /// End date, resolved to `to_block` unless `to_block` is set
    pub to_date: Option<String>,
    /// Explicit start block
    pub from_block: Option<u64>,
    /// Explicit end block
    pub to_block: Option<u64>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Add or replace one query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Provide a value for a `:name` or `{name}` path placeholder.
    pub fn path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn from_date(mut self, date: impl Into<String>) -> Self {
        self.from_date = Some(date.into());
        self
    }

    pub fn to_date(mut self, date: impl Into<String>) -> Self {
        self.to_date = Some(date.into());
        self
    }

    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn to_block(mut self, block: u64) -> Self {
        self.to_block = Some(block);
        self
    }
}

/// Client for the Moralis EVM, Solana and Streams APIs.
///
/// Owns its [`Metrics`]; all requests issued through it, including those made
/// by pagination and batching, are counted there.
pub struct Web3Client {
    config: ClientConfig,
    credentials: Arc<dyn CredentialProvider>,
    executor: RequestExecutor,
}

impl std::fmt::Debug for Web3Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3Client")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl Web3Client {
    /// Create a client that talks HTTPS through `reqwest`.
    pub fn new(
        config: ClientConfig,
        credentials: impl CredentialProvider + 'static,
    ) -> Result<Self, QueryError> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(
            config,
            credentials,
            Arc::new(transport),
        ))
    }

    /// Create a client over a caller-supplied transport.
    ///
    /// The configured rate limit and request logging still apply.
    pub fn with_transport(
        config: ClientConfig,
        credentials: impl CredentialProvider + 'static,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let mut executor = RequestExecutor::new(
            Arc::new(LoggingTransport::new(transport)),
            config.retry.clone(),
            config.request_timeout,
            Metrics::new(),
        );
        if let Some(limit) = &config.rate_limit {
            executor =
                executor.with_rate_limiter(RateLimiter::new(limit.requests, limit.period));
        }

        Self {
            config,
            credentials: Arc::new(credentials),
            executor,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Copy of the request counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.executor.metrics().snapshot()
    }

    /// Run one query against `endpoint`.
    ///
    /// Returns the parsed JSON body, or the raw text when the body is not JSON.
    pub async fn query(
        &self,
        endpoint: impl Into<Endpoint>,
        options: QueryOptions,
    ) -> Result<ApiResponse, QueryError> {
        let endpoint = endpoint.into();
        let span = spans::query(endpoint.method(), endpoint.template());
        self.query_inner(&endpoint, options).instrument(span).await
    }

    async fn query_inner(
        &self,
        endpoint: &Endpoint,
        options: QueryOptions,
    ) -> Result<ApiResponse, QueryError> {
        let context = detect_blockchain(
            options.address.as_deref(),
            DetectionHints {
                chain: options.chain.as_deref(),
                network: options.network.as_deref(),
            },
        )?;

        let mut values = options.path_params.clone();
        if let Some(address) = options.address.as_deref().filter(|a| !a.is_empty()) {
            values.insert("address".to_string(), address.to_string());
            values.insert("walletAddress".to_string(), address.to_string());
        }
        if let Some(network) = context.network() {
            values
                .entry("network".to_string())
                .or_insert_with(|| network.to_string());
        }
        let path = endpoint.resolve(&values)?;

        let mut params = options.params.clone();
        let mut body = options.body.clone();

        let base_url = match (&context, options.base_url.as_deref()) {
            (BlockchainContext::Evm { chain }, None) => {
                validate_evm_chain(chain, endpoint.template(), endpoint.class())?;
                self.apply_block_range(&mut params, &options, chain).await?;
                params.insert("chain".to_string(), Value::from(chain.as_str()));
                self.config.evm_base_url.as_str()
            }
            (_, base_url) => {
                if *endpoint.method() != Method::GET {
                    merge_params_into_body(&mut params, &mut body);
                }
                base_url.unwrap_or(self.config.solana_base_url.as_str())
            }
        };

        debug!(?context, path = %path, "Resolved query");
        self.send(endpoint.method(), base_url, &path, &params, body.as_ref())
            .await
    }

    /// Fill `from_block`/`to_block`, resolving dates only when no explicit block is given.
    async fn apply_block_range(
        &self,
        params: &mut Map<String, Value>,
        options: &QueryOptions,
        chain: &ChainId,
    ) -> Result<(), QueryError> {
        let from_block = match (options.from_block, options.from_date.as_deref()) {
            (Some(block), _) => Some(block),
            (None, Some(date)) => Some(self.date_to_block(date, chain.as_str()).await?),
            (None, None) => None,
        };
        let to_block = match (options.to_block, options.to_date.as_deref()) {
            (Some(block), _) => Some(block),
            (None, Some(date)) => Some(self.date_to_block(date, chain.as_str()).await?),
            (None, None) => None,
        };

        if let Some(block) = from_block {
            params.insert("from_block".to_string(), Value::from(block));
        }
        if let Some(block) = to_block {
            params.insert("to_block".to_string(), Value::from(block));
        }
        Ok(())
    }

    /// Build and execute one request.
    pub(crate) async fn send(
        &self,
        method: &Method,
        base_url: &str,
        path: &str,
        params: &Map<String, Value>,
        body: Option<&Value>,
    ) -> Result<ApiResponse, QueryError> {
        let request = self.build_request(method, base_url, path, params, body)?;
        self.executor.execute(&request).await
    }

    fn build_request(
        &self,
        method: &Method,
        base_url: &str,
        path: &str,
        params: &Map<String, Value>,
        body: Option<&Value>,
    ) -> Result<HttpRequest, QueryError> {
        let raw = join_url(base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ValidationError::invalid_url(&raw, e))?;
        let pairs = query_pairs(params);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let key = self.credentials.api_key()?;
        let mut key_value =
            HeaderValue::from_str(key.expose_secret()).map_err(|_| ValidationError::InvalidHeader {
                header: API_KEY_HEADER.to_string(),
            })?;
        key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let body = body.map(|value| value.to_string().into_bytes());
        if let Some(bytes) = &body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        }

        Ok(HttpRequest {
            method: method.clone(),
            url,
            headers,
            body,
        })
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Flatten parameters into query pairs.
///
/// Arrays become repeated keys and nulls are dropped.
pub(crate) fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                pairs.extend(
                    items
                        .iter()
                        .filter_map(scalar_to_string)
                        .map(|item| (key.clone(), item)),
                );
            }
            other => {
                if let Some(item) = scalar_to_string(other) {
                    pairs.push((key.clone(), item));
                }
            }
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Move query parameters into a JSON object body.
///
/// Keys already present in the body keep their value. Bodies that are not
/// objects are left alone and the parameters stay in the query string.
pub(crate) fn merge_params_into_body(params: &mut Map<String, Value>, body: &mut Option<Value>) {
    if let Some(Value::Object(fields)) = body {
        for (key, value) in std::mem::take(params) {
            fields.entry(key).or_insert(value);
        }
    }
}
