//! Streams API calls.
//!
//! Streams endpoints live under their own base URL and take chain ids in
//! `chainId`/`chainIds` fields rather than a `chain` parameter. Those fields
//! accept names (`polygon`) and are normalized to hex ids before dispatch.

use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::chain::resolve_chain;
use crate::client::{merge_params_into_body, QueryOptions, Web3Client};
use crate::endpoint::Endpoint;
use crate::errors::QueryError;
use crate::response::ApiResponse;
use crate::tracing::spans;

const CHAIN_FIELDS: [&str; 2] = ["chainId", "chainIds"];

impl Web3Client {
    /// Call a Streams endpoint.
    ///
    /// Uses `options.params`, `options.body`, `options.path_params` and
    /// `options.base_url`; address detection and EVM chain validation do not
    /// apply.
    ///
    /// ```rust,ignore
    /// use reqwest::Method;
    /// use serde_json::json;
    /// use web3_query::{Endpoint, QueryOptions};
    ///
    /// client
    ///     .streams_query(
    ///         Endpoint::new(Method::PUT, "/streams/evm"),
    ///         QueryOptions::new().body(json!({
    ///             "webhookUrl": "https://example.com/hook",
    ///             "chainIds": ["eth", "polygon"],
    ///         })),
    ///     )
    ///     .await?;
    /// ```
    pub async fn streams_query(
        &self,
        endpoint: impl Into<Endpoint>,
        options: QueryOptions,
    ) -> Result<ApiResponse, QueryError> {
        let endpoint = endpoint.into();
        let span = spans::streams_query(endpoint.method(), endpoint.template());

        async move {
            let QueryOptions {
                mut params,
                mut body,
                path_params,
                base_url,
                ..
            } = options;

            normalize_chain_fields(&mut params);
            if let Some(Value::Object(fields)) = &mut body {
                normalize_chain_fields(fields);
            }

            let values: BTreeMap<String, String> = path_params
                .into_iter()
                .map(|(key, value)| {
                    if CHAIN_FIELDS.contains(&key.as_str()) {
                        let id = resolve_chain(Some(value.as_str())).to_string();
                        (key, id)
                    } else {
                        (key, value)
                    }
                })
                .collect();
            let path = endpoint.resolve(&values)?;

            if *endpoint.method() != Method::GET {
                merge_params_into_body(&mut params, &mut body);
            }

            let base_url = base_url.unwrap_or_else(|| self.config().streams_base_url.clone());
            self.send(endpoint.method(), &base_url, &path, &params, body.as_ref())
                .await
        }
        .instrument(span)
        .await
    }
}

/// Resolve chain names in `chainId`/`chainIds`, whether a string or an array of strings.
fn normalize_chain_fields(fields: &mut Map<String, Value>) {
    for name in CHAIN_FIELDS {
        if let Some(value) = fields.get_mut(name) {
            normalize_chain_value(value);
        }
    }
}

fn normalize_chain_value(value: &mut Value) {
    match value {
        Value::String(chain) => *chain = resolve_chain(Some(chain.as_str())).to_string(),
        Value::Array(items) => items.iter_mut().for_each(|item| {
            if let Value::String(chain) = item {
                *chain = resolve_chain(Some(chain.as_str())).to_string();
            }
        }),
        _ => {}
    }
}
