//! Token search and client-side token filters.

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::chain::resolve_chain;
use crate::client::Web3Client;
use crate::errors::QueryError;
use crate::response::ApiResponse;
use crate::tracing::spans;

const SEARCH_PATH: &str = "/tokens/search";

impl Web3Client {
    /// Search tokens by name, symbol or address.
    ///
    /// `chains` may hold names or hex ids; an empty slice searches every chain.
    ///
    /// ```rust,ignore
    /// let hits = client.search_token("pepe", &["eth", "base"]).await?;
    /// ```
    pub async fn search_token(
        &self,
        query: &str,
        chains: &[&str],
    ) -> Result<ApiResponse, QueryError> {
        let span = spans::search_token(query, chains.len());

        async move {
            let mut params = Map::new();
            params.insert("query".to_string(), Value::from(query));
            if !chains.is_empty() {
                let ids: Vec<String> = chains
                    .iter()
                    .map(|chain| resolve_chain(Some(*chain)).to_string())
                    .collect();
                params.insert("chains".to_string(), Value::from(ids.join(",")));
            }

            self.send(
                &Method::GET,
                &self.config().evm_base_url,
                SEARCH_PATH,
                &params,
                None,
            )
            .await
        }
        .instrument(span)
        .await
    }
}

/// Client-side filter over token entries (search hits or paginated balances).
///
/// ```rust
/// use serde_json::json;
/// use web3_query::TokenFilter;
///
/// let tokens = vec![
///     json!({ "symbol": "USDC", "verified_contract": true, "possible_spam": false }),
///     json!({ "symbol": "FREE", "verified_contract": false, "possible_spam": true }),
/// ];
/// let kept = TokenFilter::spam().apply(tokens);
/// assert_eq!(kept.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenFilter {
    exclude_spam: bool,
    verified_only: bool,
}

impl TokenFilter {
    /// Drop entries flagged `possible_spam`.
    pub fn spam() -> Self {
        Self::default().exclude_spam()
    }

    /// Keep only entries with `verified_contract`.
    pub fn verified() -> Self {
        Self::default().verified_only()
    }

    pub fn exclude_spam(mut self) -> Self {
        self.exclude_spam = true;
        self
    }

    pub fn verified_only(mut self) -> Self {
        self.verified_only = true;
        self
    }

    /// Whether `token` passes the filter.
    pub fn matches(&self, token: &Value) -> bool {
        let flag = |name: &str| token.get(name).and_then(Value::as_bool) == Some(true);
        if self.exclude_spam && flag("possible_spam") {
            return false;
        }
        if self.verified_only && !flag("verified_contract") {
            return false;
        }
        true
    }

    pub fn apply(&self, tokens: Vec<Value>) -> Vec<Value> {
        tokens.into_iter().filter(|token| self.matches(token)).collect()
    }
}
