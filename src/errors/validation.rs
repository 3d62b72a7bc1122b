//! Error types for caller-supplied input.
//!
//! Validation errors are raised before any request leaves the process and are
//! never retried.

/// Errors raised when a caller supplies malformed or unsupported input.
///
/// # Examples
///
/// ```rust
/// use web3_query::ValidationError;
///
/// let error = ValidationError::InvalidEvmAddress {
///     address: "0x123".to_string(),
/// };
/// assert!(error.to_string().contains("0x123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The resolved chain is not in the set accepted by the endpoint.
    ///
    /// When `reason` is set it replaces the generated message.
    #[error("{}", unsupported_chain_message(.chain, .endpoint, .allowed, .reason.as_deref()))]
    UnsupportedChain {
        /// Canonical chain id that was rejected
        chain: String,
        /// Endpoint template the chain was checked against
        endpoint: String,
        /// Chain ids the endpoint accepts
        allowed: Vec<String>,
        /// Optional message overriding the generated one
        reason: Option<String>,
    },

    /// A `0x`-prefixed 42 character address that is not 40 hex digits.
    #[error("Invalid EVM address format: {address}")]
    InvalidEvmAddress {
        /// The rejected address
        address: String,
    },

    /// A Solana-length address containing characters outside the Base58 alphabet.
    #[error("Invalid Solana address format: {address}")]
    InvalidSolanaAddress {
        /// The rejected address
        address: String,
    },

    /// A chain or network hint that is empty once trimmed.
    #[error("Invalid {field} parameter: value must be a non-empty string")]
    EmptyHint {
        /// Which hint was empty (`chain` or `network`)
        field: &'static str,
    },

    /// A chain or network hint containing shell metacharacters.
    #[error("Invalid {field} parameter: {value:?} contains disallowed characters")]
    UnsafeHint {
        /// Which hint was rejected (`chain` or `network`)
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// A path placeholder was left unresolved after substitution.
    #[error("Unresolved placeholder {placeholder} in endpoint {template}")]
    UnresolvedPlaceholder {
        /// The endpoint template as supplied
        template: String,
        /// The first placeholder that could not be resolved
        placeholder: String,
    },

    /// A placeholder value that cannot stand as a single path segment
    /// (empty, `.` or `..`).
    #[error("Invalid value {value:?} for path placeholder {placeholder}")]
    InvalidPathValue {
        /// Name of the placeholder
        placeholder: String,
        /// The rejected value
        value: String,
    },

    /// A date expression that could not be parsed.
    #[error("Invalid date expression: {input:?}")]
    InvalidDate {
        /// The rejected expression
        input: String,
    },

    /// The assembled request URL could not be parsed.
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl {
        /// The URL that failed to parse
        url: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A header value contained bytes that are not valid in HTTP headers.
    #[error("Invalid value for header {header}")]
    InvalidHeader {
        /// Name of the offending header
        header: String,
    },
}

fn unsupported_chain_message(
    chain: &str,
    endpoint: &str,
    allowed: &[String],
    reason: Option<&str>,
) -> String {
    match reason {
        Some(reason) => reason.to_string(),
        None => format!(
            "Unsupported chain \"{chain}\" for endpoint {endpoint}. Supported chain IDs: {}",
            allowed.join(", ")
        ),
    }
}

impl ValidationError {
    /// Create an `InvalidUrl` error from any displayable parse failure.
    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ValidationError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an `InvalidDate` error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ValidationError::InvalidDate {
            input: input.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_chain_lists_allowed_set() {
        let error = ValidationError::UnsupportedChain {
            chain: "0x5".to_string(),
            endpoint: "/wallets/:address/history".to_string(),
            allowed: vec!["0x1".to_string(), "0x89".to_string()],
            reason: None,
        };
        let message = error.to_string();
        assert!(message.contains("\"0x5\""));
        assert!(message.contains("0x1, 0x89"));
    }

    #[test]
    fn test_unsupported_chain_custom_reason() {
        let error = ValidationError::UnsupportedChain {
            chain: "0x5".to_string(),
            endpoint: "/wallets/:address/history".to_string(),
            allowed: vec!["0x1".to_string()],
            reason: Some("Endpoint only supports mainnet chains.".to_string()),
        };
        assert_eq!(error.to_string(), "Endpoint only supports mainnet chains.");
    }
}
