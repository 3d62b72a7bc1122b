//! Endpoint descriptors and path template resolution.
//!
//! Endpoint paths carry placeholders in either `:name` or `{name}` form:
//!
//! ```text
//! /wallets/:address/history
//! /streams/evm/{id}/status
//! ```
//!
//! Resolution replaces every placeholder with a value from a lookup map and
//! fails if any placeholder is left over, so a malformed URL never leaves the
//! process. Values are percent-encoded as single path segments.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;

use crate::errors::ValidationError;

/// Classification of an endpoint for chain compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointClass {
    /// No additional chain restrictions
    #[default]
    General,
    /// Wallet history; mainnet chains only
    WalletHistory,
    /// Wallet token balances; chains with token price support only
    WalletTokens,
}

impl EndpointClass {
    /// Infer the class from an endpoint path.
    ///
    /// Matches `/wallets/<segment>/history` and `/wallets/<segment>/tokens`, each
    /// followed by a word boundary.
    pub fn infer(path: &str) -> Self {
        let Some(rest) = path.strip_prefix("/wallets/") else {
            return EndpointClass::General;
        };
        let Some(slash) = rest.find('/') else {
            return EndpointClass::General;
        };
        if slash == 0 {
            return EndpointClass::General;
        }
        let tail = &rest[slash..];
        if starts_with_word(tail, "/history") {
            EndpointClass::WalletHistory
        } else if starts_with_word(tail, "/tokens") {
            EndpointClass::WalletTokens
        } else {
            EndpointClass::General
        }
    }
}

fn starts_with_word(haystack: &str, prefix: &str) -> bool {
    match haystack.strip_prefix(prefix) {
        Some(after) => !after.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    }
}

/// A logical API operation: a path template and the HTTP method it expects.
///
/// # Examples
///
/// ```rust
/// use web3_query::{Endpoint, EndpointClass};
/// use reqwest::Method;
///
/// let endpoint: Endpoint = "/wallets/:address/history".into();
/// assert_eq!(endpoint.method(), &Method::GET);
/// assert_eq!(endpoint.class(), EndpointClass::WalletHistory);
///
/// let status = Endpoint::new(Method::POST, "/streams/evm/{id}/status");
/// assert_eq!(status.class(), EndpointClass::General);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    template: String,
    method: Method,
    class: Option<EndpointClass>,
}

impl Endpoint {
    /// Create an endpoint with an explicit method.
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            method,
            class: None,
        }
    }

    /// Create a GET endpoint.
    pub fn get(template: impl Into<String>) -> Self {
        Self::new(Method::GET, template)
    }

    /// Attach explicit class metadata, overriding path inference.
    pub fn with_class(mut self, class: EndpointClass) -> Self {
        self.class = Some(class);
        self
    }

    /// The path template as supplied.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The declared HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Explicit class metadata if attached, otherwise the class inferred from the path.
    pub fn class(&self) -> EndpointClass {
        self.class
            .unwrap_or_else(|| EndpointClass::infer(&self.template))
    }

    /// Substitute placeholders from `values`; see [`resolve_template`].
    pub fn resolve(&self, values: &BTreeMap<String, String>) -> Result<String, ValidationError> {
        resolve_template(&self.template, values)
    }
}

impl From<&str> for Endpoint {
    fn from(template: &str) -> Self {
        Endpoint::get(template)
    }
}

impl From<String> for Endpoint {
    fn from(template: String) -> Self {
        Endpoint::get(template)
    }
}

/// Replace `:name` and `{name}` placeholders in `template` with entries from `values`.
///
/// Placeholders without an entry are a caller error and produce
/// [`ValidationError::UnresolvedPlaceholder`].
pub fn resolve_template(
    template: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, ValidationError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(&[':', '{'][..]) {
        out.push_str(&rest[..pos]);
        let marker = &rest[pos..];

        let (name, consumed) = if let Some(braced) = marker.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => {
                    return Err(unresolved(template, marker));
                }
            }
        } else {
            let ident = identifier_prefix(&marker[1..]);
            (ident, ident.len() + 1)
        };

        if name.is_empty() {
            // A bare ':' or '{' that is not a placeholder.
            out.push_str(&marker[..1]);
            rest = &marker[1..];
            continue;
        }

        match values.get(name) {
            Some(value) if matches!(value.as_str(), "" | "." | "..") => {
                return Err(ValidationError::InvalidPathValue {
                    placeholder: name.to_string(),
                    value: value.clone(),
                });
            }
            Some(value) => out.extend(utf8_percent_encode(value, PATH_SEGMENT)),
            None => return Err(unresolved(template, &marker[..consumed])),
        }
        rest = &marker[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Characters escaped in a substituted value: the URL path segment set
/// plus `/` and `%`, so a value can neither add segments nor start a query
/// or fragment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn identifier_prefix(s: &str) -> &str {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return "",
    }
    let end = chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

fn unresolved(template: &str, placeholder: &str) -> ValidationError {
    ValidationError::UnresolvedPlaceholder {
        template: template.to_string(),
        placeholder: placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_colon_placeholders() {
        let resolved = resolve_template(
            "/account/:network/:address/portfolio",
            &values(&[("network", "mainnet"), ("address", "So11111111111111111111111111111111111111112")]),
        )
        .unwrap();
        assert_eq!(
            resolved,
            "/account/mainnet/So11111111111111111111111111111111111111112/portfolio"
        );
    }

    #[test]
    fn test_brace_placeholders() {
        let resolved =
            resolve_template("/streams/evm/{id}/status", &values(&[("id", "abc-123")])).unwrap();
        assert_eq!(resolved, "/streams/evm/abc-123/status");
    }

    #[test]
    fn test_values_are_encoded_as_one_segment() {
        let resolved = resolve_template(
            "/:address/balance",
            &values(&[("address", "vitalik#x/../nft?chain=0x89 %")]),
        )
        .unwrap();
        assert_eq!(
            resolved,
            "/vitalik%23x%2F..%2Fnft%3Fchain=0x89%20%25/balance"
        );
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        for value in ["", ".", ".."] {
            let err = resolve_template("/:address/balance", &values(&[("address", value)]))
                .unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidPathValue {
                    placeholder: "address".to_string(),
                    value: value.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_unresolved_placeholder_is_rejected() {
        let err = resolve_template("/wallets/:address/history", &values(&[])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnresolvedPlaceholder {
                template: "/wallets/:address/history".to_string(),
                placeholder: ":address".to_string(),
            }
        );

        let err = resolve_template("/streams/evm/{id}", &values(&[])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnresolvedPlaceholder { placeholder, .. } if placeholder == "{id}"
        ));
    }

    #[test]
    fn test_no_placeholders_is_identity() {
        assert_eq!(
            resolve_template("/erc20/metadata", &values(&[])).unwrap(),
            "/erc20/metadata"
        );
    }

    #[test]
    fn test_infer_class() {
        assert_eq!(EndpointClass::infer("/wallets/:address/history"), EndpointClass::WalletHistory);
        assert_eq!(EndpointClass::infer("/wallets/0xabc/history"), EndpointClass::WalletHistory);
        assert_eq!(EndpointClass::infer("/wallets/:address/tokens"), EndpointClass::WalletTokens);
        assert_eq!(EndpointClass::infer("/wallets/:address/tokens/"), EndpointClass::WalletTokens);
        assert_eq!(EndpointClass::infer("/wallets/:address/tokensx"), EndpointClass::General);
        assert_eq!(EndpointClass::infer("/wallets//history"), EndpointClass::General);
        assert_eq!(EndpointClass::infer("/:address/erc20"), EndpointClass::General);
    }

    #[test]
    fn test_explicit_class_wins() {
        let endpoint = Endpoint::get("/custom/history").with_class(EndpointClass::WalletHistory);
        assert_eq!(endpoint.class(), EndpointClass::WalletHistory);
    }
}
