// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Response body representation.

use serde_json::Value;

/// A response body: parsed JSON when the payload is valid JSON, raw text otherwise.
///
/// Non-JSON bodies are not an error; they are handed back verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Body parsed as JSON
    Json(Value),
    /// Body that was not valid JSON
    Text(String),
}

impl ApiResponse {
    /// Parse a raw body, falling back to text when it is not JSON.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => ApiResponse::Json(value),
            Err(_) => ApiResponse::Text(body),
        }
    }

    /// Borrow the JSON value, if any.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Text(_) => None,
        }
    }

    /// Take the JSON value, if any.
    pub fn into_json(self) -> Option<Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Text(_) => None,
        }
    }

    /// Convert into a JSON value, wrapping raw text as a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::Text(text) => Value::String(text),
        }
    }
}

impl std::fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiResponse::Json(value) => write!(f, "{value}"),
            ApiResponse::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_body_json() {
        let response = ApiResponse::from_body(r#"{"result":"success"}"#.to_string());
        assert_eq!(response, ApiResponse::Json(json!({ "result": "success" })));
    }

    #[test]
    fn test_from_body_falls_back_to_text() {
        let response = ApiResponse::from_body("<html>oops</html>".to_string());
        assert_eq!(response, ApiResponse::Text("<html>oops</html>".to_string()));
        assert!(response.as_json().is_none());
    }
}
