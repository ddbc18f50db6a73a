//! HTTP Response representation for handlers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed message returned by [`Response::unauthorized`].
pub const MISSING_CREDENTIALS: &str = "Missing credentials in request";

/// Fixed message returned by [`Response::forbidden`].
pub const NOT_AUTHORIZED: &str = "You are not authorized to access this resource";

/// Represents an outgoing HTTP response in the proxy-integration shape
/// (`statusCode`, `headers`, `body`).
///
/// # Quick Reference
///
/// | Method | Status | Body |
/// |--------|--------|------|
/// | `ok(payload)` | 200 | `[payload]` |
/// | `ok_empty()` | 200 | `[]` |
/// | `created(payload)` | 201 | `payload` |
/// | `accepted(payload)` | 202 | `payload` |
/// | `bad_request(msg)` | 400 | `{"error": msg}` |
/// | `unauthorized()` | 401 | `{"error": "Missing credentials in request"}` |
/// | `forbidden()` | 403 | `{"error": "You are not authorized to access this resource"}` |
/// | `not_found(msg)` | 404 | `{"error": msg}` |
/// | `internal_error(msg)` | 500 | `{"error": msg}` |
///
/// The body is always a complete serialization. Headers are kept in a sorted
/// map so two identical responses serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTP status code
    pub status_code: u16,

    /// Response headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Serialized response body
    #[serde(default)]
    pub body: String,

    /// Set when `body` holds base64-encoded binary data
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_base64_encoded: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Response {
    /// Create a JSON response with a custom status code.
    ///
    /// If `body` cannot be serialized the result is a 500 carrying the
    /// serialization error, so the body is always valid JSON.
    ///
    /// # Example
    /// ```ignore
    /// Response::json(201, json!({"id": "new-id"}))
    /// Response::json(400, json!({"error": "Invalid input"}))
    /// ```
    pub fn json<T: Serialize>(status: u16, body: T) -> Self {
        match serde_json::to_string(&body) {
            Ok(serialized) => Self::from_json_text(status, serialized),
            Err(e) => Self::from_json_text(
                500,
                serde_json::json!({ "error": format!("Failed to serialize response body: {}", e) })
                    .to_string(),
            ),
        }
    }

    fn from_json_text(status: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            status_code: status,
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    /// Create a 200 OK response. The payload is wrapped in a one-element
    /// array, so `ok(json!({"a": 1}))` has the body `[{"a":1}]`.
    ///
    /// # Example
    /// ```ignore
    /// Response::ok(json!({"pathReceived": id}))
    /// ```
    pub fn ok<T: Serialize>(payload: T) -> Self {
        Self::json(200, std::slice::from_ref(&payload))
    }

    /// Create a 200 OK response with an empty array body (`[]`).
    pub fn ok_empty() -> Self {
        Self::json(200, serde_json::json!([]))
    }

    /// Create a 201 Created response with JSON body.
    pub fn created<T: Serialize>(payload: T) -> Self {
        Self::json(201, payload)
    }

    /// Create a 202 Accepted response with JSON body.
    pub fn accepted<T: Serialize>(payload: T) -> Self {
        Self::json(202, payload)
    }

    /// Create a 400 Bad Request response.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::json(400, serde_json::json!({ "error": message.into() }))
    }

    /// Create a 401 Unauthorized response with the fixed credentials message.
    pub fn unauthorized() -> Self {
        Self::json(401, serde_json::json!({ "error": MISSING_CREDENTIALS }))
    }

    /// Create a 403 Forbidden response with the fixed authorization message.
    pub fn forbidden() -> Self {
        Self::json(403, serde_json::json!({ "error": NOT_AUTHORIZED }))
    }

    /// Create a 404 Not Found response.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::json(404, serde_json::json!({ "error": message.into() }))
    }

    /// Create a 500 Internal Server Error response.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::json(500, serde_json::json!({ "error": message.into() }))
    }

    /// Create a binary response (files, images, ...).
    ///
    /// The data is base64-encoded and `isBase64Encoded` is set; the gateway
    /// decodes it before writing the HTTP body.
    ///
    /// # Example
    /// ```ignore
    /// Response::binary(200, image_bytes, "image/png")
    /// ```
    pub fn binary(status: u16, data: impl AsRef<[u8]>, content_type: impl Into<String>) -> Self {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(data.as_ref());

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), content_type.into());

        Self {
            status_code: status,
            headers,
            body: encoded,
            is_base64_encoded: true,
        }
    }

    /// Decode the body into raw bytes, undoing base64 for binary responses.
    pub fn body_bytes(&self) -> Result<Vec<u8>, crate::HandlerError> {
        if !self.is_base64_encoded {
            return Ok(self.body.as_bytes().to_vec());
        }
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&self.body)
            .map_err(|e| crate::HandlerError::InvalidBase64(e.to_string()))
    }

    /// Add a header to the response (builder pattern).
    ///
    /// # Example
    /// ```ignore
    /// Response::ok(json!({"data": "value"}))
    ///     .with_header("Cache-Control", "max-age=3600")
    /// ```
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add CORS headers for cross-origin requests.
    pub fn with_cors(self, origin: impl Into<String>) -> Self {
        self.with_header("Access-Control-Allow-Origin", origin)
            .with_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .with_header("Access-Control-Allow-Headers", "Content-Type, Authorization")
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok_empty()
    }
}
