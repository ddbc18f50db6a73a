//! Invocation event representation for handlers

use crate::error::HandlerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Path parameters extracted from the route. A parameter may be present with
/// a `null` value, which is distinct from the whole collection being absent.
pub type PathParameters = HashMap<String, Option<String>>;

/// Represents one incoming HTTP invocation in the proxy-integration shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    #[serde(default = "default_method")]
    pub http_method: String,

    /// Request path (e.g., "/ping/123")
    #[serde(default = "default_path")]
    pub path: String,

    /// HTTP headers
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,

    /// Query parameters
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_string_parameters: HashMap<String, String>,

    /// Path parameters, `None` when the route defines none
    #[serde(default)]
    pub path_parameters: Option<PathParameters>,

    /// Raw request body
    #[serde(default)]
    pub body: Option<String>,

    /// Set when `body` is base64-encoded binary data
    #[serde(default)]
    pub is_base64_encoded: bool,

    /// Gateway-supplied metadata
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_context: RequestContext,
}

/// Metadata the gateway attaches to every invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Request ID for tracing
    #[serde(default)]
    pub request_id: String,

    /// Milliseconds since the Unix epoch when the gateway received the request
    #[serde(default)]
    pub request_time_epoch: i64,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

/// Gateways send `null` rather than `{}` for empty collections.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Event {
    /// Create an event for the given method and path with no body or parameters.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set a path parameter (builder pattern). Passing `None` records the
    /// parameter with a `null` value.
    pub fn with_path_parameter(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.map(str::to_string));
        self
    }

    /// Set the body (builder pattern).
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a path parameter.
    ///
    /// Returns `Err(MissingPathParameters)` when the event carries no
    /// parameter collection at all, and `Ok(None)` when the collection exists
    /// but the parameter is missing or `null`.
    ///
    /// # Example
    /// ```ignore
    /// // Route: /ping/{id}, Request: /ping/123
    /// let id = event.path_parameter("id")?; // Some("123")
    /// ```
    pub fn path_parameter(&self, key: &str) -> Result<Option<&str>, HandlerError> {
        let params = self
            .path_parameters
            .as_ref()
            .ok_or(HandlerError::MissingPathParameters)?;
        Ok(params.get(key).and_then(|v| v.as_deref()))
    }

    /// The body as text, decoding base64 when `isBase64Encoded` is set.
    pub fn body_text(&self) -> Result<String, HandlerError> {
        let body = self.body.as_ref().ok_or(HandlerError::MissingBody)?;
        if !self.is_base64_encoded {
            return Ok(body.clone());
        }

        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(|e| HandlerError::InvalidBase64(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| HandlerError::InvalidBase64(e.to_string()))
    }

    /// Parse the body as JSON into a typed value.
    ///
    /// # Example
    /// ```ignore
    /// let body: serde_json::Value = event.json()?;
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let text = self.body_text()?;
        serde_json::from_str(&text).map_err(|e| HandlerError::InvalidJson(e.to_string()))
    }

    /// Get a query parameter as a string reference.
    pub fn query_param(&self, key: &str) -> Option<&String> {
        self.query_string_parameters.get(key)
    }

    /// Get a query parameter parsed as a specific type.
    /// Returns None if the parameter doesn't exist or can't be parsed.
    pub fn query_param_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.query_string_parameters.get(key).and_then(|v| v.parse().ok())
    }

    /// Get a header value (case-insensitive lookup).
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Check if request method matches (case-insensitive).
    pub fn is_method(&self, method: &str) -> bool {
        self.http_method.eq_ignore_ascii_case(method)
    }

    /// Request ID for tracing
    pub fn request_id(&self) -> &str {
        &self.request_context.request_id
    }
}

impl Default for Event {
    fn default() -> Self {
        Self {
            http_method: default_method(),
            path: default_path(),
            headers: HashMap::new(),
            query_string_parameters: HashMap::new(),
            path_parameters: None,
            body: None,
            is_base64_encoded: false,
            request_context: RequestContext::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_gateway_event_with_nulls() {
        let event: Event = serde_json::from_value(json!({
            "httpMethod": "POST",
            "path": "/ping",
            "headers": null,
            "queryStringParameters": null,
            "pathParameters": null,
            "body": "{\"id\": 42}",
            "requestContext": {"requestId": "req-1"}
        }))
        .unwrap();

        assert!(event.is_method("post"));
        assert!(event.headers.is_empty());
        assert!(event.path_parameters.is_none());
        assert_eq!(event.request_id(), "req-1");
        assert_eq!(event.body_text().unwrap(), "{\"id\": 42}");
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let event: Event = serde_json::from_str("{}").unwrap();
        assert_eq!(event.http_method, "GET");
        assert_eq!(event.path, "/");
        assert!(event.body.is_none());
        assert!(!event.is_base64_encoded);
    }

    #[test]
    fn test_path_parameter_presence() {
        let no_params = Event::new("GET", "/ping");
        assert!(matches!(
            no_params.path_parameter("id"),
            Err(HandlerError::MissingPathParameters)
        ));

        let null_id = Event::new("GET", "/ping/x").with_path_parameter("id", None);
        assert_eq!(null_id.path_parameter("id").unwrap(), None);
        assert_eq!(null_id.path_parameter("other").unwrap(), None);

        let empty_id = Event::new("GET", "/ping/").with_path_parameter("id", Some(""));
        assert_eq!(empty_id.path_parameter("id").unwrap(), Some(""));
    }

    #[test]
    fn test_null_path_parameter_from_json() {
        let event: Event = serde_json::from_value(json!({"pathParameters": {"id": null}})).unwrap();
        assert_eq!(event.path_parameter("id").unwrap(), None);
    }

    #[test]
    fn test_json_body() {
        let event = Event::new("POST", "/ping").with_body(r#"{"id": "abc"}"#);
        let value: serde_json::Value = event.json().unwrap();
        assert_eq!(value, json!({"id": "abc"}));

        let bad = Event::new("POST", "/ping").with_body("not json");
        assert!(matches!(bad.json::<serde_json::Value>(), Err(HandlerError::InvalidJson(_))));

        let missing = Event::new("POST", "/ping");
        assert!(matches!(missing.json::<serde_json::Value>(), Err(HandlerError::MissingBody)));
    }

    #[test]
    fn test_base64_body() {
        let mut event = Event::new("POST", "/ping").with_body("eyJpZCI6MX0=");
        event.is_base64_encoded = true;
        assert_eq!(event.body_text().unwrap(), r#"{"id":1}"#);

        event.body = Some("%%%".to_string());
        assert!(matches!(event.body_text(), Err(HandlerError::InvalidBase64(_))));
    }

    #[test]
    fn test_header_and_query_lookup() {
        let mut event = Event::new("GET", "/ping");
        event.headers.insert("Content-Type".into(), "application/json".into());
        event.query_string_parameters.insert("page".into(), "2".into());

        assert_eq!(event.header("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(event.query_param_as::<u32>("page"), Some(2));
        assert_eq!(event.query_param_as::<u32>("missing"), None);
        assert_eq!(event.query_param("page").map(String::as_str), Some("2"));
    }
}
