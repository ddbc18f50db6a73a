//! Gateway router - turns HTTP requests into function invocations
//!
//! Every request is matched against the manifest routes, converted into an
//! [`Event`], handed to the function in-process, and the resulting
//! completion is written back as the HTTP response.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serverless_ping_sdk::request::{Event, PathParameters, RequestContext};
use serverless_ping_sdk::Response as FunctionResponse;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;

/// Create the gateway router that handles all incoming requests
pub fn create_gateway_router(_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/{*path}", any(handle_gateway_request))
        .route("/", any(handle_gateway_request))
}

/// Health check endpoint for the gateway
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handle an incoming gateway request
async fn handle_gateway_request(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = Uuid::new_v4().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let Some(route_path) = state.route_path(&path) else {
        tracing::debug!("Path {} is outside stage {:?}", path, state.config.stage);
        return into_http(FunctionResponse::not_found(format!("No function for {} {}", method, path)));
    };

    let matched = state
        .routes
        .iter()
        .find_map(|route| route.matches(&method, route_path).map(|params| (route, params)));
    let Some((route, params)) = matched else {
        tracing::debug!("No function found for {} {}", method, path);
        return into_http(FunctionResponse::not_found(format!("No function for {} {}", method, path)));
    };

    let params = match decode_path_params(params) {
        Ok(params) => params,
        Err(e) => {
            tracing::debug!(request_id = %request_id, "Undecodable path parameter in {}: {}", path, e);
            return into_http(FunctionResponse::bad_request(format!(
                "Path parameter is not valid UTF-8 after decoding: {}",
                e
            )));
        }
    };

    let query: HashMap<String, String> = request
        .uri()
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    let body_bytes = match axum::body::to_bytes(request.into_body(), state.config.body_limit_bytes).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(request_id = %request_id, "Failed to read body: {}", e);
            return into_http(FunctionResponse::bad_request("Failed to read body"));
        }
    };
    let (body, is_base64_encoded) = encode_body(&body_bytes);

    // Routes without {param} segments send a null collection, like a real gateway
    let path_parameters: Option<PathParameters> = route
        .has_parameters()
        .then(|| params.into_iter().map(|(k, v)| (k, Some(v))).collect());

    let event = Event {
        http_method: method,
        path: path.clone(),
        headers,
        query_string_parameters: query,
        path_parameters,
        body,
        is_base64_encoded,
        request_context: RequestContext {
            request_id: request_id.clone(),
            request_time_epoch: chrono::Utc::now().timestamp_millis(),
        },
    };

    let completion = match serverless_ping::invoke(&route.handler, event) {
        Ok(completion) => completion,
        Err(e) => {
            tracing::error!(request_id = %request_id, function = %route.function, "Handler error: {}", e);
            return into_http(FunctionResponse::internal_error(e.to_string()));
        }
    };

    if let Some(error) = completion.error() {
        tracing::error!(
            request_id = %request_id,
            function = %route.function,
            "Invocation failed: {}",
            error
        );
    }

    let mut response = completion.into_response();
    tracing::debug!(
        request_id = %request_id,
        function = %route.function,
        status = response.status_code,
        "Invocation completed"
    );

    if route.cors {
        response = response.with_cors("*");
    }
    into_http(response)
}

/// Percent-decode captured path segments, as a proxy gateway does before
/// handing `pathParameters` to a function.
fn decode_path_params(
    params: HashMap<String, String>,
) -> Result<HashMap<String, String>, std::str::Utf8Error> {
    params
        .into_iter()
        .map(|(name, raw)| -> Result<(String, String), std::str::Utf8Error> {
            let value = percent_encoding::percent_decode_str(&raw).decode_utf8()?;
            Ok((name, value.into_owned()))
        })
        .collect()
}

/// Text bodies pass through; anything that is not UTF-8 is base64-encoded.
fn encode_body(bytes: &[u8]) -> (Option<String>, bool) {
    if bytes.is_empty() {
        return (None, false);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => (Some(text.to_string()), false),
        Err(_) => {
            use base64::Engine;
            (Some(base64::engine::general_purpose::STANDARD.encode(bytes)), true)
        }
    }
}

/// Convert a function response into an HTTP response
fn into_http(response: FunctionResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match response.body_bytes() {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Function returned an undecodable body: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid function response").into_response();
        }
    };

    let mut builder = Response::builder().status(status);
    for (key, value) in &response.headers {
        builder = builder.header(key, value);
    }

    match builder.body(Body::from(body)) {
        Ok(response) => response,
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::manifest::FunctionsManifest;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const MANIFEST: &str = r#"
service: serverless-ping
functions:
  ping:
    events:
      - http:
          method: get
          path: ping
  pingPath:
    events:
      - http:
          method: get
          path: ping/{id}
      - http:
          method: get
          path: echo
  pingPost:
    events:
      - http:
          method: post
          path: ping
          cors: true
"#;

    fn app_with(config: AppConfig) -> Router {
        let manifest = FunctionsManifest::parse(MANIFEST).unwrap();
        let state = Arc::new(AppState::new(config, &manifest));
        create_gateway_router(state.clone()).with_state(state)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Body) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri).body(body).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    fn json_of(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = send(app_with(AppConfig::default()), "GET", "/health", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_ping() {
        let (status, headers, body) = send(app_with(AppConfig::default()), "GET", "/ping", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn test_ping_path() {
        let (status, _, body) = send(app_with(AppConfig::default()), "GET", "/ping/abc", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!([{"pathReceived": "abc"}]));
    }

    #[tokio::test]
    async fn test_ping_path_decodes_parameters() {
        let (status, _, body) = send(app_with(AppConfig::default()), "GET", "/ping/a%20b", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!([{"pathReceived": "a b"}]));

        let (status, _, body) =
            send(app_with(AppConfig::default()), "GET", "/ping/caf%C3%A9%2F1", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!([{"pathReceived": "café/1"}]));
    }

    #[tokio::test]
    async fn test_ping_path_rejects_invalid_utf8_parameter() {
        let (status, _, body) = send(app_with(AppConfig::default()), "GET", "/ping/%FF", Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_of(&body)["error"]
            .as_str()
            .unwrap()
            .starts_with("Path parameter is not valid UTF-8"));
    }

    #[test]
    fn test_decode_path_params() {
        let params: HashMap<String, String> = [("id".to_string(), "a%2Bb+c".to_string())].into_iter().collect();
        let decoded = decode_path_params(params).unwrap();
        assert_eq!(decoded.get("id").map(String::as_str), Some("a+b+c"));
    }

    #[tokio::test]
    async fn test_ping_path_without_parameters_fails() {
        let (status, _, body) = send(app_with(AppConfig::default()), "GET", "/echo", Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body), json!({"error": "Event has no pathParameters collection"}));
    }

    #[tokio::test]
    async fn test_ping_post() {
        let (status, headers, body) =
            send(app_with(AppConfig::default()), "POST", "/ping", Body::from(r#"{"id": 42}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(json_of(&body), json!({"success": "true", "message": "id: 42"}));
    }

    #[tokio::test]
    async fn test_ping_post_validation_and_parse_errors() {
        let (status, _, body) = send(app_with(AppConfig::default()), "POST", "/ping", Body::from("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body), json!({"error": "id not found in message body"}));

        let (status, _, body) = send(app_with(AppConfig::default()), "POST", "/ping", Body::from("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_of(&body)["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _, body) = send(app_with(AppConfig::default()), "DELETE", "/ping", Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body), json!({"error": "No function for DELETE /ping"}));
    }

    #[tokio::test]
    async fn test_stage_prefix() {
        let config = AppConfig {
            stage: Some("dev".to_string()),
            ..AppConfig::default()
        };

        let (status, _, body) = send(app_with(config.clone()), "GET", "/dev/ping/xyz", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!([{"pathReceived": "xyz"}]));

        let (status, _, _) = send(app_with(config), "GET", "/ping/xyz", Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let config = AppConfig {
            body_limit_bytes: 4,
            ..AppConfig::default()
        };
        let (status, _, body) = send(app_with(config), "POST", "/ping", Body::from(r#"{"id": 1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body), json!({"error": "Failed to read body"}));
    }

    #[test]
    fn test_encode_body() {
        assert_eq!(encode_body(b""), (None, false));
        assert_eq!(encode_body(b"{}"), (Some("{}".to_string()), false));
        assert_eq!(encode_body(&[0xff, 0xfe]), (Some("//4=".to_string()), true));
    }

    #[test]
    fn test_into_http_decodes_binary() {
        let response = into_http(FunctionResponse::binary(200, [1u8, 2, 3], "application/octet-stream"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/octet-stream");
    }
}
