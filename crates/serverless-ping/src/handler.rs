//! The `ping`, `pingPath` and `pingPost` functions
//!
//! Each takes one event and returns one completion. `pingPath` treats only a
//! missing or `null` id as absent, while `pingPost` rejects any falsy id
//! (`null`, `false`, `0`, `""`).

use serverless_ping_sdk::prelude::*;

/// Returned by `pingPath` when the `id` path parameter is null
pub const MISSING_PATH_ID: &str = "id was not found in the request path";

/// Returned by `pingPost` when the body carries no usable `id`
pub const MISSING_BODY_ID: &str = "id not found in message body";

/// Always answers 200 with an empty array body.
pub fn ping(_event: Event) -> Completion {
    Completion::succeed(Response::ok_empty())
}

/// Echo the `id` path parameter.
pub fn ping_path(event: Event) -> Completion {
    let id = match event.path_parameter("id") {
        Ok(id) => id,
        Err(e) => return Completion::fail(e),
    };

    match id {
        Some(id) => Completion::succeed(Response::ok(json!({ "pathReceived": id }))),
        None => Completion::succeed(Response::bad_request(MISSING_PATH_ID)),
    }
}

/// Echo the `id` field of a JSON body as a 201.
pub fn ping_post(event: Event) -> Completion {
    let body: JsonValue = match event.json() {
        Ok(body) => body,
        Err(e) => return Completion::fail(e),
    };

    let id = match &body {
        JsonValue::Null => {
            return Completion::fail(HandlerError::InvalidJson(
                "body is null, expected an object".to_string(),
            ))
        }
        JsonValue::Object(fields) => fields.get("id").filter(|id| is_truthy(id)),
        _ => None,
    };

    let Some(id) = id else {
        return Completion::succeed(Response::bad_request(MISSING_BODY_ID));
    };

    Completion::succeed(Response::created(json!({
        "success": "true",
        "message": format!("id: {}", template_string(id)),
    })))
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Render a value the way string interpolation does: strings verbatim,
/// numbers per [`number_string`], arrays comma-joined.
fn template_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.as_f64().map(number_string).unwrap_or_else(|| n.to_string()),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                // null elements render as empty strings inside a join
                JsonValue::Null => String::new(),
                other => template_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        JsonValue::Object(_) => "[object Object]".to_string(),
    }
}

/// Number-to-string conversion with the same digits and notation as
/// ECMAScript's `Number.prototype.toString()`: plain decimal for exponents in
/// `[-7, 21)`, otherwise `d.ddde+N` / `d.ddde-N`.
fn number_string(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };

    // `{:e}` yields the shortest round-tripping digits, e.g. "1.2345e-7"
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 >= 0 { "+" } else { "-" };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (n - 1).abs())
        }
    };

    format!("{}{}", sign, body)
}
