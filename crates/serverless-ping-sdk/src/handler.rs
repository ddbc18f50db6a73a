//! Handler signature and the completion value every invocation produces
//!
//! A handler is a plain function from [`Event`] to [`Completion`]. Returning a
//! value (instead of calling back) guarantees each invocation completes
//! exactly once, with either a response or a failure plus fallback response.
//!
//! # Example
//!
//! ```ignore
//! use serverless_ping_sdk::prelude::*;
//!
//! fn echo(event: Event) -> Completion {
//!     match event.path_parameter("id") {
//!         Ok(Some(id)) => Completion::succeed(Response::ok(json!({"id": id}))),
//!         Ok(None) => Completion::succeed(Response::bad_request("missing id")),
//!         Err(e) => Completion::fail(e),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{Event, HandlerError, Response};

/// Type alias for the handler function signature
pub type HandlerFn = fn(Event) -> Completion;

/// Outcome of a single invocation
#[derive(Debug)]
pub enum Completion {
    /// The handler produced a response. Validation failures (400s) land here.
    Succeeded(Response),

    /// The handler hit a structural failure; `response` is the fallback
    /// returned to the caller.
    Failed {
        error: HandlerError,
        response: Response,
    },
}

impl Completion {
    /// Complete successfully with the given response.
    pub fn succeed(response: Response) -> Self {
        Completion::Succeeded(response)
    }

    /// Complete with a failure and a 400 fallback built from the error's
    /// description.
    pub fn fail(error: HandlerError) -> Self {
        let response = Response::bad_request(error.to_string());
        Completion::Failed { error, response }
    }

    /// Complete with a failure and an explicit fallback response.
    pub fn fail_with(error: HandlerError, response: Response) -> Self {
        Completion::Failed { error, response }
    }

    /// The response carried by this completion, fallback or not.
    pub fn response(&self) -> &Response {
        match self {
            Completion::Succeeded(response) => response,
            Completion::Failed { response, .. } => response,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&HandlerError> {
        match self {
            Completion::Succeeded(_) => None,
            Completion::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Completion::Failed { .. })
    }

    /// Consume the completion, keeping only the response.
    pub fn into_response(self) -> Response {
        match self {
            Completion::Succeeded(response) => response,
            Completion::Failed { response, .. } => response,
        }
    }

    /// Wire form sent back to the gateway.
    pub fn to_frame(&self) -> CompletionFrame {
        CompletionFrame {
            error: self.error().map(|e| e.to_string()),
            response: self.response().clone(),
        }
    }
}

impl From<Response> for Completion {
    fn from(response: Response) -> Self {
        Completion::Succeeded(response)
    }
}

/// Serialized completion: `{"error": string | null, "response": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionFrame {
    pub error: Option<String>,
    pub response: Response,
}
