//! serverless-ping SDK - Types and utilities for writing function handlers
//!
//! A handler receives an [`Event`] describing one HTTP invocation and returns
//! a [`Completion`]: either a response, or a failure paired with a fallback
//! response. Responses are built with the constructors on [`Response`].

pub mod request;
pub mod response;
pub mod handler;
pub mod ipc;
pub mod error;

pub mod prelude {
    //! Common imports for function handlers
    pub use crate::request::{Event, PathParameters, RequestContext};
    pub use crate::response::Response;
    pub use crate::handler::{Completion, CompletionFrame, HandlerFn};
    pub use crate::ipc::{read_event, send_completion};
    pub use crate::error::HandlerError;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Value as JsonValue};
}

// Re-export key types at crate root
pub use request::Event;
pub use response::Response;
pub use handler::{Completion, CompletionFrame, HandlerFn};
pub use error::HandlerError;
