//! Error types for serverless-ping handlers

use thiserror::Error;

/// Errors that can occur while handling or transporting an invocation
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Event has no pathParameters collection")]
    MissingPathParameters,

    #[error("Event has no body")]
    MissingBody,

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Invalid base64 body: {0}")]
    InvalidBase64(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

impl HandlerError {
    /// Convert the error to an HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::MissingPathParameters
            | HandlerError::MissingBody
            | HandlerError::InvalidJson(_)
            | HandlerError::InvalidBase64(_) => 400,
            HandlerError::UnknownFunction(_) => 404,
            HandlerError::IpcError(_) | HandlerError::SerializationError(_) => 500,
        }
    }

    /// Convert to a Response
    pub fn to_response(&self) -> crate::Response {
        crate::Response::json(
            self.status_code(),
            serde_json::json!({
                "error": self.to_string()
            }),
        )
    }
}

impl From<HandlerError> for crate::Response {
    fn from(err: HandlerError) -> Self {
        err.to_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Response;

    #[test]
    fn test_handler_error_conversion() {
        let err = HandlerError::InvalidJson("expected value at line 1 column 1".to_string());
        let response: Response = err.into();
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.body,
            r#"{"error":"Invalid JSON body: expected value at line 1 column 1"}"#
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HandlerError::MissingPathParameters.status_code(), 400);
        assert_eq!(HandlerError::UnknownFunction("x".into()).status_code(), 404);
        assert_eq!(HandlerError::IpcError("closed".into()).status_code(), 500);
    }
}
