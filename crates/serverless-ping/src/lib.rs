//! serverless-ping functions
//!
//! Three HTTP-triggered functions that echo an identifier back: `ping`,
//! `pingPath` and `pingPost`. Each can run as its own worker binary
//! (`src/bin/`) or be invoked in-process by name through [`invoke`].

pub mod handler;

use serverless_ping_sdk::{Completion, Event, HandlerError, HandlerFn};

/// Function names as they appear in `functions.yaml`, with their handlers
pub const FUNCTIONS: &[(&str, HandlerFn)] = &[
    ("ping", handler::ping as HandlerFn),
    ("pingPath", handler::ping_path as HandlerFn),
    ("pingPost", handler::ping_post as HandlerFn),
];

/// Look up a handler by function name.
pub fn lookup(name: &str) -> Option<HandlerFn> {
    FUNCTIONS
        .iter()
        .find(|(function, _)| *function == name)
        .map(|(_, handler)| *handler)
}

/// Invoke the named function with `event`.
pub fn invoke(name: &str, event: Event) -> Result<Completion, HandlerError> {
    let handler = lookup(name).ok_or_else(|| HandlerError::UnknownFunction(name.to_string()))?;
    Ok(handler(event))
}

/// Names of every registered function.
pub fn names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names() {
        assert_eq!(names().collect::<Vec<_>>(), vec!["ping", "pingPath", "pingPost"]);
        assert!(lookup("pingPath").is_some());
        assert!(lookup("ping_path").is_none());
    }

    #[test]
    fn test_invoke_by_name() {
        let completion = invoke("ping", Event::default()).unwrap();
        assert_eq!(completion.response().status_code, 200);

        let completion = invoke("pingPost", Event::new("POST", "/ping").with_body(r#"{"id":"x"}"#)).unwrap();
        assert_eq!(completion.response().status_code, 201);
    }

    #[test]
    fn test_invoke_unknown_function() {
        let err = invoke("pong", Event::default()).unwrap_err();
        assert!(matches!(err, HandlerError::UnknownFunction(ref name) if name == "pong"));
    }
}
