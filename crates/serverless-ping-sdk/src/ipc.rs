//! Invocation protocol between the gateway and function worker processes.
//!
//! Workers read events from stdin and write completions to stdout, one
//! length-prefixed JSON frame each (4-byte big-endian length, then payload).
//! Stderr is left free for diagnostics.
//!
//! # Handler Macro
//!
//! ```ignore
//! fn handle(event: Event) -> Completion {
//!     Completion::succeed(Response::ok_empty())
//! }
//! handler_loop!(handle);
//! ```

use crate::{Completion, CompletionFrame, Event, HandlerError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, ErrorKind, Read, Write};

/// Upper bound on a single frame, matching the gateway's body limit headroom
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Read one frame from `reader` and deserialize it.
///
/// Returns `Ok(None)` on a clean end of stream before any length bytes.
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>, HandlerError> {
    // Read length prefix (4 bytes, big-endian)
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(HandlerError::IpcError(format!("Failed to read length prefix: {}", e))),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(HandlerError::IpcError(format!(
            "Frame of {} bytes exceeds limit of {} bytes",
            len, MAX_FRAME_LEN
        )));
    }

    // Read the JSON payload
    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .map_err(|e| HandlerError::IpcError(format!("Failed to read payload: {}", e)))?;

    serde_json::from_slice(&payload)
        .map(Some)
        .map_err(|e| HandlerError::IpcError(format!("Failed to parse frame: {}", e)))
}

/// Serialize `value` and write it to `writer` as one frame.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), HandlerError> {
    let payload = serde_json::to_vec(value)
        .map_err(|e| HandlerError::IpcError(format!("Failed to serialize frame: {}", e)))?;

    let len = u32::try_from(payload.len())
        .map_err(|_| HandlerError::IpcError("Frame too large".into()))?;

    // Write length prefix
    writer
        .write_all(&len.to_be_bytes())
        .map_err(|e| HandlerError::IpcError(format!("Failed to write length: {}", e)))?;

    // Write payload
    writer
        .write_all(&payload)
        .map_err(|e| HandlerError::IpcError(format!("Failed to write payload: {}", e)))?;

    writer
        .flush()
        .map_err(|e| HandlerError::IpcError(format!("Failed to flush: {}", e)))
}

/// Read an event from stdin (sent by the gateway).
///
/// Returns `Ok(None)` once the gateway closes the channel.
pub fn read_event() -> Result<Option<Event>, HandlerError> {
    let stdin = io::stdin();
    let mut handle = stdin.lock();
    read_frame(&mut handle)
}

/// Send a completion to stdout (received by the gateway).
pub fn send_completion(completion: &Completion) -> Result<(), HandlerError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_frame(&mut handle, &completion.to_frame())
}

/// Run `handler` over every event frame in `input`, writing one completion
/// frame per event to `output`. Stops cleanly at end of input.
pub fn serve<R: Read, W: Write>(
    handler: crate::HandlerFn,
    input: &mut R,
    output: &mut W,
) -> Result<usize, HandlerError> {
    let mut served = 0;
    while let Some(event) = read_frame::<_, Event>(input)? {
        let completion = handler(event);
        if let Some(error) = completion.error() {
            eprintln!("Invocation failed: {}", error);
        }
        write_frame(output, &completion.to_frame())?;
        served += 1;
    }
    Ok(served)
}

/// Read back a completion written by [`serve`] or [`send_completion`].
pub fn read_completion<R: Read>(reader: &mut R) -> Result<Option<CompletionFrame>, HandlerError> {
    read_frame(reader)
}

/// Convenience macro for running a handler as a worker process.
///
/// The handler function takes an `Event` and returns a `Completion`.
///
/// # Example
/// ```ignore
/// use serverless_ping_sdk::prelude::*;
///
/// fn handle(event: Event) -> Completion {
///     Completion::succeed(Response::ok(json!({"path": event.path})))
/// }
///
/// handler_loop!(handle);
/// ```
#[macro_export]
macro_rules! handler_loop {
    ($handler:expr) => {
        fn main() {
            let stdin = ::std::io::stdin();
            let stdout = ::std::io::stdout();
            match $crate::ipc::serve($handler, &mut stdin.lock(), &mut stdout.lock()) {
                Ok(served) => eprintln!("Channel closed after {} invocation(s)", served),
                Err(e) => {
                    eprintln!("Worker stopped: {}", e);
                    ::std::process::exit(1);
                }
            }
        }
    };
}
