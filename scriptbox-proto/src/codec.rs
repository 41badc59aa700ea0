//! Newline-delimited JSON frame codec over any `BufRead`/`Write` stream.
//!
//! Each frame is one compact JSON object followed by `\n`. Compact
//! `serde_json` output escapes all control characters, so an encoded
//! frame can never contain an embedded newline.

use std::io::{BufRead, Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::message::{Request, Response};

/// Maximum allowed frame length (16 MiB), terminator included.
const MAX_FRAME: u64 = 16 * 1024 * 1024;

/// Failures at the framing layer, distinct from any error the host returns.
///
/// A malformed frame means the contract with the host is broken; callers
/// treat everything here except [`WireError::Eof`] under the syscall
/// namespace as unrecoverable.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    /// The host closed the response stream before replying.
    #[error("host stream closed")]
    Eof,

    /// The underlying stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The response line was not a well-formed protocol message.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// The response line exceeded the frame length limit.
    #[error("frame exceeds 16 MiB limit")]
    Oversize,

    /// The `base64` flag was set but `data` was not canonical base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The `base64` flag was set on non-string `data`.
    #[error("base64 flag set on non-string data")]
    BinaryNotText,
}

/// A decoded response payload.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Payload {
    /// An ordinary JSON value.
    Value(Value),
    /// Binary content recovered from a base64-flagged response.
    Binary(Vec<u8>),
}

/// Encodes `req` as one newline-terminated JSON frame, writes it, and flushes.
pub fn write_request<W: Write>(w: &mut W, req: &Request) -> Result<(), WireError> {
    let mut line = serde_json::to_vec(req)?;
    debug_assert!(!line.contains(&b'\n'));
    line.push(b'\n');
    w.write_all(&line)?;
    w.flush()?;
    Ok(())
}

/// Reads exactly one response frame from `r`.
///
/// An empty read (stream closed before any byte) yields [`WireError::Eof`];
/// a non-empty line that fails to parse — including invalid UTF-8 —
/// yields [`WireError::Json`]; a line longer than the frame limit yields
/// [`WireError::Oversize`]. The frame is decoded from raw bytes so that
/// stream corruption is never mistaken for a stream-level I/O failure.
pub fn read_response<R: BufRead>(r: &mut R) -> Result<Response, WireError> {
    let mut line = Vec::new();
    let n = r.by_ref().take(MAX_FRAME).read_until(b'\n', &mut line)?;
    if n == 0 {
        return Err(WireError::Eof);
    }
    if n as u64 == MAX_FRAME && line.last() != Some(&b'\n') {
        return Err(WireError::Oversize);
    }
    Ok(serde_json::from_slice(&line)?)
}

/// Applies the `base64` flag to a response's `data`.
///
/// Base64 is decoded strictly: non-canonical encodings (wrong padding,
/// invalid alphabet, set trailing bits) are rejected rather than silently
/// accepted.
pub fn decode_payload(resp: Response) -> Result<Payload, WireError> {
    if !resp.base64 {
        return Ok(Payload::Value(resp.data));
    }
    match resp.data {
        Value::String(text) => Ok(Payload::Binary(STANDARD.decode(text.as_bytes())?)),
        _ => Err(WireError::BinaryNotText),
    }
}
