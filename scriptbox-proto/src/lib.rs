//! Wire protocol for scriptbox host↔sandbox communication.
//!
//! Messages are serialized as compact JSON and framed one per line,
//! newline-terminated, UTF-8. The sandbox writes [`Request`] frames and
//! reads [`Response`] frames; binary response payloads are carried as
//! base64 text inside the otherwise text-safe structure.
//!
//! Earlier protocol revisions omitted the `ns` field from requests and
//! named the lifecycle signal `completeInit`. This crate targets the
//! latest revision only.

mod codec;
mod message;

pub use codec::{Payload, WireError, decode_payload, read_response, write_request};
pub use message::{CODE_OK, Namespace, Request, Response};
