//! Protocol message types for host↔sandbox communication.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success sentinel for [`Response::code`].
pub const CODE_OK: i64 = 0;

/// Routing tag selecting which call table on the host handles a request.
///
/// The integer values are fixed by the protocol and must match host
/// expectations exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[non_exhaustive]
pub enum Namespace {
    /// Raw syscall-style operations. Low-level failures here are expected
    /// to be handled by callers rather than killing the sandbox.
    Sys = 0,
    /// Sandbox lifecycle and control operations (e.g. `complete_init`).
    Sandbox = 1,
    /// Wiki-domain operations.
    Wiki = 2,
}

impl From<Namespace> for u8 {
    fn from(ns: Namespace) -> Self {
        ns as Self
    }
}

impl TryFrom<u8> for Namespace {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Sys),
            1 => Ok(Self::Sandbox),
            2 => Ok(Self::Wiki),
            other => Err(format!("unknown namespace {other}")),
        }
    }
}

/// A single remote call, sent from the sandbox to the host.
///
/// Serialized as `{"ns":<int>,"name":<string>,"args":[...]}`. Arguments
/// are positional only; no named arguments cross the wire. Created once
/// per call, immutable, discarded after transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Call table selector.
    pub ns: Namespace,
    /// Opaque call identifier within the namespace.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<Value>,
}

/// A single reply, sent from the host to the sandbox.
///
/// `code == 0` means success and `data` is the return value. A negative
/// `code` commands process exit. A positive `code` indexes the error
/// taxonomy. `errno`, when nonzero under the syscall namespace, signals a
/// POSIX-style error. All fields except `code` are optional on the wire;
/// the decoder does not depend on key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Status code: zero for success, positive for a catchable error,
    /// negative for host-commanded shutdown.
    pub code: i64,
    /// POSIX errno accompanying a raw syscall failure; zero when unused.
    #[serde(default)]
    pub errno: i32,
    /// Return value or error detail.
    #[serde(default)]
    pub data: Value,
    /// When true, `data` is binary content encoded as base64 text.
    #[serde(default)]
    pub base64: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Namespace::Wiki).unwrap();
        assert_eq!(json, "2");

        let ns: Namespace = serde_json::from_str("0").unwrap();
        assert_eq!(ns, Namespace::Sys);
    }

    #[test]
    fn namespace_rejects_unknown_values() {
        assert!(serde_json::from_str::<Namespace>("3").is_err());
        assert!(serde_json::from_str::<Namespace>("-1").is_err());
    }

    #[test]
    fn response_fields_default_when_absent() {
        let resp: Response = serde_json::from_str(r#"{"code":0}"#).unwrap();
        assert_eq!(resp.code, CODE_OK);
        assert_eq!(resp.errno, 0);
        assert!(resp.data.is_null());
        assert!(!resp.base64);
    }

    #[test]
    fn response_ignores_key_order() {
        let a: Response = serde_json::from_str(r#"{"code":1,"data":"x","errno":0}"#).unwrap();
        let b: Response = serde_json::from_str(r#"{"errno":0,"data":"x","code":1}"#).unwrap();
        assert_eq!(a.code, b.code);
        assert_eq!(a.data, b.data);
    }
}
