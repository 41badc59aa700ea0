//! Synchronous call primitive between the sandbox and its host.
//!
//! Every remote operation funnels through [`Bridge::call`]: write one
//! request frame, block for exactly one response frame, classify it.
//! There is no retry, no timeout, and no concurrent call in flight; the
//! sandbox makes no progress while a call is outstanding.

use std::io::{BufRead, Write};
use std::process;

use serde_json::Value;
use tracing::{trace, warn};

use scriptbox_proto::{
    CODE_OK, Namespace, Payload, Request, Response, WireError, decode_payload, read_response,
    write_request,
};

use crate::error::{Error, Result};

/// Exit status for a protocol-level transport failure (EPROTO).
///
/// Used when the response stream is severed or corrupted outside the
/// syscall namespace; there is no safe way to continue a script whose
/// bridge to the host is broken.
pub const EXIT_PROTOCOL: i32 = 71;

/// errno reported to callers when the syscall stream is severed.
const EIO: i32 = 5;

/// Outcome of a round trip that does not produce a value.
#[derive(Debug)]
enum Abort {
    /// A catchable failure, surfaced to script code.
    Error(Error),
    /// The process must terminate with this status.
    Exit(i32),
}

/// The transport context for remote calls.
///
/// Constructed once at startup over the host-supplied pipes (see
/// [`Bridge::from_host_pipes`]) and threaded through everything that
/// needs to reach the host. In tests, any in-memory `BufRead`/`Write`
/// pair substitutes for the real pipes.
#[derive(Debug)]
pub struct Bridge<R, W> {
    /// Response stream, host to sandbox.
    reader: R,
    /// Request stream, sandbox to host.
    writer: W,
    /// Whether the one-shot `complete_init` signal has been sent.
    init_done: bool,
}

impl<R: BufRead, W: Write> Bridge<R, W> {
    /// Creates a bridge over an arbitrary stream pair.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            init_done: false,
        }
    }

    /// Issues one remote call and blocks for its result.
    ///
    /// Exactly-once on the wire: callers needing retry semantics must
    /// re-invoke. Returns the response payload on success, an [`Error`]
    /// for catchable host failures, and does not return at all when the
    /// host commands shutdown or the protocol is violated — the process
    /// exits instead.
    pub fn call(&mut self, ns: Namespace, name: &str, args: Vec<Value>) -> Result<Payload> {
        match self.exchange(ns, name, args) {
            Ok(payload) => Ok(payload),
            Err(Abort::Error(err)) => Err(err),
            Err(Abort::Exit(status)) => {
                warn!(status, name, "fatal bridge condition, terminating");
                process::exit(status)
            }
        }
    }

    /// Signals the host that sandbox initialization is complete.
    ///
    /// Must run after all bootstrap imports and before any user script
    /// code; the host uses it to narrow sandbox privileges. Sent at most
    /// once per process; repeat calls are no-ops.
    pub fn complete_init(&mut self) -> Result<()> {
        if self.init_done {
            return Ok(());
        }
        self.call(Namespace::Sandbox, "complete_init", Vec::new())?;
        self.init_done = true;
        Ok(())
    }

    /// One full round trip, with fatal conditions reported rather than
    /// executed. [`Bridge::call`] turns [`Abort::Exit`] into the real
    /// process exit.
    fn exchange(
        &mut self,
        ns: Namespace,
        name: &str,
        args: Vec<Value>,
    ) -> std::result::Result<Payload, Abort> {
        let req = Request {
            ns,
            name: name.to_owned(),
            args,
        };
        trace!(ns = u8::from(ns), name, "sending request");

        if let Err(err) = write_request(&mut self.writer, &req) {
            return Err(stream_failure(ns, err));
        }

        let resp = match read_response(&mut self.reader) {
            Ok(resp) => resp,
            Err(err) => return Err(stream_failure(ns, err)),
        };
        trace!(code = resp.code, errno = resp.errno, "received response");

        classify(ns, resp)
    }
}

/// Applies the severity policy to one decoded response.
///
/// Precedence: syscall errno, then host-directed fatal codes, then the
/// error taxonomy, then success. Exactly one of value, catchable error,
/// or exit results — an error is never silently discarded.
fn classify(ns: Namespace, resp: Response) -> std::result::Result<Payload, Abort> {
    if ns == Namespace::Sys && resp.errno != 0 {
        return Err(Abort::Error(Error::from_errno(resp.errno, &resp.data)));
    }

    if resp.code < 0 {
        // Host-commanded shutdown: the negated code is the exit status.
        // A code whose negation does not fit an exit status (including
        // i64::MIN, which has no negation at all) falls back to the
        // protocol-failure status.
        let status = resp
            .code
            .checked_neg()
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(EXIT_PROTOCOL);
        return Err(Abort::Exit(status));
    }

    if resp.code != CODE_OK {
        return Err(Abort::Error(Error::from_code(resp.code, &resp.data)));
    }

    // A corrupt base64 payload breaks the data-model contract just as a
    // malformed line would.
    decode_payload(resp).map_err(|err| {
        warn!(%err, "undecodable success payload");
        Abort::Exit(EXIT_PROTOCOL)
    })
}

/// Policy for a severed or corrupted stream.
///
/// EOF and raw I/O failures under the syscall namespace surface as a
/// catchable EIO-class error; everywhere else, and for any malformed
/// frame, the contract with the host is broken and the process must stop.
fn stream_failure(ns: Namespace, err: WireError) -> Abort {
    match err {
        WireError::Eof | WireError::Io(_) if ns == Namespace::Sys => Abort::Error(Error::Io {
            errno: EIO,
            message: "host bridge stream failed".to_owned(),
            path: None,
            path2: None,
        }),
        _ => {
            warn!(%err, "bridge protocol failure");
            Abort::Exit(EXIT_PROTOCOL)
        }
    }
}
