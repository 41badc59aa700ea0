//! Sandbox-side client for the scriptbox host bridge.
//!
//! A restricted interpreter process executes untrusted wiki scripts and
//! can only affect the outside world through synchronous remote calls to
//! its privileged parent, carried over two pre-opened pipes. This crate
//! is that client half: the blocking call primitive ([`Bridge`]), the
//! taxonomy of host-reported failures ([`Error`]), identity-preserving
//! proxies for host-side invocations ([`FrameCache`]), and the bootstrap
//! glue that attaches the pipes and signals `complete_init`.
//!
//! # Quick start
//!
//! ```no_run
//! use scriptbox_guest::{Bridge, Namespace};
//!
//! let mut bridge = Bridge::from_host_pipes();
//! bridge.complete_init().expect("host rejected init");
//!
//! let upper = bridge
//!     .call(Namespace::Wiki, "language_uc", vec!["café".into()])
//!     .expect("call failed");
//! ```
//!
//! Everything is single-threaded and fully synchronous: one request
//! outstanding at a time, responses strictly request-ordered, no
//! client-side deadline. Fatal protocol conditions (severed or corrupted
//! transport, host-commanded shutdown) terminate the process rather than
//! surfacing to script code.

#[cfg(unix)]
mod boot;
mod bridge;
mod error;
mod frame;

#[cfg(unix)]
pub use boot::{HOST_READ_FD, HOST_WRITE_FD, HostBridge};
pub use bridge::{Bridge, EXIT_PROTOCOL};
pub use error::{Error, Result};
pub use frame::{Frame, FrameCache, current_frame};
pub use scriptbox_proto::{Namespace, Payload};
