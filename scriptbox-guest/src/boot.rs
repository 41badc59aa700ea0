//! Attachment to the pre-opened host pipes.
//!
//! The host opens two pipes before the sandboxed process's entry point
//! runs: fd 3 carries responses host→sandbox, fd 4 carries requests
//! sandbox→host. The sandbox never opens these itself.

use std::fs::File;
use std::io::BufReader;
use std::os::fd::{FromRawFd, RawFd};

use crate::bridge::Bridge;

/// Response stream from the host (read side).
pub const HOST_READ_FD: RawFd = 3;

/// Request stream to the host (write side).
pub const HOST_WRITE_FD: RawFd = 4;

/// The bridge type over the real host pipes.
pub type HostBridge = Bridge<BufReader<File>, File>;

impl Bridge<BufReader<File>, File> {
    /// Attaches to the pipes the host opened before spawning this process.
    ///
    /// Takes ownership of fds 3 and 4; call at most once per process.
    /// Both endpoints live for the process lifetime — there is no
    /// teardown path other than process exit.
    #[allow(unsafe_code)]
    pub fn from_host_pipes() -> Self {
        // Safety: the host guarantees fds 3 and 4 are open before our
        // entry point runs, and nothing else in this process owns them.
        let reader = unsafe { File::from_raw_fd(HOST_READ_FD) };
        let writer = unsafe { File::from_raw_fd(HOST_WRITE_FD) };
        Self::new(BufReader::new(reader), writer)
    }
}
