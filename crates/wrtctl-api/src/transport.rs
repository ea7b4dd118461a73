// Transport seam between the session manager and the wire.
//
// The session only ever sees these two traits. `SshConnector` is the
// production implementation; tests plug in scripted shells.

use async_trait::async_trait;

use crate::error::Error;

/// Raw text read back after writing one line into the shell.
///
/// `stdout` is everything the terminal printed up to and including the
/// next prompt: the echoed command, its output, and the prompt itself.
/// `stderr` holds anything that arrived on the separate error stream
/// (usually empty under a PTY, which merges both).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub stdout: String,
    pub stderr: String,
}

/// A live interactive shell sitting at its prompt.
#[async_trait]
pub trait Transport: Send {
    /// Write `line` followed by a newline and read until the next prompt.
    async fn send_line(&mut self, line: &str) -> Result<Transcript, Error>;

    /// Close the shell and the connection underneath it.
    async fn close(&mut self) -> Result<(), Error>;
}

/// Opens fresh transports to one device.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect, authenticate, and return a shell waiting at its prompt.
    async fn open(&self) -> Result<Box<dyn Transport>, Error>;

    /// Human-readable target for logs (e.g. `root@192.168.1.1:22`).
    fn target(&self) -> String;
}
