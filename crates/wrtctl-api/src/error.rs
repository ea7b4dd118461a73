use thiserror::Error;

/// Top-level error type for the `wrtctl-api` crate.
///
/// Covers every failure mode of the remote shell channel: opening and
/// authenticating the SSH connection, the liveness probe, reading the
/// terminal transcript, exit-status framing, and ubus calls.
/// `wrtctl-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// TCP connect, key exchange, or shell setup failed.
    #[error("Cannot connect to {host}: {reason}")]
    Connect { host: String, reason: String },

    /// The device rejected the supplied credentials.
    #[error("Authentication failed for {username}@{host}")]
    Authentication { host: String, username: String },

    /// Opening the connection took longer than the connect timeout.
    #[error("Connecting to {host} timed out after {timeout_secs}s")]
    ConnectTimeout { host: String, timeout_secs: u64 },

    /// The `echo 1234` liveness probe did not come back verbatim.
    #[error("Liveness probe failed: expected `1234`, got {output:?}")]
    Probe { output: String },

    /// Every connection attempt in the retry budget failed.
    #[error("Gave up on {target} after {attempts} connection attempt(s): {last_error}")]
    RetriesExhausted {
        target: String,
        attempts: u32,
        #[source]
        last_error: Box<Error>,
    },

    /// The command contains a line break. An interactive shell would run
    /// each line separately and interleave prompts with the output.
    #[error("Command contains a line break: {command:?}")]
    MultiLineCommand { command: String },

    /// A command was issued while no transport is open.
    #[error("Not connected")]
    NotConnected,

    // ── Transport ───────────────────────────────────────────────────
    /// SSH protocol error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// I/O error on the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The shell prompt did not appear within the read timeout.
    #[error("Timed out after {timeout_secs}s waiting for the shell prompt")]
    Timeout { timeout_secs: u64 },

    /// The remote side closed the shell channel.
    #[error("Shell channel closed by remote")]
    ChannelClosed,

    /// The configured prompt pattern is not a valid regex.
    #[error("Invalid prompt pattern: {0}")]
    Prompt(#[from] regex::Error),

    // ── Framing ─────────────────────────────────────────────────────
    /// The trailing line of a checked command was not an integer.
    #[error("Could not parse exit status from {line:?}")]
    ExitStatus { line: String },

    // ── ubus ────────────────────────────────────────────────────────
    /// `ubus call` exited non-zero.
    #[error("ubus call {path} {method} failed with exit status {exit_code}")]
    Ubus {
        path: String,
        method: String,
        exit_code: i32,
        output: String,
    },

    /// Encoding the ubus argument object failed.
    #[error("Cannot encode ubus arguments: {0}")]
    Encode(String),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the transport that produced this error can no
    /// longer be trusted to be in sync with the remote prompt.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Ssh(_) | Self::Io(_) | Self::Timeout { .. } | Self::ChannelClosed
        )
    }

    /// Returns `true` if the failure is a credential problem.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::RetriesExhausted { last_error, .. } => last_error.is_auth(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_is_seen_through_exhausted_retries() {
        let err = Error::RetriesExhausted {
            target: "root@router:22".into(),
            attempts: 3,
            last_error: Box::new(Error::Authentication {
                host: "router".into(),
                username: "root".into(),
            }),
        };
        assert!(err.is_auth());
        assert!(!err.is_transport());
    }

    #[test]
    fn refused_connection_is_not_an_auth_failure() {
        let err = Error::RetriesExhausted {
            target: "root@router:22".into(),
            attempts: 3,
            last_error: Box::new(Error::ChannelClosed),
        };
        assert!(!err.is_auth());
    }
}
