// Terminal session manager and command channel
//
// Owns the single live transport to one device. Every command first
// re-validates the connection with a liveness probe, reconnecting with a
// bounded, sequential retry budget, then runs one write-then-read cycle
// through the transport and reframes the transcript.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::framing::{
    PROBE_COMMAND, PROBE_REPLY, checked_command, normalize, split_exit_status,
    strip_echo_and_prompt,
};
use crate::transport::{Connector, Transcript, Transport};

/// Reconnect budget for [`Session::ensure_connected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total connection attempts per call (values below 1 behave as 1).
    pub attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Outcome of one shell command.
///
/// `exit_code` is only populated by [`Session::send_checked`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// `true` when the command was checked and exited 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// One logical connection to a device.
///
/// Not safe for concurrent use: the channel has no way to tag responses,
/// so callers must hold `&mut Session` for the whole command. Wrap it in a
/// mutex to share it.
pub struct Session {
    connector: Arc<dyn Connector>,
    transport: Option<Box<dyn Transport>>,
    retry: RetryPolicy,
}

impl Session {
    /// Create a disconnected session. Nothing is opened until the first command.
    pub fn new(connector: Arc<dyn Connector>, retry: RetryPolicy) -> Self {
        Self {
            connector,
            transport: None,
            retry,
        }
    }

    /// Whether a transport handle is currently held (not whether it still answers).
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Make sure a live, responsive shell is available.
    ///
    /// Opens a transport when none is held, then probes it with
    /// `echo 1234`. A probe failure discards the handle and the next
    /// attempt starts from scratch. Attempts are sequential with a fixed
    /// backoff between them.
    pub async fn ensure_connected(&mut self) -> Result<(), Error> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error: Option<Error> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry.backoff).await;
            }

            if self.transport.is_none() {
                match self.connector.open().await {
                    Ok(transport) => {
                        info!(target_host = %self.connector.target(), attempt, "SSH connection established");
                        self.transport = Some(transport);
                    }
                    Err(e) => {
                        warn!(target_host = %self.connector.target(), attempt, error = %e, "failed to open shell");
                        last_error = Some(e);
                        continue;
                    }
                }
            }

            match self.probe().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(attempt, error = %e, "liveness probe failed, dropping connection");
                    self.transport = None;
                    last_error = Some(e);
                }
            }
        }

        Err(Error::RetriesExhausted {
            target: self.connector.target(),
            attempts,
            last_error: Box::new(last_error.unwrap_or(Error::NotConnected)),
        })
    }

    /// Run a command and return its output with the echo and prompt removed.
    ///
    /// The command must be one line. Anything else fails with
    /// [`Error::MultiLineCommand`] before the device is contacted.
    pub async fn send_raw(&mut self, command: &str) -> Result<String, Error> {
        single_line(command)?;
        self.ensure_connected().await?;
        let transcript = self.exchange(command).await?;
        Ok(strip_echo_and_prompt(&normalize(&transcript.stdout)))
    }

    /// Run a command and capture its exit status.
    ///
    /// Like [`send_raw`](Self::send_raw), refuses commands containing
    /// `\n` or `\r`.
    ///
    /// Sends `<command>; echo $?` and reads the final output line as the
    /// status. A command whose output does not end in a newline, or that
    /// itself prints a bare integer as its last line, is ambiguous under
    /// this convention: the numeral is taken as the status.
    pub async fn send_checked(&mut self, command: &str) -> Result<CommandOutput, Error> {
        single_line(command)?;
        self.ensure_connected().await?;
        let transcript = self.exchange(&checked_command(command)).await?;
        let body = strip_echo_and_prompt(&normalize(&transcript.stdout));
        let (stdout, exit_code) = split_exit_status(&body)?;
        debug!(command, exit_code, "checked command finished");
        Ok(CommandOutput {
            stdout,
            stderr: normalize(&transcript.stderr),
            exit_code: Some(exit_code),
        })
    }

    /// Close the transport if one is open. Safe to call repeatedly.
    pub async fn close(&mut self) -> Result<(), Error> {
        match self.transport.take() {
            Some(mut transport) => {
                debug!(target_host = %self.connector.target(), "closing shell");
                transport.close().await
            }
            None => Ok(()),
        }
    }

    // ── Private helpers ──────────────────────────────────────────────

    async fn probe(&mut self) -> Result<(), Error> {
        let transcript = self.exchange(PROBE_COMMAND).await?;
        let output = strip_echo_and_prompt(&normalize(&transcript.stdout));
        if output == PROBE_REPLY {
            Ok(())
        } else {
            Err(Error::Probe { output })
        }
    }

    /// One write-then-read cycle. A broken transport is dropped so the next
    /// command reconnects instead of reading a stale prompt.
    async fn exchange(&mut self, line: &str) -> Result<Transcript, Error> {
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        debug!(command = line, "sending");
        let result = transport.send_line(line).await;
        if let Err(ref e) = result {
            if e.is_transport() {
                warn!(error = %e, "transport failed, discarding connection");
                self.transport = None;
            }
        }
        result
    }
}

/// Every command is written as exactly one terminal line.
fn single_line(command: &str) -> Result<(), Error> {
    if command.contains(['\n', '\r']) {
        return Err(Error::MultiLineCommand {
            command: command.to_string(),
        });
    }
    Ok(())
}
