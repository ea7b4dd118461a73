// ── Core error types ──
//
// User-facing errors from wrtctl-core. Consumers never see raw SSH
// protocol errors or transcript framing failures directly: the
// `From<wrtctl_api::Error>` impl translates channel-level errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {target}: {reason}")]
    ConnectionFailed { target: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Device disconnected")]
    Disconnected,

    #[error("Connection lost: {message}")]
    Transport { message: String },

    #[error("Device did not respond within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Remote command errors ────────────────────────────────────────
    #[error("`{command}` exited with status {exit_code}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("ubus call {path} {method} failed: {message}")]
    Rpc {
        path: String,
        method: String,
        message: String,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Cannot parse {what}: unexpected line {line:?}")]
    Parse { what: String, line: String },

    #[error("Cannot decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn parse(what: &str, line: &str) -> Self {
        Self::Parse {
            what: what.to_string(),
            line: line.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` when the failure means the device could not be
    /// reached at all, as opposed to a command that ran and failed.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::AuthenticationFailed { .. }
                | Self::Disconnected
                | Self::Transport { .. }
                | Self::Timeout { .. }
        )
    }
}

// ── Conversion from channel-layer errors ─────────────────────────────

impl From<wrtctl_api::Error> for CoreError {
    fn from(err: wrtctl_api::Error) -> Self {
        use wrtctl_api::Error as Api;

        match err {
            Api::RetriesExhausted {
                target,
                attempts,
                last_error,
            } => match *last_error {
                inner if inner.is_auth() => CoreError::from(inner),
                Api::ConnectTimeout { timeout_secs, .. } | Api::Timeout { timeout_secs } => {
                    CoreError::Timeout { timeout_secs }
                }
                other => CoreError::ConnectionFailed {
                    target,
                    reason: format!("{other} (after {attempts} attempt(s))"),
                },
            },
            Api::Connect { host, reason } => CoreError::ConnectionFailed {
                target: host,
                reason,
            },
            Api::Authentication { host, username } => CoreError::AuthenticationFailed {
                message: format!("device {host} rejected the password for {username}"),
            },
            Api::ConnectTimeout { timeout_secs, .. } | Api::Timeout { timeout_secs } => {
                CoreError::Timeout { timeout_secs }
            }
            Api::Probe { output } => CoreError::ConnectionFailed {
                target: String::new(),
                reason: format!("liveness probe returned {output:?}"),
            },
            Api::NotConnected => CoreError::Disconnected,
            Api::MultiLineCommand { command } => CoreError::ValidationFailed {
                message: format!("command must be a single line: {command:?}"),
            },
            e @ (Api::Ssh(_) | Api::Io(_) | Api::ChannelClosed) => CoreError::Transport {
                message: e.to_string(),
            },
            Api::Prompt(e) => CoreError::Config {
                message: format!("invalid prompt pattern: {e}"),
            },
            Api::ExitStatus { line } => CoreError::Decode {
                what: "exit status".into(),
                message: format!("not an integer: {line:?}"),
            },
            Api::Ubus {
                path,
                method,
                exit_code,
                output,
            } => CoreError::Rpc {
                path,
                method,
                message: if output.trim().is_empty() {
                    format!("exit status {exit_code}")
                } else {
                    format!("exit status {exit_code}: {}", output.trim())
                },
            },
            Api::Encode(message) => CoreError::Internal(message),
            Api::Deserialization { message, .. } => CoreError::Decode {
                what: "ubus reply".into(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_auth_failure_surfaces_as_auth() {
        let err = CoreError::from(wrtctl_api::Error::RetriesExhausted {
            target: "root@router:22".into(),
            attempts: 3,
            last_error: Box::new(wrtctl_api::Error::Authentication {
                host: "router".into(),
                username: "root".into(),
            }),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
        assert!(err.is_connection());
    }

    #[test]
    fn exhausted_refusal_keeps_the_target() {
        let err = CoreError::from(wrtctl_api::Error::RetriesExhausted {
            target: "root@router:22".into(),
            attempts: 2,
            last_error: Box::new(wrtctl_api::Error::Connect {
                host: "router".into(),
                reason: "connection refused".into(),
            }),
        });
        match err {
            CoreError::ConnectionFailed { target, reason } => {
                assert_eq!(target, "root@router:22");
                assert!(reason.contains("connection refused"), "{reason}");
                assert!(reason.contains("2 attempt"), "{reason}");
            }
            other => panic!("expected ConnectionFailed, got {other:?}"),
        }
    }

    #[test]
    fn ubus_failure_becomes_rpc_error() {
        let err = CoreError::from(wrtctl_api::Error::Ubus {
            path: "network.interface.wan".into(),
            method: "status".into(),
            exit_code: 4,
            output: String::new(),
        });
        assert_eq!(
            err.to_string(),
            "ubus call network.interface.wan status failed: exit status 4"
        );
        assert!(!err.is_connection());
    }

    #[test]
    fn multi_line_command_is_a_validation_failure() {
        let err = CoreError::from(wrtctl_api::Error::MultiLineCommand {
            command: "echo a\necho b".into(),
        });
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(!err.is_connection());
    }
}
