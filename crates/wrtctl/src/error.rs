//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and a distinct process exit code.

use miette::Diagnostic;
use thiserror::Error;

use wrtctl_config::ConfigError;
use wrtctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const REMOTE_COMMAND: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {target}")]
    #[diagnostic(
        code(wrtctl::connection_failed),
        help(
            "{reason}\n\
             Check that the device is up and SSH is reachable.\n\
             A host key missing from known_hosts can be accepted with --accept-host-key."
        )
    )]
    ConnectionFailed { target: String, reason: String },

    #[error("Lost the connection to the device: {message}")]
    #[diagnostic(code(wrtctl::connection_lost))]
    ConnectionLost { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wrtctl::auth_failed),
        help(
            "Verify the user and password for this device.\n\
             Run: wrtctl config set-password --profile <name>\n\
             Or set WRTCTL_PASSWORD."
        )
    )]
    AuthFailed { message: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Device did not respond within {seconds}s")]
    #[diagnostic(
        code(wrtctl::timeout),
        help("Increase the timeout with --timeout or check the shell prompt pattern.")
    )]
    Timeout { seconds: u64 },

    // ── Remote failures ──────────────────────────────────────────────

    #[error("`{command}` exited with status {status}")]
    #[diagnostic(code(wrtctl::command_failed), help("Device output:\n{output}"))]
    RemoteCommand {
        command: String,
        status: i32,
        output: String,
    },

    #[error("ubus call {path} {method} failed: {message}")]
    #[diagnostic(
        code(wrtctl::ubus),
        help("Run: wrtctl run ubus list  to see the objects this device exposes")
    )]
    Rpc {
        path: String,
        method: String,
        message: String,
    },

    /// `run` finished with a non-zero status; output was already printed.
    #[error("Remote command exited with status {status}")]
    #[diagnostic(code(wrtctl::remote_exit))]
    RemoteExit { status: i32 },

    #[error("Could not bring {key} to the desired value")]
    #[diagnostic(code(wrtctl::state_failed), help("{comment}"))]
    StateFailed { key: String, comment: String },

    #[error("Unexpected data from device: {message}")]
    #[diagnostic(code(wrtctl::device_data))]
    DeviceData { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wrtctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wrtctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wrtctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(wrtctl::no_config),
        help(
            "Pass --host, or create a profile with: wrtctl config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(wrtctl::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wrtctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────

    #[error("Internal error: {0}")]
    #[diagnostic(code(wrtctl::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ConnectionLost { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::RemoteCommand { .. } | Self::Rpc { .. } => exit_code::REMOTE_COMMAND,
            Self::RemoteExit { status } => *status,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::StateFailed { .. }
            | Self::DeviceData { .. }
            | Self::Config(_) | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { target, reason } => {
                Self::ConnectionFailed { target, reason }
            }
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Disconnected => Self::ConnectionLost {
                message: "session closed".into(),
            },
            CoreError::Transport { message } => Self::ConnectionLost { message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::CommandFailed {
                command,
                exit_code,
                output,
            } => Self::RemoteCommand {
                command,
                status: exit_code,
                output,
            },
            CoreError::Rpc {
                path,
                method,
                message,
            } => Self::Rpc {
                path,
                method,
                message,
            },
            err @ (CoreError::Parse { .. } | CoreError::Decode { .. }) => Self::DeviceData {
                message: err.to_string(),
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "argument".into(),
                reason: message,
            },
            CoreError::Config { message } => Self::Validation {
                field: "device config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: "(see: wrtctl config profiles)".into(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}
