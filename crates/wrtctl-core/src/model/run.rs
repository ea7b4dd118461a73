use serde::Serialize;
use wrtctl_api::CommandOutput;

/// Result of an arbitrary command, reported whatever its exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<CommandOutput> for RunResult {
    fn from(output: CommandOutput) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code.unwrap_or(-1),
        }
    }
}
