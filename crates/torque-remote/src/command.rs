//! Captured output of one remote command.

use crate::RemoteError;

/// What a remote command left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Take stdout, treating non-zero exit as OK when there is output.
    ///
    /// Scheduler tools exit non-zero for things like an empty queue or an
    /// unknown user while still printing a usable table.
    pub fn into_stdout(self, command: &str) -> Result<String, RemoteError> {
        if !self.success() && self.stdout.trim().is_empty() {
            return Err(RemoteError::Failed {
                command: command.to_string(),
                status: self.exit_status,
                stderr: self.stderr.trim().to_string(),
            });
        }
        if !self.success() {
            tracing::debug!(
                command,
                status = self.exit_status,
                "Command exited non-zero, parsing its output anyway"
            );
        }
        Ok(self.stdout)
    }
}
