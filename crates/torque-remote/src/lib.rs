//! Remote command execution for Torque report collection.
//!
//! The collector only needs three things from a transport: open a
//! session, run one command and capture its output, and close the
//! session. [`Connector`] and [`RemoteSession`] are that contract;
//! [`SshConnector`] implements it over SSH with password authentication.

pub mod command;
pub mod ssh;

pub use command::CommandOutput;
pub use ssh::{SshConfig, SshConnector, DEFAULT_SSH_PORT, DEFAULT_TIMEOUT};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Failed to connect to {host}: {error}")]
    Connect { host: String, error: String },
    #[error("Failed to execute {command}: {error}")]
    Run { command: String, error: String },
    #[error("Command {command} exited with status {status}: {stderr}")]
    Failed {
        command: String,
        status: u32,
        stderr: String,
    },
    #[error("Failed to close session: {0}")]
    Close(String),
    #[error("Remote {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

/// Opens sessions on the scheduler host.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RemoteSession>, RemoteError>;
}

/// One open session on the scheduler host.
#[async_trait]
pub trait RemoteSession: Send {
    /// Execute `command` and capture its output.
    async fn run(&mut self, command: &str) -> Result<CommandOutput, RemoteError>;

    async fn close(self: Box<Self>) -> Result<(), RemoteError>;
}
