//! SSH transport backed by `async-ssh2-tokio`.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_ssh2_tokio::client::{AuthMethod, Client, ServerCheckMethod};
use async_trait::async_trait;

use crate::{CommandOutput, Connector, RemoteError, RemoteSession};

pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to log in.
#[derive(Clone)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Upper bound for each connect, command and disconnect.
    pub timeout: Duration,
}

impl SshConfig {
    pub fn with_password(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for SshConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Opens a fresh SSH connection per collection cycle.
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: SshConfig,
}

impl SshConnector {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SshConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self) -> Result<Box<dyn RemoteSession>, RemoteError> {
        let cfg = &self.config;
        let client = bounded(
            cfg.timeout,
            "connect",
            Client::connect(
                (cfg.host.clone(), cfg.port),
                &cfg.username,
                AuthMethod::with_password(&cfg.password),
                ServerCheckMethod::NoCheck,
            ),
        )
        .await?
        .map_err(|e| RemoteError::Connect {
            host: format!("{}:{}", cfg.host, cfg.port),
            error: e.to_string(),
        })?;

        tracing::debug!(host = %cfg.host, port = cfg.port, user = %cfg.username, "SSH session open");

        Ok(Box::new(SshSession {
            client,
            timeout: cfg.timeout,
        }))
    }
}

struct SshSession {
    client: Client,
    timeout: Duration,
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn run(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
        let result = bounded(self.timeout, "run", self.client.execute(command))
            .await?
            .map_err(|e| RemoteError::Run {
                command: command.to_string(),
                error: e.to_string(),
            })?;

        Ok(CommandOutput {
            stdout: result.stdout,
            stderr: result.stderr,
            exit_status: result.exit_status,
        })
    }

    async fn close(self: Box<Self>) -> Result<(), RemoteError> {
        bounded(self.timeout, "close", self.client.disconnect())
            .await?
            .map_err(|e| RemoteError::Close(e.to_string()))
    }
}

/// Run `fut`, turning expiry of `limit` into [`RemoteError::Timeout`].
async fn bounded<F: Future>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<F::Output, RemoteError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| RemoteError::Timeout {
            operation,
            after: limit,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let cfg = SshConfig::with_password("torque", "s3cret", "headnode", DEFAULT_SSH_PORT);
        let debug = format!("{cfg:?}");
        assert!(debug.contains("headnode"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_config_defaults() {
        let cfg = SshConfig::with_password("torque", "pw", "headnode", 2222)
            .timeout(Duration::from_secs(5));
        assert_eq!(cfg.port, 2222);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let err = bounded(
            Duration::from_millis(10),
            "connect",
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RemoteError::Timeout { operation: "connect", .. }));
    }

    #[tokio::test]
    async fn test_bounded_passes_output_through() {
        let value = bounded(Duration::from_secs(1), "run", async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        // Nothing listens on port 1 of the loopback interface.
        let connector = SshConnector::new(
            SshConfig::with_password("torque", "pw", "127.0.0.1", 1).timeout(Duration::from_secs(5)),
        );
        let err = match connector.connect().await {
            Ok(_) => panic!("connection to a closed port succeeded"),
            Err(e) => e,
        };
        assert!(matches!(
            err,
            RemoteError::Connect { .. } | RemoteError::Timeout { .. }
        ));
    }
}
