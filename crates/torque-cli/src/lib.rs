//! CLI argument parsing for the Torque exporter.

use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use torque_collector::{CollectorConfig, DedupScope};
use torque_remote::SshConfig;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown time zone '{0}', expected an IANA name such as Europe/Madrid")]
    InvalidTimeZone(String),
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("Refusing to target '{0}': reports are only collected over SSH")]
    LocalExecution(String),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "torque-exporter")]
#[command(about = "Export Torque/Moab queue state as Prometheus metrics")]
pub struct Args {
    /// Address the metrics endpoint listens on
    #[arg(long, env = "TE_LISTEN_ADDRESS", default_value = "0.0.0.0:9100")]
    pub listen_address: SocketAddr,

    /// Torque head node
    #[arg(long, env = "TE_HOST")]
    pub host: String,

    /// SSH port of the head node
    #[arg(long, env = "TE_SSH_PORT", default_value = "22")]
    pub ssh_port: u16,

    /// SSH login; also the user whose jobs are listed
    #[arg(long, env = "TE_SSH_USER")]
    pub ssh_user: String,

    /// SSH password
    #[arg(long, env = "TE_SSH_PASSWORD", hide_env_values = true)]
    pub ssh_password: Option<String>,

    /// Time zone the scheduler prints timestamps in
    #[arg(long, env = "TE_COUNTRYTZ", default_value = "Europe/Madrid")]
    pub countrytz: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "TE_LOG_LEVEL", default_value = "error")]
    pub log_level: String,

    /// Expected scrape interval in seconds
    #[arg(long, env = "TE_SCRAPE_INTERVAL", default_value = "60")]
    pub scrape_interval: u64,

    /// Timeout in seconds for each SSH connect, command and disconnect
    #[arg(long, env = "TE_SSH_TIMEOUT", default_value = "30")]
    pub ssh_timeout: u64,

    /// Also export the queue listing (qstat -Q)
    #[arg(long, env = "TE_ENABLE_PARTITION_NODES")]
    pub enable_partition_nodes: bool,

    /// How long an exposed job id stays suppressed
    #[arg(long, env = "TE_DEDUP_SCOPE", value_enum, default_value_t = DedupArg::PerCycle)]
    pub dedup_scope: DedupArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupArg {
    PerCycle,
    UntilRestart,
}

impl From<DedupArg> for DedupScope {
    fn from(arg: DedupArg) -> Self {
        match arg {
            DedupArg::PerCycle => DedupScope::PerCycle,
            DedupArg::UntilRestart => DedupScope::UntilRestart,
        }
    }
}

/// Validated startup configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub listen_address: SocketAddr,
    pub ssh: SshConfig,
    pub collector: CollectorConfig,
    pub log_level: tracing::Level,
    /// Non-fatal problems, logged once logging is up.
    pub warnings: Vec<String>,
}

impl Args {
    pub fn into_config(self) -> Result<ExporterConfig, ConfigError> {
        let mut warnings = Vec::new();

        if is_local(&self.host) {
            return Err(ConfigError::LocalExecution(self.host));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingCredential("host"));
        }
        if self.ssh_user.trim().is_empty() {
            return Err(ConfigError::MissingCredential("ssh-user"));
        }

        let time_zone: Tz = self
            .countrytz
            .parse()
            .map_err(|_| ConfigError::InvalidTimeZone(self.countrytz.clone()))?;

        let log_level = match self.log_level.parse::<tracing::Level>() {
            Ok(level) => level,
            Err(_) => {
                warnings.push(format!(
                    "Unknown log level '{}', using warn",
                    self.log_level
                ));
                tracing::Level::WARN
            }
        };

        let password = match self.ssh_password {
            Some(password) if !password.is_empty() => password,
            _ => return Err(ConfigError::MissingCredential("ssh-password")),
        };

        let ssh = SshConfig::with_password(&self.ssh_user, password, &self.host, self.ssh_port)
            .timeout(Duration::from_secs(self.ssh_timeout));

        let mut collector = CollectorConfig::new(time_zone, &self.ssh_user);
        collector.interval = Duration::from_secs(self.scrape_interval);
        collector.window.dedup = self.dedup_scope.into();
        if self.enable_partition_nodes {
            collector = collector.with_partition_nodes(&self.ssh_user);
        }

        Ok(ExporterConfig {
            listen_address: self.listen_address,
            ssh,
            collector,
            log_level,
            warnings,
        })
    }
}

fn is_local(host: &str) -> bool {
    let host = host.trim();
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

#[cfg(test)]
mod tests {
    use super::*;
    use torque_reports::ReportKind;

    fn args() -> Args {
        Args {
            listen_address: "0.0.0.0:9100".parse().unwrap(),
            host: "hpc.example.org".into(),
            ssh_port: 22,
            ssh_user: "alice".into(),
            ssh_password: Some("secret".into()),
            countrytz: "Europe/Madrid".into(),
            log_level: "error".into(),
            scrape_interval: 60,
            ssh_timeout: 30,
            enable_partition_nodes: false,
            dedup_scope: DedupArg::PerCycle,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "torque-exporter",
            "--host",
            "hpc.example.org",
            "--ssh-user",
            "alice",
            "--ssh-password",
            "secret",
            "--ssh-port",
            "2222",
            "--dedup-scope",
            "until-restart",
            "--enable-partition-nodes",
        ])
        .unwrap();
        assert_eq!(args.host, "hpc.example.org");
        assert_eq!(args.ssh_port, 2222);
        assert_eq!(args.dedup_scope, DedupArg::UntilRestart);
        assert!(args.enable_partition_nodes);
        assert_eq!(args.scrape_interval, 60);
    }

    #[test]
    fn test_into_config_defaults() {
        let config = args().into_config().unwrap();
        assert_eq!(config.listen_address.port(), 9100);
        assert_eq!(config.ssh.host, "hpc.example.org");
        assert_eq!(config.ssh.port, 22);
        assert_eq!(config.ssh.timeout, Duration::from_secs(30));
        assert_eq!(config.collector.time_zone, chrono_tz::Europe::Madrid);
        assert_eq!(config.collector.interval, Duration::from_secs(60));
        assert_eq!(config.collector.window.dedup, DedupScope::PerCycle);
        assert_eq!(config.log_level, tracing::Level::ERROR);
        assert!(config.warnings.is_empty());

        let kinds: Vec<_> = config.collector.reports.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ReportKind::QueueRunning, ReportKind::UserJobs]);
        assert_eq!(config.collector.reports[1].command, "qstat -u alice");
    }

    #[test]
    fn test_partition_nodes_and_dedup() {
        let mut a = args();
        a.enable_partition_nodes = true;
        a.dedup_scope = DedupArg::UntilRestart;
        let config = a.into_config().unwrap();
        assert_eq!(config.collector.reports.len(), 3);
        assert_eq!(config.collector.reports[2].kind, ReportKind::PartitionNodes);
        assert_eq!(config.collector.window.dedup, DedupScope::UntilRestart);
    }

    #[test]
    fn test_invalid_time_zone() {
        let mut a = args();
        a.countrytz = "Mars/Olympus".into();
        assert_eq!(
            a.into_config().unwrap_err(),
            ConfigError::InvalidTimeZone("Mars/Olympus".into())
        );
    }

    #[test]
    fn test_local_host_rejected() {
        for host in ["localhost", "LOCALHOST", "127.0.0.1", "::1"] {
            let mut a = args();
            a.host = host.into();
            assert!(matches!(
                a.into_config(),
                Err(ConfigError::LocalExecution(_))
            ));
        }
    }

    #[test]
    fn test_missing_user() {
        let mut a = args();
        a.ssh_user = "  ".into();
        assert_eq!(
            a.into_config().unwrap_err(),
            ConfigError::MissingCredential("ssh-user")
        );
    }

    #[test]
    fn test_missing_password() {
        let mut a = args();
        a.ssh_password = None;
        assert_eq!(
            a.into_config().unwrap_err(),
            ConfigError::MissingCredential("ssh-password")
        );

        let mut a = args();
        a.ssh_password = Some(String::new());
        assert_eq!(
            a.into_config().unwrap_err(),
            ConfigError::MissingCredential("ssh-password")
        );
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_warn() {
        let mut a = args();
        a.log_level = "chatty".into();
        let config = a.into_config().unwrap();
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert!(config.warnings[0].contains("chatty"));

        let mut a = args();
        a.log_level = "debug".into();
        assert_eq!(a.into_config().unwrap().log_level, tracing::Level::DEBUG);
    }
}
