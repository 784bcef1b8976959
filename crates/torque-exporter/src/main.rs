//! torque-exporter - Prometheus exporter for Torque/Moab queues.

mod http;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use torque_cli::Args;
use torque_collector::TorqueCollector;
use torque_remote::SshConnector;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.into_config().into_diagnostic()?;

    // RUST_LOG wins over --log-level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(config.log_level).into())
                .from_env_lossy(),
        )
        .init();
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let connector = SshConnector::new(config.ssh.clone());
    let collector = TorqueCollector::new(Box::new(connector), config.collector.clone())
        .into_diagnostic()?;

    let listener = tokio::net::TcpListener::bind(config.listen_address)
        .await
        .into_diagnostic()?;
    tracing::info!(
        address = %config.listen_address,
        host = %config.ssh.host,
        "torque-exporter listening"
    );

    axum::serve(listener, http::router(Arc::new(collector)))
        .await
        .into_diagnostic()?;
    Ok(())
}
