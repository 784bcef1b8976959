//! Collection cycle for the Torque exporter.
//!
//! [`TorqueCollector`] runs the configured scheduler reports over a fresh
//! remote session, filters their records through a [`CollectionWindow`]
//! and exposes one gauge sample per record.

pub mod collector;
pub mod metrics;
pub mod window;

pub use collector::{Clock, CollectorConfig, CycleSummary, ReportConfig, TorqueCollector};
pub use metrics::ExporterMetrics;
pub use window::{CollectionWindow, DedupScope, Exposure, WindowAdvance, WindowPolicy};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}
