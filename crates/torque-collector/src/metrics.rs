//! Prometheus descriptors exposed by the exporter.

use prometheus::{Encoder, Gauge, GaugeVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use torque_reports::ReportKind;

use crate::CollectorError;

/// Registry plus every descriptor, registered once at construction.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    reports: HashMap<ReportKind, GaugeVec>,
    up: Gauge,
    scrape_duration: Gauge,
    report_records: IntGaugeVec,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self, CollectorError> {
        let registry = Registry::new();

        let mut reports = HashMap::new();
        for kind in ReportKind::ALL {
            let vec = GaugeVec::new(Opts::new(kind.metric_name(), kind.help()), kind.labels())?;
            registry.register(Box::new(vec.clone()))?;
            reports.insert(kind, vec);
        }

        let up = Gauge::with_opts(Opts::new(
            "te_up",
            "Whether the last collection reached the Torque host (1 = yes, 0 = no)",
        ))?;
        registry.register(Box::new(up.clone()))?;

        let scrape_duration = Gauge::with_opts(Opts::new(
            "te_scrape_duration_seconds",
            "Duration of the last collection cycle",
        ))?;
        registry.register(Box::new(scrape_duration.clone()))?;

        let report_records = IntGaugeVec::new(
            Opts::new(
                "te_report_records",
                "Records exposed per report in the last collection cycle",
            ),
            &["report"],
        )?;
        registry.register(Box::new(report_records.clone()))?;

        Ok(Self {
            registry,
            reports,
            up,
            scrape_duration,
            report_records,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Drop every sample of the previous cycle.
    pub fn reset(&self) {
        for vec in self.reports.values() {
            vec.reset();
        }
        self.report_records.reset();
        self.up.set(0.0);
    }

    /// Emit one presence sample; `labels` follow [`ReportKind::labels`].
    pub fn expose(&self, kind: ReportKind, labels: &[String]) {
        let values: Vec<&str> = labels.iter().map(String::as_str).collect();
        if let Some(vec) = self.reports.get(&kind) {
            vec.with_label_values(&values).set(1.0);
        }
    }

    pub fn set_up(&self, up: bool) {
        self.up.set(if up { 1.0 } else { 0.0 });
    }

    pub fn set_scrape_duration(&self, seconds: f64) {
        self.scrape_duration.set(seconds);
    }

    pub fn set_report_records(&self, kind: ReportKind, count: usize) {
        self.report_records
            .with_label_values(&[kind.name()])
            .set(count as i64);
    }

    /// Encode the whole registry in the Prometheus text format.
    pub fn encode(&self) -> Result<String, CollectorError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::with_capacity(4096);
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| CollectorError::Encoding(e.to_string()))
    }
}
