//! One collection cycle: connect, run every report, expose, disconnect.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use torque_parsers::{ParseContext, ParseError};
use torque_remote::{Connector, RemoteSession};
use torque_reports::{records, JobRecord, NodeRecord, QueueEntry, Record, ReportKind};

use crate::metrics::ExporterMetrics;
use crate::window::{CollectionWindow, Exposure, WindowPolicy};
use crate::CollectorError;

/// One report to run each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub kind: ReportKind,
    pub command: String,
    pub exposure: Exposure,
}

impl ReportConfig {
    pub fn new(kind: ReportKind, user: &str) -> Self {
        Self {
            kind,
            command: kind.default_command(user),
            exposure: Exposure::Snapshot,
        }
    }
}

/// Settings fixed at construction.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub time_zone: Tz,
    /// Expected time between scrapes; the initial window lookback.
    pub interval: Duration,
    /// Run in order each cycle.
    pub reports: Vec<ReportConfig>,
    pub window: WindowPolicy,
}

impl CollectorConfig {
    /// Running queue and `user`'s jobs; the queue listing is left out.
    pub fn new(time_zone: Tz, user: &str) -> Self {
        Self {
            time_zone,
            interval: Duration::from_secs(60),
            reports: vec![
                ReportConfig::new(ReportKind::QueueRunning, user),
                ReportConfig::new(ReportKind::UserJobs, user),
            ],
            window: WindowPolicy::default(),
        }
    }

    pub fn with_partition_nodes(mut self, user: &str) -> Self {
        if !self.reports.iter().any(|r| r.kind == ReportKind::PartitionNodes) {
            self.reports
                .push(ReportConfig::new(ReportKind::PartitionNodes, user));
        }
        self
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Whether a session was opened.
    pub connected: bool,
    /// Records exposed per report; reports whose command failed are absent.
    pub exposed: Vec<(ReportKind, usize)>,
}

impl CycleSummary {
    pub fn exposed(&self, kind: ReportKind) -> Option<usize> {
        self.exposed
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Turns scheduler reports into Prometheus samples.
///
/// Cycles are serialized: the window lock is held from connect to
/// disconnect, so overlapping scrapes wait for each other. The remote
/// session never outlives its cycle.
pub struct TorqueCollector {
    connector: Box<dyn Connector>,
    config: CollectorConfig,
    metrics: ExporterMetrics,
    window: Mutex<CollectionWindow>,
    clock: Clock,
}

impl TorqueCollector {
    pub fn new(
        connector: Box<dyn Connector>,
        config: CollectorConfig,
    ) -> Result<Self, CollectorError> {
        Self::with_clock(connector, config, Arc::new(Utc::now))
    }

    pub fn with_clock(
        connector: Box<dyn Connector>,
        config: CollectorConfig,
        clock: Clock,
    ) -> Result<Self, CollectorError> {
        let metrics = ExporterMetrics::new()?;
        let now = clock().with_timezone(&config.time_zone);
        let window = CollectionWindow::new(now, config.interval, config.window);
        Ok(Self {
            connector,
            config,
            metrics,
            window: Mutex::new(window),
            clock,
        })
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Start of the current lookback window.
    pub async fn last_collection(&self) -> DateTime<Tz> {
        self.window.lock().await.last_collection()
    }

    /// Run one cycle, replacing all report samples.
    pub async fn collect(&self) -> CycleSummary {
        let mut window = self.window.lock().await;
        self.run_cycle(&mut window).await
    }

    /// Run one cycle and encode the registry before the next cycle may
    /// reset it.
    pub async fn collect_and_encode(&self) -> Result<(CycleSummary, String), CollectorError> {
        let mut window = self.window.lock().await;
        let summary = self.run_cycle(&mut window).await;
        let text = self.metrics.encode()?;
        Ok((summary, text))
    }

    async fn run_cycle(&self, window: &mut CollectionWindow) -> CycleSummary {
        let timer = Instant::now();
        let started = (self.clock)().with_timezone(&self.config.time_zone);

        self.metrics.reset();
        window.begin_cycle();

        let mut summary = CycleSummary::default();
        let mut session = match self.connector.connect().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Creating SSH client: {}", e);
                self.metrics
                    .set_scrape_duration(timer.elapsed().as_secs_f64());
                return summary;
            }
        };
        summary.connected = true;
        self.metrics.set_up(true);

        let ctx = ParseContext::new(started);
        for report in &self.config.reports {
            if let Some(count) = self
                .collect_report(session.as_mut(), report, &ctx, window)
                .await
            {
                self.metrics.set_report_records(report.kind, count);
                summary.exposed.push((report.kind, count));
            }
        }

        if let Err(e) = session.close().await {
            tracing::error!("Closing SSH client: {}", e);
        }
        window.finish_cycle(started);

        let elapsed = timer.elapsed();
        self.metrics.set_scrape_duration(elapsed.as_secs_f64());
        tracing::info!(
            exposed = ?summary.exposed,
            elapsed_ms = elapsed.as_millis() as u64,
            "Collection cycle finished"
        );

        summary
    }

    /// Run one report; `None` when its command could not be run.
    async fn collect_report(
        &self,
        session: &mut dyn RemoteSession,
        report: &ReportConfig,
        ctx: &ParseContext,
        window: &mut CollectionWindow,
    ) -> Option<usize> {
        let output = match session.run(&report.command).await {
            Ok(output) => output.into_stdout(&report.command),
            Err(e) => Err(e),
        };
        let stdout = match output {
            Ok(stdout) => stdout,
            Err(e) => {
                tracing::error!("Error running {} report: {}", report.kind, e);
                return None;
            }
        };

        let count = match report.kind {
            ReportKind::QueueRunning => {
                self.expose_records::<QueueEntry>(&stdout, ctx, report.exposure, window)
            }
            ReportKind::UserJobs => {
                self.expose_records::<JobRecord>(&stdout, ctx, report.exposure, window)
            }
            ReportKind::PartitionNodes => {
                self.expose_records::<NodeRecord>(&stdout, ctx, report.exposure, window)
            }
        };
        Some(count)
    }

    fn expose_records<R: Record>(
        &self,
        stdout: &str,
        ctx: &ParseContext,
        exposure: Exposure,
        window: &mut CollectionWindow,
    ) -> usize {
        let mut count = 0;
        for item in records::<R>(stdout, ctx) {
            match item {
                Ok(record) => {
                    if window.admit(R::KIND, record.identity(), record.observed_at(), exposure) {
                        self.metrics.expose(R::KIND, &record.label_values());
                        count += 1;
                    }
                }
                Err(e) if is_end_of_data(&e) => {
                    tracing::debug!(report = %R::KIND, "End of report data: {}", e);
                }
                Err(e) => {
                    tracing::warn!(report = %R::KIND, "Report truncated at malformed row: {}", e);
                }
            }
        }
        count
    }
}

/// Footers, separators and blank lines end a report's data. Anything else
/// is a data row the scheduler printed in an unexpected shape.
fn is_end_of_data(error: &ParseError) -> bool {
    matches!(error, ParseError::Empty | ParseError::FieldCount { .. })
}
