//! Torque report records.

use chrono::DateTime;
use chrono_tz::Tz;
use std::fmt;
use torque_parsers::{ParseError, Row, Schema, StatusCode};

/// The scheduler reports the exporter knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// `showq -r`
    QueueRunning,
    /// `qstat -u <user>`
    UserJobs,
    /// `qstat -Q`
    PartitionNodes,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [Self::QueueRunning, Self::UserJobs, Self::PartitionNodes];

    pub fn name(self) -> &'static str {
        match self {
            Self::QueueRunning => "queue-running",
            Self::UserJobs => "user-jobs",
            Self::PartitionNodes => "partition-nodes",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Self::QueueRunning => &crate::showq::SHOWQ_R_SCHEMA,
            Self::UserJobs => &crate::qstat::QSTAT_U_SCHEMA,
            Self::PartitionNodes => &crate::queues::QSTAT_Q_SCHEMA,
        }
    }

    /// Header lines printed before the first data line.
    pub fn preamble(self) -> usize {
        match self {
            Self::QueueRunning => crate::showq::SHOWQ_R_PREAMBLE,
            Self::UserJobs => crate::qstat::QSTAT_U_PREAMBLE,
            Self::PartitionNodes => crate::queues::QSTAT_Q_PREAMBLE,
        }
    }

    /// Command line run on the scheduler host.
    pub fn default_command(self, user: &str) -> String {
        match self {
            Self::QueueRunning => "showq -r".to_string(),
            Self::UserJobs => format!("qstat -u {user}"),
            Self::PartitionNodes => "qstat -Q".to_string(),
        }
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            Self::QueueRunning => "te_showq_r",
            Self::UserJobs => "te_qstat_u",
            Self::PartitionNodes => "te_qstat_f",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::QueueRunning => "torque's queue",
            Self::UserJobs => "user's jobs",
            Self::PartitionNodes => "job details",
        }
    }

    /// Label names, in the order [`Record::label_values`] returns them.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Self::QueueRunning => &["jobid", "state", "username", "remaining", "starttime"],
            Self::UserJobs => &["jobid", "username", "jobname", "status"],
            Self::PartitionNodes => &["partition", "availability", "state"],
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record built from one line of a report.
pub trait Record: Sized {
    const KIND: ReportKind;

    fn from_row(row: &Row) -> Result<Self, ParseError>;

    /// Identifier used for de-duplication.
    fn identity(&self) -> &str;

    fn label_values(&self) -> Vec<String>;

    /// When the record's event happened, if the report says.
    fn observed_at(&self) -> Option<DateTime<Tz>> {
        None
    }
}

/// A job from `qstat -u`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub job_id: String,
    pub username: String,
    pub job_name: String,
    pub status: StatusCode,
}

/// A running job from `showq -r`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub job_id: String,
    pub state: StatusCode,
    pub username: String,
    pub remaining_seconds: u64,
    pub start_time: DateTime<Tz>,
}

/// A queue from `qstat -Q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub partition: String,
    pub availability: String,
    pub state: String,
}
