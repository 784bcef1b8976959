//! Running jobs via Moab `showq -r`.
//!
//! ```text
//! active jobs------------------------
//! JOBID  S  PAR  EFFIC  XFACTOR  Q  USERNAME  GROUP  MHOST  PROCS  REMAINING  STARTTIME
//!
//! 4807   R  DEF  99.62      1.0  -     alice  users  node01     8  1-02:03:04  Mon Jan 15 10:30:00
//!
//! 1 active job   8 of 64 processors in use by local jobs (12.50%)
//! ```

use crate::types::{QueueEntry, Record, ReportKind};
use chrono::DateTime;
use chrono_tz::Tz;
use torque_parsers::{column, ColumnKind, ParseError, Row, Schema};

pub(crate) const SHOWQ_R_PREAMBLE: usize = 2;

pub static SHOWQ_R_SCHEMA: Schema = Schema {
    name: "showq -r",
    columns: &[
        column("JOBID", ColumnKind::Text),
        column("S", ColumnKind::Status),
        column("PAR", ColumnKind::Text),
        column("EFFIC", ColumnKind::Text),
        column("XFACTOR", ColumnKind::Text),
        column("Q", ColumnKind::Text),
        column("USERNAME", ColumnKind::Text),
        column("GROUP", ColumnKind::Text),
        column("MHOST", ColumnKind::Text),
        column("PROCS", ColumnKind::Count),
        column("REMAINING", ColumnKind::Duration),
        column("STARTTIME", ColumnKind::Timestamp),
    ],
};

impl Record for QueueEntry {
    const KIND: ReportKind = ReportKind::QueueRunning;

    fn from_row(row: &Row) -> Result<Self, ParseError> {
        Ok(QueueEntry {
            job_id: row.text("JOBID")?.to_string(),
            state: row.status("S")?,
            username: row.text("USERNAME")?.to_string(),
            remaining_seconds: row.seconds("REMAINING")?,
            start_time: row.timestamp("STARTTIME")?,
        })
    }

    fn identity(&self) -> &str {
        &self.job_id
    }

    fn label_values(&self) -> Vec<String> {
        vec![
            self.job_id.clone(),
            self.state.to_string(),
            self.username.clone(),
            self.remaining_seconds.to_string(),
            self.start_time.to_rfc3339(),
        ]
    }

    fn observed_at(&self) -> Option<DateTime<Tz>> {
        Some(self.start_time)
    }
}
