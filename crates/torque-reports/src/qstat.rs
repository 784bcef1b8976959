//! Per-user jobs via Torque `qstat -u <user>`.
//!
//! ```text
//! headnode.cluster:
//!                                                                                   Req'd       Req'd       Elap
//! Job ID                  Username    Queue    Jobname          SessID  NDS   TSK   Memory      Time    S   Time
//! ----------------------- ----------- -------- ---------------- ------ ----- ------ --------- --------- - ---------
//! 4807.headnode           alice       batch    align_s1          20931     1      8       4gb  24:00:00 R  01:12:40
//! ```

use crate::types::{JobRecord, Record, ReportKind};
use torque_parsers::{column, ColumnKind, ParseError, Row, Schema};

pub(crate) const QSTAT_U_PREAMBLE: usize = 4;

pub static QSTAT_U_SCHEMA: Schema = Schema {
    name: "qstat -u",
    columns: &[
        column("Job ID", ColumnKind::Text),
        column("Username", ColumnKind::Text),
        column("Queue", ColumnKind::Text),
        column("Jobname", ColumnKind::Text),
        column("SessID", ColumnKind::Count),
        column("NDS", ColumnKind::Count),
        column("TSK", ColumnKind::Count),
        column("Req'd Memory", ColumnKind::Text),
        column("Req'd Time", ColumnKind::Text),
        column("S", ColumnKind::Status),
        column("Elap Time", ColumnKind::Text),
    ],
};

impl Record for JobRecord {
    const KIND: ReportKind = ReportKind::UserJobs;

    fn from_row(row: &Row) -> Result<Self, ParseError> {
        Ok(JobRecord {
            job_id: row.text("Job ID")?.to_string(),
            username: row.text("Username")?.to_string(),
            job_name: row.text("Jobname")?.to_string(),
            status: row.status("S")?,
        })
    }

    fn identity(&self) -> &str {
        &self.job_id
    }

    fn label_values(&self) -> Vec<String> {
        vec![
            self.job_id.clone(),
            self.username.clone(),
            self.job_name.clone(),
            self.status.to_string(),
        ]
    }
}
