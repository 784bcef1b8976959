//! Queue (partition) availability via Torque `qstat -Q`.
//!
//! ```text
//! Queue              Max    Tot   Ena   Str   Que   Run   Hld   Wat   Trn   Ext T   Cpt
//! ----------------   ---   ----    --    --   ---   ---   ---   ---   ---   --- -   ---
//! batch                0     12   yes   yes     4     8     0     0     0     0 E     3
//! ```

use crate::types::{NodeRecord, Record, ReportKind};
use torque_parsers::{column, ColumnKind, ParseError, Row, Schema};

pub(crate) const QSTAT_Q_PREAMBLE: usize = 2;

pub static QSTAT_Q_SCHEMA: Schema = Schema {
    name: "qstat -Q",
    columns: &[
        column("Queue", ColumnKind::Text),
        column("Max", ColumnKind::Count),
        column("Tot", ColumnKind::Count),
        column("Ena", ColumnKind::Text),
        column("Str", ColumnKind::Text),
        column("Que", ColumnKind::Count),
        column("Run", ColumnKind::Count),
        column("Hld", ColumnKind::Count),
        column("Wat", ColumnKind::Count),
        column("Trn", ColumnKind::Count),
        column("Ext", ColumnKind::Count),
        column("T", ColumnKind::Text),
        column("Cpt", ColumnKind::Count),
    ],
};

impl Record for NodeRecord {
    const KIND: ReportKind = ReportKind::PartitionNodes;

    fn from_row(row: &Row) -> Result<Self, ParseError> {
        Ok(NodeRecord {
            partition: row.text("Queue")?.to_string(),
            availability: row.text("Ena")?.to_string(),
            state: row.text("Str")?.to_string(),
        })
    }

    fn identity(&self) -> &str {
        &self.partition
    }

    fn label_values(&self) -> Vec<String> {
        vec![
            self.partition.clone(),
            self.availability.clone(),
            self.state.clone(),
        ]
    }
}
