//! Torque/Moab report layouts.
//!
//! One module per scheduler command, each declaring the column schema of
//! its table and how a parsed row becomes a record.

pub mod qstat;
pub mod queues;
pub mod showq;
pub mod types;

pub use types::{JobRecord, NodeRecord, QueueEntry, Record, ReportKind};

use torque_parsers::{parse_row, skip_preamble, LineIterator, ParseContext, ParseError};

/// Parse one line of `R`'s report.
pub fn parse_record<R: Record>(line: &str, ctx: &ParseContext) -> Result<R, ParseError> {
    let row = parse_row(R::KIND.schema(), line, ctx)?;
    R::from_row(&row)
}

/// Iterate over the records in a report's captured output.
///
/// The preamble is skipped; iteration ends at the first line that does
/// not match the schema (usually the summary footer).
pub fn records<'a, R: Record>(
    output: &'a str,
    ctx: &'a ParseContext,
) -> LineIterator<'a, impl FnMut(&str) -> Result<R, ParseError> + 'a> {
    let data = skip_preamble(output, R::KIND.preamble());
    LineIterator::new(data, move |line: &str| parse_record::<R>(line, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_labels_match_records() {
        for kind in ReportKind::ALL {
            assert!(!kind.labels().is_empty());
            assert!(kind.metric_name().starts_with("te_"));
        }
        assert_eq!(ReportKind::UserJobs.default_command("alice"), "qstat -u alice");
        assert_eq!(ReportKind::QueueRunning.to_string(), "queue-running");
    }

    #[test]
    fn test_schema_widths() {
        assert_eq!(ReportKind::QueueRunning.schema().width(), 15);
        assert_eq!(ReportKind::UserJobs.schema().width(), 11);
        assert_eq!(ReportKind::PartitionNodes.schema().width(), 13);
    }
}
