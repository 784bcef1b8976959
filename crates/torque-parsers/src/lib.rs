//! Shared parsing utilities for Torque/Moab report output.
//!
//! Reports are whitespace-delimited tables. This crate provides the
//! duration grammar, the job state letters, the column schema used to
//! describe a report's layout and the line iterator that drives it.

pub mod lines;
pub mod schema;
pub mod status;
pub mod time;

pub use lines::{skip_preamble, LineIterator};
pub use schema::{column, parse_row, Column, ColumnKind, ParseContext, Row, Schema, Value};
pub use status::StatusCode;
pub use time::{parse_duration_secs, resolve_showq_time, MalformedDuration};

use thiserror::Error;

/// A report line did not match its schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty line")]
    Empty,
    #[error("{schema}: expected {expected} fields, got {got}: {line}")]
    FieldCount {
        schema: &'static str,
        expected: usize,
        got: usize,
        line: String,
    },
    #[error("Unknown job state: {0:?}")]
    UnknownStatus(String),
    #[error("Column {column}: invalid count {value:?}")]
    InvalidCount { column: &'static str, value: String },
    #[error(transparent)]
    Duration(#[from] MalformedDuration),
    #[error("Column {column}: invalid timestamp {value:?}")]
    Timestamp { column: &'static str, value: String },
    #[error("No column named {0}")]
    MissingColumn(&'static str),
    #[error("Column {0} has a different kind")]
    ColumnType(&'static str),
}
