//! Declarative column layouts for whitespace-delimited reports.
//!
//! A report format is a [`Schema`]: an ordered list of named columns, each
//! with a [`ColumnKind`]. [`parse_row`] is the only line parser; it checks
//! the token count and converts every column by kind into a [`Row`].

use chrono::DateTime;
use chrono_tz::Tz;

use crate::time::{parse_duration_secs, resolve_showq_time};
use crate::{ParseError, StatusCode};

/// How a column's tokens are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Kept verbatim.
    Text,
    /// One of the eight job state letters.
    Status,
    /// Unsigned integer, or `--` when the scheduler has no value.
    Count,
    /// `[<days>-]<time>`, stored as seconds.
    Duration,
    /// `showq` start time, four tokens wide (e.g. `Mon Jan 15 10:30:00`).
    Timestamp,
}

impl ColumnKind {
    /// Number of whitespace-separated tokens the column spans.
    pub const fn width(self) -> usize {
        match self {
            Self::Timestamp => 4,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

pub const fn column(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

/// Fixed column layout of one report.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Schema {
    /// Total token count a data line must have.
    pub fn width(&self) -> usize {
        self.columns.iter().map(|c| c.kind.width()).sum()
    }
}

/// Inputs that some column kinds need besides the line itself.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Reference time, already in the scheduler's time zone.
    pub now: DateTime<Tz>,
}

impl ParseContext {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }
}

/// A typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Status(StatusCode),
    Count(Option<u64>),
    Seconds(u64),
    Timestamp(DateTime<Tz>),
}

/// One parsed line, addressable by column name.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<(&'static str, Value)>,
}

impl Row {
    fn get(&self, name: &'static str) -> Result<&Value, ParseError> {
        self.values
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, value)| value)
            .ok_or(ParseError::MissingColumn(name))
    }

    pub fn text(&self, name: &'static str) -> Result<&str, ParseError> {
        match self.get(name)? {
            Value::Text(s) => Ok(s),
            _ => Err(ParseError::ColumnType(name)),
        }
    }

    pub fn status(&self, name: &'static str) -> Result<StatusCode, ParseError> {
        match self.get(name)? {
            Value::Status(code) => Ok(*code),
            _ => Err(ParseError::ColumnType(name)),
        }
    }

    pub fn count(&self, name: &'static str) -> Result<Option<u64>, ParseError> {
        match self.get(name)? {
            Value::Count(n) => Ok(*n),
            _ => Err(ParseError::ColumnType(name)),
        }
    }

    pub fn seconds(&self, name: &'static str) -> Result<u64, ParseError> {
        match self.get(name)? {
            Value::Seconds(secs) => Ok(*secs),
            _ => Err(ParseError::ColumnType(name)),
        }
    }

    pub fn timestamp(&self, name: &'static str) -> Result<DateTime<Tz>, ParseError> {
        match self.get(name)? {
            Value::Timestamp(dt) => Ok(*dt),
            _ => Err(ParseError::ColumnType(name)),
        }
    }
}

/// Parse one report line against `schema`.
///
/// The line may still carry its terminator. Blank lines and lines whose
/// token count differs from [`Schema::width`] are rejected, which is how
/// headers, separators and footers end a report.
pub fn parse_row(schema: &Schema, line: &str, ctx: &ParseContext) -> Result<Row, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    if tokens.len() != schema.width() {
        return Err(ParseError::FieldCount {
            schema: schema.name,
            expected: schema.width(),
            got: tokens.len(),
            line: line.trim_end().to_string(),
        });
    }

    let mut rest = tokens.as_slice();
    let mut values = Vec::with_capacity(schema.columns.len());
    for col in schema.columns {
        let (taken, remaining) = rest.split_at(col.kind.width());
        rest = remaining;
        values.push((col.name, parse_value(col, taken, ctx)?));
    }

    Ok(Row { values })
}

fn parse_value(col: &Column, tokens: &[&str], ctx: &ParseContext) -> Result<Value, ParseError> {
    let raw = tokens.join(" ");
    let value = match col.kind {
        ColumnKind::Text => Value::Text(raw),
        ColumnKind::Status => Value::Status(raw.parse()?),
        ColumnKind::Count => Value::Count(parse_count(&raw).ok_or(ParseError::InvalidCount {
            column: col.name,
            value: raw,
        })?),
        ColumnKind::Duration => Value::Seconds(parse_duration_secs(&raw)?),
        ColumnKind::Timestamp => match resolve_showq_time(&raw, &ctx.now) {
            Some(dt) => Value::Timestamp(dt),
            None => {
                return Err(ParseError::Timestamp {
                    column: col.name,
                    value: raw,
                });
            }
        },
    };
    Ok(value)
}

fn parse_count(s: &str) -> Option<Option<u64>> {
    if s == "--" {
        return Some(None);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().map(Some)
}
