//! Feature Engineering: datetime detection and calendar-part extraction.
//!
//! Runs in two phases on the operator's working copy:
//!
//! 1. **Detection**: every text column whose non-missing values all parse as a calendar
//!    date/time (see [`crate::temporal::parse_datetime`]) is promoted to
//!    [`DataType::DateTime`]. Columns that do not parse are left alone.
//! 2. **Extraction**: for each selected datetime column, `Int64` columns `<column>_year`,
//!    `<column>_month` and `<column>_day` are appended. The source column is kept.
//!
//! Detection is not a step of its own. A [`crate::session::Session`] runs it on the working copy
//! before every operator application, so whichever operator follows carries the promotion and
//! the same undo reverts it. This operator also runs it itself, so it can be used directly on an
//! unpromoted table.

use std::borrow::Cow;

use chrono::Datelike;

use crate::error::{CleaningError, CleaningResult};
use crate::temporal::parse_datetime;
use crate::types::{DataType, Field, Table, Value};

use super::{resolve_columns, Applied, Operator, OperatorKind, OperatorParams, ParameterOptions};

/// Appends year/month/day columns derived from datetime columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractDatetime;

const PARTS: [&str; 3] = ["year", "month", "day"];

/// Names of text columns that detection would promote, in schema order.
///
/// A column needs at least one non-missing value to qualify.
pub fn detect_datetime_columns(table: &Table) -> Vec<String> {
    table
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(idx, f)| f.data_type == DataType::Utf8 && column_parses(table, *idx))
        .map(|(_, f)| f.name.clone())
        .collect()
}

fn column_parses(table: &Table, idx: usize) -> bool {
    let mut seen = false;
    for v in table.column_values(idx) {
        match v {
            v if v.is_missing() => {}
            Value::Utf8(s) if parse_datetime(s).is_some() => seen = true,
            _ => return false,
        }
    }
    seen
}

/// `table` with every detectable text column promoted to datetime, plus the names of the
/// promoted columns. Borrows the input when nothing is detected.
pub fn promote_datetime_columns(table: &Table) -> (Cow<'_, Table>, Vec<String>) {
    let detected = detect_datetime_columns(table);
    if detected.is_empty() {
        return (Cow::Borrowed(table), detected);
    }
    let mut out = table.clone();
    for name in &detected {
        let Some(idx) = out.schema.index_of(name) else {
            continue;
        };
        out.schema.fields[idx].data_type = DataType::DateTime;
        for row in &mut out.rows {
            let promoted = match &row[idx] {
                Value::Utf8(s) => parse_datetime(s).map_or(Value::Null, Value::DateTime),
                _ => Value::Null,
            };
            row[idx] = promoted;
        }
    }
    (Cow::Owned(out), detected)
}

impl ExtractDatetime {
    fn selection<'a>(&self, params: &'a OperatorParams) -> CleaningResult<&'a [String]> {
        match params {
            OperatorParams::ExtractDatetime { columns } => Ok(columns.as_slice()),
            other => Err(other.mismatch(self.kind())),
        }
    }

    /// Detection, then selection checks against the promoted table.
    fn prepare(&self, table: &Table, params: &OperatorParams) -> CleaningResult<(Table, Vec<String>, Vec<usize>)> {
        let columns = self.selection(params)?;
        let (promoted, detected) = promote_datetime_columns(table);
        let promoted = promoted.into_owned();
        if promoted.datetime_columns().is_empty() {
            return Err(CleaningError::NoDatetimeColumns);
        }
        let idxs = resolve_columns(&promoted, columns, self.kind())?;
        for &idx in &idxs {
            let field = &promoted.schema.fields[idx];
            if !field.data_type.is_datetime() {
                return Err(CleaningError::NonDatetimeColumn {
                    column: field.name.clone(),
                });
            }
        }
        Ok((promoted, detected, idxs))
    }
}

fn part(v: &Value, which: &str) -> Value {
    match (v.as_datetime(), which) {
        (Some(dt), "year") => Value::Int64(i64::from(dt.year())),
        (Some(dt), "month") => Value::Int64(i64::from(dt.month())),
        (Some(dt), "day") => Value::Int64(i64::from(dt.day())),
        _ => Value::Null,
    }
}

impl Operator for ExtractDatetime {
    fn kind(&self) -> OperatorKind {
        OperatorKind::ExtractDatetime
    }

    fn is_eligible(&self, table: &Table) -> bool {
        !table.datetime_columns().is_empty() || !detect_datetime_columns(table).is_empty()
    }

    fn parameter_options(&self, table: &Table) -> ParameterOptions {
        let detected = detect_datetime_columns(table);
        let columns = table
            .schema
            .fields
            .iter()
            .filter(|f| f.data_type.is_datetime() || detected.contains(&f.name))
            .map(|f| f.name.clone())
            .collect();
        ParameterOptions::Columns {
            columns,
            methods: Vec::new(),
        }
    }

    fn validate(&self, table: &Table, params: &OperatorParams) -> CleaningResult<()> {
        self.prepare(table, params).map(|_| ())
    }

    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied> {
        let (mut out, detected, idxs) = self.prepare(table, params)?;

        let mut added = Vec::new();
        for idx in idxs {
            let source = out.schema.fields[idx].name.clone();
            for which in PARTS {
                let name = format!("{source}_{which}");
                let values: Vec<Value> = out.column_values(idx).map(|v| part(v, which)).collect();
                match out.schema.index_of(&name) {
                    // An existing column of the same name is overwritten where it stands.
                    Some(target) => out = out.replace_column(target, DataType::Int64, values),
                    None => {
                        out.schema.fields.push(Field::new(name.clone(), DataType::Int64));
                        for (row, v) in out.rows.iter_mut().zip(values) {
                            row.push(v);
                        }
                    }
                }
                added.push(name);
            }
        }

        let mut message = format!("Extracted {}", added.join(", "));
        if !detected.is_empty() {
            message.push_str(&format!(" (detected datetime: {})", detected.join(", ")));
        }
        Ok(Applied {
            table: out,
            rows_removed: 0,
            message,
        })
    }
}
