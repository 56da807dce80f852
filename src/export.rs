//! CSV export of a [`Table`].
//!
//! Output has a header row of column names, comma separators and UTF-8 text. Missing cells are
//! written as empty fields.

use std::io::{self, Write};

use crate::error::{IngestionError, IngestionResult};
use crate::temporal::{format_datetime, is_midnight};
use crate::types::{DataType, Table, Value};

/// Write `table` as CSV to `writer`.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> IngestionResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(table.schema.field_names())?;

    // Date-only rendering is decided per column.
    let date_only: Vec<bool> = table
        .schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            f.data_type == DataType::DateTime
                && table
                    .column_values(idx)
                    .filter_map(Value::as_datetime)
                    .all(is_midnight)
        })
        .collect();

    for row in &table.rows {
        wtr.write_record(
            row.iter()
                .zip(&date_only)
                .map(|(v, &date_only)| format_cell(v, date_only)),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `table` as a CSV string.
pub fn to_csv_string(table: &Table) -> IngestionResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| IngestionError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn format_cell(value: &Value, date_only: bool) -> String {
    match value {
        Value::DateTime(dt) => format_datetime(*dt, date_only),
        v if v.is_missing() => String::new(),
        v => v.display_text(),
    }
}

/// Render a float so integral values keep a trailing `.0`.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
