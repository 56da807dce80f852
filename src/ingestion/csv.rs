//! CSV loading, either against a user-provided [`Schema`] or with inferred column types.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::temporal::parse_datetime;
use crate::types::{DataType, Schema, Table, Value};

use super::infer::{infer_schema, is_missing_token};

/// Load a CSV file into an in-memory [`Table`] using `schema`.
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ).
/// - Each value is parsed according to the schema field type.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Load CSV data from an existing CSV reader using `schema`.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<Table> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based, and the header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(Table::new(schema.clone(), rows))
}

/// Load a CSV file, inferring column types from the data.
pub fn ingest_csv_inferred_from_path(path: impl AsRef<Path>) -> IngestionResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_inferred_from_reader(&mut rdr)
}

/// Load CSV data from an existing reader, inferring column types from the data.
///
/// See [`infer_schema`] for the inference rules. Duplicate header names are rejected because
/// column names must be unique within a table.
pub fn ingest_csv_inferred_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<Table> {
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    for (i, h) in headers.iter().enumerate() {
        if headers[..i].contains(h) {
            return Err(IngestionError::SchemaMismatch {
                message: format!("duplicate column name '{h}'"),
            });
        }
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        raw_rows.push(
            (0..headers.len())
                .map(|i| record.get(i).unwrap_or("").to_owned())
                .collect(),
        );
    }

    let schema = infer_schema(&headers, &raw_rows);
    let mut rows = Vec::with_capacity(raw_rows.len());
    for (row_idx0, raw_row) in raw_rows.iter().enumerate() {
        let user_row = row_idx0 + 2;
        let row = schema
            .fields
            .iter()
            .zip(raw_row)
            .map(|(field, raw)| parse_typed_value(user_row, &field.name, field.data_type, raw))
            .collect::<IngestionResult<Vec<_>>>()?;
        rows.push(row);
    }

    Ok(Table::new(schema, rows))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if is_missing_token(trimmed) {
        return Ok(Value::Null);
    }

    let parse_err = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_err),
        DataType::DateTime => parse_datetime(trimmed)
            .map(Value::DateTime)
            .ok_or_else(|| parse_err("expected a calendar date or date/time".to_string())),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{ingest_csv_from_reader, ingest_csv_inferred_from_reader};
    use crate::types::{DataType, Field, Schema, Value};

    fn reader(input: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes())
    }

    #[test]
    fn schema_load_parses_datetimes_and_missing_tokens() {
        let schema = Schema::new(vec![
            Field::new("when", DataType::DateTime),
            Field::new("score", DataType::Float64),
        ]);
        let t = ingest_csv_from_reader(&mut reader("when,score\n2024-01-02,NA\n,1.5\n"), &schema)
            .unwrap();
        assert!(matches!(t.rows[0][0], Value::DateTime(_)));
        assert_eq!(t.rows[0][1], Value::Null);
        assert_eq!(t.rows[1][0], Value::Null);
    }

    #[test]
    fn inferred_load_types_columns() {
        let input = "age,name,score,member\n20,Ada,1.5,True\n,Bob,2,false\n40,NA,,true\n";
        let t = ingest_csv_inferred_from_reader(&mut reader(input)).unwrap();
        let types: Vec<DataType> = t.schema.fields.iter().map(|f| f.data_type).collect();
        assert_eq!(
            types,
            vec![DataType::Int64, DataType::Utf8, DataType::Float64, DataType::Bool]
        );
        assert_eq!(t.rows[1][0], Value::Null);
        assert_eq!(t.rows[2][1], Value::Null);
        assert_eq!(t.rows[1][2], Value::Float64(2.0));
        assert_eq!(t.rows[0][3], Value::Bool(true));
    }

    #[test]
    fn inferred_load_rejects_duplicate_headers() {
        let err = ingest_csv_inferred_from_reader(&mut reader("a,a\n1,2\n")).unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'a'"));
    }

    #[test]
    fn schema_load_errors_on_type_parse() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        let err = ingest_csv_from_reader(&mut reader("id\nnot_an_int\n"), &schema).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("failed to parse value"));
        assert!(msg.contains("column 'id'"));
    }
}
