//! Column type inference for untyped (CSV) sources.

use crate::types::{DataType, Field, Schema};

/// Cell spellings treated as missing, matching what common dataframe readers accept.
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// `true` if the (already trimmed) cell spells a missing value.
pub fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.contains(&s)
}

/// Infer a schema from raw string cells.
///
/// Per column, looking only at non-missing cells:
///
/// - every cell parses as `i64` → [`DataType::Int64`]
/// - every cell parses as `f64` → [`DataType::Float64`]
/// - every cell is `true`/`false` (any case) → [`DataType::Bool`]
/// - otherwise → [`DataType::Utf8`]
///
/// A column with no non-missing cells is [`DataType::Float64`]. Datetimes are never inferred
/// here; text columns are promoted later by datetime detection.
pub fn infer_schema(headers: &[String], rows: &[Vec<String>]) -> Schema {
    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|s| s.trim())
                .filter(|s| !is_missing_token(s));
            Field::new(name.clone(), infer_column_type(cells))
        })
        .collect();
    Schema::new(fields)
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> DataType {
    let mut all_int = true;
    let mut all_float = true;
    let mut all_bool = true;
    let mut seen = false;

    for cell in cells {
        seen = true;
        all_int = all_int && cell.parse::<i64>().is_ok();
        all_float = all_float && cell.parse::<f64>().is_ok();
        all_bool = all_bool && matches!(cell.to_ascii_lowercase().as_str(), "true" | "false");
        if !(all_int || all_float || all_bool) {
            return DataType::Utf8;
        }
    }

    if !seen || (all_float && !all_int) {
        DataType::Float64
    } else if all_int {
        DataType::Int64
    } else {
        DataType::Bool
    }
}
