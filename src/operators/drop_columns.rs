//! Drop Columns.

use crate::error::CleaningResult;
use crate::types::{Schema, Table};

use super::{resolve_columns, Applied, Operator, OperatorKind, OperatorParams, ParameterOptions};

/// Removes the selected columns, keeping every row and the order of the remaining columns.
///
/// Removing every column is allowed and yields a zero-column table with the same row count.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropColumns;

impl DropColumns {
    fn selection<'a>(&self, params: &'a OperatorParams) -> CleaningResult<&'a [String]> {
        match params {
            OperatorParams::DropColumns { columns } => Ok(columns.as_slice()),
            other => Err(other.mismatch(self.kind())),
        }
    }
}

impl Operator for DropColumns {
    fn kind(&self) -> OperatorKind {
        OperatorKind::DropColumns
    }

    fn is_eligible(&self, table: &Table) -> bool {
        table.column_count() > 0
    }

    fn parameter_options(&self, table: &Table) -> ParameterOptions {
        ParameterOptions::Columns {
            columns: table.schema.field_names().map(str::to_string).collect(),
            methods: Vec::new(),
        }
    }

    fn validate(&self, table: &Table, params: &OperatorParams) -> CleaningResult<()> {
        resolve_columns(table, self.selection(params)?, self.kind()).map(|_| ())
    }

    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied> {
        let drop = resolve_columns(table, self.selection(params)?, self.kind())?;
        let keep: Vec<usize> = (0..table.column_count())
            .filter(|idx| !drop.contains(idx))
            .collect();

        let schema = Schema::new(
            keep.iter()
                .map(|&idx| table.schema.fields[idx].clone())
                .collect(),
        );
        let rows = table
            .rows
            .iter()
            .map(|row| keep.iter().map(|&idx| row[idx].clone()).collect())
            .collect();

        let dropped: Vec<&str> = drop
            .iter()
            .map(|&idx| table.schema.fields[idx].name.as_str())
            .collect();
        Ok(Applied {
            table: Table::new(schema, rows),
            rows_removed: 0,
            message: format!("Dropped {} column(s): {}", dropped.len(), dropped.join(", ")),
        })
    }
}
