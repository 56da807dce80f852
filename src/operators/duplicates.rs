//! Drop Duplicates.

use std::collections::HashSet;

use crate::error::CleaningResult;
use crate::types::{Table, ValueKey};

use super::{Applied, Operator, OperatorKind, OperatorParams, ParameterOptions};

/// Removes rows equal, across all columns, to an earlier row. First occurrences are kept in
/// their original order. Missing cells compare equal to each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropDuplicates;

impl Operator for DropDuplicates {
    fn kind(&self) -> OperatorKind {
        OperatorKind::DropDuplicates
    }

    fn is_eligible(&self, _table: &Table) -> bool {
        true
    }

    fn parameter_options(&self, _table: &Table) -> ParameterOptions {
        ParameterOptions::None
    }

    fn validate(&self, _table: &Table, params: &OperatorParams) -> CleaningResult<()> {
        match params {
            OperatorParams::DropDuplicates => Ok(()),
            other => Err(other.mismatch(self.kind())),
        }
    }

    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied> {
        self.validate(table, params)?;

        let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(table.row_count());
        let out = table.filter_rows(|row| seen.insert(row.iter().map(|v| v.key()).collect()));
        let removed = table.row_count() - out.row_count();
        Ok(Applied {
            table: out,
            rows_removed: removed,
            message: format!("Removed {removed} duplicate row(s)"),
        })
    }
}
