//! Handle Outliers.
//!
//! Two row-filtering methods over a set of numeric columns:
//!
//! - **Z-score**: each selected column is scored independently against its own mean and
//!   population standard deviation; a row survives only if every selected column has
//!   `|z| < threshold`.
//! - **IQR**: columns are processed one after another in the order given, each against the
//!   quartiles of the rows that are still left. The selection order therefore changes the
//!   result.
//!
//! Missing cells never make a row an outlier.

use rayon::prelude::*;

use crate::error::{CleaningError, CleaningResult};
use crate::stats::{mean, numeric_values, population_std, quantile};
use crate::types::Table;

use super::{
    require_numeric, resolve_columns, Applied, Operator, OperatorKind, OperatorParams,
    OutlierMethod, ParameterOptions,
};

/// Removes outlier rows by Z-score or IQR.
#[derive(Debug, Clone, Copy)]
pub struct HandleOutliers {
    zscore_threshold: f64,
    iqr_multiplier: f64,
}

impl Default for HandleOutliers {
    fn default() -> Self {
        Self::new(3.0, 1.5)
    }
}

impl HandleOutliers {
    /// Create the operator with explicit thresholds.
    pub fn new(zscore_threshold: f64, iqr_multiplier: f64) -> Self {
        Self {
            zscore_threshold,
            iqr_multiplier,
        }
    }

    fn request(&self, table: &Table, params: &OperatorParams) -> CleaningResult<(OutlierMethod, Vec<usize>)> {
        let OperatorParams::HandleOutliers { method, columns } = params else {
            return Err(params.mismatch(self.kind()));
        };
        if table.numeric_columns().is_empty() {
            return Err(CleaningError::NoNumericColumns);
        }
        let idxs = resolve_columns(table, columns, self.kind())?;
        require_numeric(table, &idxs)?;
        Ok((*method, idxs))
    }

    fn zscore_filter(&self, table: &Table, idxs: &[usize]) -> Table {
        let masks: Vec<Vec<bool>> = idxs
            .par_iter()
            .map(|&idx| zscore_mask(table, idx, self.zscore_threshold))
            .collect();

        let keep: Vec<bool> = (0..table.row_count())
            .map(|row| masks.iter().all(|mask| mask[row]))
            .collect();
        table.retain_mask(&keep)
    }

    fn iqr_filter(&self, table: &Table, idxs: &[usize]) -> Table {
        let mut current = table.clone();
        for &idx in idxs {
            let values = numeric_values(&current, idx);
            let (Some(q1), Some(q3)) = (quantile(&values, 0.25), quantile(&values, 0.75)) else {
                continue;
            };
            let iqr = q3 - q1;
            let lower = q1 - self.iqr_multiplier * iqr;
            let upper = q3 + self.iqr_multiplier * iqr;
            current = current.filter_rows(|row| {
                row[idx]
                    .as_f64()
                    .is_none_or(|v| (lower..=upper).contains(&v))
            });
        }
        current
    }
}

/// `true` for rows whose value in column `idx` is within the threshold (or missing).
fn zscore_mask(table: &Table, idx: usize, threshold: f64) -> Vec<bool> {
    let values = numeric_values(table, idx);
    let (Some(m), Some(std)) = (mean(&values), population_std(&values)) else {
        return vec![true; table.row_count()];
    };

    table
        .column_values(idx)
        .map(|v| match v.as_f64() {
            None => true,
            Some(_) if std == 0.0 => true,
            Some(x) => ((x - m) / std).abs() < threshold,
        })
        .collect()
}

impl Operator for HandleOutliers {
    fn kind(&self) -> OperatorKind {
        OperatorKind::HandleOutliers
    }

    fn is_eligible(&self, table: &Table) -> bool {
        !table.numeric_columns().is_empty()
    }

    fn parameter_options(&self, table: &Table) -> ParameterOptions {
        ParameterOptions::Columns {
            columns: table.numeric_columns(),
            methods: [OutlierMethod::ZScore, OutlierMethod::Iqr]
                .iter()
                .map(|m| m.name().to_string())
                .collect(),
        }
    }

    fn validate(&self, table: &Table, params: &OperatorParams) -> CleaningResult<()> {
        self.request(table, params).map(|_| ())
    }

    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied> {
        let (method, idxs) = self.request(table, params)?;
        let out = match method {
            OutlierMethod::ZScore => self.zscore_filter(table, &idxs),
            OutlierMethod::Iqr => self.iqr_filter(table, &idxs),
        };
        let removed = table.row_count() - out.row_count();
        Ok(Applied {
            table: out,
            rows_removed: removed,
            message: format!("Removed {removed} outlier row(s) using {}", method.name()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HandleOutliers;
    use crate::error::CleaningError;
    use crate::operators::{Operator, OperatorParams, OutlierMethod};
    use crate::types::{DataType, Field, Schema, Table, Value};

    fn params(method: OutlierMethod, cols: &[&str]) -> OperatorParams {
        OperatorParams::HandleOutliers {
            method,
            columns: cols.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Eleven 10s and one 1000: the spike has |z| = sqrt(11) > 3.
    fn spike_table() -> Table {
        let schema = Schema::new(vec![
            Field::new("v", DataType::Float64),
            Field::new("label", DataType::Utf8),
        ]);
        let mut rows: Vec<Vec<Value>> = (0..11)
            .map(|i| vec![Value::Float64(10.0), Value::Utf8(format!("r{i}"))])
            .collect();
        rows.push(vec![Value::Float64(1000.0), Value::Utf8("spike".into())]);
        Table::new(schema, rows)
    }

    #[test]
    fn zscore_drops_the_spike_only() {
        let applied = HandleOutliers::default()
            .apply(&spike_table(), &params(OutlierMethod::ZScore, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 1);
        assert!(applied
            .table
            .rows
            .iter()
            .all(|r| r[1] != Value::Utf8("spike".into())));
    }

    #[test]
    fn zscore_keeps_everything_when_no_value_reaches_threshold() {
        let schema = Schema::new(vec![Field::new("v", DataType::Int64)]);
        let t = Table::new(
            schema,
            vec![
                vec![Value::Int64(1)],
                vec![Value::Int64(2)],
                vec![Value::Int64(3)],
                vec![Value::Null],
                vec![Value::Int64(100)],
            ],
        );
        let applied = HandleOutliers::default()
            .apply(&t, &params(OutlierMethod::ZScore, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 0);
        assert_eq!(applied.table, t);
    }

    #[test]
    fn zscore_threshold_is_configurable() {
        let applied = HandleOutliers::new(1.0, 1.5)
            .apply(&spike_table(), &params(OutlierMethod::ZScore, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 1);
    }

    #[test]
    fn iqr_removes_values_outside_the_fences() {
        let schema = Schema::new(vec![Field::new("v", DataType::Int64)]);
        let t = Table::new(
            schema,
            [1, 2, 3, 4, 100].iter().map(|&v| vec![Value::Int64(v)]).collect(),
        );
        let applied = HandleOutliers::default()
            .apply(&t, &params(OutlierMethod::Iqr, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 1);
        assert_eq!(applied.table.row_count(), 4);
    }

    fn single_column(values: &[f64]) -> Table {
        Table::new(
            Schema::new(vec![Field::new("v", DataType::Float64)]),
            values.iter().map(|&v| vec![Value::Float64(v)]).collect(),
        )
    }

    #[test]
    fn zscore_drops_values_exactly_at_the_threshold() {
        // Nine 0s and one 10: mean 1, population std 3, so the 10 sits at z = 3.
        let mut values = vec![0.0; 9];
        values.push(10.0);
        let t = single_column(&values);

        let applied = HandleOutliers::default()
            .apply(&t, &params(OutlierMethod::ZScore, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 1);
        assert!(applied.table.rows.iter().all(|r| r[0] == Value::Float64(0.0)));

        let applied = HandleOutliers::new(3.0 + 1e-9, 1.5)
            .apply(&t, &params(OutlierMethod::ZScore, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 0);
    }

    #[test]
    fn iqr_fences_are_inclusive() {
        // Q1 = 2, Q3 = 6, IQR = 4: fences at -4 and 12.
        let on_fence = single_column(&[0.0, 2.0, 4.0, 6.0, 12.0]);
        let applied = HandleOutliers::default()
            .apply(&on_fence, &params(OutlierMethod::Iqr, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 0);

        let past_fence = single_column(&[0.0, 2.0, 4.0, 6.0, 12.5]);
        let applied = HandleOutliers::default()
            .apply(&past_fence, &params(OutlierMethod::Iqr, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 1);
        assert_eq!(applied.table.rows.last(), Some(&vec![Value::Float64(6.0)]));

        let low_fence = single_column(&[-4.0, 2.0, 4.0, 6.0, 10.0]);
        let applied = HandleOutliers::default()
            .apply(&low_fence, &params(OutlierMethod::Iqr, &["v"]))
            .unwrap();
        assert_eq!(applied.rows_removed, 0);
    }

    #[test]
    fn non_numeric_selection_is_rejected() {
        assert!(matches!(
            HandleOutliers::default().validate(&spike_table(), &params(OutlierMethod::Iqr, &["label"])),
            Err(CleaningError::NonNumericColumn { column }) if column == "label"
        ));
    }
}
