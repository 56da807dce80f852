//! Feature Scaling / Normalization.

use rayon::prelude::*;

use crate::error::{CleaningError, CleaningResult};
use crate::stats::{mean, min_max, numeric_values, population_std};
use crate::types::{DataType, Table, Value};

use super::{
    require_numeric, resolve_columns, Applied, Operator, OperatorKind, OperatorParams,
    ParameterOptions, ScalingMethod,
};

/// Rescales numeric columns in place (same names and positions) to `Float64`.
///
/// Statistics are computed per column over its non-missing values; missing cells stay
/// missing. A column whose non-missing values are all equal (or that has none) cannot be
/// scaled and fails with [`CleaningError::DegenerateColumn`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleFeatures;

/// `x -> (x - shift) / divisor` for one column.
#[derive(Debug, Clone, Copy)]
struct Affine {
    idx: usize,
    shift: f64,
    divisor: f64,
}

impl ScaleFeatures {
    fn plan(&self, table: &Table, params: &OperatorParams) -> CleaningResult<(ScalingMethod, Vec<Affine>)> {
        let OperatorParams::ScaleFeatures { method, columns } = params else {
            return Err(params.mismatch(self.kind()));
        };
        if table.numeric_columns().is_empty() {
            return Err(CleaningError::NoNumericColumns);
        }
        let idxs = resolve_columns(table, columns, self.kind())?;
        require_numeric(table, &idxs)?;

        let transforms = idxs
            .into_iter()
            .map(|idx| affine_for(table, idx, *method))
            .collect::<CleaningResult<Vec<_>>>()?;
        Ok((*method, transforms))
    }
}

fn affine_for(table: &Table, idx: usize, method: ScalingMethod) -> CleaningResult<Affine> {
    let column = &table.schema.fields[idx].name;
    let degenerate = |reason: &str| CleaningError::DegenerateColumn {
        column: column.clone(),
        reason: reason.to_string(),
    };

    let values = numeric_values(table, idx);
    let (lo, hi) = min_max(&values).ok_or_else(|| degenerate("no non-missing values"))?;
    if lo == hi {
        return Err(degenerate(match method {
            ScalingMethod::Standard => "zero variance",
            ScalingMethod::MinMax => "max equals min",
        }));
    }

    let (shift, divisor) = match method {
        ScalingMethod::Standard => {
            let m = mean(&values).ok_or_else(|| degenerate("no non-missing values"))?;
            let std = population_std(&values).ok_or_else(|| degenerate("no non-missing values"))?;
            (m, std)
        }
        ScalingMethod::MinMax => (lo, hi - lo),
    };
    Ok(Affine { idx, shift, divisor })
}

/// Numeric columns with at least two distinct non-missing values.
fn scalable_columns(table: &Table) -> Vec<String> {
    table
        .numeric_columns()
        .into_iter()
        .filter(|name| {
            table.schema.index_of(name).is_some_and(|idx| {
                min_max(&numeric_values(table, idx)).is_some_and(|(lo, hi)| lo != hi)
            })
        })
        .collect()
}

fn scaled_column(table: &Table, t: Affine) -> Vec<Value> {
    table
        .column_values(t.idx)
        .map(|v| {
            v.as_f64()
                .map_or(Value::Null, |x| Value::Float64((x - t.shift) / t.divisor))
        })
        .collect()
}

impl Operator for ScaleFeatures {
    fn kind(&self) -> OperatorKind {
        OperatorKind::ScaleFeatures
    }

    fn is_eligible(&self, table: &Table) -> bool {
        !scalable_columns(table).is_empty()
    }

    fn parameter_options(&self, table: &Table) -> ParameterOptions {
        ParameterOptions::Columns {
            columns: scalable_columns(table),
            methods: [ScalingMethod::Standard, ScalingMethod::MinMax]
                .iter()
                .map(|m| m.name().to_string())
                .collect(),
        }
    }

    fn validate(&self, table: &Table, params: &OperatorParams) -> CleaningResult<()> {
        self.plan(table, params).map(|_| ())
    }

    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied> {
        let (method, transforms) = self.plan(table, params)?;

        let columns: Vec<(usize, Vec<Value>)> = transforms
            .par_iter()
            .map(|&t| (t.idx, scaled_column(table, t)))
            .collect();

        let mut out = table.clone();
        for (idx, values) in columns {
            out.schema.fields[idx].data_type = DataType::Float64;
            for (row, v) in out.rows.iter_mut().zip(values) {
                row[idx] = v;
            }
        }

        let names: Vec<&str> = transforms
            .iter()
            .map(|t| table.schema.fields[t.idx].name.as_str())
            .collect();
        Ok(Applied {
            table: out,
            rows_removed: 0,
            message: format!("Scaled {} with {}", names.join(", "), method.name()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ScaleFeatures;
    use crate::error::CleaningError;
    use crate::operators::{Operator, OperatorParams, ParameterOptions, ScalingMethod};
    use crate::types::{DataType, Field, Schema, Table, Value};

    fn table() -> Table {
        let schema = Schema::new(vec![
            Field::new("x", DataType::Int64),
            Field::new("flat", DataType::Float64),
            Field::new("name", DataType::Utf8),
        ]);
        Table::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::Float64(5.0), Value::Utf8("a".into())],
                vec![Value::Int64(2), Value::Float64(5.0), Value::Utf8("b".into())],
                vec![Value::Null, Value::Null, Value::Utf8("c".into())],
                vec![Value::Int64(3), Value::Float64(5.0), Value::Utf8("d".into())],
            ],
        )
    }

    fn params(method: ScalingMethod, cols: &[&str]) -> OperatorParams {
        OperatorParams::ScaleFeatures {
            method,
            columns: cols.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn floats(t: &Table, idx: usize) -> Vec<Option<f64>> {
        t.column_values(idx).map(Value::as_f64).collect()
    }

    #[test]
    fn min_max_maps_range_to_unit_interval() {
        let out = ScaleFeatures
            .apply(&table(), &params(ScalingMethod::MinMax, &["x"]))
            .unwrap()
            .table;
        assert_eq!(out.schema.fields[0].data_type, DataType::Float64);
        assert_eq!(floats(&out, 0), vec![Some(0.0), Some(0.5), None, Some(1.0)]);
    }

    #[test]
    fn standard_uses_population_statistics() {
        let out = ScaleFeatures
            .apply(&table(), &params(ScalingMethod::Standard, &["x"]))
            .unwrap()
            .table;
        let expected = 1.0 / (2.0f64 / 3.0).sqrt();
        let got = floats(&out, 0);
        assert!((got[0].unwrap() + expected).abs() < 1e-12);
        assert_eq!(got[1], Some(0.0));
        assert!((got[3].unwrap() - expected).abs() < 1e-12);
        assert_eq!(out.rows[2][0], Value::Null);
    }

    #[test]
    fn constant_column_is_degenerate() {
        for method in [ScalingMethod::Standard, ScalingMethod::MinMax] {
            let err = ScaleFeatures
                .validate(&table(), &params(method, &["x", "flat"]))
                .unwrap_err();
            assert!(matches!(err, CleaningError::DegenerateColumn { ref column, .. } if column == "flat"));
        }
    }

    #[test]
    fn non_numeric_column_is_rejected() {
        assert!(matches!(
            ScaleFeatures.validate(&table(), &params(ScalingMethod::MinMax, &["name"])),
            Err(CleaningError::NonNumericColumn { .. })
        ));
    }

    #[test]
    fn menu_lists_only_columns_that_can_be_scaled() {
        let ParameterOptions::Columns { columns, .. } = ScaleFeatures.parameter_options(&table()) else {
            panic!("expected a column selection");
        };
        assert_eq!(columns, vec!["x"]);
        for method in [ScalingMethod::Standard, ScalingMethod::MinMax] {
            let offered: Vec<&str> = columns.iter().map(String::as_str).collect();
            assert!(ScaleFeatures.validate(&table(), &params(method, &offered)).is_ok());
        }

        let constant = Table::new(
            Schema::new(vec![Field::new("n", DataType::Int64)]),
            vec![vec![Value::Int64(1)], vec![Value::Int64(1)], vec![Value::Int64(1)]],
        );
        assert!(!ScaleFeatures.is_eligible(&constant));
    }
}
