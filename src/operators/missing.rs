//! Handle Missing Data.
//!
//! Works on one column per application. Which strategies are allowed depends on the column's
//! kind: numeric columns accept drop / mean / median, everything else accepts drop /
//! most-frequent.

use crate::error::{CleaningError, CleaningResult};
use crate::stats::{mean, median, mode, numeric_values};
use crate::types::{DataType, Table, Value};

use super::{
    Applied, ColumnChoice, MissingStrategy, Operator, OperatorKind, OperatorParams,
    ParameterOptions,
};

/// Drops or imputes the missing cells of a single column.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandleMissing;

struct Request<'a> {
    idx: usize,
    column: &'a str,
    strategy: MissingStrategy,
}

impl HandleMissing {
    fn request<'a>(&self, table: &Table, params: &'a OperatorParams) -> CleaningResult<Request<'a>> {
        let OperatorParams::HandleMissing { column, strategy } = params else {
            return Err(params.mismatch(self.kind()));
        };
        let idx = table
            .schema
            .index_of(column)
            .ok_or_else(|| CleaningError::UnknownColumn { column: column.clone() })?;

        let numeric = table.schema.fields[idx].data_type.is_numeric();
        if !MissingStrategy::for_kind(numeric).contains(strategy) {
            return Err(CleaningError::UnsupportedStrategy {
                column: column.clone(),
                strategy: strategy.name().to_string(),
            });
        }
        let missing = table.missing_count(idx);
        if missing == 0 {
            return Err(CleaningError::NoMissingValues { column: column.clone() });
        }
        if missing == table.row_count() && *strategy != MissingStrategy::DropRows {
            return Err(all_missing(column));
        }
        Ok(Request {
            idx,
            column: column.as_str(),
            strategy: *strategy,
        })
    }
}

impl Operator for HandleMissing {
    fn kind(&self) -> OperatorKind {
        OperatorKind::HandleMissing
    }

    fn is_eligible(&self, table: &Table) -> bool {
        !table.columns_with_missing().is_empty()
    }

    fn parameter_options(&self, table: &Table) -> ParameterOptions {
        let choices = table
            .columns_with_missing()
            .into_iter()
            .map(|column| {
                let idx = table.schema.index_of(&column);
                let numeric = idx.is_some_and(|i| table.schema.fields[i].data_type.is_numeric());
                // Nothing to compute a fill from: only dropping is possible.
                let no_values = idx.is_some_and(|i| table.missing_count(i) == table.row_count());
                ColumnChoice {
                    column,
                    methods: MissingStrategy::for_kind(numeric)
                        .iter()
                        .filter(|s| !no_values || **s == MissingStrategy::DropRows)
                        .map(|s| s.name().to_string())
                        .collect(),
                }
            })
            .collect();
        ParameterOptions::PerColumn { choices }
    }

    fn validate(&self, table: &Table, params: &OperatorParams) -> CleaningResult<()> {
        self.request(table, params).map(|_| ())
    }

    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied> {
        let req = self.request(table, params)?;
        let missing = table.missing_count(req.idx);

        let Some((fill, data_type)) = fill_value(table, &req)? else {
            let out = table.filter_rows(|row| !row[req.idx].is_missing());
            let removed = table.row_count() - out.row_count();
            return Ok(Applied {
                table: out,
                rows_removed: removed,
                message: format!("Dropped {removed} row(s) with missing '{}'", req.column),
            });
        };
        let values = table
            .column_values(req.idx)
            .map(|v| {
                if v.is_missing() {
                    fill.clone()
                } else if data_type == DataType::Float64 {
                    v.as_f64().map_or(Value::Null, Value::Float64)
                } else {
                    v.clone()
                }
            })
            .collect();

        Ok(Applied {
            table: table.replace_column(req.idx, data_type, values),
            rows_removed: 0,
            message: format!(
                "Filled {missing} missing value(s) in '{}' with {} ({})",
                req.column,
                strategy_label(req.strategy),
                fill.display_text()
            ),
        })
    }
}

/// The statistic to impute with and the column type after imputation, or `None` for
/// [`MissingStrategy::DropRows`].
///
/// Mean and median fills promote the column to `Float64`.
fn fill_value(table: &Table, req: &Request<'_>) -> CleaningResult<Option<(Value, DataType)>> {
    let data_type = table.schema.fields[req.idx].data_type;
    let fill = match req.strategy {
        MissingStrategy::DropRows => return Ok(None),
        MissingStrategy::FillMean => {
            mean(&numeric_values(table, req.idx)).map(|v| (Value::Float64(v), DataType::Float64))
        }
        MissingStrategy::FillMedian => {
            median(&numeric_values(table, req.idx)).map(|v| (Value::Float64(v), DataType::Float64))
        }
        MissingStrategy::FillMostFrequent => mode(table.column_values(req.idx)).map(|v| (v, data_type)),
    };
    fill.map(Some).ok_or_else(|| all_missing(req.column))
}

fn all_missing(column: &str) -> CleaningError {
    CleaningError::DegenerateColumn {
        column: column.to_string(),
        reason: "no non-missing values to compute a fill value from".to_string(),
    }
}

fn strategy_label(s: MissingStrategy) -> &'static str {
    match s {
        MissingStrategy::DropRows => "drop",
        MissingStrategy::FillMean => "mean",
        MissingStrategy::FillMedian => "median",
        MissingStrategy::FillMostFrequent => "most frequent",
    }
}

#[cfg(test)]
mod tests {
    use super::HandleMissing;
    use crate::error::CleaningError;
    use crate::operators::{MissingStrategy, Operator, OperatorParams, ParameterOptions};
    use crate::types::{DataType, Field, Schema, Table, Value};

    fn ages() -> Table {
        let schema = Schema::new(vec![
            Field::new("age", DataType::Int64),
            Field::new("city", DataType::Utf8),
        ]);
        Table::new(
            schema,
            vec![
                vec![Value::Int64(20), Value::Utf8("Oslo".into())],
                vec![Value::Int64(25), Value::Null],
                vec![Value::Null, Value::Utf8("Rome".into())],
                vec![Value::Int64(40), Value::Utf8("Rome".into())],
            ],
        )
    }

    fn params(column: &str, strategy: MissingStrategy) -> OperatorParams {
        OperatorParams::HandleMissing {
            column: column.to_string(),
            strategy,
        }
    }

    #[test]
    fn fill_mean_replaces_missing_and_keeps_row_count() {
        let out = HandleMissing
            .apply(&ages(), &params("age", MissingStrategy::FillMean))
            .unwrap()
            .table;
        assert_eq!(out.row_count(), 4);
        assert_eq!(out.schema.fields[0].data_type, DataType::Float64);
        let Value::Float64(filled) = out.rows[2][0] else {
            panic!("expected a float fill, got {:?}", out.rows[2][0]);
        };
        assert!((filled - 85.0 / 3.0).abs() < 1e-9);
        assert_eq!(out.rows[0][0], Value::Float64(20.0));
        // Other columns untouched.
        assert_eq!(out.rows[1][1], Value::Null);
    }

    #[test]
    fn fill_median_uses_middle_value() {
        let out = HandleMissing
            .apply(&ages(), &params("age", MissingStrategy::FillMedian))
            .unwrap()
            .table;
        assert_eq!(out.rows[2][0], Value::Float64(25.0));
    }

    #[test]
    fn fill_most_frequent_on_text() {
        let out = HandleMissing
            .apply(&ages(), &params("city", MissingStrategy::FillMostFrequent))
            .unwrap()
            .table;
        assert_eq!(out.rows[1][1], Value::Utf8("Rome".into()));
        assert_eq!(out.schema.fields[1].data_type, DataType::Utf8);
    }

    #[test]
    fn drop_rows_removes_only_rows_missing_the_target() {
        let applied = HandleMissing
            .apply(&ages(), &params("city", MissingStrategy::DropRows))
            .unwrap();
        assert_eq!(applied.rows_removed, 1);
        assert_eq!(applied.table.row_count(), 3);
        assert_eq!(applied.table.missing_count(1), 0);
        // The missing age survives: only the target column decides.
        assert_eq!(applied.table.missing_count(0), 1);
    }

    #[test]
    fn strategy_must_match_column_kind() {
        assert!(matches!(
            HandleMissing.validate(&ages(), &params("age", MissingStrategy::FillMostFrequent)),
            Err(CleaningError::UnsupportedStrategy { .. })
        ));
        assert!(matches!(
            HandleMissing.validate(&ages(), &params("city", MissingStrategy::FillMean)),
            Err(CleaningError::UnsupportedStrategy { .. })
        ));
    }

    #[test]
    fn column_without_missing_values_is_rejected() {
        let t = ages().filter_rows(|row| !row[0].is_missing() && !row[1].is_missing());
        assert!(!HandleMissing.is_eligible(&t));
        assert!(matches!(
            HandleMissing.validate(&t, &params("age", MissingStrategy::DropRows)),
            Err(CleaningError::NoMissingValues { .. })
        ));
    }

    #[test]
    fn options_list_strategies_per_column_kind() {
        let ParameterOptions::PerColumn { choices } = HandleMissing.parameter_options(&ages())
        else {
            panic!("expected per-column options");
        };
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].column, "age");
        assert_eq!(choices[0].methods, vec!["drop_rows", "fill_mean", "fill_median"]);
        assert_eq!(choices[1].methods, vec!["drop_rows", "fill_most_frequent"]);
    }

    #[test]
    fn fill_on_all_missing_column_is_degenerate() {
        let t = Table::new(
            Schema::new(vec![Field::new("x", DataType::Float64)]),
            vec![vec![Value::Null], vec![Value::Null]],
        );
        assert!(matches!(
            HandleMissing.validate(&t, &params("x", MissingStrategy::FillMean)),
            Err(CleaningError::DegenerateColumn { .. })
        ));
        assert!(matches!(
            HandleMissing.apply(&t, &params("x", MissingStrategy::FillMedian)),
            Err(CleaningError::DegenerateColumn { .. })
        ));
        let dropped = HandleMissing
            .apply(&t, &params("x", MissingStrategy::DropRows))
            .unwrap();
        assert_eq!(dropped.table.row_count(), 0);
    }

    #[test]
    fn all_missing_columns_are_only_offered_row_dropping() {
        let t = Table::new(
            Schema::new(vec![
                Field::new("x", DataType::Float64),
                Field::new("tag", DataType::Utf8),
            ]),
            vec![
                vec![Value::Null, Value::Null],
                vec![Value::Null, Value::Null],
            ],
        );
        let ParameterOptions::PerColumn { choices } = HandleMissing.parameter_options(&t) else {
            panic!("expected per-column options");
        };
        assert_eq!(choices.len(), 2);
        for choice in &choices {
            assert_eq!(choice.methods, vec!["drop_rows"]);
        }
    }
}
