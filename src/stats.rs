//! Column statistics used by the cleaning operators.
//!
//! All statistics ignore missing cells. Numeric helpers operate on the `f64` view of a column
//! (see [`numeric_values`]).

use std::collections::HashMap;

use crate::types::{Table, Value, ValueKey};

/// Non-missing numeric cells of column `idx`, in row order.
pub fn numeric_values(table: &Table, idx: usize) -> Vec<f64> {
    table.column_values(idx).filter_map(Value::as_f64).collect()
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, or `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Population standard deviation (ddof = 0), or `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Smallest and largest value, or `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Quantile `q` in `[0, 1]` with linear interpolation between the two nearest ranks.
///
/// Position `q * (n - 1)` in the sorted values, so `q = 0.25` on `[1, 2, 3, 4]` is `1.75`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Most frequent non-missing value.
///
/// Ties resolve to the smallest value under [`Value::total_cmp`]. Returns `None` if every
/// value is missing.
pub fn mode<'a>(values: impl Iterator<Item = &'a Value>) -> Option<Value> {
    let mut counts: HashMap<ValueKey, (usize, &'a Value)> = HashMap::new();
    for v in values.filter(|v| !v.is_missing()) {
        counts.entry(v.key()).or_insert((0, v)).0 += 1;
    }

    counts
        .into_values()
        .max_by(|(ca, va), (cb, vb)| ca.cmp(cb).then_with(|| vb.total_cmp(va)))
        .map(|(_, v)| v.clone())
}

#[cfg(test)]
mod tests {
    use super::{mean, median, min_max, mode, numeric_values, population_std, quantile};
    use crate::types::{DataType, Field, Schema, Table, Value};

    fn numeric_table_with_nulls() -> Table {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
        ]);
        Table::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::Float64(10.0)],
                vec![Value::Int64(2), Value::Null],
                vec![Value::Int64(3), Value::Float64(5.5)],
            ],
        )
    }

    #[test]
    fn numeric_values_skip_missing_cells() {
        let t = numeric_table_with_nulls();
        assert_eq!(numeric_values(&t, 1), vec![10.0, 5.5]);
        assert_eq!(mean(&numeric_values(&t, 0)), Some(2.0));
        assert_eq!(median(&numeric_values(&t, 0)), Some(2.0));

        let all_null = Table::new(
            Schema::new(vec![Field::new("score", DataType::Float64)]),
            vec![vec![Value::Null], vec![Value::Null]],
        );
        assert!(numeric_values(&all_null, 0).is_empty());
        assert_eq!(population_std(&numeric_values(&all_null, 0)), None);
        assert_eq!(mode(all_null.column_values(0)), None);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 0.75), Some(3.25));
        assert_eq!(median(&v), Some(2.5));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn population_std_uses_n_denominator() {
        let std = population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.0).abs() < 1e-12);
        assert_eq!(mean(&[]), None);
        assert_eq!(min_max(&[3.0, -1.0, 2.0]), Some((-1.0, 3.0)));
    }

    #[test]
    fn mode_breaks_ties_by_smallest_value() {
        let values = vec![
            Value::Utf8("pear".into()),
            Value::Utf8("apple".into()),
            Value::Null,
            Value::Utf8("pear".into()),
            Value::Utf8("apple".into()),
            Value::Null,
            Value::Null,
        ];
        assert_eq!(mode(values.iter()), Some(Value::Utf8("apple".into())));

        let values = vec![Value::Int64(3), Value::Int64(3), Value::Int64(1)];
        assert_eq!(mode(values.iter()), Some(Value::Int64(3)));
    }
}
