//! Encode Categorical Variables.
//!
//! Category order is always the sorted order of the distinct non-missing values, so encodings
//! are deterministic for a given column.

use std::collections::{HashMap, HashSet};

use crate::error::{CleaningError, CleaningResult};
use crate::types::{DataType, Field, Schema, Table, Value, ValueKey};

use super::{
    resolve_columns, Applied, EncodingMethod, Operator, OperatorKind, OperatorParams,
    ParameterOptions,
};

/// Label, one-hot or dummy encoding of text columns.
///
/// - [`EncodingMethod::Label`] replaces each selected column in place with `Int64` ranks
///   `0..k`; missing cells stay missing.
/// - [`EncodingMethod::OneHot`] removes the selected columns and appends one `Bool` column per
///   category, named `<column>_<value>`.
/// - [`EncodingMethod::GetDummies`] does the same but omits the first category's column.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeCategorical;

struct Plan {
    method: EncodingMethod,
    /// Selected column index and its sorted categories.
    columns: Vec<(usize, Vec<Value>)>,
}

impl EncodeCategorical {
    fn plan(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Plan> {
        let OperatorParams::EncodeCategorical { method, columns } = params else {
            return Err(params.mismatch(self.kind()));
        };
        if table.categorical_columns().is_empty() {
            return Err(CleaningError::NoCategoricalColumns);
        }
        let idxs = resolve_columns(table, columns, self.kind())?;
        for &idx in &idxs {
            let field = &table.schema.fields[idx];
            if !field.data_type.is_categorical() {
                return Err(CleaningError::NonCategoricalColumn {
                    column: field.name.clone(),
                });
            }
        }

        let plan = Plan {
            method: *method,
            columns: idxs
                .into_iter()
                .map(|idx| (idx, sorted_categories(table, idx)))
                .collect(),
        };
        if plan.method != EncodingMethod::Label {
            indicator_fields(table, &plan)?;
        }
        Ok(plan)
    }
}

fn sorted_categories(table: &Table, idx: usize) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut cats: Vec<Value> = table
        .column_values(idx)
        .filter(|v| !v.is_missing() && seen.insert(v.key()))
        .cloned()
        .collect();
    cats.sort_by(Value::total_cmp);
    cats
}

/// Indicator columns to append, in order, as `(source idx, category, field)`.
fn indicator_fields<'p>(
    table: &Table,
    plan: &'p Plan,
) -> CleaningResult<Vec<(usize, &'p Value, Field)>> {
    let selected: Vec<usize> = plan.columns.iter().map(|(idx, _)| *idx).collect();
    let mut taken: HashSet<String> = table
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(idx, _)| !selected.contains(idx))
        .map(|(_, f)| f.name.clone())
        .collect();

    let skip = usize::from(plan.method == EncodingMethod::GetDummies);
    let mut out = Vec::new();
    for (idx, cats) in &plan.columns {
        let source = &table.schema.fields[*idx].name;
        for cat in cats.iter().skip(skip) {
            let name = format!("{source}_{}", cat.display_text());
            if !taken.insert(name.clone()) {
                return Err(CleaningError::DuplicateColumn { column: name });
            }
            out.push((*idx, cat, Field::new(name, DataType::Bool)));
        }
    }
    Ok(out)
}

fn label_encode(table: &Table, plan: &Plan) -> Table {
    let mut out = table.clone();
    for (idx, cats) in &plan.columns {
        let ranks: HashMap<ValueKey, i64> = cats
            .iter()
            .enumerate()
            .map(|(rank, v)| (v.key(), rank as i64))
            .collect();
        out.schema.fields[*idx].data_type = DataType::Int64;
        for row in &mut out.rows {
            row[*idx] = ranks
                .get(&row[*idx].key())
                .map_or(Value::Null, |&rank| Value::Int64(rank));
        }
    }
    out
}

fn indicator_encode(table: &Table, plan: &Plan) -> CleaningResult<Table> {
    let indicators = indicator_fields(table, plan)?;
    let keep: Vec<usize> = (0..table.column_count())
        .filter(|idx| !plan.columns.iter().any(|(sel, _)| sel == idx))
        .collect();

    let mut fields: Vec<Field> = keep
        .iter()
        .map(|&idx| table.schema.fields[idx].clone())
        .collect();
    fields.extend(indicators.iter().map(|(_, _, f)| f.clone()));

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut out: Vec<Value> = keep.iter().map(|&idx| row[idx].clone()).collect();
            out.extend(
                indicators
                    .iter()
                    .map(|(idx, cat, _)| Value::Bool(row[*idx].key() == cat.key())),
            );
            out
        })
        .collect();

    Ok(Table::new(Schema::new(fields), rows))
}

impl Operator for EncodeCategorical {
    fn kind(&self) -> OperatorKind {
        OperatorKind::EncodeCategorical
    }

    fn is_eligible(&self, table: &Table) -> bool {
        !table.categorical_columns().is_empty()
    }

    fn parameter_options(&self, table: &Table) -> ParameterOptions {
        ParameterOptions::Columns {
            columns: table.categorical_columns(),
            methods: [
                EncodingMethod::Label,
                EncodingMethod::OneHot,
                EncodingMethod::GetDummies,
            ]
            .iter()
            .map(|m| m.name().to_string())
            .collect(),
        }
    }

    fn validate(&self, table: &Table, params: &OperatorParams) -> CleaningResult<()> {
        self.plan(table, params).map(|_| ())
    }

    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied> {
        let plan = self.plan(table, params)?;
        let out = match plan.method {
            EncodingMethod::Label => label_encode(table, &plan),
            EncodingMethod::OneHot | EncodingMethod::GetDummies => indicator_encode(table, &plan)?,
        };
        let names: Vec<&str> = plan
            .columns
            .iter()
            .map(|(idx, _)| table.schema.fields[*idx].name.as_str())
            .collect();
        Ok(Applied {
            table: out,
            rows_removed: 0,
            message: format!(
                "Encoded {} with {}",
                names.join(", "),
                plan.method.name()
            ),
        })
    }
}
