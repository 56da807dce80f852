//! Cleaning operators.
//!
//! Every operator is a stateless value implementing [`Operator`]: an eligibility predicate over
//! the current [`Table`], a description of the parameters that are currently valid, validation,
//! and a pure transform that builds a new table. Operators never mutate their input.
//!
//! Operators are looked up by name through an [`OperatorRegistry`]:
//!
//! | name                 | operator                         |
//! |----------------------|----------------------------------|
//! | `drop_columns`       | [`drop_columns::DropColumns`]    |
//! | `handle_missing`     | [`missing::HandleMissing`]       |
//! | `handle_outliers`    | [`outliers::HandleOutliers`]     |
//! | `drop_duplicates`    | [`duplicates::DropDuplicates`]   |
//! | `encode_categorical` | [`encode::EncodeCategorical`]    |
//! | `scale_features`     | [`scale::ScaleFeatures`]         |
//! | `extract_datetime`   | [`datetime::ExtractDatetime`]    |
//!
//! ## Example
//!
//! ```rust
//! use rust_data_cleaning::operators::{OperatorOptions, OperatorParams, OperatorRegistry};
//! use rust_data_cleaning::types::{DataType, Field, Schema, Table, Value};
//!
//! let table = Table::new(
//!     Schema::new(vec![Field::new("id", DataType::Int64), Field::new("tmp", DataType::Utf8)]),
//!     vec![vec![Value::Int64(1), Value::Utf8("x".to_string())]],
//! );
//! let registry = OperatorRegistry::new(&OperatorOptions::default());
//! let op = registry.get("drop_columns").unwrap();
//! let params = OperatorParams::DropColumns { columns: vec!["tmp".to_string()] };
//! op.validate(&table, &params).unwrap();
//! let applied = op.apply(&table, &params).unwrap();
//! assert_eq!(applied.table.column_count(), 1);
//! ```

pub mod datetime;
pub mod drop_columns;
pub mod duplicates;
pub mod encode;
pub mod missing;
pub mod outliers;
pub mod scale;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CleaningError, CleaningResult};
use crate::types::Table;

/// The seven operator names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Remove selected columns.
    DropColumns,
    /// Drop or impute missing cells in one column.
    HandleMissing,
    /// Remove outlier rows by Z-score or IQR.
    HandleOutliers,
    /// Remove repeated rows, keeping the first occurrence.
    DropDuplicates,
    /// Label, one-hot or dummy encoding of text columns.
    EncodeCategorical,
    /// Standard or min-max scaling of numeric columns.
    ScaleFeatures,
    /// Append year, month and day columns derived from datetime columns.
    ExtractDatetime,
}

impl OperatorKind {
    /// All kinds, in menu order.
    pub const ALL: [Self; 7] = [
        Self::DropColumns,
        Self::HandleMissing,
        Self::HandleOutliers,
        Self::DropDuplicates,
        Self::EncodeCategorical,
        Self::ScaleFeatures,
        Self::ExtractDatetime,
    ];

    /// Stable machine name.
    pub fn name(self) -> &'static str {
        match self {
            Self::DropColumns => "drop_columns",
            Self::HandleMissing => "handle_missing",
            Self::HandleOutliers => "handle_outliers",
            Self::DropDuplicates => "drop_duplicates",
            Self::EncodeCategorical => "encode_categorical",
            Self::ScaleFeatures => "scale_features",
            Self::ExtractDatetime => "extract_datetime",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::DropColumns => "Drop Columns",
            Self::HandleMissing => "Handle Missing Data",
            Self::HandleOutliers => "Handle Outliers",
            Self::DropDuplicates => "Drop Duplicates",
            Self::EncodeCategorical => "Encode Categorical Variables",
            Self::ScaleFeatures => "Feature Scaling / Normalization",
            Self::ExtractDatetime => "Feature Engineering",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperatorKind {
    type Err = CleaningError;

    /// Accepts either the machine name or the label (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s) || k.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| CleaningError::UnknownOperator { name: s.to_string() })
    }
}

/// Missing-data strategy for [`missing::HandleMissing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Remove every row where the target column is missing (any column kind).
    DropRows,
    /// Numeric columns only.
    FillMean,
    /// Numeric columns only.
    FillMedian,
    /// Non-numeric columns only.
    FillMostFrequent,
}

impl MissingStrategy {
    /// Stable machine name, as used in JSON parameters and menus.
    pub fn name(self) -> &'static str {
        match self {
            Self::DropRows => "drop_rows",
            Self::FillMean => "fill_mean",
            Self::FillMedian => "fill_median",
            Self::FillMostFrequent => "fill_most_frequent",
        }
    }

    /// Strategies offered for a column of the given kind.
    pub fn for_kind(numeric: bool) -> &'static [Self] {
        if numeric {
            &[Self::DropRows, Self::FillMean, Self::FillMedian]
        } else {
            &[Self::DropRows, Self::FillMostFrequent]
        }
    }
}

/// Outlier detection method for [`outliers::HandleOutliers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Drop rows with `|z|` at or above the threshold in any selected column.
    ZScore,
    /// Drop rows outside the inclusive quartile fences, column by column.
    Iqr,
}

impl OutlierMethod {
    /// Stable machine name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ZScore => "z_score",
            Self::Iqr => "iqr",
        }
    }
}

/// Encoding method for [`encode::EncodeCategorical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMethod {
    /// Replace each category by its rank among the sorted distinct values.
    Label,
    /// One indicator column per category.
    OneHot,
    /// Like [`EncodingMethod::OneHot`], minus the first category's indicator.
    GetDummies,
}

impl EncodingMethod {
    /// Stable machine name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::OneHot => "one_hot",
            Self::GetDummies => "get_dummies",
        }
    }
}

/// Scaling method for [`scale::ScaleFeatures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// `(x - mean) / std`.
    Standard,
    /// `(x - min) / (max - min)`.
    MinMax,
}

impl ScalingMethod {
    /// Stable machine name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::MinMax => "min_max",
        }
    }
}

/// User-selected parameters for one operator application.
///
/// Serialized with an `"operator"` tag, e.g.
/// `{"operator":"handle_missing","column":"age","strategy":"fill_mean"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum OperatorParams {
    DropColumns {
        columns: Vec<String>,
    },
    HandleMissing {
        column: String,
        strategy: MissingStrategy,
    },
    HandleOutliers {
        method: OutlierMethod,
        columns: Vec<String>,
    },
    DropDuplicates,
    EncodeCategorical {
        method: EncodingMethod,
        columns: Vec<String>,
    },
    ScaleFeatures {
        method: ScalingMethod,
        columns: Vec<String>,
    },
    ExtractDatetime {
        columns: Vec<String>,
    },
}

impl OperatorParams {
    /// The operator these parameters are meant for.
    pub fn kind(&self) -> OperatorKind {
        match self {
            Self::DropColumns { .. } => OperatorKind::DropColumns,
            Self::HandleMissing { .. } => OperatorKind::HandleMissing,
            Self::HandleOutliers { .. } => OperatorKind::HandleOutliers,
            Self::DropDuplicates => OperatorKind::DropDuplicates,
            Self::EncodeCategorical { .. } => OperatorKind::EncodeCategorical,
            Self::ScaleFeatures { .. } => OperatorKind::ScaleFeatures,
            Self::ExtractDatetime { .. } => OperatorKind::ExtractDatetime,
        }
    }

    /// Decode parameters submitted by a presentation layer.
    pub fn from_json(input: &str) -> CleaningResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub(crate) fn mismatch(&self, expected: OperatorKind) -> CleaningError {
        CleaningError::ParameterMismatch {
            operator: expected.name().to_string(),
            received: self.kind().name().to_string(),
        }
    }
}

/// Result of a successful operator application.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The new table.
    pub table: Table,
    /// Rows dropped by the operator (zero for column-wise operators).
    pub rows_removed: usize,
    /// Human-readable summary.
    pub message: String,
}

/// Parameter values an operator currently accepts for a given table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ParameterOptions {
    /// The operator takes no parameters.
    None,
    /// Any non-empty subset of `columns`, combined with one of `methods` (if any).
    Columns {
        columns: Vec<String>,
        methods: Vec<String>,
    },
    /// Exactly one column, with the methods valid for that column.
    PerColumn { choices: Vec<ColumnChoice> },
}

/// One selectable column and the methods valid for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChoice {
    /// Column name.
    pub column: String,
    /// Machine names of the methods valid for this column.
    pub methods: Vec<String>,
}

/// A cleaning operator.
pub trait Operator: Send + Sync {
    /// The operator's name.
    fn kind(&self) -> OperatorKind;

    /// Whether the operator can be offered for `table` at all.
    fn is_eligible(&self, table: &Table) -> bool;

    /// Parameter values that are currently valid for `table`.
    fn parameter_options(&self, table: &Table) -> ParameterOptions;

    /// Check `params` against `table` without computing the result.
    ///
    /// # Errors
    ///
    /// Returns the validation failure; callers must then leave their state unchanged.
    fn validate(&self, table: &Table, params: &OperatorParams) -> CleaningResult<()>;

    /// Build the transformed table.
    ///
    /// Implementations validate again, so `apply` alone is safe to call.
    fn apply(&self, table: &Table, params: &OperatorParams) -> CleaningResult<Applied>;
}

/// Tunables shared by the operator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorOptions {
    /// Rows with `|z| >= zscore_threshold` in any selected column are outliers.
    pub zscore_threshold: f64,
    /// Fence width, in IQRs, beyond the quartiles.
    pub iqr_multiplier: f64,
}

impl Default for OperatorOptions {
    fn default() -> Self {
        Self {
            zscore_threshold: 3.0,
            iqr_multiplier: 1.5,
        }
    }
}

/// Entry in the operator menu: an eligible operator and its current parameter options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    /// Operator to request.
    pub kind: OperatorKind,
    /// Human-readable label.
    pub label: &'static str,
    /// Parameters currently valid for the table.
    pub options: ParameterOptions,
}

/// Name → operator mapping.
pub struct OperatorRegistry {
    operators: Vec<Box<dyn Operator>>,
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.operators.iter().map(|o| o.kind()).collect::<Vec<_>>())
            .finish()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new(&OperatorOptions::default())
    }
}

impl OperatorRegistry {
    /// Registry holding all seven operators.
    pub fn new(options: &OperatorOptions) -> Self {
        Self {
            operators: vec![
                Box::new(drop_columns::DropColumns),
                Box::new(missing::HandleMissing),
                Box::new(outliers::HandleOutliers::new(
                    options.zscore_threshold,
                    options.iqr_multiplier,
                )),
                Box::new(duplicates::DropDuplicates),
                Box::new(encode::EncodeCategorical),
                Box::new(scale::ScaleFeatures),
                Box::new(datetime::ExtractDatetime),
            ],
        }
    }

    /// Look up an operator by machine name or label.
    pub fn get(&self, name: &str) -> CleaningResult<&dyn Operator> {
        let kind = name.parse::<OperatorKind>()?;
        self.by_kind(kind)
            .ok_or_else(|| CleaningError::UnknownOperator { name: name.to_string() })
    }

    /// Look up an operator by kind.
    pub fn by_kind(&self, kind: OperatorKind) -> Option<&dyn Operator> {
        self.operators
            .iter()
            .find(|o| o.kind() == kind)
            .map(|o| o.as_ref())
    }

    /// Iterate registered operators in menu order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Operator> {
        self.operators.iter().map(|o| o.as_ref())
    }

    /// Operators eligible for `table`, with their currently valid parameters.
    pub fn menu(&self, table: &Table) -> Vec<MenuEntry> {
        self.iter()
            .filter(|op| op.is_eligible(table))
            .map(|op| MenuEntry {
                kind: op.kind(),
                label: op.kind().label(),
                options: op.parameter_options(table),
            })
            .collect()
    }
}

/// Resolve a column selection to schema indexes, in the order given.
///
/// Repeated names are collapsed to their first occurrence.
pub(crate) fn resolve_columns(
    table: &Table,
    columns: &[String],
    operator: OperatorKind,
) -> CleaningResult<Vec<usize>> {
    if columns.is_empty() {
        return Err(CleaningError::EmptySelection {
            operator: operator.name().to_string(),
        });
    }
    let mut idxs = Vec::with_capacity(columns.len());
    for name in columns {
        let idx = table
            .schema
            .index_of(name)
            .ok_or_else(|| CleaningError::UnknownColumn { column: name.clone() })?;
        if !idxs.contains(&idx) {
            idxs.push(idx);
        }
    }
    Ok(idxs)
}

/// Fail with [`CleaningError::NonNumericColumn`] unless every column is numeric.
pub(crate) fn require_numeric(table: &Table, idxs: &[usize]) -> CleaningResult<()> {
    for &idx in idxs {
        let field = &table.schema.fields[idx];
        if !field.data_type.is_numeric() {
            return Err(CleaningError::NonNumericColumn {
                column: field.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        MissingStrategy, OperatorKind, OperatorOptions, OperatorParams, OperatorRegistry,
        ParameterOptions,
    };
    use crate::error::CleaningError;
    use crate::types::{DataType, Field, Schema, Table, Value};

    fn text_only_table() -> Table {
        Table::new(
            Schema::new(vec![Field::new("city", DataType::Utf8)]),
            vec![
                vec![Value::Utf8("Oslo".into())],
                vec![Value::Utf8("Rome".into())],
            ],
        )
    }

    #[test]
    fn kinds_parse_from_names_and_labels() {
        assert_eq!(
            "handle_outliers".parse::<OperatorKind>().unwrap(),
            OperatorKind::HandleOutliers
        );
        assert_eq!(
            "drop duplicates".parse::<OperatorKind>().unwrap(),
            OperatorKind::DropDuplicates
        );
        assert!(matches!(
            "explode".parse::<OperatorKind>(),
            Err(CleaningError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn params_decode_from_tagged_json() {
        let p = OperatorParams::from_json(
            r#"{"operator":"handle_missing","column":"age","strategy":"fill_mean"}"#,
        )
        .unwrap();
        assert_eq!(
            p,
            OperatorParams::HandleMissing {
                column: "age".into(),
                strategy: MissingStrategy::FillMean
            }
        );
        let p = OperatorParams::from_json(r#"{"operator":"drop_duplicates"}"#).unwrap();
        assert_eq!(p.kind(), OperatorKind::DropDuplicates);
        assert!(OperatorParams::from_json(r#"{"operator":"nope"}"#).is_err());
    }

    #[test]
    fn registry_holds_every_kind() {
        let registry = OperatorRegistry::new(&OperatorOptions::default());
        for kind in OperatorKind::ALL {
            assert_eq!(registry.by_kind(kind).unwrap().kind(), kind);
        }
        assert_eq!(
            registry.get("Handle Outliers").unwrap().kind(),
            OperatorKind::HandleOutliers
        );
    }

    #[test]
    fn menu_hides_operators_without_eligible_columns() {
        let registry = OperatorRegistry::default();
        let menu = registry.menu(&text_only_table());
        let kinds: Vec<OperatorKind> = menu.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperatorKind::DropColumns,
                OperatorKind::DropDuplicates,
                OperatorKind::EncodeCategorical
            ]
        );
        assert_eq!(menu[1].options, ParameterOptions::None);
    }

    #[test]
    fn wrong_params_are_rejected() {
        let registry = OperatorRegistry::default();
        let op = registry.by_kind(OperatorKind::DropColumns).unwrap();
        let err = op
            .validate(&text_only_table(), &OperatorParams::DropDuplicates)
            .unwrap_err();
        assert!(matches!(err, CleaningError::ParameterMismatch { .. }));
    }
}
