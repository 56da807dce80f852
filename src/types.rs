//! Core data model: the in-memory [`Table`] under edit.
//!
//! A table is an ordered list of typed [`Field`]s (its [`Schema`]) plus row-major [`Value`]
//! storage. Tables own all of their storage, so `clone()` is a value-independent snapshot.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string (text / categorical).
    Utf8,
    /// Calendar date and time without a time zone.
    DateTime,
}

impl DataType {
    /// `Int64` or `Float64`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Text columns are the categorical kind.
    pub fn is_categorical(self) -> bool {
        matches!(self, Self::Utf8)
    }

    /// Calendar date/time columns.
    pub fn is_datetime(self) -> bool {
        matches!(self, Self::DateTime)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing a table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed cell in a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date and time.
    DateTime(NaiveDateTime),
}

/// Hashable image of a [`Value`], used where cells must be compared for exact equality.
///
/// Floats compare by bit pattern after folding `-0.0` into `0.0` and every NaN into one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Int64(i64),
    Float64(u64),
    Bool(bool),
    Utf8(String),
    DateTime(NaiveDateTime),
}

impl Value {
    /// `true` for [`Value::Null`] and for a NaN float.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value, if it is a non-missing number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Calendar view of the value, if it is a datetime.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Hashable key for exact-equality grouping.
    pub fn key(&self) -> ValueKey {
        match self {
            Self::Null => ValueKey::Null,
            Self::Int64(v) => ValueKey::Int64(*v),
            Self::Float64(v) if v.is_nan() => ValueKey::Null,
            Self::Float64(v) => ValueKey::Float64(if *v == 0.0 { 0 } else { v.to_bits() }),
            Self::Bool(v) => ValueKey::Bool(*v),
            Self::Utf8(s) => ValueKey::Utf8(s.clone()),
            Self::DateTime(dt) => ValueKey::DateTime(*dt),
        }
    }

    /// Total order over values: missing first, then booleans, numbers, text and datetimes.
    ///
    /// Integers and floats compare numerically.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                _ if v.is_missing() => 0,
                Value::Bool(_) => 1,
                Value::Int64(_) | Value::Float64(_) => 2,
                Value::Utf8(_) => 3,
                Value::DateTime(_) => 4,
                Value::Null => 0,
            }
        }

        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::Utf8(a), Self::Utf8(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => rank(a).cmp(&rank(b)),
            },
        }
    }

    /// Text rendering used for generated column names and previews.
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int64(v) => v.to_string(),
            Self::Float64(v) => crate::export::format_float(*v),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Utf8(s) => s.clone(),
            Self::DateTime(dt) => crate::temporal::format_datetime(*dt, false),
        }
    }
}

/// In-memory table under edit.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields. Operators
/// never mutate a table in place; they build a new one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the table.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Iterate the cells of column `idx`, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    /// Number of missing cells in column `idx`.
    pub fn missing_count(&self, idx: usize) -> usize {
        self.column_values(idx).filter(|v| v.is_missing()).count()
    }

    /// Names of numeric columns, in schema order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_where(|f| f.data_type.is_numeric())
    }

    /// Names of text/categorical columns, in schema order.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_where(|f| f.data_type.is_categorical())
    }

    /// Names of datetime columns, in schema order.
    pub fn datetime_columns(&self) -> Vec<String> {
        self.columns_where(|f| f.data_type.is_datetime())
    }

    /// Names of columns holding at least one missing cell, in schema order.
    pub fn columns_with_missing(&self) -> Vec<String> {
        self.schema
            .fields
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.column_values(*idx).any(Value::is_missing))
            .map(|(_, f)| f.name.clone())
            .collect()
    }

    fn columns_where(&self, pred: impl Fn(&Field) -> bool) -> Vec<String> {
        self.schema
            .fields
            .iter()
            .filter(|f| pred(f))
            .map(|f| f.name.clone())
            .collect()
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Create a new table containing only rows that match `predicate`.
    ///
    /// The returned table preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Keep rows whose position has `true` in `mask`.
    ///
    /// Rows beyond the end of `mask` are dropped.
    pub fn retain_mask(&self, mask: &[bool]) -> Self {
        let rows = self
            .rows
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new table by replacing column `idx` with `values` and type `data_type`.
    ///
    /// `values` must hold one cell per row; extra values are ignored.
    pub fn replace_column(&self, idx: usize, data_type: DataType, values: Vec<Value>) -> Self {
        debug_assert_eq!(values.len(), self.row_count());
        let mut out = self.clone();
        out.schema.fields[idx].data_type = data_type;
        for (row, value) in out.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        out
    }
}
