use serde::Serialize;
use thiserror::Error;

/// Convenience result type for loading and exporting tables.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for operators and session actions.
pub type CleaningResult<T> = Result<T, CleaningError>;

/// Error type returned when reading a table from, or writing it to, delimited text.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not conform to the provided schema (missing required columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Error type returned by cleaning operators and by [`crate::session::Session`].
///
/// Every variant except [`CleaningError::Ingestion`] is a local validation failure: the
/// requested action is rejected and the session is left untouched.
#[derive(Debug, Error)]
pub enum CleaningError {
    /// A referenced column does not exist in the current table.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// A numeric-only operator was pointed at a non-numeric column.
    #[error("column '{column}' is not numeric")]
    NonNumericColumn { column: String },

    /// A categorical-only operator was pointed at a non-text column.
    #[error("column '{column}' is not categorical")]
    NonCategoricalColumn { column: String },

    /// Datetime extraction was pointed at a column that is not (and cannot be detected as) datetime.
    #[error("column '{column}' is not a datetime column")]
    NonDatetimeColumn { column: String },

    /// The table has no numeric columns.
    #[error("table has no numeric columns")]
    NoNumericColumns,

    /// The table has no text/categorical columns.
    #[error("table has no categorical columns")]
    NoCategoricalColumns,

    /// The table has no datetime columns, even after detection.
    #[error("table has no datetime columns")]
    NoDatetimeColumns,

    /// The requested missing-data strategy does not apply to the column's kind.
    #[error("strategy '{strategy}' is not supported for column '{column}'")]
    UnsupportedStrategy { column: String, strategy: String },

    /// The column has nothing to impute.
    #[error("column '{column}' has no missing values")]
    NoMissingValues { column: String },

    /// A statistic needed by the operator is undefined for this column.
    #[error("column '{column}' is degenerate: {reason}")]
    DegenerateColumn { column: String, reason: String },

    /// An operator that needs at least one column was given none.
    #[error("operator '{operator}' requires at least one column")]
    EmptySelection { operator: String },

    /// An operator would produce a column whose name is already taken.
    #[error("column '{column}' already exists")]
    DuplicateColumn { column: String },

    /// No operator is registered under this name.
    #[error("unknown operator '{name}'")]
    UnknownOperator { name: String },

    /// Parameters were built for a different operator.
    #[error("operator '{operator}' received parameters for '{received}'")]
    ParameterMismatch { operator: String, received: String },

    /// Parameters could not be decoded.
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] serde_json::Error),

    /// Undo was requested with an empty history.
    #[error("nothing to undo")]
    EmptyHistory,

    /// An operator, undo or export was requested before any table was loaded.
    #[error("no table is loaded")]
    NoCurrentTable,

    /// Loading or exporting failed.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
}

/// Flat classification of [`CleaningError`], suitable for status events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownColumn,
    NonNumericColumn,
    NonCategoricalColumn,
    NonDatetimeColumn,
    NoNumericColumns,
    NoCategoricalColumns,
    NoDatetimeColumns,
    UnsupportedStrategy,
    NoMissingValues,
    DegenerateColumn,
    EmptySelection,
    DuplicateColumn,
    UnknownOperator,
    ParameterMismatch,
    InvalidParameters,
    EmptyHistory,
    NoCurrentTable,
    Ingestion,
}

impl CleaningError {
    /// Returns the flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownColumn { .. } => ErrorKind::UnknownColumn,
            Self::NonNumericColumn { .. } => ErrorKind::NonNumericColumn,
            Self::NonCategoricalColumn { .. } => ErrorKind::NonCategoricalColumn,
            Self::NonDatetimeColumn { .. } => ErrorKind::NonDatetimeColumn,
            Self::NoNumericColumns => ErrorKind::NoNumericColumns,
            Self::NoCategoricalColumns => ErrorKind::NoCategoricalColumns,
            Self::NoDatetimeColumns => ErrorKind::NoDatetimeColumns,
            Self::UnsupportedStrategy { .. } => ErrorKind::UnsupportedStrategy,
            Self::NoMissingValues { .. } => ErrorKind::NoMissingValues,
            Self::DegenerateColumn { .. } => ErrorKind::DegenerateColumn,
            Self::EmptySelection { .. } => ErrorKind::EmptySelection,
            Self::DuplicateColumn { .. } => ErrorKind::DuplicateColumn,
            Self::UnknownOperator { .. } => ErrorKind::UnknownOperator,
            Self::ParameterMismatch { .. } => ErrorKind::ParameterMismatch,
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::EmptyHistory => ErrorKind::EmptyHistory,
            Self::NoCurrentTable => ErrorKind::NoCurrentTable,
            Self::Ingestion(_) => ErrorKind::Ingestion,
        }
    }

    /// The column this error refers to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::UnknownColumn { column }
            | Self::NonNumericColumn { column }
            | Self::NonCategoricalColumn { column }
            | Self::NonDatetimeColumn { column }
            | Self::UnsupportedStrategy { column, .. }
            | Self::NoMissingValues { column }
            | Self::DegenerateColumn { column, .. }
            | Self::DuplicateColumn { column } => Some(column.as_str()),
            _ => None,
        }
    }
}
