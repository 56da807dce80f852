//! `rust-data-cleaning` is an interactive tabular-data cleaning engine: load a table, apply a
//! sequence of named cleaning operators, preview the result after each step, and undo the most
//! recent one.
//!
//! The primary entrypoint is [`session::Session`], which owns the current [`types::Table`] and a
//! snapshot-based undo history, routes operator requests through validation, and reports one
//! [`session::StatusEvent`] per call.
//!
//! ## Operators
//!
//! | name                 | effect                                                        |
//! |----------------------|---------------------------------------------------------------|
//! | `drop_columns`       | remove the selected columns                                   |
//! | `handle_missing`     | drop rows, or fill with mean / median / most frequent value   |
//! | `handle_outliers`    | remove rows by Z-score or IQR                                 |
//! | `drop_duplicates`    | remove repeated rows, keeping the first                       |
//! | `encode_categorical` | label, one-hot or dummy encoding of text columns              |
//! | `scale_features`     | standard or min-max scaling of numeric columns                |
//! | `extract_datetime`   | detect date columns and add `_year` / `_month` / `_day`       |
//!
//! Which operators are offered, and with which columns, depends on the current table; see
//! [`session::Session::operator_menu`].
//!
//! ## Schema + value types
//!
//! - [`types::DataType::Int64`] and [`types::DataType::Float64`] are numeric
//! - [`types::DataType::Utf8`] is categorical
//! - [`types::DataType::DateTime`] holds calendar dates
//! - [`types::DataType::Bool`]
//!
//! A cell is missing when it is [`types::Value::Null`] or a NaN float.
//!
//! ## Example
//!
//! ```rust
//! use rust_data_cleaning::ingestion::csv::ingest_csv_inferred_from_reader;
//! use rust_data_cleaning::operators::{MissingStrategy, OperatorParams};
//! use rust_data_cleaning::session::Session;
//! use rust_data_cleaning::types::Value;
//!
//! # fn main() -> Result<(), rust_data_cleaning::CleaningError> {
//! let data = "id,age\n1,20\n2,25\n3,\n4,40\n";
//! let mut rdr = csv::Reader::from_reader(data.as_bytes());
//! let table = ingest_csv_inferred_from_reader(&mut rdr)?;
//!
//! let mut session = Session::default();
//! session.load_new("inline", table);
//! session.apply(
//!     "handle_missing",
//!     &OperatorParams::HandleMissing {
//!         column: "age".to_string(),
//!         strategy: MissingStrategy::FillMedian,
//!     },
//! )?;
//! assert_eq!(session.current().unwrap().rows[2][1], Value::Float64(25.0));
//!
//! session.undo()?;
//! assert_eq!(session.current().unwrap().rows[2][1], Value::Null);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`session`]: the session controller, undo history, status events and observers
//! - [`operators`]: the operator trait, registry and the seven operators
//! - [`ingestion`]: CSV loading with a given or inferred schema
//! - [`export`]: CSV serialization of a table
//! - [`types`]: schema + in-memory table types
//! - [`stats`]: column reductions used by the operators
//! - [`temporal`]: calendar date parsing and formatting
//! - [`error`]: error types

pub mod error;
pub mod export;
pub mod ingestion;
pub mod operators;
pub mod session;
pub mod stats;
pub mod temporal;
pub mod types;

pub use error::{CleaningError, CleaningResult, ErrorKind, IngestionError, IngestionResult};
pub use session::{Session, SessionOptions};
