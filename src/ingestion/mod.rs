//! Loading tables from delimited text.
//!
//! Most callers should use [`ingest_from_path`], which:
//!
//! - parses against [`IngestionOptions::schema`] when one is given
//! - otherwise infers column types from the data (see [`infer::infer_schema`])
//!
//! Cleaning sessions load through [`crate::session::Session::load_csv_path`], which wraps this
//! function and resets undo history.

pub mod csv;
pub mod infer;

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Schema, Table};

/// Options controlling how a source is loaded.
///
/// Use [`Default`] for common cases (comma delimiter, inferred types).
#[derive(Debug, Clone)]
pub struct IngestionOptions {
    /// If `None`, column types are inferred from the data.
    pub schema: Option<Schema>,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            schema: None,
            delimiter: b',',
        }
    }
}

/// Load a delimited text file into a [`Table`].
///
/// # Examples
///
/// ```no_run
/// use rust_data_cleaning::ingestion::{ingest_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), rust_data_cleaning::IngestionError> {
/// let table = ingest_from_path("people.csv", &IngestionOptions::default())?;
/// println!("rows={} cols={}", table.row_count(), table.column_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Table> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "empty source path".to_string(),
        });
    }

    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_path(path)?;

    match &options.schema {
        Some(schema) => csv::ingest_csv_from_reader(&mut rdr, schema),
        None => csv::ingest_csv_inferred_from_reader(&mut rdr),
    }
}
