//! The session controller: current table, undo history, and status reporting.
//!
//! A [`Session`] is the only place where the current table changes. Every mutation goes through
//! one of:
//!
//! - [`Session::load_new`] / [`Session::load_if_new`] / [`Session::load_csv_path`]: install a
//!   freshly loaded table and clear the history
//! - [`Session::apply`]: promote detectable datetime columns on a working copy, run the
//!   operator on it, then push the previous table onto the history and install the result
//! - [`Session::undo`]: reinstate the most recent snapshot
//!
//! Each of those calls records exactly one [`StatusEvent`] (see [`Session::last_status`]) and
//! reports it to the configured [`SessionObserver`]. A rejected request leaves both the table
//! and the history untouched.
//!
//! ```rust
//! use rust_data_cleaning::operators::OperatorParams;
//! use rust_data_cleaning::session::{Session, SessionOptions};
//! use rust_data_cleaning::types::{DataType, Field, Schema, Table, Value};
//!
//! let table = Table::new(
//!     Schema::new(vec![Field::new("id", DataType::Int64)]),
//!     vec![vec![Value::Int64(1)], vec![Value::Int64(1)]],
//! );
//! let mut session = Session::new(SessionOptions::default());
//! session.load_new("inline", table.clone());
//! session.apply("drop_duplicates", &OperatorParams::DropDuplicates).unwrap();
//! assert_eq!(session.current().unwrap().row_count(), 1);
//! session.undo().unwrap();
//! assert_eq!(session.current(), Some(&table));
//! ```

pub mod history;
pub mod observer;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CleaningError, CleaningResult, IngestionError, IngestionResult};
use crate::export;
use crate::ingestion::{ingest_from_path, IngestionOptions};
use crate::operators::datetime::promote_datetime_columns;
use crate::operators::{MenuEntry, OperatorOptions, OperatorParams, OperatorRegistry};
use crate::types::Table;

pub use history::HistoryStack;
pub use observer::{
    CompositeObserver, FileObserver, SessionAction, SessionContext, SessionObserver, Severity,
    StatusEvent, StdErrObserver,
};

/// Options controlling a [`Session`].
///
/// Use [`Default`] for common cases (no observer, default operator thresholds).
#[derive(Clone)]
pub struct SessionOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn SessionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
    /// Tunables passed to the operator set.
    pub operators: OperatorOptions,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("operators", &self.operators)
            .finish()
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: Severity::Critical,
            operators: OperatorOptions::default(),
        }
    }
}

/// Owns the current table and its undo history.
pub struct Session {
    current: Option<Table>,
    source: Option<String>,
    history: HistoryStack,
    registry: OperatorRegistry,
    observer: Option<Arc<dyn SessionObserver>>,
    alert_at_or_above: Severity,
    last_status: Option<StatusEvent>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("source", &self.source)
            .field(
                "shape",
                &self.current.as_ref().map(|t| (t.row_count(), t.column_count())),
            )
            .field("history_depth", &self.history.len())
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    /// An empty session: no table, no history.
    pub fn new(options: SessionOptions) -> Self {
        Self {
            current: None,
            source: None,
            history: HistoryStack::new(),
            registry: OperatorRegistry::new(&options.operators),
            observer: options.observer,
            alert_at_or_above: options.alert_at_or_above,
            last_status: None,
        }
    }

    /// The table under edit, if one has been loaded.
    pub fn current(&self) -> Option<&Table> {
        self.current.as_ref()
    }

    /// Token identifying the loaded source.
    pub fn source_token(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Number of applications that can be undone.
    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    /// `true` when [`Session::undo`] would succeed.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// The event recorded by the most recent `apply`, `undo` or load call.
    pub fn last_status(&self) -> Option<&StatusEvent> {
        self.last_status.as_ref()
    }

    /// The operators this session dispatches to.
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Replace the current table and clear the history, unconditionally.
    pub fn load_new(&mut self, token: impl Into<String>, table: Table) -> StatusEvent {
        let token = token.into();
        let message = format!(
            "Loaded '{token}' with {} row(s) and {} column(s)",
            table.row_count(),
            table.column_count()
        );
        self.current = Some(table);
        self.source = Some(token);
        self.history.clear();
        let ctx = self.context(SessionAction::Load, None);
        self.succeed(&ctx, message)
    }

    /// Load from `loader` only if `token` differs from the current source token.
    ///
    /// Returns `Ok(None)` without calling `loader` (and without recording an event) when the
    /// token matches the loaded source.
    ///
    /// # Errors
    ///
    /// A loader failure is returned as [`CleaningError::Ingestion`]; the session is unchanged.
    pub fn load_if_new<F>(&mut self, token: &str, loader: F) -> CleaningResult<Option<StatusEvent>>
    where
        F: FnOnce() -> IngestionResult<Table>,
    {
        if self.current.is_some() && self.source.as_deref() == Some(token) {
            return Ok(None);
        }
        match loader() {
            Ok(table) => Ok(Some(self.load_new(token, table))),
            Err(e) => {
                let ctx = SessionContext {
                    action: SessionAction::Load,
                    operator: None,
                    source: Some(token.to_string()),
                };
                Err(self.fail(&ctx, e.into()))
            }
        }
    }

    /// Load a CSV file, using its path as the source token.
    ///
    /// # Errors
    ///
    /// Load failures are returned as [`CleaningError::Ingestion`]; the session is unchanged.
    pub fn load_csv_path(
        &mut self,
        path: impl AsRef<Path>,
        options: &IngestionOptions,
    ) -> CleaningResult<StatusEvent> {
        let path = path.as_ref();
        let token = path.display().to_string();
        match ingest_from_path(path, options) {
            Ok(table) => Ok(self.load_new(token, table)),
            Err(e) => {
                let ctx = SessionContext {
                    action: SessionAction::Load,
                    operator: None,
                    source: Some(token),
                };
                Err(self.fail(&ctx, e.into()))
            }
        }
    }

    /// Apply the operator registered as `name` to the current table.
    ///
    /// # Errors
    ///
    /// - [`CleaningError::NoCurrentTable`] before any load
    /// - [`CleaningError::UnknownOperator`] for an unregistered name
    /// - any validation failure of the operator itself
    ///
    /// Text columns whose values all parse as dates are promoted to datetime as part of the
    /// application, whichever operator it is. On error the current table and the history are
    /// unchanged, promotion included.
    pub fn apply(&mut self, name: &str, params: &OperatorParams) -> CleaningResult<StatusEvent> {
        let ctx = self.context(SessionAction::Apply, Some(name));
        let result = self.try_apply(name, params);
        self.finish(&ctx, result)
    }

    /// Like [`Session::apply`], with parameters submitted as JSON.
    pub fn apply_json(&mut self, name: &str, params: &str) -> CleaningResult<StatusEvent> {
        let ctx = self.context(SessionAction::Apply, Some(name));
        let result = OperatorParams::from_json(params).and_then(|p| self.try_apply(name, &p));
        self.finish(&ctx, result)
    }

    fn try_apply(&mut self, name: &str, params: &OperatorParams) -> CleaningResult<String> {
        let table = self.current.as_ref().ok_or(CleaningError::NoCurrentTable)?;
        let op = self.registry.get(name)?;
        let (applied, detected) = {
            let (working, detected) = promote_datetime_columns(table);
            (op.apply(&working, params)?, detected)
        };

        // The result owns its storage; the previous table moves into the history unchanged.
        if let Some(previous) = self.current.replace(applied.table) {
            self.history.push(previous);
        }
        let mut message = applied.message;
        if !detected.is_empty() {
            message.push_str(&format!(" (detected datetime: {})", detected.join(", ")));
        }
        Ok(message)
    }

    /// Reinstate the table as it was before the most recent application.
    ///
    /// # Errors
    ///
    /// [`CleaningError::EmptyHistory`] if there is nothing to undo (including before any load).
    pub fn undo(&mut self) -> CleaningResult<StatusEvent> {
        let ctx = self.context(SessionAction::Undo, None);
        let result = match self.history.pop() {
            Some(previous) => {
                self.current = Some(previous);
                Ok(format!(
                    "Undid last operation ({} step(s) left to undo)",
                    self.history.len()
                ))
            }
            None => Err(CleaningError::EmptyHistory),
        };
        self.finish(&ctx, result)
    }

    /// Eligible operators for the current table, with their currently valid parameters.
    ///
    /// Computed against the table as the next application will see it, with detectable
    /// datetime columns already promoted. The current table is not modified.
    pub fn operator_menu(&self) -> CleaningResult<Vec<MenuEntry>> {
        let table = self.current.as_ref().ok_or(CleaningError::NoCurrentTable)?;
        let (view, _) = promote_datetime_columns(table);
        Ok(self.registry.menu(&view))
    }

    /// First `n` rows of the current table.
    pub fn preview(&self, n: usize) -> CleaningResult<Table> {
        let table = self.current.as_ref().ok_or(CleaningError::NoCurrentTable)?;
        Ok(table.head(n))
    }

    /// The current table as CSV text.
    pub fn export_csv(&self) -> CleaningResult<String> {
        let table = self.current.as_ref().ok_or(CleaningError::NoCurrentTable)?;
        Ok(export::to_csv_string(table)?)
    }

    fn context(&self, action: SessionAction, operator: Option<&str>) -> SessionContext {
        SessionContext {
            action,
            operator: operator.and_then(|name| name.parse().ok()),
            source: self.source.clone(),
        }
    }

    fn finish(
        &mut self,
        ctx: &SessionContext,
        result: CleaningResult<String>,
    ) -> CleaningResult<StatusEvent> {
        match result {
            Ok(message) => Ok(self.succeed(ctx, message)),
            Err(error) => Err(self.fail(ctx, error)),
        }
    }

    fn succeed(&mut self, ctx: &SessionContext, message: String) -> StatusEvent {
        let (rows, columns) = self
            .current
            .as_ref()
            .map_or((0, 0), |t| (t.row_count(), t.column_count()));
        let event = StatusEvent::Success {
            action: ctx.action,
            operator: ctx.operator,
            message,
            rows,
            columns,
        };
        if let Some(obs) = &self.observer {
            obs.on_success(ctx, &event);
        }
        self.last_status = Some(event.clone());
        event
    }

    fn fail(&mut self, ctx: &SessionContext, error: CleaningError) -> CleaningError {
        let severity = severity_for_error(&error);
        if let Some(obs) = &self.observer {
            obs.on_failure(ctx, severity, &error);
            if severity >= self.alert_at_or_above {
                obs.on_alert(ctx, severity, &error);
            }
        }
        self.last_status = Some(StatusEvent::failure(ctx, severity, &error));
        error
    }
}

/// Severity assigned to a failed session call.
pub fn severity_for_error(e: &CleaningError) -> Severity {
    match e {
        CleaningError::EmptyHistory => Severity::Info,
        CleaningError::NoCurrentTable => Severity::Error,
        CleaningError::Ingestion(IngestionError::Io(_)) => Severity::Critical,
        CleaningError::Ingestion(IngestionError::Csv(err)) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        CleaningError::Ingestion(_) => Severity::Error,
        _ => Severity::Warning,
    }
}
