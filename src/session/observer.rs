use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::{CleaningError, ErrorKind};
use crate::operators::OperatorKind;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational event (e.g. undo with nothing to undo).
    Info,
    /// A request was rejected by validation; the session is unchanged.
    Warning,
    /// The request could not be attempted (e.g. no table loaded).
    Error,
    /// I/O failure while loading or exporting.
    Critical,
}

/// Which session entrypoint produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    /// One of the `load_*` calls.
    Load,
    /// `apply` or `apply_json`.
    Apply,
    /// `undo`.
    Undo,
}

/// Context about a session call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Entrypoint that was called.
    pub action: SessionAction,
    /// Operator requested by an `apply` call.
    pub operator: Option<OperatorKind>,
    /// Source token of the table being edited (or being loaded).
    pub source: Option<String>,
}

/// Outcome of one `apply`, `undo` or load call, for the presentation layer to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusEvent {
    Success {
        action: SessionAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        operator: Option<OperatorKind>,
        message: String,
        rows: usize,
        columns: usize,
    },
    Failure {
        action: SessionAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        operator: Option<OperatorKind>,
        kind: ErrorKind,
        severity: Severity,
        #[serde(skip_serializing_if = "Option::is_none")]
        column: Option<String>,
        message: String,
    },
}

impl StatusEvent {
    pub(crate) fn failure(ctx: &SessionContext, severity: Severity, error: &CleaningError) -> Self {
        Self::Failure {
            action: ctx.action,
            operator: ctx.operator,
            kind: error.kind(),
            severity,
            column: error.column().map(str::to_string),
            message: error.to_string(),
        }
    }

    /// `true` for [`StatusEvent::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Human-readable summary.
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    /// JSON rendering, e.g. `{"status":"failure","action":"undo","kind":"empty_history",...}`.
    pub fn to_json(&self) -> String {
        // Plain strings, numbers and unit enums only; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Observer interface for session outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait SessionObserver: Send + Sync {
    /// Called when a session call succeeds.
    fn on_success(&self, _ctx: &SessionContext, _event: &StatusEvent) {}

    /// Called when a session call fails.
    fn on_failure(&self, _ctx: &SessionContext, _severity: Severity, _error: &CleaningError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &SessionContext, severity: Severity, error: &CleaningError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn SessionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl SessionObserver for CompositeObserver {
    fn on_success(&self, ctx: &SessionContext, event: &StatusEvent) {
        for o in &self.observers {
            o.on_success(ctx, event);
        }
    }

    fn on_failure(&self, ctx: &SessionContext, severity: Severity, error: &CleaningError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &SessionContext, severity: Severity, error: &CleaningError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

fn describe(ctx: &SessionContext) -> String {
    let mut out = format!("action={:?}", ctx.action);
    if let Some(op) = ctx.operator {
        out.push_str(&format!(" operator={op}"));
    }
    if let Some(source) = &ctx.source {
        out.push_str(&format!(" source={source}"));
    }
    out
}

/// Logs session events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl SessionObserver for StdErrObserver {
    fn on_success(&self, ctx: &SessionContext, event: &StatusEvent) {
        eprintln!("[session][ok] {} msg={}", describe(ctx), event.message());
    }

    fn on_failure(&self, ctx: &SessionContext, severity: Severity, error: &CleaningError) {
        eprintln!("[session][{severity:?}] {} err={error}", describe(ctx));
    }

    fn on_alert(&self, ctx: &SessionContext, severity: Severity, error: &CleaningError) {
        eprintln!("[ALERT][session][{severity:?}] {} err={error}", describe(ctx));
    }
}

/// Appends session events to a local log file, one JSON status event per line.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl SessionObserver for FileObserver {
    fn on_success(&self, _ctx: &SessionContext, event: &StatusEvent) {
        self.append_line(&format!("{} {}", unix_ts(), event.to_json()));
    }

    fn on_failure(&self, ctx: &SessionContext, severity: Severity, error: &CleaningError) {
        let event = StatusEvent::failure(ctx, severity, error);
        self.append_line(&format!("{} {}", unix_ts(), event.to_json()));
    }

    fn on_alert(&self, ctx: &SessionContext, severity: Severity, error: &CleaningError) {
        let event = StatusEvent::failure(ctx, severity, error);
        self.append_line(&format!("{} ALERT {}", unix_ts(), event.to_json()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{
        CompositeObserver, FileObserver, SessionAction, SessionContext, SessionObserver, Severity,
        StatusEvent, StdErrObserver,
    };
    use crate::error::CleaningError;

    #[derive(Default)]
    struct Counter {
        calls: Mutex<usize>,
    }

    impl SessionObserver for Counter {
        fn on_failure(&self, _ctx: &SessionContext, _severity: Severity, _error: &CleaningError) {
            *self.calls.lock().unwrap() += 1;
        }
    }

    fn undo_ctx() -> SessionContext {
        SessionContext {
            action: SessionAction::Undo,
            operator: None,
            source: None,
        }
    }

    #[test]
    fn failure_event_serializes_kind_and_severity() {
        let event = StatusEvent::failure(&undo_ctx(), Severity::Info, &CleaningError::EmptyHistory);
        assert!(!event.is_success());
        assert_eq!(
            event.to_json(),
            r#"{"status":"failure","action":"undo","kind":"empty_history","severity":"info","message":"nothing to undo"}"#
        );
    }

    #[test]
    fn severities_are_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn file_observer_appends_one_line_per_event() {
        let path = std::env::temp_dir().join(format!(
            "rust_data_cleaning_observer_{}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let obs = FileObserver::new(&path);
        obs.on_failure(&undo_ctx(), Severity::Info, &CleaningError::EmptyHistory);
        obs.on_alert(&undo_ctx(), Severity::Info, &CleaningError::EmptyHistory);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""kind":"empty_history""#));
        assert!(lines[1].contains("ALERT"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn composite_fans_out_and_alert_defaults_to_failure() {
        let counter = Arc::new(Counter::default());
        let observers: Vec<Arc<dyn SessionObserver>> =
            vec![counter.clone(), Arc::new(StdErrObserver), counter.clone()];
        let composite = CompositeObserver::new(observers);
        composite.on_failure(&undo_ctx(), Severity::Info, &CleaningError::EmptyHistory);
        composite.on_alert(&undo_ctx(), Severity::Info, &CleaningError::EmptyHistory);
        assert_eq!(*counter.calls.lock().unwrap(), 4);
    }
}
