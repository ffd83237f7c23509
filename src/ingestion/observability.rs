use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestionError;
use crate::format::FormatKind;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Rejected input (bad location, scheme, credential or file type).
    Warning,
    /// The file was read but no schema could be inferred from it.
    Error,
    /// Transport or local I/O failure.
    Critical,
}

impl IngestionSeverity {
    /// Classify an ingestion error.
    pub fn of(error: &IngestionError) -> Self {
        match error {
            IngestionError::InvalidLocation { .. }
            | IngestionError::UnsupportedScheme { .. }
            | IngestionError::MissingCredential { .. }
            | IngestionError::UnsupportedFileType { .. } => Self::Warning,
            IngestionError::SchemaGeneration { .. } => Self::Error,
            IngestionError::Transport(_) | IngestionError::Io(_) => Self::Critical,
        }
    }
}

/// Pipeline step an outcome was reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Parsing and validating the location.
    Resolve,
    /// Transferring or opening the file.
    Retrieve,
    /// Running the format extractor.
    Infer,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Location (without credentials) or declared file name.
    pub source: String,
    /// Format implied by the file name; `Unsupported` until it is known.
    pub format: FormatKind,
    /// Last stage reached.
    pub stage: Stage,
}

/// Minimal stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of discovered fields.
    pub fields: usize,
    /// Bytes retrieved, when the pipeline buffered the file itself.
    pub bytes: Option<u64>,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
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

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[ingest][ok] format={} source={} fields={} bytes={}",
            ctx.format,
            ctx.source,
            stats.fields,
            bytes_label(stats.bytes)
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!(
            "[ingest][{:?}] stage={:?} format={} source={} err={}",
            severity, ctx.stage, ctx.format, ctx.source, error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!(
            "[ALERT][ingest][{:?}] stage={:?} format={} source={} err={}",
            severity, ctx.stage, ctx.format, ctx.source, error
        );
    }
}

/// Forwards ingestion events to `tracing`, for hosts that install a subscriber.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            format = %ctx.format,
            source = %ctx.source,
            fields = stats.fields,
            bytes = ?stats.bytes,
            "schema draft inferred"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(
            ?severity,
            stage = ?ctx.stage,
            format = %ctx.format,
            source = %ctx.source,
            error = %error,
            "ingestion failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            ?severity,
            stage = ?ctx.stage,
            format = %ctx.format,
            source = %ctx.source,
            error = %error,
            "ingestion alert"
        );
    }
}

/// Appends ingestion events to a local log file.
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

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!(
            "{} ok format={} source={} fields={} bytes={}",
            unix_ts(),
            ctx.format,
            ctx.source,
            stats.fields,
            bytes_label(stats.bytes)
        ));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!(
            "{} fail severity={:?} stage={:?} format={} source={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            ctx.format,
            ctx.source,
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} stage={:?} format={} source={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            ctx.format,
            ctx.source,
            error
        ));
    }
}

fn bytes_label(bytes: Option<u64>) -> String {
    bytes.map_or_else(|| "-".to_string(), |b| b.to_string())
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
