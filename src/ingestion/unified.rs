//! Unified ingestion entrypoints.
//!
//! Two paths converge on the same [`SchemaDraft`]:
//!
//! - [`ingest_from_url`]: resolve a location, retrieve it over HTTPS or SFTP, infer
//! - [`ingest_from_reader`] / [`ingest_from_path`]: infer directly from an upload
//!
//! If an [`IngestionObserver`] is configured, success/failure/alerts are reported to it.

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::error::{IngestionError, IngestionResult};
use crate::format::FormatKind;
use crate::inference::{InferenceOptions, infer_with_options};
use crate::location::{Credential, Location};
use crate::transport::{Retriever, SchemeRetriever, TransportOptions};
use crate::types::SchemaDraft;

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, Stage};

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Timeouts, chunking, spooling and host key policy for retrieval.
    pub transport: TransportOptions,
    /// Extractor options.
    pub inference: InferenceOptions,
    /// Replaces the scheme-dispatching retriever (e.g. with a stub in tests).
    pub retriever: Option<Arc<dyn Retriever>>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("transport", &self.transport)
            .field("inference", &self.inference)
            .field("retriever_set", &self.retriever.is_some())
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            transport: TransportOptions::default(),
            inference: InferenceOptions::default(),
            retriever: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Resolve `raw_url`, retrieve the file, and infer a schema draft from it.
///
/// Validation (scheme, credential, file type) fails before any network call. The retrieved
/// buffer is released before this function returns, whatever the outcome.
///
/// # Examples
///
/// ```no_run
/// use catalog_ingest::ingestion::{ingest_from_url, IngestionOptions};
/// use catalog_ingest::location::Credential;
///
/// # fn main() -> Result<(), catalog_ingest::IngestionError> {
/// let draft = ingest_from_url(
///     "https://data.example.org/exports/bike_counts.csv",
///     None,
///     &IngestionOptions::default(),
/// )?;
/// println!("{}", draft.len());
///
/// let draft = ingest_from_url(
///     "sftp://files.example.org/outgoing/permits.xlsx",
///     Some(Credential::new("catalog", "s3cret")),
///     &IngestionOptions::default(),
/// )?;
/// println!("{:?}", draft.field_names().collect::<Vec<_>>());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_url(
    raw_url: &str,
    credential: Option<Credential>,
    options: &IngestionOptions,
) -> IngestionResult<SchemaDraft> {
    let mut ctx = IngestionContext {
        source: describe_raw(raw_url),
        format: FormatKind::Unsupported,
        stage: Stage::Resolve,
    };
    let result = ingest_remote(raw_url, credential, options, &mut ctx);
    report(options, &ctx, &result);
    result.map(|(draft, _)| draft)
}

fn ingest_remote(
    raw_url: &str,
    credential: Option<Credential>,
    options: &IngestionOptions,
    ctx: &mut IngestionContext,
) -> IngestionResult<(SchemaDraft, Option<u64>)> {
    let location = Location::resolve(raw_url, credential)?;
    ctx.source = location.to_string();
    ctx.format = location.format();

    ctx.stage = Stage::Retrieve;
    let mut file = match options.retriever.as_ref() {
        Some(retriever) => retriever.retrieve(&location)?,
        None => SchemeRetriever::new(options.transport.clone()).retrieve(&location)?,
    };

    ctx.stage = Stage::Infer;
    let draft = infer_with_options(&mut file, location.file_name(), &options.inference)?;
    Ok((draft, Some(file.len())))
}

/// Infer a schema draft from an already-open byte source, e.g. an upload.
///
/// `file_name` selects the extractor; the reader is not touched for unsupported names.
pub fn ingest_from_reader<R: Read + Seek>(
    reader: &mut R,
    file_name: &str,
    options: &IngestionOptions,
) -> IngestionResult<SchemaDraft> {
    let ctx = IngestionContext {
        source: file_name.to_string(),
        format: FormatKind::detect(file_name),
        stage: Stage::Infer,
    };
    let result = infer_with_options(reader, file_name, &options.inference).map(|draft| (draft, None));
    report(options, &ctx, &result);
    result.map(|(draft, _)| draft)
}

/// Infer a schema draft from a local file; the file name comes from the path.
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<SchemaDraft> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut ctx = IngestionContext {
        source: path.display().to_string(),
        format: FormatKind::detect(&file_name),
        stage: Stage::Retrieve,
    };

    let result = File::open(path).map_err(IngestionError::from).and_then(|mut file| {
        ctx.stage = Stage::Infer;
        let len = file.metadata().map(|m| m.len()).ok();
        infer_with_options(&mut file, &file_name, &options.inference).map(|draft| (draft, len))
    });
    report(options, &ctx, &result);
    result.map(|(draft, _)| draft)
}

fn report(
    options: &IngestionOptions,
    ctx: &IngestionContext,
    result: &IngestionResult<(SchemaDraft, Option<u64>)>,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok((draft, bytes)) => obs.on_success(
            ctx,
            IngestionStats {
                fields: draft.len(),
                bytes: *bytes,
            },
        ),
        Err(e) => {
            let sev = IngestionSeverity::of(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// Location text safe to log: userinfo is removed when the string parses as a URL.
fn describe_raw(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(mut url) => {
            let _ = url.set_password(None);
            let _ = url.set_username("");
            url.to_string()
        }
        Err(_) => raw.trim().to_string(),
    }
}

/// Where an [`IngestionRequest`] reads from.
#[derive(Debug, Clone)]
pub enum IngestionSource {
    /// A remote location plus optional credential.
    Remote {
        url: String,
        credential: Option<Credential>,
    },
    /// A file on local disk.
    Path(PathBuf),
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue ingestion work in a job system.
#[derive(Clone)]
pub struct IngestionRequest {
    /// What to ingest.
    pub source: IngestionSource,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            IngestionSource::Remote { url, credential } => {
                format!("remote({}, credential={})", describe_raw(url), credential.is_some())
            }
            IngestionSource::Path(p) => format!("path({})", p.display()),
        };
        f.debug_struct("IngestionRequest")
            .field("source", &source)
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// Execute the request.
    pub fn run(&self) -> IngestionResult<SchemaDraft> {
        match &self.source {
            IngestionSource::Remote { url, credential } => {
                ingest_from_url(url, credential.clone(), &self.options)
            }
            IngestionSource::Path(path) => ingest_from_path(path, &self.options),
        }
    }
}
