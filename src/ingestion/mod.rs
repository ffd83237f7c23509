//! Ingestion entrypoints.
//!
//! Most callers should use [`ingest_from_url`] or [`ingest_from_reader`] (from [`unified`]),
//! which:
//!
//! - validate the location or file name before any I/O
//! - retrieve remote files through a [`crate::transport::Retriever`]
//! - infer a [`crate::types::SchemaDraft`] with [`crate::inference`]
//! - optionally report success/failure/alerts to an [`IngestionObserver`]

pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    Stage, StdErrObserver, TracingObserver,
};
pub use unified::{
    IngestionOptions, IngestionRequest, IngestionSource, ingest_from_path, ingest_from_reader, ingest_from_url,
};
