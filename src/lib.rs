//! `catalog-ingest` bootstraps dataset metadata: point it at a remote file (HTTPS or SFTP) or
//! hand it an upload, and it proposes a [`types::SchemaDraft`] listing the file's field names.
//! Types and descriptions are left unset for a cataloger to curate.
//!
//! The primary entrypoints are [`ingestion::ingest_from_url`] and
//! [`ingestion::ingest_from_reader`].
//!
//! ## Pipeline
//!
//! 1. [`location::Location::resolve`] validates scheme, credentials and file type (no I/O)
//! 2. a [`transport::Retriever`] copies the remote bytes into a [`transport::RetrievedFile`]
//! 3. [`format::FormatKind::detect`] picks the extractor from the file name
//! 4. [`inference::infer`] discovers field names and assembles the draft
//!
//! Uploads skip steps 1 and 2.
//!
//! ## Supported inputs
//!
//! **Schemes:** `https` (anonymous) and `sftp` (username + password, host key checked against
//! `known_hosts` by default).
//!
//! **File formats (detected by extension, case-insensitive):**
//!
//! - **Delimited text**: `.csv`, header row is the first line
//! - **JSON**: `.json`, an array of objects; keys from every record, first-seen order
//! - **Spreadsheet** (requires the Cargo feature `excel`, on by default): `.xlsx`, first row of
//!   the first worksheet
//!
//! ## Quick example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use catalog_ingest::ingestion::{ingest_from_reader, IngestionOptions};
//!
//! # fn main() -> Result<(), catalog_ingest::IngestionError> {
//! let mut upload = Cursor::new(br#"[{"a":1,"b":2},{"a":3,"c":4}]"#.to_vec());
//! let draft = ingest_from_reader(&mut upload, "readings.json", &IngestionOptions::default())?;
//! assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every failure is an [`IngestionError`]. Input problems (`InvalidLocation`,
//! `UnsupportedScheme`, `MissingCredential`, `UnsupportedFileType`) are reported before any
//! network call; retrieval problems are [`IngestionError::Transport`]; parsing problems are
//! [`IngestionError::SchemaGeneration`] naming the format.
//!
//! ## Modules
//!
//! - [`location`]: location parsing and credential validation
//! - [`transport`]: HTTPS and SFTP retrieval into a scoped buffer
//! - [`format`]: file name to format detection
//! - [`inference`]: per-format field discovery
//! - [`ingestion`]: end-to-end entrypoints and observability
//! - [`types`]: schema draft data model
//! - [`error`]: error types

pub mod error;
pub mod format;
pub mod inference;
pub mod ingestion;
pub mod location;
pub mod transport;
pub mod types;

pub use error::{IngestionError, IngestionResult, SchemaError, TransportError};
