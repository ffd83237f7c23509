use thiserror::Error;

use crate::format::FormatKind;
use crate::location::Scheme;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by the ingestion pipeline.
///
/// The variants keep "could not reach/read the file" ([`IngestionError::Transport`]) apart from
/// "reached the file but could not infer structure from it" ([`IngestionError::SchemaGeneration`]).
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The location string is not a URL, or it has no host.
    #[error("invalid location '{raw}': {message}")]
    InvalidLocation { raw: String, message: String },

    /// The scheme is neither `https` nor `sftp`, or credentials were given for a non-`sftp` scheme.
    #[error("unsupported scheme '{scheme}': {reason}")]
    UnsupportedScheme { scheme: String, reason: &'static str },

    /// `sftp` was requested without a non-empty username or password.
    #[error("missing credential: {field} is required for sftp")]
    MissingCredential { field: &'static str },

    /// The declared file name does not end in `.csv`, `.json` or `.xlsx`.
    #[error("unsupported file type: '{name}' (expected .csv, .json or .xlsx)")]
    UnsupportedFileType { name: String },

    /// Connection, authentication or streaming failure on either transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The selected extractor could not turn the buffered bytes into field names.
    #[error("failed to generate schema from {format} file: {source}")]
    SchemaGeneration {
        format: FormatKind,
        #[source]
        source: SchemaError,
    },

    /// Local I/O error (e.g. an uploaded file could not be opened).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while retrieving a remote file.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client failed (DNS, connection refused, TLS, timeout, ...).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("http status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The body ended before the declared `Content-Length` was reached.
    #[error("truncated body: expected {expected} bytes, received {received}")]
    Truncated { expected: u64, received: u64 },

    /// TCP connection to the remote host failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "sftp")]
    /// SSH handshake failed.
    #[error("ssh handshake failed: {0}")]
    Handshake(#[source] ssh2::Error),

    /// The server host key could not be verified.
    #[error("host key verification failed for {host}: {reason}")]
    HostKey { host: String, reason: String },

    /// The server rejected the credential pair.
    #[error("authentication failed for user '{user}': {reason}")]
    Authentication { user: String, reason: String },

    /// The remote path does not exist on the server.
    #[error("remote file not found: {path}")]
    RemoteFileNotFound { path: String },

    #[cfg(feature = "sftp")]
    /// Any other SSH/SFTP protocol failure.
    #[error("sftp error: {0}")]
    Sftp(#[source] ssh2::Error),

    /// Reading the remote stream or writing the local buffer failed mid-copy.
    #[error("stream interrupted: {0}")]
    Stream(#[from] std::io::Error),

    /// The transfer was cancelled through a [`crate::transport::CancelFlag`].
    #[error("transfer cancelled after {received} bytes")]
    Cancelled { received: u64 },

    /// A retriever was handed a location of a scheme it does not serve.
    #[error("retriever for {expected} cannot fetch a {found} location")]
    SchemeMismatch { expected: Scheme, found: Scheme },

    /// An `sftp` location reached the transport without a credential pair.
    #[error("sftp location carries no credential")]
    NoCredential,

    /// SFTP support was compiled out.
    #[error("{scheme} retrieval not enabled (enable cargo feature '{feature}')")]
    FeatureDisabled {
        scheme: Scheme,
        feature: &'static str,
    },
}

/// Cause of a schema inference failure, wrapped in [`IngestionError::SchemaGeneration`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The buffer could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The header line could not be parsed or decoded.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The document is not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "excel")]
    /// The workbook is corrupt or not an `.xlsx` file.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::XlsxError),

    /// The content parsed but does not have the expected structure.
    #[error("{message}")]
    Shape { message: String },

    /// The declared file name maps to no extractor.
    #[error("unsupported file type")]
    UnsupportedFileType,

    /// The extractor for this format was compiled out.
    #[error("{format} inference not enabled (enable cargo feature '{feature}')")]
    FeatureDisabled {
        format: FormatKind,
        feature: &'static str,
    },
}

impl SchemaError {
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }
}
