//! Retrieval of remote files into a [`RetrievedFile`] buffer.
//!
//! Every transport implements [`Retriever`] and honours the same contract:
//!
//! - one connection/session per call, closed on every exit path
//! - on success, a buffer positioned at offset zero holding exactly the remote bytes
//! - on failure, a typed [`TransportError`]; never an empty "success"
//!
//! [`SchemeRetriever`] picks the transport from [`Location::scheme`].

pub mod buffer;
pub mod https;
#[cfg(feature = "sftp")]
pub mod sftp;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::TransportError;
use crate::location::{Location, Scheme};

pub use buffer::RetrievedFile;
pub use https::HttpsRetriever;
#[cfg(feature = "sftp")]
pub use sftp::SftpRetriever;

/// Bytes copied per read from the remote stream.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Bytes kept in memory before a [`RetrievedFile`] spills to disk.
pub const DEFAULT_SPOOL_THRESHOLD: usize = 8 * 1024 * 1024;

/// Port used for `sftp` locations without an explicit port.
pub const DEFAULT_SFTP_PORT: u16 = 22;

/// Fetches the bytes behind a resolved [`Location`].
pub trait Retriever: Send + Sync {
    fn retrieve(&self, location: &Location) -> Result<RetrievedFile, TransportError>;
}

/// Cooperative cancellation handle, checked between chunks.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask in-flight transfers using this flag to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How an SFTP server's host key is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Require a matching entry in an OpenSSH `known_hosts` file.
    ///
    /// `None` reads `$HOME/.ssh/known_hosts`.
    KnownHosts(Option<PathBuf>),
    /// Accept any host key without verification.
    ///
    /// Insecure: the server's identity is not checked. A warning is logged on every connection.
    AcceptAny,
}

impl Default for HostKeyPolicy {
    fn default() -> Self {
        Self::KnownHosts(None)
    }
}

/// Options shared by all transports.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Upper bound for establishing a TCP connection.
    pub connect_timeout: Duration,
    /// Upper bound for a single read (HTTPS: the whole request) before the transfer fails.
    pub read_timeout: Duration,
    /// Bytes copied per read.
    pub chunk_size: usize,
    /// Bytes kept in memory before spilling to a temporary file.
    pub spool_threshold: usize,
    /// SFTP host key verification.
    pub host_key_policy: HostKeyPolicy,
    /// Optional cooperative cancellation.
    pub cancel: Option<CancelFlag>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(300),
            chunk_size: DEFAULT_CHUNK_SIZE,
            spool_threshold: DEFAULT_SPOOL_THRESHOLD,
            host_key_policy: HostKeyPolicy::default(),
            cancel: None,
        }
    }
}

/// Dispatches to the transport matching the location's scheme.
#[derive(Debug, Clone)]
pub struct SchemeRetriever {
    options: TransportOptions,
}

impl SchemeRetriever {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }
}

impl Default for SchemeRetriever {
    fn default() -> Self {
        Self::new(TransportOptions::default())
    }
}

impl Retriever for SchemeRetriever {
    fn retrieve(&self, location: &Location) -> Result<RetrievedFile, TransportError> {
        match location.scheme() {
            Scheme::Https => HttpsRetriever::new(self.options.clone())?.retrieve(location),
            Scheme::Sftp => retrieve_sftp(&self.options, location),
        }
    }
}

#[cfg(feature = "sftp")]
fn retrieve_sftp(options: &TransportOptions, location: &Location) -> Result<RetrievedFile, TransportError> {
    SftpRetriever::new(options.clone()).retrieve(location)
}

#[cfg(not(feature = "sftp"))]
fn retrieve_sftp(_options: &TransportOptions, _location: &Location) -> Result<RetrievedFile, TransportError> {
    Err(TransportError::FeatureDisabled {
        scheme: Scheme::Sftp,
        feature: "sftp",
    })
}
