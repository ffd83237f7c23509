#![cfg(feature = "sftp")]

//! SFTP retrieval with username/password authentication.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};

use ssh2::{CheckResult, ErrorCode, KnownHostFileKind, KnownHosts, Session};
use tracing::{debug, warn};

use super::{DEFAULT_SFTP_PORT, HostKeyPolicy, Retriever, RetrievedFile, TransportOptions};
use crate::error::TransportError;
use crate::location::{Location, Scheme};

/// `LIBSSH2_FX_NO_SUCH_FILE`
const FX_NO_SUCH_FILE: i32 = 2;

/// Copies a remote file over SFTP into a [`RetrievedFile`].
#[derive(Debug, Clone)]
pub struct SftpRetriever {
    options: TransportOptions,
}

impl SftpRetriever {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }
}

impl Retriever for SftpRetriever {
    fn retrieve(&self, location: &Location) -> Result<RetrievedFile, TransportError> {
        if location.scheme() != Scheme::Sftp {
            return Err(TransportError::SchemeMismatch {
                expected: Scheme::Sftp,
                found: location.scheme(),
            });
        }
        let credential = location.credential().ok_or(TransportError::NoCredential)?;
        let host = location.host();
        let port = location.port().unwrap_or(DEFAULT_SFTP_PORT);

        let tcp = connect(host, port, &self.options)?;
        let session = SessionGuard::handshake(tcp, &self.options)?;
        verify_host_key(&session.0, host, port, &self.options.host_key_policy)?;

        session
            .0
            .userauth_password(credential.username(), credential.password())
            .map_err(|e| TransportError::Authentication {
                user: credential.username().to_string(),
                reason: e.message().to_string(),
            })?;
        if !session.0.authenticated() {
            return Err(TransportError::Authentication {
                user: credential.username().to_string(),
                reason: "server did not accept the password".to_string(),
            });
        }

        let sftp = session.0.sftp().map_err(TransportError::Sftp)?;
        let remote_path = location.remote_path();
        let mut remote = sftp.open(Path::new(remote_path)).map_err(|e| match e.code() {
            ErrorCode::SFTP(FX_NO_SUCH_FILE) => TransportError::RemoteFileNotFound {
                path: remote_path.to_string(),
            },
            _ => TransportError::Sftp(e),
        })?;

        debug!(host, port, path = remote_path, "starting sftp transfer");
        let file = RetrievedFile::spool_from_reader(
            &mut remote,
            self.options.chunk_size,
            self.options.spool_threshold,
            self.options.cancel.as_ref(),
        )?;
        debug!(host, port, path = remote_path, bytes = file.len(), "sftp transfer complete");
        Ok(file)
    }
}

/// Owns the session and disconnects it when dropped, on success and error paths alike.
struct SessionGuard(Session);

impl SessionGuard {
    fn handshake(tcp: TcpStream, options: &TransportOptions) -> Result<Self, TransportError> {
        let mut session = Session::new().map_err(TransportError::Sftp)?;
        session.set_timeout(u32::try_from(options.read_timeout.as_millis()).unwrap_or(u32::MAX));
        session.set_tcp_stream(tcp);
        session.handshake().map_err(TransportError::Handshake)?;
        Ok(Self(session))
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let _ = self.0.disconnect(None, "transfer finished", None);
    }
}

fn connect(host: &str, port: u16, options: &TransportOptions) -> Result<TcpStream, TransportError> {
    let label = format!("{host}:{port}");
    let addrs = (bare_host(host), port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Connect {
            addr: label.clone(),
            source,
        })?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, options.connect_timeout) {
            Ok(tcp) => {
                tcp.set_read_timeout(Some(options.read_timeout))
                    .and_then(|()| tcp.set_write_timeout(Some(options.read_timeout)))
                    .map_err(|source| TransportError::Connect {
                        addr: label.clone(),
                        source,
                    })?;
                debug!(addr = %addr, "sftp tcp connection established");
                return Ok(tcp);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(TransportError::Connect {
        addr: label,
        source: last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")),
    })
}

/// IPv6 literals arrive bracketed from the URL; resolvers and known_hosts want them bare.
fn bare_host(host: &str) -> &str {
    host.trim_start_matches('[').trim_end_matches(']')
}

fn host_key_rejected(host: &str, reason: String) -> TransportError {
    TransportError::HostKey {
        host: host.to_string(),
        reason,
    }
}

fn verify_host_key(
    session: &Session,
    host: &str,
    port: u16,
    policy: &HostKeyPolicy,
) -> Result<(), TransportError> {
    let path = match policy {
        HostKeyPolicy::AcceptAny => {
            warn!(host, port, "sftp host key verification disabled, accepting any key");
            return Ok(());
        }
        HostKeyPolicy::KnownHosts(Some(path)) => path.clone(),
        HostKeyPolicy::KnownHosts(None) => default_known_hosts().ok_or_else(|| {
            host_key_rejected(host, "no known_hosts file configured and HOME is not set".to_string())
        })?,
    };

    let known = load_known_hosts(session, host, &path)?;
    let (key, _) = session
        .host_key()
        .ok_or_else(|| host_key_rejected(host, "server presented no host key".to_string()))?;
    check_known_host(&known, bare_host(host), port, key, &path)
}

fn load_known_hosts(session: &Session, host: &str, path: &Path) -> Result<KnownHosts, TransportError> {
    let mut known = session.known_hosts().map_err(TransportError::Sftp)?;
    known
        .read_file(path, KnownHostFileKind::OpenSSH)
        .map_err(|e| host_key_rejected(host, format!("cannot read {}: {e}", path.display())))?;
    Ok(known)
}

fn check_known_host(
    known: &KnownHosts,
    host: &str,
    port: u16,
    key: &[u8],
    path: &Path,
) -> Result<(), TransportError> {
    match known.check_port(host, port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound => Err(host_key_rejected(
            host,
            format!("host is not listed in {}", path.display()),
        )),
        CheckResult::Mismatch => Err(host_key_rejected(
            host,
            format!("host key does not match the entry in {}", path.display()),
        )),
        CheckResult::Failure => Err(host_key_rejected(host, "known_hosts lookup failed".to_string())),
    }
}

fn default_known_hosts() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".ssh").join("known_hosts"))
}
