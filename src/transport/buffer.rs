//! Scoped, seekable buffer for retrieved bytes.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use tempfile::SpooledTempFile;

use super::CancelFlag;
use crate::error::TransportError;

/// Bytes retrieved from a remote location.
///
/// Kept in memory up to a threshold, then spilled to an anonymous temporary file. The caller owns
/// it exclusively; dropping it releases the memory or deletes the temporary file. A value handed
/// out by a retriever is positioned at offset zero.
pub struct RetrievedFile {
    buffer: SpooledTempFile,
    len: u64,
}

impl RetrievedFile {
    /// Copy `reader` to the end into a new buffer, `chunk_size` bytes at a time, and rewind it.
    ///
    /// Fails with [`TransportError::Stream`] if reading or writing fails part way, and with
    /// [`TransportError::Cancelled`] if `cancel` is raised between chunks. The partial buffer is
    /// dropped in both cases.
    pub fn spool_from_reader<R: Read>(
        reader: &mut R,
        chunk_size: usize,
        spool_threshold: usize,
        cancel: Option<&CancelFlag>,
    ) -> Result<Self, TransportError> {
        let mut buffer = SpooledTempFile::new(spool_threshold);
        let mut chunk = vec![0u8; chunk_size.max(1)];
        let mut len: u64 = 0;

        loop {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                return Err(TransportError::Cancelled { received: len });
            }
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Stream(e)),
            };
            buffer.write_all(&chunk[..n])?;
            len += n as u64;
        }

        buffer.flush()?;
        buffer.seek(SeekFrom::Start(0))?;
        Ok(Self { buffer, len })
    }

    /// Buffer an in-memory byte slice. Useful for uploads and tests.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        let mut reader = bytes;
        Self::spool_from_reader(&mut reader, bytes.len().max(1), bytes.len().max(1), None)
    }

    /// Total number of bytes retrieved.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` once the contents have spilled from memory to a temporary file.
    pub fn is_spilled(&self) -> bool {
        self.buffer.is_rolled()
    }

    /// Seek back to offset zero so the contents can be read again.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.buffer.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

impl Read for RetrievedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buffer.read(buf)
    }
}

impl Seek for RetrievedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.buffer.seek(pos)
    }
}

impl fmt::Debug for RetrievedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievedFile")
            .field("len", &self.len)
            .field("spilled", &self.is_spilled())
            .finish()
    }
}
