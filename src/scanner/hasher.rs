//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes a BLAKE3 digest of a file's full content. Files are
//! read in fixed [`CHUNK_SIZE`] pieces and folded into a running hasher, so
//! memory use does not depend on file size. The stop handle is polled before
//! every chunk read; a stop turns into [`HashError::Cancelled`].
//!
//! BLAKE3 is used for its collision resistance; at disk speeds the choice of
//! digest does not show up in scan time.
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("some_file.bin")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::HashError;
use crate::signal::StopHandle;

/// Size of each read when streaming file content.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// A 32-byte BLAKE3 content digest.
pub type Hash = [u8; 32];

/// Streaming content hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    stop: Option<StopHandle>,
}

impl Hasher {
    /// Create a hasher that never observes a stop request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll the given handle before every chunk read.
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    fn is_stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(StopHandle::is_stop_requested)
    }

    /// Hash the entire content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Cancelled`] if a stop is requested before the last
    /// chunk is read, or an I/O flavoured [`HashError`] if the file cannot be
    /// opened or a read fails partway.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(file, path)
    }

    /// Hash everything a reader yields, chunk by chunk.
    ///
    /// `path` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::full_hash`].
    pub fn hash_reader<R: Read>(&self, mut reader: R, path: &Path) -> Result<Hash, HashError> {
        let mut state = blake3::Hasher::new();
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            if self.is_stop_requested() {
                log::trace!("Hashing cancelled: {}", path.display());
                return Err(HashError::Cancelled(path.to_path_buf()));
            }
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            state.update(&buffer[..read]);
        }

        Ok(*state.finalize().as_bytes())
    }

    /// Compare two files byte by byte.
    ///
    /// Used to confirm digest matches when paranoid verification is on.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Cancelled`] on a stop request, or the I/O error of
    /// whichever file failed first. [`HashError::path`] names that file.
    pub fn files_identical(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;
        let mut buf_a = [0u8; CHUNK_SIZE];
        let mut buf_b = [0u8; CHUNK_SIZE];

        loop {
            if self.is_stop_requested() {
                return Err(HashError::Cancelled(a.to_path_buf()));
            }
            let read_a = read_full(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let read_b = read_full(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

            if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
                return Ok(false);
            }
            if read_a == 0 {
                return Ok(true);
            }
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Format a digest as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from_bytes(*hash).to_hex().to_string()
}
