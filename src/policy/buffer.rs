//! Bounded, load-once policy buffer.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Largest policy document the daemon will hold. Longer files are truncated.
pub const MAX_POLICY_LEN: usize = 65536;

/// Error type for policy loading.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// The file could not be opened.
    #[error("open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A read failed partway through the file.
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The policy document, exactly as it will be written to clients.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyBuffer {
    data: Box<[u8]>,
    truncated: bool,
}

impl PolicyBuffer {
    /// Load the policy from `path`, keeping at most [`MAX_POLICY_LEN`] bytes.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let mut file = File::open(path).map_err(|source| PolicyError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let read_error = |source: io::Error| PolicyError::Read {
            path: path.to_path_buf(),
            source,
        };

        let metadata = file.metadata().map_err(read_error)?;
        let data = read_capped(&mut file).map_err(read_error)?;

        // Only a regular file's size is known up front. Pipes and devices
        // are never read past capacity, so they are never reported truncated.
        let truncated = metadata.is_file() && metadata.len() > MAX_POLICY_LEN as u64;
        let buffer = Self::from_parts(data, truncated);

        tracing::debug!(
            path = %path.display(),
            len = buffer.len(),
            "Policy loaded"
        );

        Ok(buffer)
    }

    /// Fill a buffer from any reader until end of input or capacity.
    ///
    /// Short reads are accumulated; interrupted reads are retried. Any other
    /// read error aborts the load with nothing kept. A full buffer costs one
    /// extra read to tell an exact fit from a cut-off, so `reader` must not
    /// block indefinitely at end of input.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let data = read_capped(&mut reader)?;
        let truncated = data.len() == MAX_POLICY_LEN && has_more(&mut reader);
        Ok(Self::from_parts(data, truncated))
    }

    fn from_parts(data: Vec<u8>, truncated: bool) -> Self {
        Self {
            data: data.into_boxed_slice(),
            truncated,
        }
    }

    /// The bytes served to every client.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the source file was longer than [`MAX_POLICY_LEN`].
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

fn read_capped<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut data = vec![0u8; MAX_POLICY_LEN];
    let mut len = 0;

    while len < MAX_POLICY_LEN {
        match reader.read(&mut data[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    data.truncate(len);
    Ok(data)
}

fn has_more<R: Read>(reader: &mut R) -> bool {
    let mut probe = [0u8; 1];
    loop {
        match reader.read(&mut probe) {
            Ok(n) => return n > 0,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return false,
        }
    }
}
