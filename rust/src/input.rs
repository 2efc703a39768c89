//! File input for the hasher. This is the only module that reads the text to
//! be hashed; it hands back plain bytes and wipes them once they are dropped.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use zeroize::Zeroize;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8 text: {reason}", path.display())]
    Encoding { path: PathBuf, reason: String },
}

/// UTF-8 file content held only as long as it is needed.
pub struct SecretInput {
    bytes: Vec<u8>,
}

impl SecretInput {
    fn from_text(text: String) -> Self {
        Self {
            bytes: text.into_bytes(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for SecretInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretInput")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl Drop for SecretInput {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Reads `path` as UTF-8 text. The bytes are returned exactly as stored, with
/// no newline or whitespace normalisation.
pub fn read_input(path: impl AsRef<Path>) -> Result<SecretInput, InputError> {
    let path = path.as_ref();
    let raw = fs::read(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match String::from_utf8(raw) {
        Ok(text) => {
            debug!(path = %path.display(), len = text.len(), "read input file");
            Ok(SecretInput::from_text(text))
        }
        Err(err) => {
            let reason = err.utf8_error().to_string();
            err.into_bytes().zeroize();
            Err(InputError::Encoding {
                path: path.to_path_buf(),
                reason,
            })
        }
    }
}
