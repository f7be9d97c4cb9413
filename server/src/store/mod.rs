//! Persistence of the user and server collections.

pub mod file_store;
pub mod records;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use file_store::FileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid record at {}:{line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("failed to encode records for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported format version {version} in {}", .path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, line: usize, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            line,
            source,
        }
    }

    pub(crate) fn encode(path: &Path, source: serde_json::Error) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            source,
        }
    }
}
