use fluttercache_core::FluttercacheError;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Errors raised while populating the cache directory
#[derive(Debug, Error)]
pub enum InstallError {
    /// Archive request failed or returned a non-success status
    #[error("Failed to download {url}: {source}")]
    DownloadFailed {
        /// URL that failed
        url: Url,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },

    /// Archive digest does not match the manifest
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: Url,
        expected: String,
        actual: String,
    },

    /// Archive could not be unpacked
    #[error("Failed to extract {archive_type} archive: {reason}")]
    ExtractionFailed {
        /// Archive flavour (e.g. "zip", "tar.xz")
        archive_type: String,
        /// Human-readable reason
        reason: String,
    },

    /// Zip archive lacked the expected top-level SDK folder
    #[error("Archive does not contain a top-level '{dir_name}' directory")]
    MissingSdkDir { dir_name: String },

    /// `git clone` could not be started or exited non-zero
    #[error("Failed to clone {url} (branch {branch}): {reason}")]
    CloneFailed {
        url: String,
        branch: String,
        reason: String,
    },

    /// File system operation failed
    #[error("I/O error during {operation}: {source}")]
    IoError {
        /// Description of the operation
        operation: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        InstallError::IoError {
            operation: operation.into(),
            source,
        }
    }

    pub(crate) fn io_at(operation: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("{} {}", operation, path.display()), source)
    }
}

impl From<InstallError> for FluttercacheError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::CloneFailed { .. } => FluttercacheError::CloneFailed(err.to_string()),
            _ => FluttercacheError::InstallFailed(err.to_string()),
        }
    }
}
