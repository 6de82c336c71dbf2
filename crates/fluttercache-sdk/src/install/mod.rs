//! SDK installation into the cache directory
//!
//! ```text
//! ensure_installed()
//!     ↓
//! <cache_dir>/bin/flutter exists? ── yes ──→ CacheHit
//!     ↓ no
//! InstallSource::Repository → git clone -b <branch> <url> <cache_dir>
//! InstallSource::Archive    → download → verify sha256 → extract → remove archive
//! ```

pub mod clone;
pub mod download;
pub mod error;
pub mod extract;

pub use clone::{DEFAULT_GIT, clone_repository};
pub use download::{DownloadedArchive, download_archive, verify_sha256};
pub use error::InstallError;
pub use extract::{ArchiveKind, SDK_DIR_NAME, extract_archive};

use crate::resolve::{InstallSource, Resolution};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the SDK entry point under `bin/`
pub const TOOL_NAME: &str = "flutter";

/// Install configuration
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Where the SDK should live
    pub cache_dir: PathBuf,

    /// Scratch space for downloads and zip extraction
    pub scratch_dir: PathBuf,

    /// git executable used for source checkouts
    pub git: OsString,
}

impl InstallOptions {
    pub fn new(cache_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            scratch_dir: scratch_dir.into(),
            git: OsString::from(DEFAULT_GIT),
        }
    }
}

/// What `ensure_installed` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The SDK was already present
    CacheHit,
    /// The SDK was cloned from git
    Cloned,
    /// The SDK was downloaded and extracted
    Extracted,
}

/// `<cache_dir>/bin`
pub fn bin_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("bin")
}

/// `<cache_dir>/bin/flutter`
pub fn tool_path(cache_dir: &Path) -> PathBuf {
    bin_dir(cache_dir).join(TOOL_NAME)
}

/// Makes sure `options.cache_dir` holds the resolved SDK.
///
/// Nothing is fetched or cloned when the tool is already present.
pub fn ensure_installed(
    resolution: &Resolution,
    options: &InstallOptions,
) -> Result<InstallOutcome, InstallError> {
    let cache_dir = options.cache_dir.as_path();

    if tool_path(cache_dir).exists() {
        info!(path = %cache_dir.display(), "Flutter SDK found in cache");
        return Ok(InstallOutcome::CacheHit);
    }

    match &resolution.source {
        InstallSource::Repository { url, branch } => {
            clone_repository(&options.git, url, branch, cache_dir)?;
            Ok(InstallOutcome::Cloned)
        }
        InstallSource::Archive { url } => {
            let archive = download_archive(url, &options.scratch_dir)?;

            let installed = verify_sha256(&archive, &resolution.release.sha256, url)
                .and_then(|()| extract_archive(&archive.path, cache_dir, &options.scratch_dir));

            if let Err(e) = fs::remove_file(&archive.path) {
                warn!(path = %archive.path.display(), error = %e, "Failed to remove downloaded archive");
            }

            installed?;
            info!(path = %cache_dir.display(), "Flutter SDK installed");
            Ok(InstallOutcome::Extracted)
        }
    }
}
