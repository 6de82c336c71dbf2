//! Archive download
//!
//! Streams the SDK archive into a temporary file in the scratch directory
//! while hashing it, so the checksum can be verified without reading the file
//! a second time. The file only gets its final name once the transfer is
//! complete.

use crate::http::{ARCHIVE_TIMEOUT, build_client};
use crate::install::error::InstallError;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// File name used when the URL has no usable last segment
const FALLBACK_ARCHIVE_NAME: &str = "flutter-sdk-archive";

/// A downloaded archive on disk
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    /// Location of the archive
    pub path: PathBuf,
    /// Lower-case hex SHA-256 of the archive
    pub sha256: String,
    /// Size in bytes
    pub size: u64,
}

/// Last path segment of `url`, used as the local archive file name
pub fn archive_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_ARCHIVE_NAME)
        .to_string()
}

/// Downloads `url` into `dest_dir/<archive file name>`
///
/// # Errors
///
/// Returns `InstallError` if the request fails, the server answers with a
/// non-success status, or the file cannot be written.
pub fn download_archive(url: &Url, dest_dir: &Path) -> Result<DownloadedArchive, InstallError> {
    let client = build_client(ARCHIVE_TIMEOUT).map_err(|e| InstallError::DownloadFailed {
        url: url.clone(),
        source: e,
    })?;

    info!(%url, "Downloading Flutter SDK archive");

    let mut response = client
        .get(url.as_str())
        .send()
        .map_err(|e| InstallError::DownloadFailed {
            url: url.clone(),
            source: e,
        })?;

    if let Err(err) = response.error_for_status_ref() {
        return Err(InstallError::DownloadFailed {
            url: url.clone(),
            source: err.without_url(),
        });
    }

    fs::create_dir_all(dest_dir)
        .map_err(|e| InstallError::io_at("create download directory", dest_dir, e))?;

    // Dropped (and deleted) on every early return, so a failed transfer
    // leaves nothing behind
    let mut file = tempfile::Builder::new()
        .prefix(".fluttercache-download-")
        .tempfile_in(dest_dir)
        .map_err(|e| InstallError::io_at("create temporary file in", dest_dir, e))?;

    let total = response.content_length();
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;
    let mut last_reported = 0;
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| InstallError::io("read from HTTP response", e))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| InstallError::io_at("write archive file", file.path(), e))?;
        hasher.update(&buffer[..bytes_read]);
        downloaded += bytes_read as u64;

        if let Some(total) = total.filter(|t| *t > 0) {
            let percent = downloaded * 100 / total;
            if percent >= last_reported + 10 {
                last_reported = percent - percent % 10;
                debug!(downloaded, total, "Download {}% complete", last_reported);
            }
        }
    }

    file.as_file()
        .sync_all()
        .map_err(|e| InstallError::io_at("sync archive file", file.path(), e))?;

    let path = dest_dir.join(archive_file_name(url));
    file.persist(&path)
        .map_err(|e| InstallError::io_at("move archive to", &path, e.error))?;

    let sha256 = format!("{:x}", hasher.finalize());
    debug!(path = %path.display(), size = downloaded, %sha256, "Archive downloaded");

    Ok(DownloadedArchive {
        path,
        sha256,
        size: downloaded,
    })
}

/// True when `value` looks like a hex SHA-256 digest
pub fn is_sha256_digest(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Checks the archive digest against the manifest value.
///
/// Values that are not a SHA-256 digest (synthesized descriptors carry the
/// channel name) are not checked.
pub fn verify_sha256(archive: &DownloadedArchive, expected: &str, url: &Url) -> Result<(), InstallError> {
    if !is_sha256_digest(expected) {
        debug!(expected, "Skipping checksum verification");
        return Ok(());
    }

    if archive.sha256.eq_ignore_ascii_case(expected) {
        return Ok(());
    }

    Err(InstallError::ChecksumMismatch {
        url: url.clone(),
        expected: expected.to_ascii_lowercase(),
        actual: archive.sha256.clone(),
    })
}
