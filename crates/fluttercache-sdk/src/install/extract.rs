//! Archive extraction
//!
//! Every archive is unpacked into a scratch directory first and the SDK root
//! is then moved into place as the destination. Zip distributions must wrap
//! the SDK in a top-level `flutter/` folder; tarballs may carry it either
//! wrapped or at their root. Tarball compression is detected from the magic
//! bytes.

use crate::install::error::InstallError;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the folder wrapping the SDK inside published archives
pub const SDK_DIR_NAME: &str = "flutter";

const XZ_MAGIC: &[u8] = &[0xFD, b'7', b'z', b'X', b'Z', 0x00];
const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];

/// Archive flavours understood by the installer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tarball,
}

impl ArchiveKind {
    /// Infers the flavour from the archive file name
    pub fn from_name(name: &str) -> Self {
        if name.to_ascii_lowercase().ends_with(".zip") {
            ArchiveKind::Zip
        } else {
            ArchiveKind::Tarball
        }
    }
}

/// Extracts `archive` so that its SDK ends up at `dest`.
///
/// `scratch_dir` hosts the temporary extraction root. Any existing `dest` is
/// replaced once extraction has succeeded.
pub fn extract_archive(archive: &Path, dest: &Path, scratch_dir: &Path) -> Result<(), InstallError> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = ArchiveKind::from_name(&name);

    fs::create_dir_all(scratch_dir)
        .map_err(|e| InstallError::io_at("create scratch directory", scratch_dir, e))?;

    // TempDir removes whatever is left behind on every exit path
    let extract_root = tempfile::Builder::new()
        .prefix("fluttercache-extract-")
        .tempdir_in(scratch_dir)
        .map_err(|e| InstallError::io_at("create extraction directory in", scratch_dir, e))?;

    match kind {
        ArchiveKind::Zip => extract_zip(archive, extract_root.path())?,
        ArchiveKind::Tarball => extract_tarball(archive, extract_root.path())?,
    }

    let extracted_sdk = sdk_root(extract_root.path(), kind)?;

    if dest.exists() {
        debug!(dest = %dest.display(), "Removing existing destination");
        fs::remove_dir_all(dest)
            .map_err(|e| InstallError::io_at("remove existing destination", dest, e))?;
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| InstallError::io_at("create parent directory", parent, e))?;
    }

    move_dir(&extracted_sdk, dest)
}

/// Locates the SDK tree inside the extraction root.
///
/// Zip archives must contain `flutter/`. Tarballs use `flutter/` when present
/// and the extraction root itself otherwise.
fn sdk_root(extract_root: &Path, kind: ArchiveKind) -> Result<PathBuf, InstallError> {
    let wrapped = extract_root.join(SDK_DIR_NAME);
    let is_wrapped = fs::symlink_metadata(&wrapped)
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false);

    match (kind, is_wrapped) {
        (_, true) => Ok(wrapped),
        (ArchiveKind::Tarball, false) => Ok(extract_root.to_path_buf()),
        (ArchiveKind::Zip, false) => Err(InstallError::MissingSdkDir {
            dir_name: SDK_DIR_NAME.to_string(),
        }),
    }
}

/// Extracts a .zip archive
fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), InstallError> {
    let file = fs::File::open(archive_path)
        .map_err(|e| InstallError::io_at("open archive", archive_path, e))?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| InstallError::ExtractionFailed {
        archive_type: "zip".to_string(),
        reason: e.to_string(),
    })?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| InstallError::ExtractionFailed {
                archive_type: "zip".to_string(),
                reason: e.to_string(),
            })?;

        // Entries escaping the extraction root are skipped
        let outpath = match file.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => continue,
        };

        if file.is_dir() {
            fs::create_dir_all(&outpath)
                .map_err(|e| InstallError::io_at("create directory", &outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| InstallError::io_at("create parent directory", parent, e))?;
        }

        let mut outfile = fs::File::create(&outpath)
            .map_err(|e| InstallError::io_at("create file", &outpath, e))?;

        io::copy(&mut file, &mut outfile)
            .map_err(|e| InstallError::io_at("extract file", &outpath, e))?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|e| InstallError::io_at("set permissions for", &outpath, e))?;
        }
    }

    Ok(())
}

/// Extracts a tarball (xz, gzip or uncompressed) into `dest`
fn extract_tarball(archive_path: &Path, dest: &Path) -> Result<(), InstallError> {
    let file = fs::File::open(archive_path)
        .map_err(|e| InstallError::io_at("open archive", archive_path, e))?;
    let mut reader = BufReader::new(file);

    let magic = reader
        .fill_buf()
        .map_err(|e| InstallError::io_at("read archive", archive_path, e))?;
    let compression = Compression::sniff(magic);

    fs::create_dir_all(dest).map_err(|e| InstallError::io_at("create destination", dest, e))?;

    match compression {
        Compression::Xz => unpack_tar(xz2::read::XzDecoder::new(reader), dest, "tar.xz"),
        Compression::Gzip => unpack_tar(flate2::read::GzDecoder::new(reader), dest, "tar.gz"),
        Compression::None => unpack_tar(reader, dest, "tar"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    Xz,
    Gzip,
    None,
}

impl Compression {
    fn sniff(header: &[u8]) -> Self {
        if header.starts_with(XZ_MAGIC) {
            Compression::Xz
        } else if header.starts_with(GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::None
        }
    }
}

fn unpack_tar<R: Read>(reader: R, dest: &Path, archive_type: &str) -> Result<(), InstallError> {
    let failed = |e: io::Error| InstallError::ExtractionFailed {
        archive_type: archive_type.to_string(),
        reason: e.to_string(),
    };

    let mut archive = tar::Archive::new(reader);

    // unpack_in() skips `..` entries and refuses writes through links that
    // leave `dest`
    for entry in archive.entries().map_err(failed)? {
        let mut entry = entry.map_err(failed)?;
        if !entry.unpack_in(dest).map_err(failed)? {
            debug!("Skipped tar entry outside the extraction root");
        }
    }

    debug!(dest = %dest.display(), archive_type, "Tarball extracted");
    Ok(())
}

/// Moves a directory, copying when a rename is not possible (e.g. across
/// filesystems)
fn move_dir(from: &Path, to: &Path) -> Result<(), InstallError> {
    match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => debug!(error = %e, "Rename failed, copying instead"),
    }

    copy_dir_all(from, to)?;
    // Source lives inside a TempDir; leftovers are removed with it
    let _ = fs::remove_dir_all(from);
    Ok(())
}

fn copy_dir_all(from: &Path, to: &Path) -> Result<(), InstallError> {
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(|e| InstallError::io_at("walk directory", from, io::Error::other(e)))?;

        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| InstallError::io_at("relativize", entry.path(), io::Error::other(e)))?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| InstallError::io_at("create directory", &target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            // fs::copy carries permission bits over
            fs::copy(entry.path(), &target)
                .map_err(|e| InstallError::io_at("copy file to", &target, e))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<(), InstallError> {
    let link = fs::read_link(from).map_err(|e| InstallError::io_at("read link", from, e))?;
    std::os::unix::fs::symlink(&link, to).map_err(|e| InstallError::io_at("create link", to, e))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<(), InstallError> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| InstallError::io_at("copy file to", to, e))
}
