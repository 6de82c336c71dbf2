//! Fixture builders for testing
//!
//! Fake SDK archives mimic the layout of the published Flutter archives:
//! zip distributions wrap everything in a top-level `flutter/` folder while
//! tarballs carry the SDK tree at their root.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Contents of the fake `bin/flutter` entry point
const FAKE_FLUTTER_SCRIPT: &str = "#!/bin/sh\necho 'Flutter 3.22.1 • channel stable'\n";

/// Archive flavour produced by [`create_fake_sdk_archive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkArchiveFormat {
    /// `flutter/bin/flutter` inside a zip
    Zip,
    /// `bin/flutter` inside an xz-compressed tarball
    TarXz,
    /// `bin/flutter` inside a gzip-compressed tarball
    TarGz,
}

/// Writes a fake SDK archive named `name` into `dir` and returns its path
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn create_fake_sdk_archive(dir: &Path, name: &str, format: SdkArchiveFormat) -> PathBuf {
    let archive_path = dir.join(name);
    let file = fs::File::create(&archive_path).expect("Failed to create archive file");

    match format {
        SdkArchiveFormat::Zip => {
            let mut zip = zip::ZipWriter::new(file);
            let options = || {
                zip::write::SimpleFileOptions::default()
                    .compression_method(zip::CompressionMethod::Stored)
            };

            zip.add_directory("flutter/", options()).unwrap();
            zip.add_directory("flutter/bin/", options()).unwrap();
            zip.start_file("flutter/bin/flutter", options().unix_permissions(0o755))
                .unwrap();
            zip.write_all(FAKE_FLUTTER_SCRIPT.as_bytes()).unwrap();
            zip.start_file("flutter/version", options()).unwrap();
            zip.write_all(b"3.22.1").unwrap();
            zip.finish().unwrap();
        }
        SdkArchiveFormat::TarXz => {
            let encoder = xz2::write::XzEncoder::new(file, 6);
            let encoder = append_sdk_tree(tar::Builder::new(encoder));
            encoder.finish().unwrap();
        }
        SdkArchiveFormat::TarGz => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let encoder = append_sdk_tree(tar::Builder::new(encoder));
            encoder.finish().unwrap();
        }
    }

    archive_path
}

fn append_sdk_tree<W: Write>(mut tar: tar::Builder<W>) -> W {
    append_file(&mut tar, "bin/flutter", FAKE_FLUTTER_SCRIPT.as_bytes(), 0o755);
    append_file(&mut tar, "version", b"3.22.1", 0o644);
    tar.into_inner().expect("Failed to finish tar archive")
}

fn append_file<W: Write>(tar: &mut tar::Builder<W>, path: &str, data: &[u8], mode: u32) {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(mode);
    header.set_cksum();
    tar.append_data(&mut header, path, data)
        .expect("Failed to append tar entry");
}

/// Writes a fake `git` executable into `dir`
///
/// On success it creates `<dest>/bin/flutter` and records its arguments in
/// `<dest>/clone-args`; otherwise it prints a git-style error and exits 128.
///
/// # Panics
///
/// Panics if the script cannot be written.
#[cfg(unix)]
pub fn create_fake_git(dir: &Path, succeed: bool) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = if succeed {
        r#"#!/bin/sh
for last; do :; done
mkdir -p "$last/bin"
printf '#!/bin/sh\necho flutter\n' > "$last/bin/flutter"
echo "$@" > "$last/clone-args"
"#
    } else {
        r#"#!/bin/sh
echo "fatal: Remote branch $3 not found in upstream origin" >&2
exit 128
"#
    };

    let path = dir.join(if succeed { "git-ok" } else { "git-fail" });
    fs::write(&path, script).expect("Failed to write fake git");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Manifest document with a representative spread of releases
///
/// `archive_base` replaces the manifest `base_url` so archive downloads can
/// be pointed at a mock server.
pub fn sample_manifest_json(archive_base: &str) -> String {
    format!(
        r#"{{
  "base_url": "{archive_base}",
  "current_release": {{
    "beta": "b3",
    "stable": "s3"
  }},
  "releases": [
    {{
      "hash": "b3",
      "channel": "beta",
      "version": "3.23.0-0.1.pre",
      "dart_sdk_version": "3.5.0",
      "dart_sdk_arch": "x64",
      "release_date": "2024-06-05T17:00:00.000Z",
      "archive": "beta/flutter_3.23.0-0.1.pre-beta.tar.xz",
      "sha256": "beta"
    }},
    {{
      "hash": "s3arm",
      "channel": "stable",
      "version": "3.22.1",
      "dart_sdk_arch": "arm64",
      "release_date": "2024-05-22T20:00:00.000Z",
      "archive": "stable/flutter_arm64_3.22.1-stable.zip",
      "sha256": "stable-arm64"
    }},
    {{
      "hash": "s3",
      "channel": "stable",
      "version": "3.22.1",
      "release_date": "2024-05-22T20:00:00.000Z",
      "archive": "stable/flutter_3.22.1-stable.tar.xz",
      "sha256": "stable"
    }},
    {{
      "hash": "s2rc",
      "channel": "stable",
      "version": "2.5.0-rc",
      "archive": "stable/flutter_2.5.0-rc-stable.tar.xz",
      "sha256": "stable"
    }},
    {{
      "hash": "s2",
      "channel": "stable",
      "version": "2.5.0",
      "archive": "stable/flutter_2.5.0-stable.tar.xz",
      "sha256": "stable"
    }}
  ]
}}
"#
    )
}

/// Writes `<dir>/releases_<os>.json` and returns its path
pub fn write_fixture_manifest(dir: &Path, os: &str, json: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create fixture directory");
    let path = dir.join(format!("releases_{}.json", os));
    fs::write(&path, json).expect("Failed to write fixture manifest");
    path
}
