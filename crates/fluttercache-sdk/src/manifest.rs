//! Flutter release manifest model and sources
//!
//! The release index is published once per host OS as
//! `releases_<os>.json`. It is read either over HTTPS or, in test mode,
//! from a fixture file on disk. Both are exposed through [`ManifestSource`]
//! so the resolver does not care where the document comes from.

use crate::http::{MANIFEST_TIMEOUT, build_client};
use fluttercache_core::{FluttercacheError, HostOs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default location of the published release manifests
pub const DEFAULT_MANIFEST_BASE_URL: &str =
    "https://storage.googleapis.com/flutter_infra_release/releases";

/// Architecture assumed for releases that carry no `dart_sdk_arch`
pub const DEFAULT_ARCH: &str = "x64";

/// One entry of the release manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Release {
    /// Release track (e.g. "stable", "beta"); "any" matches every request
    pub channel: String,
    /// Framework version (e.g. "3.22.1")
    pub version: String,
    /// Dart SDK architecture; absent means x64
    #[serde(
        rename = "dart_sdk_arch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub architecture: Option<String>,
    /// Framework commit hash
    pub hash: String,
    /// SHA-256 of the archive
    pub sha256: String,
    /// Archive location, absolute or relative to the manifest base URL
    #[serde(default)]
    pub archive: String,
}

impl Release {
    /// Descriptor for a moving target (a branch) that has no manifest entry.
    ///
    /// Every placeholder field carries the channel name.
    pub fn synthesized(channel: &str, arch: &str) -> Self {
        Self {
            channel: channel.to_string(),
            version: channel.to_string(),
            architecture: Some(arch.to_string()),
            hash: channel.to_string(),
            sha256: channel.to_string(),
            archive: String::new(),
        }
    }

    /// Architecture with the implicit x64 default applied
    pub fn arch(&self) -> &str {
        self.architecture.as_deref().unwrap_or(DEFAULT_ARCH)
    }
}

/// The release index document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Manifest {
    /// Base URL for relative archive paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Releases, newest first
    pub releases: Vec<Release>,
}

impl Manifest {
    /// Parses a manifest document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolves a release's archive location to an absolute URL.
    ///
    /// Absolute archive URLs are used verbatim. Relative ones are joined onto
    /// the manifest's `base_url`, or onto `fallback_base` when the manifest
    /// does not declare one.
    pub fn archive_url(&self, release: &Release, fallback_base: &str) -> Result<Url, ManifestError> {
        let archive = release.archive.trim();
        if archive.is_empty() {
            return Err(ManifestError::MissingArchive {
                version: release.version.clone(),
            });
        }

        if let Ok(url) = Url::parse(archive) {
            return Ok(url);
        }

        let base = self.base_url.as_deref().unwrap_or(fallback_base);
        // Url::join replaces the last segment unless the base ends with '/'
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };

        Url::parse(&base)
            .and_then(|base| base.join(archive.trim_start_matches('/')))
            .map_err(|source| ManifestError::ArchiveUrl {
                archive: archive.to_string(),
                source,
            })
    }
}

/// File name of the manifest published for `os`
pub fn manifest_file_name(os: HostOs) -> String {
    format!("releases_{}.json", os.as_str())
}

/// Something that can produce the release manifest
pub trait ManifestSource {
    /// Loads and parses the manifest
    fn load(&self) -> Result<Manifest, ManifestError>;

    /// Human-readable origin for logs and errors
    fn origin(&self) -> String;
}

/// Manifest fetched over HTTPS
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    pub url: Url,
}

impl HttpManifestSource {
    /// Points at `<base_url>/releases_<os>.json`
    pub fn for_os(base_url: &str, os: HostOs) -> Result<Self, ManifestError> {
        let raw = format!("{}/{}", base_url.trim_end_matches('/'), manifest_file_name(os));
        let url = Url::parse(&raw).map_err(|source| ManifestError::InvalidUrl { url: raw, source })?;
        Ok(Self { url })
    }
}

impl ManifestSource for HttpManifestSource {
    fn load(&self) -> Result<Manifest, ManifestError> {
        debug!(url = %self.url, "Fetching release manifest");

        let client = build_client(MANIFEST_TIMEOUT).map_err(|e| ManifestError::Fetch {
            url: self.url.clone(),
            source: e,
        })?;

        let response = client
            .get(self.url.as_str())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ManifestError::Fetch {
                url: self.url.clone(),
                source: e.without_url(),
            })?;

        let body = response.text().map_err(|e| ManifestError::Fetch {
            url: self.url.clone(),
            source: e,
        })?;

        Manifest::from_json(&body).map_err(|e| ManifestError::Invalid {
            origin: self.origin(),
            reason: e.to_string(),
        })
    }

    fn origin(&self) -> String {
        self.url.to_string()
    }
}

/// Manifest read from a local fixture file (test mode)
#[derive(Debug, Clone)]
pub struct FixtureManifestSource {
    pub path: PathBuf,
}

impl FixtureManifestSource {
    /// Points at `<fixture_dir>/releases_<os>.json`
    pub fn for_os(fixture_dir: impl Into<PathBuf>, os: HostOs) -> Self {
        Self {
            path: fixture_dir.into().join(manifest_file_name(os)),
        }
    }
}

impl ManifestSource for FixtureManifestSource {
    fn load(&self) -> Result<Manifest, ManifestError> {
        debug!(path = %self.path.display(), "Reading fixture manifest");

        let json = fs::read_to_string(&self.path).map_err(|e| ManifestError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        Manifest::from_json(&json).map_err(|e| ManifestError::Invalid {
            origin: self.origin(),
            reason: e.to_string(),
        })
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

/// Manifest loading errors
#[derive(Debug, Error)]
pub enum ManifestError {
    /// HTTP request failed or returned a non-success status
    #[error("failed to fetch release manifest {url}: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// Fixture file could not be read
    #[error("failed to read release manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not a valid manifest
    #[error("invalid release manifest {origin}: {reason}")]
    Invalid { origin: String, reason: String },

    /// Manifest URL could not be built
    #[error("invalid manifest URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Release has no archive to download
    #[error("release {version} has no archive")]
    MissingArchive { version: String },

    /// Archive location could not be turned into a URL
    #[error("invalid archive location '{archive}': {source}")]
    ArchiveUrl {
        archive: String,
        #[source]
        source: url::ParseError,
    },
}

impl From<ManifestError> for FluttercacheError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Fetch { .. } | ManifestError::Read { .. } => {
                FluttercacheError::ManifestFetchFailed(err.to_string())
            }
            _ => FluttercacheError::ManifestInvalid(err.to_string()),
        }
    }
}
