//! Release resolution
//!
//! Narrows the manifest down to a single release for the requested channel,
//! architecture and version. The filters run in a fixed order because the
//! `version = any` shortcut picks the first survivor of the earlier filters.
//!
//! Moving targets bypass the manifest entirely: the `master` channel and any
//! request carrying an explicit repository URL resolve to a synthesized
//! descriptor that installs from git.

use crate::manifest::{DEFAULT_ARCH, ManifestError, ManifestSource, Release};
use fluttercache_core::FluttercacheError;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CHANNEL: &str = "stable";
pub const DEFAULT_VERSION: &str = "any";
pub const MASTER_CHANNEL: &str = "master";

/// Repository cloned for the `master` channel when no URL is given
pub const DEFAULT_REPO_URL: &str = "https://github.com/flutter/flutter.git";

/// What the caller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub channel: String,
    pub version: String,
    pub arch: String,
    pub repo_url: Option<String>,
}

impl ResolutionRequest {
    /// Builds a request, substituting defaults for empty inputs.
    ///
    /// The architecture is lower-cased; channel and version are kept as given.
    pub fn new(channel: &str, version: &str, arch: &str, repo_url: Option<&str>) -> Self {
        let or_default = |value: &str, default: &str| {
            let value = value.trim();
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            channel: or_default(channel, DEFAULT_CHANNEL),
            version: or_default(version, DEFAULT_VERSION),
            arch: or_default(arch, DEFAULT_ARCH).to_lowercase(),
            repo_url: repo_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }

    /// True when the manifest is not consulted at all
    pub fn bypasses_manifest(&self) -> bool {
        self.channel == MASTER_CHANNEL || self.repo_url.is_some()
    }
}

impl Default for ResolutionRequest {
    fn default() -> Self {
        Self::new("", "", "", None)
    }
}

/// Where the SDK comes from once resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// Download and extract a release archive
    Archive { url: Url },
    /// Clone a git repository at a branch
    Repository { url: String, branch: String },
}

/// Outcome of resolution: the release descriptor plus its install source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub release: Release,
    pub source: InstallSource,
}

/// Keeps releases on the requested channel, plus channel-agnostic ones
pub fn filter_by_channel<'a>(releases: &'a [Release], channel: &str) -> Vec<&'a Release> {
    releases
        .iter()
        .filter(|r| r.channel == "any" || r.channel == channel)
        .collect()
}

/// Keeps releases built for `arch`; a missing architecture counts as x64
pub fn filter_by_arch<'a>(releases: Vec<&'a Release>, arch: &str) -> Vec<&'a Release> {
    releases
        .into_iter()
        .filter(|r| match r.architecture.as_deref() {
            Some(release_arch) => release_arch == arch,
            None => arch == DEFAULT_ARCH,
        })
        .collect()
}

/// Keeps releases matching `version`.
///
/// `any` keeps only the first candidate. Otherwise a release matches on an
/// exact version or on a dotted prefix (`2.5` matches `2.5.0`).
pub fn filter_by_version<'a>(releases: Vec<&'a Release>, version: &str) -> Vec<&'a Release> {
    let version = normalize_version(version);

    if version == DEFAULT_VERSION {
        return releases.into_iter().take(1).collect();
    }

    let prefix = format!("{}.", version);
    releases
        .into_iter()
        .filter(|r| {
            r.version == version || (r.version.starts_with(&prefix) && r.version != version)
        })
        .collect()
}

/// Strips a single leading `v` (`v3.22.1` → `3.22.1`)
pub fn normalize_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Runs the three filters and returns the first surviving release
pub fn select_release(
    releases: &[Release],
    request: &ResolutionRequest,
) -> Result<Release, ResolveError> {
    let by_channel = filter_by_channel(releases, &request.channel);
    let by_arch = filter_by_arch(by_channel, &request.arch);
    let by_version = filter_by_version(by_arch, &request.version);

    debug!(
        channel = %request.channel,
        version = %request.version,
        arch = %request.arch,
        candidates = by_version.len(),
        "Filtered release manifest"
    );

    by_version
        .first()
        .map(|r| (*r).clone())
        .ok_or_else(|| ResolveError::VersionNotFound {
            channel: request.channel.clone(),
            version: normalize_version(&request.version).to_string(),
            arch: request.arch.clone(),
        })
}

/// Resolves `request` to a single release and its install source.
///
/// `manifest` is only consulted when the request does not bypass it.
/// `archive_base_url` is used for relative archive paths when the manifest
/// has no `base_url` of its own.
pub fn resolve(
    request: &ResolutionRequest,
    manifest: &dyn ManifestSource,
    archive_base_url: &str,
) -> Result<Resolution, ResolveError> {
    if request.bypasses_manifest() {
        let url = request
            .repo_url
            .clone()
            .unwrap_or_else(|| DEFAULT_REPO_URL.to_string());

        info!(channel = %request.channel, repo = %url, "Using source checkout, skipping manifest");

        return Ok(Resolution {
            release: Release::synthesized(&request.channel, &request.arch),
            source: InstallSource::Repository {
                url,
                branch: request.channel.clone(),
            },
        });
    }

    let loaded = manifest.load()?;
    let release = select_release(&loaded.releases, request)?;
    let url = loaded.archive_url(&release, archive_base_url)?;

    info!(
        channel = %release.channel,
        version = %release.version,
        arch = %release.arch(),
        "Resolved release from {}",
        manifest.origin()
    );

    Ok(Resolution {
        release,
        source: InstallSource::Archive { url },
    })
}

/// Resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Nothing in the manifest matches the request
    #[error(
        "Unable to determine Flutter version for channel: {channel} version: {version} architecture: {arch}"
    )]
    VersionNotFound {
        channel: String,
        version: String,
        arch: String,
    },

    /// The manifest could not be loaded
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl From<ResolveError> for FluttercacheError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::VersionNotFound {
                channel,
                version,
                arch,
            } => FluttercacheError::VersionNotFound {
                channel,
                version,
                arch,
            },
            ResolveError::Manifest(e) => e.into(),
        }
    }
}
