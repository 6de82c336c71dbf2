//! Flutter SDK release resolution and cache installation.
//!
//! # Pipeline
//!
//! ```text
//! ManifestSource::load()        (skipped for master / explicit repo URL)
//!     ↓
//! resolve()                     channel → arch → version filters
//!     ↓
//! template::expand_cache_*()    :channel: :version: :arch: :hash: :sha256: :os:
//!     ↓
//! install::ensure_installed()   cache hit | git clone | download + extract
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fluttercache_core::HostOs;
//! use fluttercache_sdk::install::{InstallOptions, ensure_installed};
//! use fluttercache_sdk::manifest::{DEFAULT_MANIFEST_BASE_URL, HttpManifestSource};
//! use fluttercache_sdk::resolve::{ResolutionRequest, resolve};
//! use fluttercache_sdk::template::{DEFAULT_CACHE_KEY_TEMPLATE, expand_cache_key};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let os = HostOs::Linux;
//! let source = HttpManifestSource::for_os(DEFAULT_MANIFEST_BASE_URL, os)?;
//! let request = ResolutionRequest::new("stable", "3.22", "x64", None);
//!
//! let resolution = resolve(&request, &source, DEFAULT_MANIFEST_BASE_URL)?;
//! let key = expand_cache_key(DEFAULT_CACHE_KEY_TEMPLATE, &resolution.release, os);
//! println!("cache key: {}", key);
//!
//! ensure_installed(&resolution, &InstallOptions::new("/tmp/flutter", "/tmp"))?;
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod install;
pub mod manifest;
pub mod resolve;
pub mod template;

// Re-export commonly used types
pub use install::{InstallOptions, InstallOutcome, ensure_installed};
pub use manifest::{FixtureManifestSource, HttpManifestSource, Manifest, ManifestSource, Release};
pub use resolve::{InstallSource, Resolution, ResolutionRequest, resolve};

// Type alias for convenience
pub type Result<T> = fluttercache_core::Result<T>;
