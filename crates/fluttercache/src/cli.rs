//! CLI argument structure using clap

use clap::Parser;
use fluttercache_sdk::install::DEFAULT_GIT;
use fluttercache_sdk::manifest::DEFAULT_MANIFEST_BASE_URL;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fluttercache")]
#[command(about = "Resolve, cache and install the Flutter SDK for CI runs", long_about = None)]
// `--version` selects the Flutter version
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Release channel (stable, beta, master, or a branch with --repo-url)
    pub channel: Option<String>,

    /// Flutter version (e.g. "3.22.1", "v3.22" or "any")
    #[arg(short = 'n', long)]
    pub version: Option<String>,

    /// Target architecture (e.g. x64, arm64)
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Cache path template for the Flutter installation
    #[arg(short, long)]
    pub cache_path: Option<String>,

    /// Cache key template for the Flutter installation
    #[arg(short = 'k', long)]
    pub cache_key: Option<String>,

    /// Resolve and report only, do not install
    #[arg(short, long)]
    pub print_only: bool,

    /// Read the manifest from the fixture directory and skip CI output files
    #[arg(short, long)]
    pub test_mode: bool,

    /// Clone this git repository instead of downloading a release archive
    #[arg(short, long)]
    pub repo_url: Option<String>,

    /// Directory holding releases_<os>.json fixtures for test mode
    #[arg(long, env = "FLUTTERCACHE_FIXTURE_DIR", default_value = "test")]
    pub fixture_dir: PathBuf,

    /// Base URL of the published release manifests
    #[arg(long, env = "FLUTTERCACHE_MANIFEST_BASE_URL", default_value = DEFAULT_MANIFEST_BASE_URL)]
    pub manifest_base_url: String,

    /// git executable used for source checkouts
    #[arg(long, env = "FLUTTERCACHE_GIT", default_value = DEFAULT_GIT)]
    pub git: OsString,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
