//! Test utilities for fluttercache
//!
//! This crate provides shared testing utilities used across the fluttercache
//! workspace: workspace-local temp directories, fake SDK archives, fake git
//! binaries and fixture manifests.

pub mod fixtures;

pub use fixtures::{
    SdkArchiveFormat, create_fake_sdk_archive, sample_manifest_json, write_fixture_manifest,
};

#[cfg(unix)]
pub use fixtures::create_fake_git;

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// This keeps test scratch files in one gitignored place that is easy to
/// clean up manually if a test aborts.
///
/// # Panics
///
/// Panics if the current directory cannot be determined or the directory
/// cannot be created.
///
/// # Examples
///
/// ```rust
/// use fluttercache_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("test.txt");
/// std::fs::write(&file_path, "test data").unwrap();
/// // Cleanup happens automatically when temp is dropped
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");

    let tmp_base = workspace_root.join(".tmp");

    // Ensure .tmp/ exists
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");

    // Create unique subdirectory within .tmp/
    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}
