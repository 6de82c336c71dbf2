//! Source checkout via `git clone`

use crate::install::error::InstallError;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Program used when no explicit git binary is configured
pub const DEFAULT_GIT: &str = "git";

/// Clones `url` at `branch` into `dest`.
///
/// Runs `<git> clone -b <branch> <url> <dest>`. A branch that does not exist
/// in the repository surfaces as a non-zero exit.
pub fn clone_repository(
    git: &OsStr,
    url: &str,
    branch: &str,
    dest: &Path,
) -> Result<(), InstallError> {
    info!(%url, %branch, dest = %dest.display(), "Cloning Flutter repository");

    let output = Command::new(git)
        .arg("clone")
        .arg("-b")
        .arg(branch)
        .arg(url)
        .arg(dest)
        .output()
        .map_err(|e| InstallError::CloneFailed {
            url: url.to_string(),
            branch: branch.to_string(),
            reason: format!("failed to run {}: {}", git.to_string_lossy(), e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InstallError::CloneFailed {
            url: url.to_string(),
            branch: branch.to_string(),
            reason: match output.status.code() {
                Some(code) => format!("git exited with status {}: {}", code, stderr.trim()),
                None => format!("git terminated by signal: {}", stderr.trim()),
            },
        });
    }

    debug!(dest = %dest.display(), "Clone complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluttercache_testkit::temp_dir_in_workspace;

    #[test]
    fn test_clone_missing_git_binary_fails() {
        let temp = temp_dir_in_workspace();
        let err = clone_repository(
            OsStr::new("definitely-not-a-git-binary"),
            "https://example.com/flutter.git",
            "master",
            &temp.path().join("sdk"),
        )
        .unwrap_err();

        match err {
            InstallError::CloneFailed { url, branch, reason } => {
                assert_eq!(url, "https://example.com/flutter.git");
                assert_eq!(branch, "master");
                assert!(reason.contains("definitely-not-a-git-binary"));
            }
            other => panic!("Expected CloneFailed, got: {:?}", other),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_clone_nonzero_exit_fails() {
        let temp = temp_dir_in_workspace();
        let git = fluttercache_testkit::create_fake_git(temp.path(), false);

        let err = clone_repository(
            git.as_os_str(),
            "https://example.com/flutter.git",
            "no-such-branch",
            &temp.path().join("sdk"),
        )
        .unwrap_err();

        assert!(matches!(err, InstallError::CloneFailed { .. }));
        assert!(err.to_string().contains("no-such-branch"));
    }

    #[test]
    #[cfg(unix)]
    fn test_clone_passes_branch_url_and_destination() {
        let temp = temp_dir_in_workspace();
        let git = fluttercache_testkit::create_fake_git(temp.path(), true);
        let dest = temp.path().join("sdk");

        clone_repository(git.as_os_str(), "https://example.com/flutter.git", "beta", &dest)
            .unwrap();

        assert!(dest.join("bin").join("flutter").is_file());
        let args = std::fs::read_to_string(dest.join("clone-args")).unwrap();
        assert_eq!(
            args.trim(),
            format!("clone -b beta https://example.com/flutter.git {}", dest.display())
        );
    }
}
