//! Cache key and cache path templating
//!
//! Templates are plain strings containing `:name:` placeholders. Expansion is
//! literal substring replacement; replacement values are assumed not to
//! contain placeholders themselves.

use crate::manifest::Release;
use fluttercache_core::HostOs;

pub const CHANNEL_TOKEN: &str = ":channel:";
pub const VERSION_TOKEN: &str = ":version:";
pub const ARCH_TOKEN: &str = ":arch:";
pub const HASH_TOKEN: &str = ":hash:";
pub const SHA256_TOKEN: &str = ":sha256:";
pub const OS_TOKEN: &str = ":os:";

/// Cache key used when the caller does not provide one
pub const DEFAULT_CACHE_KEY_TEMPLATE: &str = "flutter-:os:-:channel:-:version:-:arch:-:hash:";

/// Replaces every placeholder in `template` with the matching release field
pub fn expand(template: &str, release: &Release, os: HostOs) -> String {
    [
        (CHANNEL_TOKEN, release.channel.as_str()),
        (VERSION_TOKEN, release.version.as_str()),
        (ARCH_TOKEN, release.arch()),
        (HASH_TOKEN, release.hash.as_str()),
        (SHA256_TOKEN, release.sha256.as_str()),
        (OS_TOKEN, os.as_str()),
    ]
    .into_iter()
    .fold(template.to_string(), |acc, (token, value)| {
        acc.replace(token, value)
    })
}

/// Converts a slash-separated template path into host-native form.
///
/// On Windows a single leading `/` is dropped and every `/` becomes `\`.
/// Other hosts get the path back unchanged.
pub fn transform_path(path: &str, os: HostOs) -> String {
    if !os.is_windows() {
        return path.to_string();
    }

    path.strip_prefix('/').unwrap_or(path).replace('/', "\\")
}

/// Expands a cache key template
pub fn expand_cache_key(template: &str, release: &Release, os: HostOs) -> String {
    expand(template, release, os)
}

/// Expands a cache path template; the host path transform runs first so
/// substituted values are left untouched
pub fn expand_cache_path(template: &str, release: &Release, os: HostOs) -> String {
    expand(&transform_path(template, os), release, os)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stable_release() -> Release {
        Release {
            channel: "stable".to_string(),
            version: "3.22.1".to_string(),
            architecture: None,
            hash: "a14f74ff3a1cbd521163c5f03d68113d50af93d3".to_string(),
            sha256: "abcdef".to_string(),
            archive: "stable/linux/flutter_linux_3.22.1-stable.tar.xz".to_string(),
        }
    }

    #[test]
    fn test_expand_all_tokens() {
        let release = stable_release();
        let expanded = expand(
            ":channel:|:version:|:arch:|:hash:|:sha256:|:os:",
            &release,
            HostOs::Linux,
        );
        assert_eq!(
            expanded,
            "stable|3.22.1|x64|a14f74ff3a1cbd521163c5f03d68113d50af93d3|abcdef|linux"
        );
    }

    #[test]
    fn test_expand_default_key() {
        let release = stable_release();
        assert_eq!(
            expand_cache_key(DEFAULT_CACHE_KEY_TEMPLATE, &release, HostOs::MacOS),
            "flutter-macos-stable-3.22.1-x64-a14f74ff3a1cbd521163c5f03d68113d50af93d3"
        );
    }

    #[test]
    fn test_expand_repeated_tokens() {
        let release = stable_release();
        assert_eq!(
            expand(":channel:/:channel:", &release, HostOs::Linux),
            "stable/stable"
        );
    }

    #[test]
    fn test_expand_uses_release_arch() {
        let mut release = stable_release();
        release.architecture = Some("arm64".to_string());
        assert_eq!(expand(":arch:", &release, HostOs::MacOS), "arm64");
    }

    #[test]
    fn test_expand_without_tokens_is_identity() {
        let release = stable_release();
        assert_eq!(expand("plain-key", &release, HostOs::Linux), "plain-key");
    }

    #[test]
    fn test_expand_is_idempotent() {
        let release = stable_release();
        let once = expand(DEFAULT_CACHE_KEY_TEMPLATE, &release, HostOs::Windows);
        let twice = expand(&once, &release, HostOs::Windows);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_expand_synthesized_release() {
        let release = Release::synthesized("master", "x64");
        assert_eq!(
            expand(DEFAULT_CACHE_KEY_TEMPLATE, &release, HostOs::Linux),
            "flutter-linux-master-master-x64-master"
        );
    }

    #[test]
    fn test_transform_path_windows() {
        assert_eq!(
            transform_path("/flutter/stable-any-x64", HostOs::Windows),
            "flutter\\stable-any-x64"
        );
    }

    #[test]
    fn test_transform_path_windows_strips_single_slash() {
        assert_eq!(transform_path("//share/sdk", HostOs::Windows), "\\share\\sdk");
    }

    #[test]
    fn test_transform_path_windows_relative() {
        assert_eq!(transform_path("D:/a/_temp/flutter", HostOs::Windows), "D:\\a\\_temp\\flutter");
    }

    #[test]
    fn test_transform_path_other_hosts_unchanged() {
        assert_eq!(
            transform_path("/flutter/stable-any-x64", HostOs::Linux),
            "/flutter/stable-any-x64"
        );
        assert_eq!(
            transform_path("/flutter/stable-any-x64", HostOs::MacOS),
            "/flutter/stable-any-x64"
        );
    }

    #[test]
    fn test_expand_cache_path_transforms_before_substitution() {
        let mut release = stable_release();
        release.version = "3.22/1".to_string();
        assert_eq!(
            expand_cache_path("/tmp/flutter/:channel:-:version:", &release, HostOs::Windows),
            "tmp\\flutter\\stable-3.22/1"
        );
    }
}
