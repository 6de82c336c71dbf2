use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FluttercacheError {
    // Environment errors
    #[error("ENV_MISSING: required environment variable {0} is not set")]
    EnvMissing(String),

    #[error("OS_UNSUPPORTED: unsupported runner OS '{0}'")]
    UnsupportedOs(String),

    // Resolution errors
    #[error(
        "VERSION_NOT_FOUND: Unable to determine Flutter version for channel: {channel} version: {version} architecture: {arch}"
    )]
    VersionNotFound {
        channel: String,
        version: String,
        arch: String,
    },

    // Manifest errors
    #[error("MANIFEST_FETCH_FAILED: {0}")]
    ManifestFetchFailed(String),

    #[error("MANIFEST_INVALID: {0}")]
    ManifestInvalid(String),

    // Install errors
    #[error("SDK_INSTALL_FAILED: {0}")]
    InstallFailed(String),

    #[error("SDK_CLONE_FAILED: {0}")]
    CloneFailed(String),

    // Output errors
    #[error("OUTPUT_WRITE_FAILED: failed to append to {path}: {reason}")]
    OutputWriteFailed { path: PathBuf, reason: String },

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for FluttercacheError {
    fn from(err: serde_json::Error) -> Self {
        FluttercacheError::ManifestInvalid(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, FluttercacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_found_names_all_inputs() {
        let err = FluttercacheError::VersionNotFound {
            channel: "beta".to_string(),
            version: "9.9".to_string(),
            arch: "arm64".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("VERSION_NOT_FOUND"));
        assert!(msg.contains("channel: beta"));
        assert!(msg.contains("version: 9.9"));
        assert!(msg.contains("architecture: arm64"));
    }

    #[test]
    fn test_json_error_maps_to_manifest_invalid() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FluttercacheError = json_err.into();
        assert!(matches!(err, FluttercacheError::ManifestInvalid(_)));
    }

    #[test]
    fn test_every_variant_has_error_code() {
        let errors = [
            FluttercacheError::EnvMissing("RUNNER_OS".to_string()),
            FluttercacheError::UnsupportedOs("Plan9".to_string()),
            FluttercacheError::ManifestFetchFailed("timeout".to_string()),
            FluttercacheError::ManifestInvalid("bad json".to_string()),
            FluttercacheError::InstallFailed("disk full".to_string()),
            FluttercacheError::CloneFailed("exit 128".to_string()),
            FluttercacheError::OutputWriteFailed {
                path: PathBuf::from("/out"),
                reason: "denied".to_string(),
            },
            FluttercacheError::IoError(std::io::Error::other("boom")),
        ];

        for err in errors {
            let msg = err.to_string();
            let code = msg.split(':').next().unwrap_or_default();
            assert!(
                !code.is_empty() && code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "missing error code in: {}",
                msg
            );
        }
    }
}
