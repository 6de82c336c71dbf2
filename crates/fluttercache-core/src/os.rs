use crate::error::{FluttercacheError, Result};
use std::fmt;

/// Operating system family of the CI runner, as reported by `RUNNER_OS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    MacOS,
    Windows,
}

impl HostOs {
    /// Parses a runner OS name (`Linux`, `macOS`, `Windows`), case-insensitively.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(HostOs::Linux),
            "macos" => Ok(HostOs::MacOS),
            "windows" => Ok(HostOs::Windows),
            _ => Err(FluttercacheError::UnsupportedOs(name.to_string())),
        }
    }

    /// Lower-case name used in manifest file names and the `:os:` placeholder.
    pub fn as_str(self) -> &'static str {
        match self {
            HostOs::Linux => "linux",
            HostOs::MacOS => "macos",
            HostOs::Windows => "windows",
        }
    }

    pub fn is_windows(self) -> bool {
        self == HostOs::Windows
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runner_os_names() {
        assert_eq!(HostOs::parse("Linux").unwrap(), HostOs::Linux);
        assert_eq!(HostOs::parse("macOS").unwrap(), HostOs::MacOS);
        assert_eq!(HostOs::parse("Windows").unwrap(), HostOs::Windows);
    }

    #[test]
    fn test_parse_unknown_os_fails() {
        let err = HostOs::parse("plan9").unwrap_err();
        assert!(err.to_string().contains("plan9"));
    }

    #[test]
    fn test_as_str_is_lowercase() {
        assert_eq!(HostOs::MacOS.as_str(), "macos");
        assert_eq!(HostOs::Windows.to_string(), "windows");
    }

    #[test]
    fn test_only_windows_is_windows() {
        assert!(HostOs::Windows.is_windows());
        assert!(!HostOs::Linux.is_windows());
        assert!(!HostOs::MacOS.is_windows());
    }
}
