//! Step outputs
//!
//! Every run prints `KEY=value` lines to stdout. On a CI runner the same lines
//! are appended to the `GITHUB_OUTPUT` file and the SDK `bin` directory to
//! the `GITHUB_PATH` file.

use fluttercache_core::{FluttercacheError, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Resolved values reported to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutputs {
    pub channel: String,
    pub version: String,
    pub architecture: String,
    pub cache_key: String,
    pub cache_path: String,
}

impl StepOutputs {
    /// `KEY=value` lines in their fixed order
    pub fn lines(&self) -> Vec<String> {
        [
            ("CHANNEL", &self.channel),
            ("VERSION", &self.version),
            ("ARCHITECTURE", &self.architecture),
            ("CACHE-KEY", &self.cache_key),
            ("CACHE-PATH", &self.cache_path),
        ]
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
    }
}

pub fn print_lines<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Appends `lines` to `path`, creating the file if needed
pub fn append_lines(path: &Path, lines: &[String]) -> Result<()> {
    let write = || -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        print_lines(&mut file, lines)
    };

    write().map_err(|e| FluttercacheError::OutputWriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
