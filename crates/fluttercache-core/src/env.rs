//! Runner environment configuration
//!
//! All values the CI runner passes through environment variables are gathered
//! once into a [`RunnerEnv`]. Library code only ever sees this struct, so the
//! pipeline can be driven deterministically from tests.

use crate::error::{FluttercacheError, Result};
use crate::os::HostOs;
use std::path::{Path, PathBuf};

pub const RUNNER_OS: &str = "RUNNER_OS";
pub const RUNNER_TEMP: &str = "RUNNER_TEMP";
pub const HOME: &str = "HOME";
pub const USE_CACHE: &str = "USE_CACHE";
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
pub const GITHUB_PATH: &str = "GITHUB_PATH";

/// Snapshot of the runner environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerEnv {
    /// Host operating system family (`RUNNER_OS`)
    pub os: HostOs,

    /// Scratch directory for downloads and extraction (`RUNNER_TEMP`)
    pub runner_temp: Option<PathBuf>,

    /// User home directory (`HOME`)
    pub home: Option<PathBuf>,

    /// `false` only when `USE_CACHE` is literally `false`
    pub use_cache: bool,

    /// Key/value output sink (`GITHUB_OUTPUT`)
    pub github_output: Option<PathBuf>,

    /// Search-path sink (`GITHUB_PATH`)
    pub github_path: Option<PathBuf>,
}

impl RunnerEnv {
    /// Builds the environment from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. `RUNNER_OS` is the only variable
    /// required up front; the others are checked when they are needed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let os_name =
            get(RUNNER_OS).ok_or_else(|| FluttercacheError::EnvMissing(RUNNER_OS.into()))?;
        let os = HostOs::parse(&os_name)?;

        Ok(Self {
            os,
            runner_temp: get(RUNNER_TEMP).map(PathBuf::from),
            home: get(HOME).map(PathBuf::from),
            use_cache: get(USE_CACHE).as_deref() != Some("false"),
            github_output: get(GITHUB_OUTPUT).map(PathBuf::from),
            github_path: get(GITHUB_PATH).map(PathBuf::from),
        })
    }

    /// Builds the environment from the current process environment.
    pub fn from_env() -> Result<Self> {
        let mut env = Self::from_lookup(|key| std::env::var(key).ok())?;
        if env.home.is_none() {
            env.home = dirs::home_dir();
        }
        Ok(env)
    }

    pub fn runner_temp(&self) -> Result<&Path> {
        require(self.runner_temp.as_deref(), RUNNER_TEMP)
    }

    pub fn home(&self) -> Result<&Path> {
        require(self.home.as_deref(), HOME)
    }

    pub fn github_output(&self) -> Result<&Path> {
        require(self.github_output.as_deref(), GITHUB_OUTPUT)
    }

    pub fn github_path(&self) -> Result<&Path> {
        require(self.github_path.as_deref(), GITHUB_PATH)
    }

    /// Cache path template used when the caller does not provide one.
    ///
    /// Lives under `RUNNER_TEMP`, or under `HOME` when `USE_CACHE=false` so the
    /// SDK survives outside the runner's scratch space.
    pub fn default_cache_path_template(&self) -> Result<String> {
        let base = if self.use_cache {
            format!("{}/flutter", self.runner_temp()?.display())
        } else {
            format!("{}/_flutter", self.home()?.display())
        };
        Ok(format!("{}/:channel:-:version:-:arch:", base))
    }
}

fn require<'a>(value: Option<&'a Path>, key: &str) -> Result<&'a Path> {
    value.ok_or_else(|| FluttercacheError::EnvMissing(key.to_string()))
}
