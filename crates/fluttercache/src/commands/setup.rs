//! Setup pipeline: resolve → expand → report → install

use crate::cli::Cli;
use crate::output::{self, StepOutputs};
use anyhow::Result;
use fluttercache_core::{FluttercacheError, RunnerEnv};
use fluttercache_sdk::install::{InstallOptions, InstallOutcome, bin_dir, ensure_installed};
use fluttercache_sdk::manifest::{FixtureManifestSource, HttpManifestSource, ManifestSource};
use fluttercache_sdk::resolve::{ResolutionRequest, resolve};
use fluttercache_sdk::template::{
    DEFAULT_CACHE_KEY_TEMPLATE, expand_cache_key, expand_cache_path,
};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything the pipeline needs from the command line
#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub request: ResolutionRequest,
    pub cache_path_template: Option<String>,
    pub cache_key_template: Option<String>,
    pub print_only: bool,
    pub test_mode: bool,
    pub fixture_dir: PathBuf,
    pub manifest_base_url: String,
    pub git: OsString,
}

impl SetupOptions {
    pub fn from_cli(cli: Cli) -> Self {
        let request = ResolutionRequest::new(
            cli.channel.as_deref().unwrap_or_default(),
            cli.version.as_deref().unwrap_or_default(),
            cli.arch.as_deref().unwrap_or_default(),
            cli.repo_url.as_deref(),
        );

        Self {
            request,
            cache_path_template: non_empty(cli.cache_path),
            cache_key_template: non_empty(cli.cache_key),
            print_only: cli.print_only,
            test_mode: cli.test_mode,
            fixture_dir: cli.fixture_dir,
            manifest_base_url: cli.manifest_base_url,
            git: cli.git,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub outputs: StepOutputs,
    /// `None` in print-only mode
    pub install: Option<InstallOutcome>,
}

/// Entry point for the binary
pub fn run(cli: Cli) -> Result<()> {
    let options = SetupOptions::from_cli(cli);
    let env = RunnerEnv::from_env()?;

    let mut stdout = io::stdout().lock();
    let report = execute(&options, &env, &mut stdout)?;
    debug!(
        cache_path = %report.outputs.cache_path,
        install = ?report.install,
        "Setup complete"
    );
    Ok(())
}

/// Runs the pipeline against an explicit environment, writing outputs to `out`
pub fn execute<W: Write>(
    options: &SetupOptions,
    env: &RunnerEnv,
    out: &mut W,
) -> fluttercache_core::Result<SetupReport> {
    let cache_path_template = match &options.cache_path_template {
        Some(template) => template.clone(),
        None => env.default_cache_path_template()?,
    };
    let cache_key_template = options
        .cache_key_template
        .as_deref()
        .unwrap_or(DEFAULT_CACHE_KEY_TEMPLATE);

    let source = manifest_source(options, env)?;
    let resolution = resolve(&options.request, source.as_ref(), &options.manifest_base_url)?;
    let release = &resolution.release;

    let outputs = StepOutputs {
        channel: release.channel.clone(),
        version: release.version.clone(),
        architecture: release.arch().to_string(),
        cache_key: expand_cache_key(cache_key_template, release, env.os),
        cache_path: expand_cache_path(&cache_path_template, release, env.os),
    };

    let lines = outputs.lines();
    output::print_lines(out, &lines)?;
    if !options.test_mode {
        output::append_lines(env.github_output()?, &lines)?;
    }

    if options.print_only {
        debug!("Print-only mode, skipping install");
        return Ok(SetupReport {
            outputs,
            install: None,
        });
    }

    let cache_dir = PathBuf::from(&outputs.cache_path);
    let install_options = InstallOptions {
        cache_dir: cache_dir.clone(),
        scratch_dir: env.runner_temp()?.to_path_buf(),
        git: options.git.clone(),
    };
    let outcome = ensure_installed(&resolution, &install_options)?;

    if !options.test_mode {
        let bin = bin_dir(&cache_dir);
        output::append_lines(env.github_path()?, &[bin.display().to_string()])?;
        info!(path = %bin.display(), "Added Flutter to PATH");
    }

    Ok(SetupReport {
        outputs,
        install: Some(outcome),
    })
}

fn manifest_source(
    options: &SetupOptions,
    env: &RunnerEnv,
) -> fluttercache_core::Result<Box<dyn ManifestSource>> {
    if options.test_mode {
        let source = FixtureManifestSource::for_os(fixture_dir(&options.fixture_dir), env.os);
        return Ok(Box::new(source));
    }

    let source = HttpManifestSource::for_os(&options.manifest_base_url, env.os)
        .map_err(FluttercacheError::from)?;
    Ok(Box::new(source))
}

fn fixture_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluttercache_sdk::install::tool_path;
    use fluttercache_testkit::{
        SdkArchiveFormat, create_fake_sdk_archive, sample_manifest_json, temp_dir_in_workspace,
        write_fixture_manifest,
    };
    use mockito::Server;
    use std::collections::HashMap;
    use std::fs;

    fn options(fixture_dir: &Path, channel: &str, version: &str, arch: &str) -> SetupOptions {
        SetupOptions {
            request: ResolutionRequest::new(channel, version, arch, None),
            cache_path_template: None,
            cache_key_template: None,
            print_only: true,
            test_mode: true,
            fixture_dir: fixture_dir.to_path_buf(),
            manifest_base_url: "http://127.0.0.1:9".to_string(),
            git: OsString::from("definitely-not-a-git-binary"),
        }
    }

    fn runner_env(os: &str, root: &Path, extra: &[(&str, String)]) -> RunnerEnv {
        let mut map: HashMap<String, String> = HashMap::new();
        map.insert("RUNNER_OS".into(), os.into());
        map.insert("RUNNER_TEMP".into(), root.join("runner").display().to_string());
        map.insert("HOME".into(), root.join("home").display().to_string());
        for (k, v) in extra {
            map.insert(k.to_string(), v.clone());
        }
        RunnerEnv::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    fn run_to_string(options: &SetupOptions, env: &RunnerEnv) -> (SetupReport, String) {
        let mut out = Vec::new();
        let report = execute(options, env, &mut out).unwrap();
        (report, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_print_only_reports_resolved_release() {
        let temp = temp_dir_in_workspace();
        let fixtures = temp.path().join("fixtures");
        write_fixture_manifest(&fixtures, "linux", &sample_manifest_json("https://example.com"));

        let env = runner_env("Linux", temp.path(), &[]);
        let (report, stdout) = run_to_string(&options(&fixtures, "stable", "3.22", "x64"), &env);

        assert_eq!(report.install, None);
        assert_eq!(report.outputs.version, "3.22.1");
        assert!(stdout.contains("CHANNEL=stable\n"));
        assert!(stdout.contains("VERSION=3.22.1\n"));
        assert!(stdout.contains("ARCHITECTURE=x64\n"));
        assert!(stdout.contains("CACHE-KEY=flutter-linux-stable-3.22.1-x64-s3\n"));
        assert!(stdout.contains(&format!(
            "CACHE-PATH={}/runner/flutter/stable-3.22.1-x64\n",
            temp.path().display()
        )));
    }

    #[test]
    fn test_custom_templates() {
        let temp = temp_dir_in_workspace();
        let fixtures = temp.path().join("fixtures");
        write_fixture_manifest(&fixtures, "macos", &sample_manifest_json("https://example.com"));

        let mut opts = options(&fixtures, "stable", "any", "ARM64");
        opts.cache_key_template = Some("key-:os:-:hash:-:sha256:".to_string());
        opts.cache_path_template = Some("/opt/:channel:/:arch:".to_string());

        let env = runner_env("macOS", temp.path(), &[]);
        let (report, _) = run_to_string(&opts, &env);

        assert_eq!(report.outputs.architecture, "arm64");
        assert_eq!(report.outputs.cache_key, "key-macos-s3arm-stable-arm64");
        assert_eq!(report.outputs.cache_path, "/opt/stable/arm64");
    }

    #[test]
    fn test_windows_cache_path_transform() {
        let temp = temp_dir_in_workspace();
        let fixtures = temp.path().join("fixtures");
        write_fixture_manifest(&fixtures, "windows", &sample_manifest_json("https://example.com"));

        let mut opts = options(&fixtures, "stable", "", "");
        opts.cache_path_template = Some("/flutter/:channel:-:version:-:arch:".to_string());

        let env = runner_env("Windows", temp.path(), &[]);
        let (report, _) = run_to_string(&opts, &env);

        assert_eq!(report.outputs.cache_path, "flutter\\stable-3.22.1-x64");
    }

    #[test]
    fn test_use_cache_false_defaults_under_home() {
        let temp = temp_dir_in_workspace();
        let fixtures = temp.path().join("fixtures");
        write_fixture_manifest(&fixtures, "linux", &sample_manifest_json("https://example.com"));

        let env = runner_env("Linux", temp.path(), &[("USE_CACHE", "false".to_string())]);
        let (report, _) = run_to_string(&options(&fixtures, "beta", "any", "x64"), &env);

        assert_eq!(
            report.outputs.cache_path,
            format!("{}/home/_flutter/beta-3.23.0-0.1.pre-x64", temp.path().display())
        );
    }

    #[test]
    fn test_no_matching_release_fails() {
        let temp = temp_dir_in_workspace();
        let fixtures = temp.path().join("fixtures");
        write_fixture_manifest(&fixtures, "linux", &sample_manifest_json("https://example.com"));

        let env = runner_env("Linux", temp.path(), &[]);
        let mut out = Vec::new();
        let err = execute(&options(&fixtures, "beta", "9.9", "arm64"), &env, &mut out).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("beta"));
        assert!(message.contains("9.9"));
        assert!(message.contains("arm64"));
        assert!(out.is_empty(), "nothing should be reported on failure");
    }

    #[test]
    fn test_master_bypasses_missing_fixture() {
        let temp = temp_dir_in_workspace();
        let env = runner_env("Linux", temp.path(), &[]);

        let (report, stdout) =
            run_to_string(&options(&temp.path().join("nowhere"), "master", "", ""), &env);

        assert_eq!(report.outputs.version, "master");
        assert!(stdout.contains("CACHE-KEY=flutter-linux-master-master-x64-master\n"));
    }

    #[test]
    fn test_ci_sinks_written_outside_test_mode() {
        let temp = temp_dir_in_workspace();
        let github_output = temp.path().join("github_output");
        let github_path = temp.path().join("github_path");
        let cache_dir = temp.path().join("sdk");
        fs::create_dir_all(bin_dir(&cache_dir)).unwrap();
        fs::write(tool_path(&cache_dir), "#!/bin/sh").unwrap();

        let env = runner_env(
            "Linux",
            temp.path(),
            &[
                ("GITHUB_OUTPUT", github_output.display().to_string()),
                ("GITHUB_PATH", github_path.display().to_string()),
            ],
        );
        let mut opts = options(temp.path(), "master", "", "");
        opts.test_mode = false;
        opts.print_only = false;
        opts.cache_path_template = Some(cache_dir.display().to_string());

        let (report, _) = run_to_string(&opts, &env);

        assert_eq!(report.install, Some(InstallOutcome::CacheHit));
        let written = fs::read_to_string(&github_output).unwrap();
        assert!(written.contains("CHANNEL=master\n"));
        assert!(written.contains(&format!("CACHE-PATH={}\n", cache_dir.display())));
        assert_eq!(
            fs::read_to_string(&github_path).unwrap(),
            format!("{}\n", cache_dir.join("bin").display())
        );
    }

    #[test]
    fn test_missing_github_output_is_fatal_outside_test_mode() {
        let temp = temp_dir_in_workspace();
        let env = runner_env("Linux", temp.path(), &[]);
        let mut opts = options(temp.path(), "master", "", "");
        opts.test_mode = false;

        let err = execute(&opts, &env, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, FluttercacheError::EnvMissing(ref key) if key == "GITHUB_OUTPUT"));
    }

    #[test]
    fn test_test_mode_installs_from_archive() {
        let temp = temp_dir_in_workspace();
        let archive = create_fake_sdk_archive(temp.path(), "sdk.tar.xz", SdkArchiveFormat::TarXz);

        let mut server = Server::new();
        let mock = server
            .mock("GET", "/stable/flutter_3.22.1-stable.tar.xz")
            .with_status(200)
            .with_body(fs::read(&archive).unwrap())
            .create();

        let fixtures = temp.path().join("fixtures");
        write_fixture_manifest(&fixtures, "linux", &sample_manifest_json(&server.url()));
        fs::create_dir_all(temp.path().join("runner")).unwrap();

        let mut opts = options(&fixtures, "stable", "3.22.1", "x64");
        opts.print_only = false;

        let env = runner_env("Linux", temp.path(), &[]);
        let (report, _) = run_to_string(&opts, &env);

        mock.assert();
        assert_eq!(report.install, Some(InstallOutcome::Extracted));
        assert!(tool_path(Path::new(&report.outputs.cache_path)).is_file());
    }
}
