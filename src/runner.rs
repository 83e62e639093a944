//! Wrapper around the dashboard's npm test scripts.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;

use crate::config::TestSettings;

/// Which slice of the dashboard's Jest suites to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    Unit,
    Integration,
    E2e,
    All,
}

impl TestType {
    /// Parse the positional test-type argument.
    ///
    /// Validated by hand rather than as a clap value enum: an unknown type
    /// must exit 1 like every other runner failure, and clap usage errors
    /// exit 2.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "unit" => Ok(Self::Unit),
            "integration" => Ok(Self::Integration),
            "e2e" => Ok(Self::E2e),
            "all" => Ok(Self::All),
            other => bail!("unknown test type '{other}' (expected unit, integration, e2e or all)"),
        }
    }

    fn npm_args(self) -> &'static [&'static str] {
        match self {
            Self::All => &["test"],
            Self::Unit => &["run", "test:unit"],
            Self::Integration => &["run", "test:integration"],
            Self::E2e => &["run", "test:e2e"],
        }
    }
}

pub struct RunnerOptions {
    pub test_type: String,
    pub test_path: Option<PathBuf>,
    pub coverage: bool,
    pub watch: bool,
    pub verbose: bool,
    pub check_only: bool,
}

/// Validate, check prerequisites, then run the selected suite with streamed
/// output. Ok only when the child exited 0.
pub async fn run(root: &Path, settings: &TestSettings, opts: RunnerOptions) -> Result<()> {
    let test_type = TestType::parse(&opts.test_type)?;
    if opts.coverage && test_type != TestType::All {
        bail!("--coverage runs the whole suite; combine it with the 'all' test type");
    }

    check_prerequisites(root, settings).await?;
    if opts.check_only {
        println!("Test prerequisites OK.");
        return Ok(());
    }

    let mut command = Command::new("npm");
    command.current_dir(root);
    if opts.coverage {
        command.args(["run", "test:coverage"]);
    } else {
        command.args(test_type.npm_args());
    }

    let mut extra: Vec<String> = Vec::new();
    if let Some(path) = &opts.test_path {
        extra.push(path.display().to_string());
    }
    if opts.verbose {
        extra.push("--verbose".to_string());
    }
    if opts.watch {
        extra.push("--watch".to_string());
    }
    if !extra.is_empty() {
        command.arg("--");
        command.args(&extra);
    }

    println!("Executing: {}", render(&command));

    // Test output streams straight to the terminal.
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let status = command.status().await.context("failed to launch npm")?;
    match status.code() {
        Some(0) => {
            println!("\nAll tests passed.");
            Ok(())
        }
        Some(code) => bail!("tests failed (npm exited with code {code})"),
        None => bail!("test run terminated by a signal"),
    }
}

/// Everything the suites need, checked before any child is spawned. Files
/// first so the answer does not depend on the environment, then npm itself.
async fn check_prerequisites(root: &Path, settings: &TestSettings) -> Result<()> {
    let files = [
        ("package.json", root.join("package.json")),
        ("Jest config", settings.jest_config.clone()),
        ("test setup file", settings.setup_file.clone()),
    ];
    for (what, path) in files {
        if !path.exists() {
            bail!("{what} not found at {}", path.display());
        }
    }

    let probe = Command::new("npm")
        .arg("--version")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;
    match probe {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            println!("npm {version}");
            Ok(())
        }
        _ => bail!("npm is not installed or not on PATH; install Node.js from https://nodejs.org/"),
    }
}

fn render(command: &Command) -> String {
    let std_command = command.as_std();
    let mut rendered = std_command.get_program().to_string_lossy().into_owned();
    for arg in std_command.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashdevConfig;

    #[test]
    fn parses_known_test_types() {
        assert_eq!(TestType::parse("unit").unwrap(), TestType::Unit);
        assert_eq!(TestType::parse("integration").unwrap(), TestType::Integration);
        assert_eq!(TestType::parse("e2e").unwrap(), TestType::E2e);
        assert_eq!(TestType::parse("all").unwrap(), TestType::All);
    }

    #[test]
    fn rejects_unknown_test_types() {
        assert!(TestType::parse("bogus").is_err());
        assert!(TestType::parse("Unit").is_err());
        assert!(TestType::parse("").is_err());
    }

    #[test]
    fn npm_args_select_the_right_script() {
        assert_eq!(TestType::All.npm_args(), &["test"]);
        assert_eq!(TestType::Unit.npm_args(), &["run", "test:unit"]);
        assert_eq!(TestType::E2e.npm_args(), &["run", "test:e2e"]);
    }

    #[tokio::test]
    async fn missing_package_json_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let settings = DashdevConfig::default().test_settings(dir.path());

        let err = check_prerequisites(dir.path(), &settings)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("package.json"));
    }

    #[tokio::test]
    async fn missing_jest_config_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        let settings = DashdevConfig::default().test_settings(dir.path());

        let err = check_prerequisites(dir.path(), &settings)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Jest config"));
    }

    #[tokio::test]
    async fn missing_setup_file_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("jest.config.js"), "module.exports = {};").unwrap();
        let settings = DashdevConfig::default().test_settings(dir.path());

        let err = check_prerequisites(dir.path(), &settings)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("setup file"));
    }
}
