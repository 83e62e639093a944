use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Fallback when neither `PORT` nor `dashdev.toml` sets one.
pub const DEFAULT_PORT: u16 = 3000;

/// Quiet period between the last data-file change and a regeneration run.
pub const DEFAULT_QUIET_MS: u64 = 2000;

/// Configuration loaded from `dashdev.toml` at the project root.
///
/// All keys are optional; [`server_settings`](DashdevConfig::server_settings)
/// and [`test_settings`](DashdevConfig::test_settings) apply the defaults and
/// anchor relative paths at the project root.
#[derive(Debug, Deserialize, Default)]
pub struct DashdevConfig {
    /// Port the dev server listens on (overridden by the `PORT` env var).
    pub port: Option<u16>,
    /// Directory served as static files. Defaults to the project root itself.
    pub site_root: Option<PathBuf>,
    /// Directory of weekly CSV files to watch. Defaults to `data/`.
    pub data_dir: Option<PathBuf>,
    /// Executable that rewrites the derived weeks artifact. Defaults to
    /// `scripts/update-weeks`.
    pub update_script: Option<PathBuf>,
    /// Quiet period in milliseconds before a regeneration fires.
    pub quiet_ms: Option<u64>,
    #[serde(default)]
    pub test: TestConfig,
}

/// `[test]` table: where the test runner looks for its prerequisites.
#[derive(Debug, Deserialize, Default)]
pub struct TestConfig {
    /// Jest configuration file. Defaults to `jest.config.js`.
    pub jest_config: Option<PathBuf>,
    /// Jest setup file. Defaults to `tests/setup.js`.
    pub setup_file: Option<PathBuf>,
}

/// Fully-resolved dev-server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub site_root: PathBuf,
    pub data_dir: PathBuf,
    pub update_script: PathBuf,
    pub quiet: Duration,
}

/// Fully-resolved test-runner settings.
#[derive(Debug, Clone)]
pub struct TestSettings {
    pub jest_config: PathBuf,
    pub setup_file: PathBuf,
}

impl DashdevConfig {
    /// Load configuration from `dashdev.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or
    /// cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join("dashdev.toml");

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("warning: failed to parse dashdev.toml: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("warning: failed to read dashdev.toml: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Resolve server settings against the project root.
    pub fn server_settings(&self, root: &Path) -> ServerSettings {
        ServerSettings {
            port: self.port.unwrap_or(DEFAULT_PORT),
            site_root: anchored(root, self.site_root.as_deref().unwrap_or(Path::new("."))),
            data_dir: anchored(root, self.data_dir.as_deref().unwrap_or(Path::new("data"))),
            update_script: anchored(
                root,
                self.update_script
                    .as_deref()
                    .unwrap_or(Path::new("scripts/update-weeks")),
            ),
            quiet: Duration::from_millis(self.quiet_ms.unwrap_or(DEFAULT_QUIET_MS)),
        }
    }

    /// Resolve test-runner settings against the project root.
    pub fn test_settings(&self, root: &Path) -> TestSettings {
        TestSettings {
            jest_config: anchored(
                root,
                self.test
                    .jest_config
                    .as_deref()
                    .unwrap_or(Path::new("jest.config.js")),
            ),
            setup_file: anchored(
                root,
                self.test
                    .setup_file
                    .as_deref()
                    .unwrap_or(Path::new("tests/setup.js")),
            ),
        }
    }
}

/// `PORT` environment override for the dev server.
pub fn port_from_env() -> Option<u16> {
    let raw = std::env::var("PORT").ok()?;
    match raw.parse() {
        Ok(port) => Some(port),
        Err(_) => {
            eprintln!("warning: ignoring unparsable PORT value '{raw}'");
            None
        }
    }
}

/// Join `path` onto `root` unless it is already absolute.
fn anchored(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashdevConfig::load(dir.path());
        let settings = config.server_settings(dir.path());

        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.quiet, Duration::from_millis(DEFAULT_QUIET_MS));
        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.update_script, dir.path().join("scripts/update-weeks"));
    }

    #[test]
    fn unparsable_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dashdev.toml"), "port = \"not a number").unwrap();

        let config = DashdevConfig::load(dir.path());
        let settings = config.server_settings(dir.path());
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn configured_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dashdev.toml"),
            r#"
port = 8080
data_dir = "weeks"
update_script = "tools/regen"
quiet_ms = 500

[test]
jest_config = "jest.config.mjs"
"#,
        )
        .unwrap();

        let config = DashdevConfig::load(dir.path());
        let settings = config.server_settings(dir.path());
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.data_dir, dir.path().join("weeks"));
        assert_eq!(settings.update_script, dir.path().join("tools/regen"));
        assert_eq!(settings.quiet, Duration::from_millis(500));

        let test_settings = config.test_settings(dir.path());
        assert_eq!(test_settings.jest_config, dir.path().join("jest.config.mjs"));
        assert_eq!(test_settings.setup_file, dir.path().join("tests/setup.js"));
    }

    #[test]
    fn absolute_paths_are_kept_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashdevConfig {
            update_script: Some(PathBuf::from("/usr/local/bin/regen")),
            ..Default::default()
        };
        let settings = config.server_settings(dir.path());
        assert_eq!(settings.update_script, PathBuf::from("/usr/local/bin/regen"));
    }
}
