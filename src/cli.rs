use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Developer tooling for the weekly analytics dashboard.
///
/// `dashdev` bundles the development file server (static hosting plus
/// automatic regeneration of the derived week data) with a wrapper around
/// the dashboard's JavaScript test suites.
#[derive(Parser, Debug)]
#[command(
    name = "dashdev",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the dashboard for development.
    ///
    /// Hosts the site root as static files, watches the weekly data directory
    /// and re-runs the regeneration script after a quiet period, and exposes
    /// `GET /api/update-weeks` to trigger a regeneration on demand.
    Serve {
        /// Project root containing `dashdev.toml`, the site, and the data directory.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Run the regeneration script once and exit with its status.
    Update {
        /// Project root containing `dashdev.toml` and the script.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Run the dashboard's JavaScript test suites via npm.
    ///
    /// Checks prerequisites (npm on PATH, package.json, Jest config, test
    /// setup file) before spawning anything; a missing prerequisite exits 1
    /// without running tests.
    Test {
        /// Which suite to run: unit, integration, e2e or all.
        test_type: String,

        /// Restrict the run to a single test file or directory.
        test_path: Option<PathBuf>,

        /// Project root containing package.json.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Generate a coverage report (whole suite only).
        #[arg(long)]
        coverage: bool,

        /// Re-run tests when files change.
        #[arg(long)]
        watch: bool,

        /// Show individual test results.
        #[arg(long)]
        verbose: bool,

        /// Check prerequisites and exit without running any tests.
        #[arg(long)]
        check: bool,
    },
}
