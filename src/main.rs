mod cli;
mod config;
mod matcher;
mod runner;
mod server;
mod update;
mod watcher;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::DashdevConfig;
use update::Updater;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { root } => {
            let config = DashdevConfig::load(&root);
            let mut settings = config.server_settings(&root);
            if let Some(port) = config::port_from_env() {
                settings.port = port;
            }
            server::serve(settings).await
        }

        Commands::Update { root } => {
            let config = DashdevConfig::load(&root);
            let settings = config.server_settings(&root);
            let invocation = Updater::new(settings.update_script).run().await;
            print!("{}", invocation.stdout);
            match invocation.exit_code {
                Some(0) => Ok(()),
                Some(code) => anyhow::bail!("regeneration script exited with code {code}"),
                None => anyhow::bail!(
                    "regeneration script failed to run: {}",
                    invocation.stderr.trim()
                ),
            }
        }

        Commands::Test {
            test_type,
            test_path,
            root,
            coverage,
            watch,
            verbose,
            check,
        } => {
            let config = DashdevConfig::load(&root);
            let settings = config.test_settings(&root);
            runner::run(
                &root,
                &settings,
                runner::RunnerOptions {
                    test_type,
                    test_path,
                    coverage,
                    watch,
                    verbose,
                    check_only: check,
                },
            )
            .await
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}
