mod cli;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use zivpn_core::{AppCore, Settings};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    if let Some(dir) = &cli.dir {
        settings.paths.config_root = dir.clone();
    }

    let _guard = init_logging(&settings, cli.verbose);
    tracing::debug!(config_root = %settings.paths.config_root.display(), "zivpn CLI starting");

    let core = AppCore::new(settings);
    let result = match cli.command {
        Commands::User { command } => commands::user::run(&core, command, cli.format).await,
        Commands::Backup { command } => commands::backup::run(&core, command, cli.format).await,
        Commands::Info => commands::info::run(&core, cli.format),
    };

    core.settle_restarts().await;
    result
}

/// Log to a daily file under the log directory; cron runs leave a trail
/// there without touching stdout.
fn init_logging(settings: &Settings, verbose: bool) -> WorkerGuard {
    let appender = std::fs::create_dir_all(&settings.paths.log_dir)
        .ok()
        .and_then(|_| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("zivpn")
                .filename_suffix("log")
                .build(&settings.paths.log_dir)
                .ok()
        });
    let (writer, guard) = match appender {
        Some(appender) => tracing_appender::non_blocking(appender),
        // Unprivileged runs cannot write the system log directory.
        None => tracing_appender::non_blocking(std::io::sink()),
    };

    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    guard
}
