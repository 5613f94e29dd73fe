use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pomo_cli::commands::{pause, start, status, summary};
use pomo_cli::{Backend, Cli, Commands, Config};
use pomo_core::{CancellationToken, IntervalConfig, MemoryRepository, Repository};
use pomo_db::SqliteRepository;

/// Opens the configured repository, ensuring the database directory exists.
fn open_repository(config: &Config) -> Result<Arc<dyn Repository>> {
    match config.backend {
        Backend::Memory => Ok(Arc::new(MemoryRepository::new())),
        Backend::Sqlite => {
            if let Some(parent) = config.database_path.parent() {
                std::fs::create_dir_all(parent).context("failed to create database directory")?;
            }
            let repo = SqliteRepository::open(&config.database_path).with_context(|| {
                format!("failed to open {}", config.database_path.display())
            })?;
            Ok(Arc::new(repo))
        }
    }
}

/// Load config and build the interval configuration for this session.
fn open_session(cli: &Cli) -> Result<IntervalConfig> {
    let config = Config::load_from(cli.config.as_deref(), &cli.overrides())
        .context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let (pomodoro, short_break, long_break) =
        config.durations().context("invalid interval duration")?;
    let repo = open_repository(&config)?;
    Ok(IntervalConfig::new(repo, pomodoro, short_break, long_break))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout();
    match &cli.command {
        Some(Commands::Start) => {
            let config = open_session(&cli)?;
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_signal.cancel();
                }
            });
            start::run(&mut stdout, &config, &cancel).await?;
        }
        Some(Commands::Pause) => {
            let config = open_session(&cli)?;
            pause::run(&mut stdout, &config)?;
        }
        Some(Commands::Status) => {
            let config = open_session(&cli)?;
            status::run(&mut stdout, config.repo())?;
        }
        Some(Commands::Summary { day }) => {
            let config = open_session(&cli)?;
            let day = day.unwrap_or_else(|| chrono::Utc::now().date_naive());
            summary::run(&mut stdout, config.repo(), day)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
