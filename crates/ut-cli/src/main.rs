use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ut_cli::commands::{stats, status};
use ut_cli::{Cli, Commands, Config};

/// Load config from the default locations plus an optional explicit file.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Open the configured database for reading. A missing file is an error.
fn open_database(config: &Config) -> Result<ut_db::Database> {
    ut_db::Database::open_read_only(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support; stdout is reserved for reports
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

    match &cli.command {
        Some(Commands::Stats { period }) => {
            let config = load_config(cli.config.as_deref())?;
            // Resolve before touching the database so bad input never runs a query
            let plan = stats::StatsPlan::resolve(period, &config, Local::now())?;
            let db = open_database(&config)?;
            let mut stdout = std::io::stdout().lock();
            stats::run(&mut stdout, &db, &plan)?;
        }
        Some(Commands::Status) => {
            let config = load_config(cli.config.as_deref())?;
            let db = open_database(&config)?;
            let mut stdout = std::io::stdout().lock();
            status::run(&mut stdout, &db, &config.database_path)?;
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
