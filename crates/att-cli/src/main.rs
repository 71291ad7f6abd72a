use std::path::Path;

use anyhow::{Context, Result};
use att_cli::commands::{day, edit, records, report, status, timeline, util};
use att_cli::{Cli, Commands, Config};
use att_core::Directory;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Load config and the attendance data it points to.
fn load_data(config_path: Option<&Path>, data_path: Option<&Path>) -> Result<(Directory, Config)> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    if let Some(path) = data_path {
        config.data_path = path.to_path_buf();
    }
    tracing::debug!(?config, "loaded configuration");

    let directory = util::load_directory(&config.data_path)?;
    Ok((directory, config))
}

fn main() -> Result<()> {
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

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (directory, config) = load_data(cli.config.as_deref(), cli.data.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Timeline(args) => timeline::run(&mut stdout, &directory, args, &config)?,
        Commands::Day(args) => day::run(&mut stdout, &directory, args, &config)?,
        Commands::Records(args) => records::run(&mut stdout, &directory, args, &config)?,
        Commands::Report(args) => report::run(&mut stdout, &directory, args, &config)?,
        Commands::Status(args) => status::run(&mut stdout, &directory, args, &config)?,
        Commands::Edit(args) => edit::run(&mut stdout, &directory, args, &config)?,
    }

    Ok(())
}
