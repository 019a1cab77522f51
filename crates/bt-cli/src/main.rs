use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bt_cli::commands::{check, day, util, week};
use bt_cli::{Cli, Commands, Config};

/// Load and validate configuration.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    config
        .layout
        .validate()
        .context("invalid layout configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Day(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let loaded = util::load_events(&args.input)?;
            day::run(&mut out, args, &loaded, &config.layout)?;
        }
        Some(Commands::Week(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let loaded = util::load_events(&args.input)?;
            week::run(&mut out, args, &loaded, &config.layout)?;
        }
        Some(Commands::Check { input }) => {
            // Check only parses, so it runs without config
            let loaded = util::load_events(input)?;
            check::run(&mut out, &loaded)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
