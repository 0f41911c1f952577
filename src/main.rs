// ABOUTME: Entry point for the deployment-gate CLI application.
// ABOUTME: Parses arguments, sets up logging and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use deployment_gate::config::Config;
use deployment_gate::error::Result;
use deployment_gate::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the flags
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        let mut cause = std::error::Error::source(&e);
        while let Some(inner) = cause {
            tracing::debug!(cause = %inner, "Caused by");
            cause = inner.source();
        }
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_required(path),
        None => Config::discover(&env::current_dir()?),
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);

    match &cli.command {
        Commands::Init {
            applications,
            force,
        } => commands::init(applications, *force, &output),
        Commands::Wait(args) => {
            let mut config = load_config(&cli)?;
            config.apply(commands::overrides(args)?);
            config.validate()?;
            commands::wait(config, args, output).await
        }
    }
}
