mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use spacecopy_config::ConfigLoader;

use cli::{Cli, Commands, ConfigCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new()
        .with_file(cli.config.clone())
        .load()
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
        config.validate()?;
    }

    observability::init_tracing(&config.logging.level);

    match &cli.command {
        Commands::Simulate(args) => {
            commands::simulate::apply_overrides(&mut config, args);
            commands::simulate::run(args, &config).await?;
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                commands::config::show(&config, &cli.config)?;
            }
        },
    }

    Ok(())
}
