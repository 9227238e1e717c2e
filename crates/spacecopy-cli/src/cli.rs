use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spacecopy")]
#[command(about = "spacecopy: copy the services of a set of applications between spaces")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, env = "SPACECOPY_CONFIG", default_value = "spacecopy.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy services between two space fixtures and report what happened
    Simulate(SimulateArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Source space fixture (JSON)
    #[arg(long)]
    pub source: PathBuf,
    /// Destination space fixture (JSON)
    #[arg(long)]
    pub destination: PathBuf,
    /// Application whose services are copied (repeatable)
    #[arg(long = "app", required = true)]
    pub apps: Vec<String>,
    /// Service instance to copy as a user-provided service (repeatable)
    #[arg(long = "ups-instance")]
    pub ups_instances: Vec<String>,
    /// Offering label whose instances are copied as user-provided services (repeatable)
    #[arg(long = "ups-offering")]
    pub ups_offerings: Vec<String>,
    /// Delete and rebuild services that already exist at the destination
    #[arg(long)]
    pub recreate: bool,
    /// Write the source space after the run to this file
    #[arg(long)]
    pub write_source: Option<PathBuf>,
    /// Write the destination space after the run to this file
    #[arg(long)]
    pub write_destination: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "spacecopy",
            "simulate",
            "--source",
            "src.json",
            "--destination",
            "dest.json",
            "--app",
            "app1",
            "--app",
            "app2",
            "--ups-offering",
            "RabbitMQ",
            "--recreate",
        ])
        .unwrap();

        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.apps, vec!["app1", "app2"]);
        assert_eq!(args.ups_offerings, vec!["RabbitMQ"]);
        assert!(args.ups_instances.is_empty());
        assert!(args.recreate);
        assert!(args.write_destination.is_none());
    }

    #[test]
    fn test_simulate_requires_an_app() {
        let result = Cli::try_parse_from([
            "spacecopy",
            "simulate",
            "--source",
            "src.json",
            "--destination",
            "dest.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "spacecopy",
            "config",
            "show",
            "--config",
            "other.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
