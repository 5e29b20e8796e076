use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tessera",
    about = "Tessera: modular runtime around a concurrent in-memory datastore",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the storage engine and any enabled modules until Ctrl-C
    Serve(ServeArgs),
    /// Validate a configuration file and print a summary
    CheckConfig(CheckConfigArgs),
    /// Print the default configuration as TOML
    Defaults,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Args)]
pub struct CheckConfigArgs {
    /// Configuration file to validate
    #[arg(short, long)]
    pub config: PathBuf,
}
