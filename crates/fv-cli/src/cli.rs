use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "featurevote",
    about = "Feature voting board: propose features, vote on them, see what matters",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
    /// Rewrite the journal to hold only live features
    Compact(ConfigArgs),
}

/// Configuration sources shared by every subcommand.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Journal file; overrides `data_path`
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Listen address; overrides `bind_addr`
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}
