use anyhow::{bail, Context};
use colored::Colorize;
use fv_server::{FeatureVoteServer, ServerConfig};
use fv_store::JournaledFeatureStore;

use crate::cli::{Cli, Command, ConfigArgs, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Config(args) => cmd_config(&args),
        Command::Compact(args) => cmd_compact(&args),
    }
}

/// File config (or defaults) with command-line overrides applied.
fn resolve_config(args: &ConfigArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(data) = &args.data {
        config.data_path = Some(data.clone());
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = resolve_config(&args.source)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let storage = match &config.data_path {
        Some(path) => path.display().to_string(),
        None => "memory".to_string(),
    };
    println!(
        "{} Feature vote server on {} (storage: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        storage.cyan()
    );

    let server = FeatureVoteServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(server.serve())?;
    println!("{} Server stopped.", "✓".green());
    Ok(())
}

fn cmd_config(args: &ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(args)?;
    config.validate()?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_compact(args: &ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(args)?;
    let Some(path) = &config.data_path else {
        bail!("no journal to compact: set data_path or pass --data");
    };

    let store = JournaledFeatureStore::open(path, config.journal_config())
        .with_context(|| format!("failed to open journal {}", path.display()))?;
    let before = store.journal().offset();
    store.compact()?;
    let after = store.journal().offset();
    println!(
        "{} Compacted {}: {} -> {} bytes",
        "✓".green().bold(),
        path.display().to_string().bold(),
        before,
        after
    );
    Ok(())
}
