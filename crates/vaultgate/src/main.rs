mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config, then merge CLI overrides.
    let mut cfg = config::load(&cli.config)?;
    if let Some(ref rules) = cli.rules {
        cfg.policy.rules_file = rules.clone();
    }
    if let Some(ref vault) = cli.vault {
        cfg.vault.root = vault.clone();
    }

    // 3. Init tracing. Logs go to stderr; stdout belongs to the commands.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        config_file = %cli.config.display(),
        rules_file = %cfg.policy.rules_file.display(),
        vault = %cfg.vault.root.display(),
        "vaultgate starting"
    );

    // 4. Dispatch. Commands report their exit code instead of exiting so
    //    cleanup (decision log flush) always runs first.
    let code = match cli.command {
        Command::Check { ref path, method } => {
            commands::check::execute(&cfg, path, method).await?
        }
        Command::Filter { method, json } => commands::filter::execute(&cfg, method, json).await?,
        Command::Lint => commands::lint::execute(&cfg).await?,
        Command::Rules => commands::rules::execute(&cfg).await?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
