mod download;
mod resolve;
mod search;

use closebook_core::{ClientConfig, TInvestAdapter};
use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let adapter = build_adapter(cli)?;
    info!(live = adapter.is_live(), "market data adapter ready");

    match &cli.command {
        Command::Search(args) => search::run(args, &adapter).await,
        Command::Resolve(args) => resolve::run(args, &adapter).await,
        Command::Download(args) => download::run(args, &adapter).await,
    }
}

/// One adapter per invocation; every request of the command shares its transport.
fn build_adapter(cli: &Cli) -> Result<TInvestAdapter, CliError> {
    if cli.mock {
        return Ok(TInvestAdapter::default());
    }

    let mut config = ClientConfig::from_env()?;
    if let Some(target) = cli.target_override() {
        config = config.with_target(target);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    Ok(TInvestAdapter::from_config(&config)?)
}
