mod query;
mod refresh;
mod serve;

use std::sync::Arc;

use serde_json::Value;

use countrycache_core::{CountryCacheConfig, GdpMultiplier, Refresher, ReqwestHttpClient};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Run the selected command. `None` means the command produced no document.
pub async fn run(cli: &Cli) -> Result<Option<Value>, CliError> {
    let config = resolve_config(cli)?;

    match &cli.command {
        Command::Serve(args) => {
            serve::run(&config, args).await?;
            Ok(None)
        }
        Command::Refresh => refresh::run(&config).await.map(Some),
        Command::Status => query::status(&config).map(Some),
        Command::Countries(args) => query::countries(&config, args).map(Some),
        Command::Show(args) => query::show(&config, &args.name).map(Some),
        Command::Delete(args) => query::delete(&config, &args.name).map(Some),
        Command::Regions => query::regions(&config).map(Some),
    }
}

/// Environment configuration with command-line overrides applied.
pub fn resolve_config(cli: &Cli) -> Result<CountryCacheConfig, CliError> {
    let mut config = CountryCacheConfig::from_env();

    if let Some(home) = cli.home.as_ref() {
        let rehomed = CountryCacheConfig::from_home(home.clone());
        config.home = rehomed.home;
        config.db_path = rehomed.db_path;
        config.summary_path = rehomed.summary_path;
    }
    if let Some(db_path) = cli.db_path.as_ref() {
        config.db_path = db_path.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.source_timeout_ms = timeout_ms;
    }
    if let Some(multiplier) = cli.gdp_multiplier {
        config.gdp_multiplier = GdpMultiplier::fixed(multiplier)?;
    }

    Ok(config)
}

fn build_refresher(config: &CountryCacheConfig) -> Result<Refresher, CliError> {
    let warehouse = config.open_warehouse()?;
    Ok(config.refresher(Arc::new(ReqwestHttpClient::new()), Arc::new(warehouse)))
}
