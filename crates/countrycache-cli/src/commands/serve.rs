use countrycache_core::CountryCacheConfig;
use countrycache_web::AppState;

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn run(config: &CountryCacheConfig, args: &ServeArgs) -> Result<(), CliError> {
    let refresher = super::build_refresher(config)?;
    let bind = args.bind.as_deref().unwrap_or(config.bind.as_str());
    countrycache_web::serve(AppState::new(refresher), bind).await?;
    Ok(())
}
