use serde_json::{json, Value};
use tracing::warn;

use countrycache_core::CountryCacheConfig;

use crate::error::CliError;

pub async fn run(config: &CountryCacheConfig) -> Result<Value, CliError> {
    let refresher = super::build_refresher(config)?;
    let report = refresher.refresh().await?;

    let mut data = serde_json::to_value(&report)?;
    if let Some(report_error) = report.report_warning.as_ref() {
        warn!(error = %report_error, "refresh committed without a summary image");
        data["warning"] = json!("Summary image generation failed");
    }
    Ok(data)
}
