use serde_json::{json, Value};

use countrycache_core::{CountryCacheConfig, CountryQuery, CountryStore, GdpSort};

use crate::cli::CountriesArgs;
use crate::error::CliError;

pub fn status(config: &CountryCacheConfig) -> Result<Value, CliError> {
    let warehouse = config.open_warehouse()?;
    Ok(serde_json::to_value(CountryStore::status(&warehouse)?)?)
}

pub fn countries(config: &CountryCacheConfig, args: &CountriesArgs) -> Result<Value, CliError> {
    let query = CountryQuery {
        region: args.region.clone(),
        currency: args.currency.clone(),
        sort: args
            .sort
            .as_deref()
            .map(str::parse::<GdpSort>)
            .transpose()?,
    };

    let warehouse = config.open_warehouse()?;
    Ok(serde_json::to_value(warehouse.list(&query)?)?)
}

pub fn show(config: &CountryCacheConfig, name: &str) -> Result<Value, CliError> {
    let warehouse = config.open_warehouse()?;
    Ok(serde_json::to_value(warehouse.get(name)?)?)
}

pub fn delete(config: &CountryCacheConfig, name: &str) -> Result<Value, CliError> {
    let warehouse = config.open_warehouse()?;
    warehouse.delete(name)?;
    Ok(json!({ "message": "Deleted" }))
}

pub fn regions(config: &CountryCacheConfig) -> Result<Value, CliError> {
    let warehouse = config.open_warehouse()?;
    Ok(serde_json::to_value(CountryStore::region_summaries(&warehouse)?)?)
}

#[cfg(test)]
mod tests {
    use countrycache_core::{CountryName, CountryRecord, UtcDateTime};

    use super::*;

    fn config(temp: &tempfile::TempDir) -> CountryCacheConfig {
        CountryCacheConfig::from_home(temp.path().to_path_buf())
    }

    fn seed(config: &CountryCacheConfig) {
        let warehouse = config.open_warehouse().expect("warehouse");
        warehouse
            .upsert_all(&[CountryRecord {
                id: None,
                name: CountryName::parse("Ghana").expect("name"),
                capital: Some("Accra".to_string()),
                region: Some("Africa".to_string()),
                population: 31_072_940,
                currency_code: Some("GHS".to_string()),
                exchange_rate: Some(12.5),
                estimated_gdp: Some(4_000_000_000.0),
                flag_url: None,
                last_refreshed_at: UtcDateTime::parse("2025-03-01T12:00:00Z").expect("ts"),
            }])
            .expect("seed");
    }

    #[test]
    fn show_and_delete_are_case_insensitive() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = config(&temp);
        seed(&config);

        let shown = show(&config, "GHANA").expect("show");
        assert_eq!(shown["name"], "Ghana");

        delete(&config, "ghana").expect("delete");
        let missing = show(&config, "Ghana").expect_err("deleted");
        assert_eq!(missing.exit_code(), 5);
        assert_eq!(status(&config).expect("status")["total_countries"], 0);
    }

    #[test]
    fn invalid_sort_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let args = CountriesArgs {
            region: None,
            currency: None,
            sort: Some("alphabetical".to_string()),
        };

        let error = countries(&config(&temp), &args).expect_err("invalid sort");
        assert_eq!(error.exit_code(), 2);
    }
}
