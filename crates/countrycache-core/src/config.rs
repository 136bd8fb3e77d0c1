//! Runtime configuration resolved from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `COUNTRYCACHE_HOME` | `$HOME/.countrycache` |
//! | `COUNTRYCACHE_DB_PATH` | `<home>/cache/countries.duckdb` |
//! | `COUNTRYCACHE_COUNTRIES_URL` | REST Countries v2 `all` |
//! | `COUNTRYCACHE_EXCHANGE_URL` | open.er-api.com `latest/USD` |
//! | `COUNTRYCACHE_SOURCE_TIMEOUT_MS` | `20000` |
//! | `COUNTRYCACHE_GDP_MULTIPLIER` | uniform draw in `[1000, 2000)` |
//! | `COUNTRYCACHE_BIND` | `0.0.0.0:8000` |
//!
//! Unparseable values are ignored with a warning.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use countrycache_warehouse::{Warehouse, WarehouseConfig, WarehouseError};
use tracing::warn;

use crate::adapters::{OpenErApiAdapter, RestCountriesAdapter};
use crate::estimator::GdpMultiplier;
use crate::http_client::HttpClient;
use crate::refresh::Refresher;
use crate::store::CountryStore;
use crate::summary::SvgSummaryReporter;

pub const DEFAULT_COUNTRIES_URL: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";
pub const DEFAULT_EXCHANGE_URL: &str = "https://open.er-api.com/v6/latest/USD";
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct CountryCacheConfig {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub summary_path: PathBuf,
    pub countries_url: String,
    pub exchange_url: String,
    pub source_timeout_ms: u64,
    pub gdp_multiplier: GdpMultiplier,
    pub bind: String,
    pub max_pool_size: usize,
}

impl Default for CountryCacheConfig {
    fn default() -> Self {
        Self::from_home(resolve_countrycache_home(|key| env::var_os(key).map(PathBuf::from)))
    }
}

impl CountryCacheConfig {
    /// Defaults rooted at `home`, ignoring the environment.
    pub fn from_home(home: PathBuf) -> Self {
        let cache = home.join("cache");
        Self {
            db_path: cache.join("countries.duckdb"),
            summary_path: cache.join("summary.svg"),
            home,
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            exchange_url: DEFAULT_EXCHANGE_URL.to_string(),
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            gdp_multiplier: GdpMultiplier::default(),
            bind: DEFAULT_BIND.to_string(),
            max_pool_size: 4,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let home = resolve_countrycache_home(|key| var(key).map(PathBuf::from));
        let mut config = Self::from_home(home);

        if let Some(db_path) = var("COUNTRYCACHE_DB_PATH") {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(url) = var("COUNTRYCACHE_COUNTRIES_URL") {
            config.countries_url = url;
        }
        if let Some(url) = var("COUNTRYCACHE_EXCHANGE_URL") {
            config.exchange_url = url;
        }
        if let Some(raw) = var("COUNTRYCACHE_SOURCE_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(timeout_ms) if timeout_ms > 0 => config.source_timeout_ms = timeout_ms,
                _ => warn!(value = %raw, "ignoring invalid COUNTRYCACHE_SOURCE_TIMEOUT_MS"),
            }
        }
        if let Some(raw) = var("COUNTRYCACHE_GDP_MULTIPLIER") {
            match parse_fixed_multiplier(&raw) {
                Some(multiplier) => config.gdp_multiplier = multiplier,
                None => warn!(value = %raw, "ignoring invalid COUNTRYCACHE_GDP_MULTIPLIER"),
            }
        }
        if let Some(bind) = var("COUNTRYCACHE_BIND") {
            config.bind = bind;
        }

        config
    }

    pub fn warehouse_config(&self) -> WarehouseConfig {
        WarehouseConfig {
            db_path: self.db_path.clone(),
            max_pool_size: self.max_pool_size,
        }
    }

    pub fn open_warehouse(&self) -> Result<Warehouse, WarehouseError> {
        Warehouse::open(self.warehouse_config())
    }

    /// Wire the production sources and the SVG reporter around `store`.
    pub fn refresher(
        &self,
        http_client: Arc<dyn HttpClient>,
        store: Arc<dyn CountryStore>,
    ) -> Refresher {
        Refresher::new(
            Arc::new(RestCountriesAdapter::new(
                Arc::clone(&http_client),
                self.countries_url.clone(),
                self.source_timeout_ms,
            )),
            Arc::new(OpenErApiAdapter::new(
                http_client,
                self.exchange_url.clone(),
                self.source_timeout_ms,
            )),
            store,
            Arc::new(SvgSummaryReporter::new(self.summary_path.clone())),
            self.gdp_multiplier,
        )
    }
}

pub fn parse_fixed_multiplier(raw: &str) -> Option<GdpMultiplier> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|value| GdpMultiplier::fixed(value).ok())
}

fn resolve_countrycache_home<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if let Some(path) = lookup("COUNTRYCACHE_HOME") {
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = lookup("HOME") {
        return home.join(".countrycache");
    }

    PathBuf::from(".countrycache")
}
