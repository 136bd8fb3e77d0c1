//! # Countrycache Core
//!
//! Refresh-and-merge pipeline for the countrycache aggregator.
//!
//! ## Overview
//!
//! A refresh cycle fetches country metadata and exchange rates from two
//! upstream sources, derives an estimated GDP for every country, and upserts
//! the result into the country store inside one transaction. A summary
//! snapshot is rendered after the commit.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | REST Countries and open.er-api.com clients |
//! | [`config`] | Environment-driven configuration |
//! | [`data_source`] | Source traits, raw payloads, source errors |
//! | [`domain`] | Country records, names, rate tables, timestamps |
//! | [`error`] | Validation errors |
//! | [`estimator`] | GDP estimate and multiplier draws |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`merge`] | Record derivation for one cycle |
//! | [`refresh`] | Refresh orchestrator |
//! | [`source`] | Source identifiers |
//! | [`store`] | Country store seam |
//! | [`summary`] | Summary reporter seam and SVG renderer |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use countrycache_core::{CountryCacheConfig, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CountryCacheConfig::from_env();
//!     let store = Arc::new(config.open_warehouse()?);
//!     let refresher = config.refresher(Arc::new(ReqwestHttpClient::new()), store);
//!
//!     let report = refresher.refresh().await?;
//!     println!("{} countries as of {}", report.total_countries, report.last_refreshed_at);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use countrycache_core::RefreshError;
//!
//! fn describe(error: &RefreshError) -> String {
//!     match error {
//!         RefreshError::SourceUnavailable(source) => source.details(),
//!         RefreshError::Storage(_) => String::from("Internal server error"),
//!     }
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod http_client;
pub mod merge;
pub mod refresh;
pub mod source;
pub mod store;
pub mod summary;

// Adapter implementations
pub use adapters::{OpenErApiAdapter, RestCountriesAdapter};

// Configuration
pub use config::CountryCacheConfig;

// Source contracts
pub use data_source::{
    CountrySource, ExchangeRateSource, RawCountry, RawCurrency, SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{CountryName, CountryRecord, ExchangeRateTable, UtcDateTime};

// Error types
pub use error::ValidationError;

// Estimation and merge
pub use estimator::{estimate, GdpMultiplier, MultiplierDraw};
pub use merge::{derive_record, plan_refresh, CurrencyDerivation, RefreshPlan};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StaticHttpClient,
};

// Orchestration
pub use refresh::{RefreshError, RefreshReport, Refresher};

// Source identifiers
pub use source::SourceId;

// Store seam
pub use store::{
    CountryQuery, CountryStore, GdpSort, RankedCountry, RegionSummary, StoreError, StoreStatus,
    UpsertCounts,
};

// Summary reporting
pub use summary::{
    format_gdp, RefreshSummary, ReportError, SummaryArtifact, SummaryReporter,
    SvgSummaryReporter,
};

// Warehouse (re-exported from countrycache-warehouse)
pub use countrycache_warehouse::{Warehouse, WarehouseConfig, WarehouseError};
