//! Country Store seam used by the refresh pipeline and the query API.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use countrycache_warehouse::{
    CountryFilter, CountryRow, GdpOrder, StoredCountry, Warehouse, WarehouseError,
};

use crate::{CountryName, CountryRecord, UtcDateTime, ValidationError};

/// Errors raised by a [`CountryStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("country not found: {name}")]
    NotFound { name: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<WarehouseError> for StoreError {
    fn from(error: WarehouseError) -> Self {
        match error {
            WarehouseError::NotFound { name } => Self::NotFound { name },
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Ordering of a listing by estimated GDP. Records without an estimate sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GdpSort {
    #[serde(rename = "gdp_asc")]
    Ascending,
    #[serde(rename = "gdp_desc")]
    Descending,
}

impl GdpSort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "gdp_asc",
            Self::Descending => "gdp_desc",
        }
    }
}

impl FromStr for GdpSort {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gdp_asc" => Ok(Self::Ascending),
            "gdp_desc" => Ok(Self::Descending),
            _ => Err(ValidationError::InvalidSort {
                value: value.to_owned(),
            }),
        }
    }
}

/// Filters and ordering for [`CountryStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<GdpSort>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCounts {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub total_countries: u64,
    /// Latest refresh time across all records, `None` when the store is empty.
    pub last_refreshed_at: Option<UtcDateTime>,
}

/// One entry of a GDP ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCountry {
    pub name: String,
    pub estimated_gdp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: Option<String>,
    pub country_count: u64,
    pub total_population: u64,
    pub total_estimated_gdp: Option<f64>,
}

/// Persisted collection of country records.
///
/// Every name argument is matched case-insensitively.
pub trait CountryStore: Send + Sync {
    /// Apply all records in one transaction; on error nothing is written.
    fn upsert_all(&self, records: &[CountryRecord]) -> Result<UpsertCounts, StoreError>;

    fn list(&self, query: &CountryQuery) -> Result<Vec<CountryRecord>, StoreError>;

    fn get(&self, name: &str) -> Result<CountryRecord, StoreError>;

    fn delete(&self, name: &str) -> Result<(), StoreError>;

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.status()?.total_countries)
    }

    fn status(&self) -> Result<StoreStatus, StoreError>;

    /// Highest estimated GDPs first; records without an estimate are excluded.
    fn top_by_gdp(&self, limit: usize) -> Result<Vec<RankedCountry>, StoreError>;

    fn region_summaries(&self) -> Result<Vec<RegionSummary>, StoreError>;
}

impl CountryStore for Warehouse {
    fn upsert_all(&self, records: &[CountryRecord]) -> Result<UpsertCounts, StoreError> {
        let rows: Vec<CountryRow> = records.iter().map(to_row).collect();
        let summary = self.upsert_countries(&rows)?;
        Ok(UpsertCounts {
            inserted: summary.inserted,
            updated: summary.updated,
        })
    }

    fn list(&self, query: &CountryQuery) -> Result<Vec<CountryRecord>, StoreError> {
        let filter = CountryFilter {
            region: query.region.clone(),
            currency_code: query.currency.clone(),
            order: match query.sort {
                None => GdpOrder::Unsorted,
                Some(GdpSort::Ascending) => GdpOrder::Ascending,
                Some(GdpSort::Descending) => GdpOrder::Descending,
            },
        };
        self.list_countries(&filter)?
            .into_iter()
            .map(from_stored)
            .collect()
    }

    fn get(&self, name: &str) -> Result<CountryRecord, StoreError> {
        match self.find_country(name)? {
            Some(stored) => from_stored(stored),
            None => Err(StoreError::NotFound {
                name: name.to_owned(),
            }),
        }
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.delete_country(name).map_err(StoreError::from)
    }

    fn status(&self) -> Result<StoreStatus, StoreError> {
        let status = Warehouse::status(self)?;
        let last_refreshed_at = status
            .last_refreshed_at_ms
            .map(UtcDateTime::from_unix_millis)
            .transpose()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(StoreStatus {
            total_countries: status.total_countries,
            last_refreshed_at,
        })
    }

    fn top_by_gdp(&self, limit: usize) -> Result<Vec<RankedCountry>, StoreError> {
        Ok(Warehouse::top_by_gdp(self, limit)?
            .into_iter()
            .map(|row| RankedCountry {
                name: row.name,
                estimated_gdp: Some(row.estimated_gdp),
            })
            .collect())
    }

    fn region_summaries(&self) -> Result<Vec<RegionSummary>, StoreError> {
        Ok(Warehouse::region_summaries(self)?
            .into_iter()
            .map(|row| RegionSummary {
                region: row.region,
                country_count: row.country_count,
                total_population: row.total_population,
                total_estimated_gdp: row.total_estimated_gdp,
            })
            .collect())
    }
}

fn to_row(record: &CountryRecord) -> CountryRow {
    CountryRow {
        name: record.name.as_str().to_owned(),
        capital: record.capital.clone(),
        region: record.region.clone(),
        population: record.population,
        currency_code: record.currency_code.clone(),
        exchange_rate: record.exchange_rate,
        estimated_gdp: record.estimated_gdp,
        flag_url: record.flag_url.clone(),
        last_refreshed_at_ms: record.last_refreshed_at.unix_millis(),
    }
}

fn from_stored(stored: StoredCountry) -> Result<CountryRecord, StoreError> {
    let StoredCountry { id, country } = stored;
    let name = CountryName::parse(&country.name).map_err(|e| StoreError::Storage(e.to_string()))?;
    let last_refreshed_at = UtcDateTime::from_unix_millis(country.last_refreshed_at_ms)
        .map_err(|e| StoreError::Storage(e.to_string()))?;

    Ok(CountryRecord {
        id: Some(id),
        name,
        capital: country.capital,
        region: country.region,
        population: country.population,
        currency_code: country.currency_code,
        exchange_rate: country.exchange_rate,
        estimated_gdp: country.estimated_gdp,
        flag_url: country.flag_url,
        last_refreshed_at,
    })
}
