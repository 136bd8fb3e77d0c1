//! # Countrycache Warehouse
//!
//! DuckDB-based country store for countrycache.
//!
//! ## Overview
//!
//! The warehouse persists one row per country, keyed by a normalized
//! (lowercased) name so that lookups, upserts and deletes are
//! case-insensitive without scanning. Batch upserts run inside a single
//! transaction: either every row of the batch commits or none does.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use countrycache_warehouse::{CountryFilter, CountryRow, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open_in_memory()?;
//!
//!     warehouse.upsert_countries(&[CountryRow {
//!         name: "India".to_string(),
//!         capital: Some("New Delhi".to_string()),
//!         region: Some("Asia".to_string()),
//!         population: 1_380_004_385,
//!         currency_code: Some("INR".to_string()),
//!         exchange_rate: Some(83.2),
//!         estimated_gdp: Some(25_000_000_000.0),
//!         flag_url: None,
//!         last_refreshed_at_ms: 1_700_000_000_000,
//!     }])?;
//!
//!     let found = warehouse.find_country("INDIA")?;
//!     assert!(found.is_some());
//!
//!     let asia = warehouse.list_countries(&CountryFilter {
//!         region: Some("asia".to_string()),
//!         ..CountryFilter::default()
//!     })?;
//!     println!("{} countries in Asia", asia.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `countries` | One row per country, primary key `name_key` |
//! | `schema_migrations` | Applied migration versions |
//!
//! ## Views
//!
//! | View | Description |
//! |------|-------------|
//! | `vw_gdp_ranking` | Non-null GDP rows ranked descending |
//! | `vw_region_summary` | Per-region totals |

pub mod duckdb;
pub mod migrations;
pub mod views;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{Connection, ToSql};
use serde::Serialize;
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};

const SELECT_COUNTRY_COLUMNS: &str = "SELECT id, name, capital, region, population, \
     currency_code, exchange_rate, estimated_gdp, flag_url, epoch_ms(last_refreshed_at) \
     FROM countries";

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// No country matched the given name.
    #[error("country not found: {name}")]
    NotFound { name: String },

    /// A row could not be represented in the schema.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

/// A country row as written by a refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRow {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    /// Unix epoch milliseconds (UTC).
    pub last_refreshed_at_ms: i64,
}

/// A persisted country row with its internal identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCountry {
    pub id: i64,
    pub country: CountryRow,
}

/// Ordering applied to a country listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GdpOrder {
    /// Ordered by normalized name.
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

/// Optional equality filters and ordering for a country listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub currency_code: Option<String>,
    pub order: GdpOrder,
}

/// Number of rows inserted and updated by one batch upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Aggregate state of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarehouseStatus {
    pub total_countries: u64,
    /// Latest `last_refreshed_at` across all rows, `None` when empty.
    pub last_refreshed_at_ms: Option<i64>,
}

/// One row of the GDP ranking view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GdpRankRow {
    pub rank: u64,
    pub name: String,
    pub estimated_gdp: f64,
}

/// One row of the per-region summary view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummaryRow {
    pub region: Option<String>,
    pub country_count: u64,
    pub total_population: u64,
    pub total_estimated_gdp: Option<f64>,
}

/// Normalized lookup key for a country name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The country store.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open (and migrate) a file-backed warehouse.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = DuckDbConnectionManager::open(config.db_path, config.max_pool_size)?;
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Open (and migrate) a private in-memory warehouse.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        let manager = DuckDbConnectionManager::open_in_memory(2)?;
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Initialize database schema and views.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        views::create_views(&connection)?;
        Ok(())
    }

    /// Path to the database file, `None` for in-memory warehouses.
    pub fn db_path(&self) -> Option<&Path> {
        self.manager.db_path()
    }

    /// Insert or update every row in one transaction.
    ///
    /// Rows are matched on their normalized name. A matched row keeps its
    /// internal id and has every other column overwritten, including the
    /// stored casing of `name`. Rows are applied in order, so a later row
    /// whose name collides with an earlier one in the same batch wins.
    ///
    /// Any failure rolls the whole batch back.
    pub fn upsert_countries(&self, rows: &[CountryRow]) -> Result<UpsertSummary, WarehouseError> {
        if rows.is_empty() {
            return Ok(UpsertSummary::default());
        }

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<UpsertSummary, WarehouseError> {
            let mut summary = UpsertSummary::default();
            for row in rows {
                if upsert_country(&connection, row)? {
                    summary.inserted += 1;
                } else {
                    summary.updated += 1;
                }
            }
            Ok(summary)
        })();

        finalize_transaction(&connection, result)
    }

    /// List countries matching the filter.
    ///
    /// Region and currency filters compare case-insensitively. GDP ordering
    /// always places rows without an estimate last.
    pub fn list_countries(
        &self,
        filter: &CountryFilter,
    ) -> Result<Vec<StoredCountry>, WarehouseError> {
        let region = filter.region.as_deref().map(str::to_lowercase);
        let currency = filter.currency_code.as_deref().map(str::to_lowercase);

        let mut clauses = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();
        if let Some(region) = region.as_ref() {
            clauses.push("lower(region) = ?");
            params.push(region);
        }
        if let Some(currency) = currency.as_ref() {
            clauses.push("lower(currency_code) = ?");
            params.push(currency);
        }

        let mut sql = String::from(SELECT_COUNTRY_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(clauses.join(" AND ").as_str());
        }
        sql.push_str(match filter.order {
            GdpOrder::Unsorted => " ORDER BY name_key",
            GdpOrder::Ascending => " ORDER BY estimated_gdp ASC NULLS LAST, name_key",
            GdpOrder::Descending => " ORDER BY estimated_gdp DESC NULLS LAST, name_key",
        });

        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(sql.as_str())?;
        let rows = statement.query_map(params.as_slice(), read_stored_country)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(WarehouseError::from)
    }

    /// Find a country by case-insensitive name.
    pub fn find_country(&self, name: &str) -> Result<Option<StoredCountry>, WarehouseError> {
        let key = name_key(name);
        let sql = format!("{SELECT_COUNTRY_COLUMNS} WHERE name_key = ?");

        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(sql.as_str())?;
        let mut rows = statement.query_map([key.as_str()], read_stored_country)?;
        rows.next().transpose().map_err(WarehouseError::from)
    }

    /// Delete a country by case-insensitive name.
    pub fn delete_country(&self, name: &str) -> Result<(), WarehouseError> {
        let key = name_key(name);
        let connection = self.manager.acquire()?;
        let deleted = connection.execute("DELETE FROM countries WHERE name_key = ?", [key.as_str()])?;
        if deleted == 0 {
            return Err(WarehouseError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Total row count and latest refresh timestamp.
    pub fn status(&self) -> Result<WarehouseStatus, WarehouseError> {
        let connection = self.manager.acquire()?;
        let (total, last): (i64, Option<i64>) = connection.query_row(
            "SELECT COUNT(*), epoch_ms(MAX(last_refreshed_at)) FROM countries",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(WarehouseStatus {
            total_countries: non_negative(total, "total_countries")?,
            last_refreshed_at_ms: last,
        })
    }

    /// The `limit` highest estimated GDPs. Rows without an estimate are never ranked.
    pub fn top_by_gdp(&self, limit: usize) -> Result<Vec<GdpRankRow>, WarehouseError> {
        let limit = i64::try_from(limit)
            .map_err(|_| WarehouseError::InvalidData(format!("ranking limit {limit} too large")))?;

        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT gdp_rank, name, estimated_gdp FROM vw_gdp_ranking \
             WHERE gdp_rank <= ? ORDER BY gdp_rank",
        )?;
        let rows = statement.query_map([limit], |row| {
            let rank: i64 = row.get(0)?;
            Ok(GdpRankRow {
                rank: rank.max(0) as u64,
                name: row.get(1)?,
                estimated_gdp: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(WarehouseError::from)
    }

    /// Per-region totals ordered by region name (unknown region last).
    pub fn region_summaries(&self) -> Result<Vec<RegionSummaryRow>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT region, country_count, total_population, total_estimated_gdp \
             FROM vw_region_summary ORDER BY region NULLS LAST",
        )?;
        let rows = statement.query_map([], |row| {
            let count: i64 = row.get(1)?;
            let population: Option<i64> = row.get(2)?;
            Ok(RegionSummaryRow {
                region: row.get(0)?,
                country_count: count.max(0) as u64,
                total_population: population.unwrap_or_default().max(0) as u64,
                total_estimated_gdp: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(WarehouseError::from)
    }
}

/// Update the row matching `row`'s normalized name, inserting it when absent.
///
/// Returns `true` when a new row was inserted.
fn upsert_country(connection: &Connection, row: &CountryRow) -> Result<bool, WarehouseError> {
    let key = name_key(&row.name);
    let population = i64::try_from(row.population).map_err(|_| {
        WarehouseError::InvalidData(format!(
            "population {} of '{}' exceeds storage range",
            row.population, row.name
        ))
    })?;

    let params: [&dyn ToSql; 10] = [
        &row.name,
        &row.capital,
        &row.region,
        &population,
        &row.currency_code,
        &row.exchange_rate,
        &row.estimated_gdp,
        &row.flag_url,
        &row.last_refreshed_at_ms,
        &key,
    ];
    let updated = connection.execute(
        "UPDATE countries SET \
         name = ?, capital = ?, region = ?, population = ?, currency_code = ?, \
         exchange_rate = ?, estimated_gdp = ?, flag_url = ?, \
         last_refreshed_at = epoch_ms(CAST(? AS BIGINT)) \
         WHERE name_key = ?",
        params.as_slice(),
    )?;
    if updated > 0 {
        return Ok(false);
    }

    let params: [&dyn ToSql; 10] = [
        &key,
        &row.name,
        &row.capital,
        &row.region,
        &population,
        &row.currency_code,
        &row.exchange_rate,
        &row.estimated_gdp,
        &row.flag_url,
        &row.last_refreshed_at_ms,
    ];
    connection.execute(
        "INSERT INTO countries \
         (name_key, name, capital, region, population, currency_code, exchange_rate, \
          estimated_gdp, flag_url, last_refreshed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, epoch_ms(CAST(? AS BIGINT)))",
        params.as_slice(),
    )?;
    Ok(true)
}

/// Finalize a transaction, committing on success or rolling back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn read_stored_country(row: &::duckdb::Row<'_>) -> Result<StoredCountry, ::duckdb::Error> {
    let population: i64 = row.get(4)?;
    Ok(StoredCountry {
        id: row.get(0)?,
        country: CountryRow {
            name: row.get(1)?,
            capital: row.get(2)?,
            region: row.get(3)?,
            population: population.max(0) as u64,
            currency_code: row.get(5)?,
            exchange_rate: row.get(6)?,
            estimated_gdp: row.get(7)?,
            flag_url: row.get(8)?,
            last_refreshed_at_ms: row.get(9)?,
        },
    })
}

fn non_negative(value: i64, field: &str) -> Result<u64, WarehouseError> {
    u64::try_from(value)
        .map_err(|_| WarehouseError::InvalidData(format!("{field} must be non-negative: {value}")))
}
