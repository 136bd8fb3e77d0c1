//! # Domain Models
//!
//! Canonical domain types for countrycache.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CountryRecord`] | Enriched, persisted country record |
//! | [`CountryName`] | Validated country name (case-insensitive natural key) |
//! | [`ExchangeRateTable`] | Per-cycle currency code to rate mapping |
//! | [`UtcDateTime`] | UTC timestamp |

mod country;
mod rates;
mod timestamp;

pub use country::{CountryName, CountryRecord};
pub use rates::ExchangeRateTable;
pub use timestamp::UtcDateTime;
