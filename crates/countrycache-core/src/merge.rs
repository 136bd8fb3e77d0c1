//! Turns fetched source entries into the records a refresh cycle persists.
//!
//! | Currency situation | `currency_code` | `exchange_rate` | `estimated_gdp` |
//! |--------------------|-----------------|-----------------|-----------------|
//! | no currency entry | `None` | `None` | `Some(0.0)` |
//! | code without a rate | `Some(code)` | `None` | `None` |
//! | code with a rate | `Some(code)` | `Some(rate)` | `Some(estimate)` |
//!
//! The store applies the resulting records in order inside one transaction,
//! so names that collide case-insensitively resolve to the later entry.

use tracing::warn;

use crate::data_source::RawCountry;
use crate::estimator::{estimate, MultiplierDraw};
use crate::{CountryName, CountryRecord, ExchangeRateTable, UtcDateTime, ValidationError};

/// Currency-derived fields of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrencyDerivation {
    NoCurrency,
    UnknownRate { code: String },
    Known { code: String, rate: f64, estimated_gdp: f64 },
}

impl CurrencyDerivation {
    pub fn derive(
        currency_code: Option<&str>,
        population: u64,
        rates: &ExchangeRateTable,
        draw: &mut MultiplierDraw,
    ) -> Self {
        let Some(code) = currency_code else {
            return Self::NoCurrency;
        };
        match rates.rate(code) {
            Some(rate) => Self::Known {
                code: code.to_owned(),
                rate,
                estimated_gdp: estimate(population, rate, draw.sample()),
            },
            None => Self::UnknownRate {
                code: code.to_owned(),
            },
        }
    }

    pub fn currency_code(&self) -> Option<&str> {
        match self {
            Self::NoCurrency => None,
            Self::UnknownRate { code } | Self::Known { code, .. } => Some(code),
        }
    }

    pub fn exchange_rate(&self) -> Option<f64> {
        match self {
            Self::Known { rate, .. } => Some(*rate),
            _ => None,
        }
    }

    pub fn estimated_gdp(&self) -> Option<f64> {
        match self {
            Self::NoCurrency => Some(0.0),
            Self::UnknownRate { .. } => None,
            Self::Known { estimated_gdp, .. } => Some(*estimated_gdp),
        }
    }
}

/// Build the record for one fetched entry, stamped with the cycle timestamp.
pub fn derive_record(
    raw: &RawCountry,
    rates: &ExchangeRateTable,
    draw: &mut MultiplierDraw,
    now: UtcDateTime,
) -> Result<CountryRecord, ValidationError> {
    let name = CountryName::parse(raw.name.as_deref().unwrap_or_default())?;
    let population = raw.population();
    let currency =
        CurrencyDerivation::derive(raw.first_currency_code(), population, rates, draw);

    Ok(CountryRecord {
        id: None,
        name,
        capital: non_blank(raw.capital.as_deref()),
        region: non_blank(raw.region.as_deref()),
        population,
        currency_code: currency.currency_code().map(str::to_owned),
        exchange_rate: currency.exchange_rate(),
        estimated_gdp: currency.estimated_gdp(),
        flag_url: non_blank(raw.flag.as_deref()),
        last_refreshed_at: now,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Records to upsert for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshPlan {
    pub records: Vec<CountryRecord>,
    /// Entries dropped because they had no usable name.
    pub skipped_entries: usize,
}

/// Derive every record of a cycle in source order.
pub fn plan_refresh(
    entries: &[RawCountry],
    rates: &ExchangeRateTable,
    draw: &mut MultiplierDraw,
    now: UtcDateTime,
) -> RefreshPlan {
    let mut records = Vec::with_capacity(entries.len());
    let mut skipped_entries = 0;

    for (index, raw) in entries.iter().enumerate() {
        match derive_record(raw, rates, draw, now) {
            Ok(record) => records.push(record),
            Err(error) => {
                skipped_entries += 1;
                warn!(index, %error, "skipping country entry");
            }
        }
    }

    RefreshPlan {
        records,
        skipped_entries,
    }
}
