//! Source contracts and the raw payload types they return.
//!
//! | Trait | Response | Failure tag |
//! |-------|----------|-------------|
//! | [`CountrySource`] | `Vec<RawCountry>` | [`SourceId::Countries`] |
//! | [`ExchangeRateSource`] | [`ExchangeRateTable`] | [`SourceId::Exchange`] |
//!
//! Clients make exactly one attempt per call; there is no retry policy.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::{ExchangeRateTable, SourceId};

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure, non-success status.
    Unavailable,
    /// The request exceeded its timeout.
    TimedOut,
    /// The response body could not be decoded.
    Malformed,
}

/// Structured source error, always tagged with the failing source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    source: SourceId,
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(source: SourceId, message: impl Into<String>) -> Self {
        Self {
            source,
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn timed_out(source: SourceId, message: impl Into<String>) -> Self {
        Self {
            source,
            kind: SourceErrorKind::TimedOut,
            message: message.into(),
        }
    }

    pub fn malformed(source: SourceId, message: impl Into<String>) -> Self {
        Self {
            source,
            kind: SourceErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub const fn source_id(&self) -> SourceId {
        self.source
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::TimedOut => "source.timed_out",
            SourceErrorKind::Malformed => "source.malformed",
        }
    }

    /// User-facing detail naming the failing source.
    pub fn details(&self) -> String {
        format!("Could not fetch data from {}", self.source.label())
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.source.label(), self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// One currency entry of a raw country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCurrency {
    #[serde(default)]
    pub code: Option<String>,
}

/// A country entry exactly as the countries source returned it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCountry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: Option<serde_json::Number>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub currencies: Option<Vec<RawCurrency>>,
}

impl RawCountry {
    /// Population, defaulting to 0 when absent or not a non-negative number.
    pub fn population(&self) -> u64 {
        let Some(number) = self.population.as_ref() else {
            return 0;
        };
        number.as_u64().unwrap_or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .map(|value| value as u64)
                .unwrap_or(0)
        })
    }

    /// Code of the first currency entry, if it has a non-blank one.
    pub fn first_currency_code(&self) -> Option<&str> {
        self.currencies
            .as_deref()?
            .first()?
            .code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// Source of raw country metadata.
pub trait CountrySource: Send + Sync {
    fn fetch_countries<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawCountry>, SourceError>> + Send + 'a>>;
}

/// Source of the currency exchange-rate table.
pub trait ExchangeRateSource: Send + Sync {
    fn fetch_exchange_rates<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeRateTable, SourceError>> + Send + 'a>>;
}
