use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// Country display name; the natural key of a record under case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryName(String);

impl CountryName {
    /// Parse a name, trimming surrounding whitespace. Casing is preserved.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCountryName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CountryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CountryName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryName> for String {
    fn from(value: CountryName) -> Self {
        value.0
    }
}

/// An enriched country record as persisted in the store.
///
/// `estimated_gdp` distinguishes three cases: `Some(0.0)` when the country
/// has no currency at all, `None` when a currency exists but its rate is
/// unknown, and a computed value otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Internal store identifier; absent until the record has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: CountryName,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: UtcDateTime,
}
