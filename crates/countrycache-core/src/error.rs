use thiserror::Error;

/// Validation and contract errors exposed by `countrycache-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("country name cannot be empty")]
    EmptyCountryName,

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp out of range: {millis}ms since epoch")]
    TimestampOutOfRange { millis: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be positive")]
    NonPositiveValue { field: &'static str },
    #[error("multiplier range is empty: min {min} > max {max}")]
    EmptyMultiplierRange { min: String, max: String },

    #[error("invalid sort '{value}', expected one of gdp_desc, gdp_asc")]
    InvalidSort { value: String },
}

