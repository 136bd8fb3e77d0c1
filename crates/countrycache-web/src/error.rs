use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use countrycache_core::{RefreshError, SourceError, StoreError, ValidationError};

/// Errors returned by the query API.
///
/// Every response body carries an `error` field; `details` is added where
/// the cause can be named.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("external data source unavailable: {0}")]
    SourceUnavailable(SourceError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("country not found: {0}")]
    CountryNotFound(String),

    #[error("validation failed on '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error("summary image not found")]
    SummaryImageNotFound,
}

impl ApiError {
    pub fn validation(field: &'static str, error: ValidationError) -> Self {
        Self::Validation {
            field,
            message: error.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CountryNotFound(_) | Self::SummaryImageNotFound => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::SourceUnavailable(source) => json!({
                "error": "External data source unavailable",
                "details": source.details(),
            }),
            Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::CountryNotFound(_) => json!({ "error": "Country not found" }),
            Self::Validation { field, message } => json!({
                "error": "Validation failed",
                "details": { (*field): message },
            }),
            Self::SummaryImageNotFound => json!({ "error": "Summary image not found" }),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { name } => Self::CountryNotFound(name),
            StoreError::Storage(message) => Self::Internal(message),
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(error: RefreshError) -> Self {
        match error {
            RefreshError::SourceUnavailable(source) => Self::SourceUnavailable(source),
            RefreshError::Storage(store) => Self::Internal(store.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(message) = &self {
            error!(%message, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
