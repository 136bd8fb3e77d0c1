use thiserror::Error;

use countrycache_core::{RefreshError, SourceError, StoreError, WarehouseError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] countrycache_core::ValidationError),

    #[error("source unavailable: {0}")]
    SourceUnavailable(SourceError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("country not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::SourceUnavailable(_) => 3,
            Self::Storage(_) => 4,
            Self::Serialization(_) => 4,
            Self::NotFound(_) => 5,
            Self::Io(_) => 10,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { name } => Self::NotFound(name),
            StoreError::Storage(message) => Self::Storage(message),
        }
    }
}

impl From<WarehouseError> for CliError {
    fn from(error: WarehouseError) -> Self {
        StoreError::from(error).into()
    }
}

impl From<RefreshError> for CliError {
    fn from(error: RefreshError) -> Self {
        match error {
            RefreshError::SourceUnavailable(source) => Self::SourceUnavailable(source),
            RefreshError::Storage(store) => store.into(),
        }
    }
}
