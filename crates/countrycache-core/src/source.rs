use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifies which upstream source a fetch (or failure) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Countries,
    Exchange,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Countries => "countries",
            Self::Exchange => "exchange",
        }
    }

    /// Human-readable label used in error details.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Countries => "Countries API",
            Self::Exchange => "Exchange API",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
