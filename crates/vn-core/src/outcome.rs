//! Structured fetch status reported alongside fetched data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a price request was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Downloaded from the vendor on this call.
    Fetched,
    /// Read from an existing cache entry.
    Cached,
    /// The vendor returned no rows for a valid request.
    Empty,
    /// The request failed.
    Error,
}

impl FetchStatus {
    /// Returns true if the status carries data.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        matches!(self, Self::Fetched | Self::Cached)
    }

    /// Lowercase label used in text output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Cached => "cached",
            Self::Empty => "empty",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
