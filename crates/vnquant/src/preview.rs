//! Result reports and text previews for text-oriented consumers.

use std::fmt;

use polars::prelude::DataFrame;
use vn_cache::to_csv_string;
use vn_core::{DataError, FetchStatus, PriceRecord, Result, Symbol, price_records};

/// Outcome of a price request: status, data and any error text.
///
/// Consumers should branch on [`PriceReport::status`]; the text produced by
/// [`PriceReport::render`] is for display only.
#[derive(Clone, Debug)]
pub struct PriceReport {
    /// Requested symbol.
    pub symbol: Symbol,
    /// Requested start date as given by the caller.
    pub start: String,
    /// Requested end date as given by the caller.
    pub end: String,
    /// How the request was satisfied.
    pub status: FetchStatus,
    /// Normalized price frame (empty unless the status has data).
    pub data: DataFrame,
    /// Error message when `status` is [`FetchStatus::Error`].
    pub error: Option<String>,
}

impl PriceReport {
    /// A report carrying data (fetched, cached or empty).
    #[must_use]
    pub fn with_data(
        symbol: Symbol,
        start: impl Into<String>,
        end: impl Into<String>,
        status: FetchStatus,
        data: DataFrame,
    ) -> Self {
        Self {
            symbol,
            start: start.into(),
            end: end.into(),
            status,
            data,
            error: None,
        }
    }

    /// A failed report.
    #[must_use]
    pub fn failed(
        symbol: Symbol,
        start: impl Into<String>,
        end: impl Into<String>,
        error: &DataError,
    ) -> Self {
        Self {
            symbol,
            start: start.into(),
            end: end.into(),
            status: FetchStatus::Error,
            data: DataFrame::empty(),
            error: Some(error.to_string()),
        }
    }

    /// Number of rows in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns true if the report has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Returns true if the data came from the cache.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.status == FetchStatus::Cached
    }

    /// Typed rows of the report.
    ///
    /// # Errors
    /// Returns an error if the frame lacks the normalized price columns.
    pub fn records(&self) -> Result<Vec<PriceRecord>> {
        price_records(&self.data)
    }

    /// Renders a status header followed by the data as CSV.
    ///
    /// Empty and failed reports render as a single sentence.
    #[must_use]
    pub fn render(&self) -> String {
        match self.status {
            FetchStatus::Empty => format!(
                "No data found for symbol '{}' between {} and {}",
                self.symbol, self.start, self.end
            ),
            FetchStatus::Error => format!(
                "Error retrieving data for symbol '{}': {}",
                self.symbol,
                self.error.as_deref().unwrap_or("unknown error")
            ),
            FetchStatus::Fetched | FetchStatus::Cached => {
                let marker = if self.is_cached() { " (cached)" } else { "" };
                let body = to_csv_string(&self.data)
                    .unwrap_or_else(|e| format!("# Data could not be rendered: {e}\n"));
                format!(
                    "# Vietnamese stock data for {} from {} to {}{marker}\n\
                     # Total records: {}\n\
                     # Status: {}\n\n{body}",
                    self.symbol,
                    self.start,
                    self.end,
                    self.len(),
                    self.status,
                )
            }
        }
    }

    /// Renders the report and keeps at most `max_chars` characters.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.render(), max_chars).to_string()
    }
}

impl fmt::Display for PriceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Returns at most the first `max_chars` characters of `text`.
///
/// Cuts on a character boundary, never inside a multi-byte character.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
