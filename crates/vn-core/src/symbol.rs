//! Ticker symbols and the Vietnamese-market classifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};

/// Symbol suffixes that mark a ticker as listed on a Vietnamese exchange.
pub const VN_EXCHANGE_SUFFIXES: &[&str] = &["HNX", "UPC"];

/// Longest symbol accepted by [`Symbol::parse`].
pub const MAX_SYMBOL_LEN: usize = 20;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Parses caller input into a symbol that is safe to use in cache file
    /// names and vendor queries.
    ///
    /// Accepts 1 to [`MAX_SYMBOL_LEN`] ASCII letters, digits and dots,
    /// starting with a letter or digit. Input is upper-cased; surrounding
    /// whitespace is not trimmed.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] for anything else.
    pub fn parse(s: &str) -> Result<Self> {
        let symbol = Self::new(s);
        symbol.validate()?;
        Ok(symbol)
    }

    /// Checks that the symbol matches the rules of [`Symbol::parse`].
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if it does not.
    pub fn validate(&self) -> Result<()> {
        let s = self.0.as_str();
        let valid = !s.is_empty()
            && s.len() <= MAX_SYMBOL_LEN
            && s.starts_with(|c: char| c.is_ascii_alphanumeric())
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '.');

        if valid {
            Ok(())
        } else {
            Err(DataError::InvalidParameter(format!(
                "invalid symbol '{}' (expected 1-{MAX_SYMBOL_LEN} letters, digits or dots)",
                s.escape_debug()
            )))
        }
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this symbol looks like a Vietnamese ticker.
    #[must_use]
    pub fn is_vietnamese(&self) -> bool {
        is_vn_stock(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Determines whether a ticker looks like a Vietnamese stock.
///
/// A symbol qualifies when, after upper-casing, it is at most three ASCII
/// letters, or when it ends with one of [`VN_EXCHANGE_SUFFIXES`]. This is a
/// heuristic: nothing is checked against an exchange registry.
///
/// The empty string is not alphabetic and therefore not Vietnamese. Symbols
/// containing digits only qualify through the suffix rule.
///
/// ```
/// use vn_core::is_vn_stock;
///
/// assert!(is_vn_stock("vnm"));
/// assert!(is_vn_stock("SHBHNX"));
/// assert!(!is_vn_stock("NVDA"));
/// ```
#[must_use]
pub fn is_vn_stock(symbol: &str) -> bool {
    let symbol = symbol.to_uppercase();
    let short_alpha = !symbol.is_empty()
        && symbol.chars().count() <= 3
        && symbol.chars().all(|c| c.is_ascii_alphabetic());

    short_alpha
        || VN_EXCHANGE_SUFFIXES
            .iter()
            .any(|suffix| symbol.ends_with(suffix))
}

/// Vietnamese stock exchanges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// Ho Chi Minh City Stock Exchange.
    #[serde(rename = "HOSE")]
    Hose,
    /// Hanoi Stock Exchange.
    #[serde(rename = "HNX")]
    Hnx,
    /// Unlisted Public Company Market.
    #[serde(rename = "UPCOM")]
    Upcom,
}

impl Exchange {
    /// Guesses the listing exchange from the symbol length alone.
    ///
    /// Three-character tickers map to HOSE, anything else to HNX. This is a
    /// placeholder rule, not a lookup.
    #[must_use]
    pub fn guess(symbol: &Symbol) -> Self {
        if symbol.as_str().chars().count() <= 3 {
            Self::Hose
        } else {
            Self::Hnx
        }
    }

    /// Returns the exchange code as used by the vendor (`floor` field).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Hose => "HOSE",
            Self::Hnx => "HNX",
            Self::Upcom => "UPCOM",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
