//! Vendor response layouts.
//!
//! A vendor download for one symbol comes back as a flat frame. A download
//! for several symbols comes back grouped two levels deep: first by symbol,
//! then by field. [`VendorPrices`] models both shapes so callers can pick the
//! requested symbol out of either.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use crate::error::{DataError, Result};
use crate::symbol::Symbol;

/// Price data as returned by a vendor download call.
#[derive(Clone, Debug)]
pub enum VendorPrices {
    /// Single-symbol layout: one frame of field columns.
    Flat(DataFrame),
    /// Multi-symbol layout: field columns grouped under each symbol.
    BySymbol(BTreeMap<Symbol, DataFrame>),
}

impl VendorPrices {
    /// An empty single-symbol response.
    #[must_use]
    pub fn empty() -> Self {
        Self::Flat(DataFrame::empty())
    }

    /// Returns true if the response carries the multi-symbol layout.
    #[must_use]
    pub const fn is_multi_symbol(&self) -> bool {
        matches!(self, Self::BySymbol(_))
    }

    /// Symbols present at the first column level, in order.
    ///
    /// A flat response has no symbol level and returns an empty list.
    #[must_use]
    pub fn symbols(&self) -> Vec<&Symbol> {
        match self {
            Self::Flat(_) => Vec::new(),
            Self::BySymbol(groups) => groups.keys().collect(),
        }
    }

    /// Returns true if there are no rows for any symbol.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat(df) => df.height() == 0,
            Self::BySymbol(groups) => groups.values().all(|df| df.height() == 0),
        }
    }

    /// Reduces the response to the columns of one symbol.
    ///
    /// A flat response is returned as is. For the multi-symbol layout only
    /// the requested symbol's group is kept; an empty multi-symbol response
    /// yields an empty frame.
    ///
    /// # Errors
    /// Returns [`DataError::SymbolNotFound`] if a non-empty multi-symbol
    /// response does not contain `symbol`.
    pub fn into_symbol(self, symbol: &Symbol) -> Result<DataFrame> {
        match self {
            Self::Flat(df) => Ok(df),
            Self::BySymbol(groups) if groups.is_empty() => Ok(DataFrame::empty()),
            Self::BySymbol(mut groups) => groups
                .remove(symbol)
                .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string())),
        }
    }
}

impl From<DataFrame> for VendorPrices {
    fn from(df: DataFrame) -> Self {
        Self::Flat(df)
    }
}
