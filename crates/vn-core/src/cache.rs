//! Cache trait for storing fetched price data.
//!
//! This module defines the [`PriceCache`] trait. Entries are keyed by
//! provider tag, symbol and the requested date range, and never expire.

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;

use crate::{error::Result, symbol::Symbol};

/// Provider tag used in cache keys and file names.
pub const PROVIDER_TAG: &str = "VNQuant";

/// Trait for caching fetched price frames.
///
/// Implementations decide where entries live (CSV files, memory, nowhere).
/// There is no invalidation: an entry stays valid until it is removed.
#[async_trait]
pub trait PriceCache: Send + Sync {
    /// Retrieves a cached frame for the exact request key.
    ///
    /// Returns `Ok(Some(df))` if cached data exists, `Ok(None)` if not cached.
    async fn get_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<DataFrame>>;

    /// Stores a frame under the request key, replacing any previous entry.
    async fn put_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        data: &DataFrame,
    ) -> Result<()>;

    /// Clears all cached data.
    ///
    /// Returns the number of entries removed.
    async fn clear(&self) -> Result<usize>;
}
