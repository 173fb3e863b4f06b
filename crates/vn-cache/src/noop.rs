//! No-op cache implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::trace;
use vn_core::{PriceCache, Result, Symbol};

/// A no-op cache that doesn't store anything.
///
/// `get_prices` always returns `Ok(None)` and `put_prices` always returns `Ok(())`.
/// Used by the online (uncached) interface and to test code paths without hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PriceCache for NoopCache {
    async fn get_prices(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Option<DataFrame>> {
        trace!("NoopCache: get_prices called, returning None");
        Ok(None)
    }

    async fn put_prices(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
        _data: &DataFrame,
    ) -> Result<()> {
        trace!("NoopCache: put_prices called, doing nothing");
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        trace!("NoopCache: clear called, returning 0");
        Ok(0)
    }
}
