//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use vn_core::{PriceCache, Result, Symbol};

/// Key for price cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PriceKey {
    provider: String,
    symbol: Symbol,
    start: NaiveDate,
    end: NaiveDate,
}

impl PriceKey {
    fn new(provider: &str, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            provider: provider.to_string(),
            symbol: symbol.clone(),
            start,
            end,
        }
    }
}

/// Simple in-memory cache for testing and development.
///
/// Frames are stored in a `RwLock`-protected `HashMap` and are lost when the
/// cache is dropped. Frames are cloned on get/put.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    prices: RwLock<HashMap<PriceKey, DataFrame>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.prices.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.prices.read().await.is_empty()
    }
}

#[async_trait]
impl PriceCache for InMemoryCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<DataFrame>> {
        let key = PriceKey::new(provider, symbol, start, end);

        let cache = self.prices.read().await;
        match cache.get(&key) {
            Some(df) => {
                debug!("Cache hit for price data");
                Ok(Some(df.clone()))
            }
            None => {
                debug!("Cache miss for price data");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, data), fields(provider = %provider, symbol = %symbol))]
    async fn put_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        data: &DataFrame,
    ) -> Result<()> {
        let key = PriceKey::new(provider, symbol, start, end);

        let mut cache = self.prices.write().await;
        cache.insert(key, data.clone());
        debug!("Cached {} price rows", data.height());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize> {
        let mut cache = self.prices.write().await;
        let removed = cache.len();
        cache.clear();
        debug!("Cleared {} cache entries", removed);
        Ok(removed)
    }
}
