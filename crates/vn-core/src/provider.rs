//! Provider traits for fetching market data.
//!
//! This module defines the vendor boundary:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`PriceDataProvider`] - Daily price history downloads
//! - [`FundamentalDataProvider`] - Financial reports

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    error::Result,
    frame::VendorPrices,
    symbol::Symbol,
    types::ReportPeriod,
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "VNDirect").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for daily price history.
#[async_trait]
pub trait PriceDataProvider: DataProvider {
    /// Downloads daily prices for one or more symbols.
    ///
    /// Returns [`VendorPrices::Flat`] for a single symbol and
    /// [`VendorPrices::BySymbol`] for several. Frames use the vendor's
    /// lowercase field names (`date`, `open`, `high`, `low`, `close`,
    /// `volume`, `adjust`, ...). A valid request with no trading days
    /// returns an empty response, not an error.
    async fn download(
        &self,
        symbols: &[Symbol],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<VendorPrices>;
}

/// Provider for financial reports.
#[async_trait]
pub trait FundamentalDataProvider: DataProvider {
    /// Fetches the income statement for a symbol.
    ///
    /// Returns a frame with `item_code`, `item_name` and one column per
    /// fiscal period, most recent first.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The stock symbol
    /// * `period` - Quarterly or annual reports
    /// * `limit` - Maximum number of periods to return
    async fn income_statement(
        &self,
        symbol: &Symbol,
        period: ReportPeriod,
        limit: Option<usize>,
    ) -> Result<DataFrame>;
}
