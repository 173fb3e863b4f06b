#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vnquant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! VNDirect data provider.
//!
//! This crate provides a VNDirect data provider that implements the
//! [`DataProvider`], [`PriceDataProvider`], and [`FundamentalDataProvider`]
//! traits from `vn-core`.
//!
//! # Features
//!
//! - Daily prices from the `stock_prices` endpoint, one request per symbol
//! - Multi-symbol downloads returned in the grouped [`VendorPrices::BySymbol`] layout
//! - Income statements pivoted to one column per fiscal period
//! - Built-in rate limiting (1 request per second by default)
//!
//! # Example
//!
//! ```no_run
//! use vn_vndirect::VndirectProvider;
//! use vn_core::{PriceDataProvider, Symbol};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> vn_core::Result<()> {
//! let provider = VndirectProvider::new();
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
//!
//! let prices = provider.download(&[Symbol::new("VNM")], start, end).await?;
//! println!("Multi-symbol layout: {}", prices.is_multi_symbol());
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::*;
use reqwest::Url;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};
use vn_core::types::{DATE_FORMAT, days_since_epoch};
use vn_core::{
    DataConfig, DataError, DataProvider, FundamentalDataProvider, PriceDataProvider,
    ReportPeriod, Result, Symbol, VendorPrices,
};

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// Page size for price requests; large enough for a decade of daily bars.
const PRICE_PAGE_SIZE: usize = 9990;

/// Page size for financial statement requests.
const STATEMENT_PAGE_SIZE: usize = 2000;

/// Page size for financial model requests.
const MODEL_PAGE_SIZE: usize = 2999;

/// VNDirect model types that make up an income statement (corporate,
/// securities, insurance and banking templates).
const INCOME_MODEL_TYPES: &str = "2,90,102,412";

/// Accounting circulars whose item names are accepted.
const MODEL_NOTES: &str =
    "TT199/2014/TT-BTC,TT334/2016/TT-BTC,TT49/2014/TT-NHNN,TT202/2014/TT-BTC,TT210/2014/TT-BTC";

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

const PROVIDER_NAME: &str = "VNDirect";

/// VNDirect data provider.
///
/// Implements [`DataProvider`], [`PriceDataProvider`], and [`FundamentalDataProvider`].
#[derive(Debug)]
pub struct VndirectProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl VndirectProvider {
    /// Create a provider against the public API with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new(), vn_core::config::DEFAULT_VENDOR_BASE_URL)
    }

    /// Create a provider from configuration (base URL and timeout).
    ///
    /// # Errors
    /// Returns [`DataError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: &DataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DataError::Network(e.to_string()))?;

        Ok(Self::with_client(client, &config.vendor_base_url))
    }

    /// Create a provider with a custom HTTP client and base URL.
    ///
    /// Rate limiting is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Set the minimum delay between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit_ms = rate_limit.as_millis() as u64;
        self
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = now_millis();
        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(now_millis(), Ordering::Relaxed);
    }

    /// Build an endpoint URL. Query values are percent-encoded.
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            DataError::InvalidParameter(format!("invalid vendor URL '{}': {e}", self.base_url))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Build the stock price URL for a symbol and date range.
    fn prices_url(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> Result<Url> {
        self.endpoint(
            "/v4/stock_prices",
            &[
                ("sort", "date".to_string()),
                (
                    "q",
                    format!(
                        "code:{}~date:gte:{}~date:lte:{}",
                        symbol.as_str(),
                        start.format(DATE_FORMAT),
                        end.format(DATE_FORMAT)
                    ),
                ),
                ("size", PRICE_PAGE_SIZE.to_string()),
                ("page", "1".to_string()),
            ],
        )
    }

    /// Build the financial statements URL.
    fn statements_url(&self, symbol: &Symbol, period: ReportPeriod) -> Result<Url> {
        self.endpoint(
            "/v4/financial_statements",
            &[
                (
                    "q",
                    format!(
                        "code:{}~reportType:{}~modelType:{}",
                        symbol.as_str(),
                        period.as_vendor_str(),
                        INCOME_MODEL_TYPES
                    ),
                ),
                ("sort", "fiscalDate:desc".to_string()),
                ("size", STATEMENT_PAGE_SIZE.to_string()),
            ],
        )
    }

    /// Build the financial models (item names) URL.
    fn models_url(&self, symbol: &Symbol) -> Result<Url> {
        self.endpoint(
            "/v4/financial_models",
            &[
                ("sort", "displayOrder:asc".to_string()),
                (
                    "q",
                    format!(
                        "codeList:{}~modelType:{}~note:{}",
                        symbol.as_str(),
                        INCOME_MODEL_TYPES,
                        MODEL_NOTES
                    ),
                ),
                ("size", MODEL_PAGE_SIZE.to_string()),
            ],
        )
    }

    /// Make a rate-limited GET request and parse the JSON response.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, symbol: &Symbol) -> Result<T> {
        self.apply_rate_limit().await;
        debug!(%url, "VNDirect request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(DataError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))
    }

    /// Fetch one symbol's daily prices as a vendor-shaped frame.
    async fn fetch_symbol(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        symbol.validate()?;
        let url = self.prices_url(symbol, start, end)?;
        let response: PriceResponse = self.get_json(url, symbol).await?;
        parse_price_response(symbol, response)
    }
}

impl Default for VndirectProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for VndirectProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "VNDirect finfo API provider for Vietnamese daily prices and financial reports"
    }
}

#[async_trait]
impl PriceDataProvider for VndirectProvider {
    async fn download(
        &self,
        symbols: &[Symbol],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<VendorPrices> {
        if start > end {
            return Err(DataError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        match symbols {
            [] => Err(DataError::InvalidParameter(
                "At least one symbol is required".to_string(),
            )),
            [symbol] => Ok(VendorPrices::Flat(self.fetch_symbol(symbol, start, end).await?)),
            _ => {
                let mut groups = BTreeMap::new();
                for symbol in symbols {
                    match self.fetch_symbol(symbol, start, end).await {
                        Ok(df) => {
                            groups.insert(symbol.clone(), df);
                        }
                        Err(DataError::SymbolNotFound(_)) => {
                            warn!(symbol = %symbol, "Symbol not found, skipping");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(VendorPrices::BySymbol(groups))
            }
        }
    }
}

#[async_trait]
impl FundamentalDataProvider for VndirectProvider {
    async fn income_statement(
        &self,
        symbol: &Symbol,
        period: ReportPeriod,
        limit: Option<usize>,
    ) -> Result<DataFrame> {
        symbol.validate()?;
        let statements: StatementResponse = self
            .get_json(self.statements_url(symbol, period)?, symbol)
            .await?;

        if statements.data.is_empty() {
            debug!(symbol = %symbol, "No financial statements returned");
            return Ok(DataFrame::empty());
        }

        let models: ModelResponse = self.get_json(self.models_url(symbol)?, symbol).await?;
        pivot_statements(&statements.data, &models.data, limit)
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Convert a price response into a vendor-shaped frame sorted by date.
///
/// Columns: `date`, `code`, `floor`, `open`, `high`, `low`, `close`, `adjust`,
/// `avg`, `volume_match`, `volume_reconcile`, `volume`, `value_match`,
/// `change_perc`. `volume` is matched plus put-through volume.
fn parse_price_response(symbol: &Symbol, response: PriceResponse) -> Result<DataFrame> {
    let mut rows = response.data;
    if rows.is_empty() {
        debug!(symbol = %symbol, "No price rows returned");
        return Ok(DataFrame::empty());
    }

    rows.sort_by(|a, b| a.date.cmp(&b.date));

    let dates = rows
        .iter()
        .map(|row| {
            NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
                .map(days_since_epoch)
                .map_err(|e| DataError::Parse(format!("bad date '{}': {e}", row.date)))
        })
        .collect::<Result<Vec<i32>>>()?;

    let date_col = Column::new("date".into(), dates).cast(&DataType::Date)?;
    let codes: Vec<&str> = rows
        .iter()
        .map(|row| row.code.as_deref().unwrap_or(symbol.as_str()))
        .collect();
    let floors: Vec<Option<&str>> = rows.iter().map(|row| row.floor.as_deref()).collect();
    let volumes: Vec<Option<f64>> = rows
        .iter()
        .map(|row| match (row.nm_volume, row.pt_volume) {
            (None, None) => None,
            (matched, reconciled) => Some(matched.unwrap_or_default() + reconciled.unwrap_or_default()),
        })
        .collect();

    let df = DataFrame::new(vec![
        date_col,
        Column::new("code".into(), codes),
        Column::new("floor".into(), floors),
        Column::new("open".into(), rows.iter().map(|r| r.open).collect::<Vec<_>>()),
        Column::new("high".into(), rows.iter().map(|r| r.high).collect::<Vec<_>>()),
        Column::new("low".into(), rows.iter().map(|r| r.low).collect::<Vec<_>>()),
        Column::new("close".into(), rows.iter().map(|r| r.close).collect::<Vec<_>>()),
        Column::new("adjust".into(), rows.iter().map(|r| r.ad_close).collect::<Vec<_>>()),
        Column::new("avg".into(), rows.iter().map(|r| r.average).collect::<Vec<_>>()),
        Column::new(
            "volume_match".into(),
            rows.iter().map(|r| r.nm_volume).collect::<Vec<_>>(),
        ),
        Column::new(
            "volume_reconcile".into(),
            rows.iter().map(|r| r.pt_volume).collect::<Vec<_>>(),
        ),
        Column::new("volume".into(), volumes),
        Column::new(
            "value_match".into(),
            rows.iter().map(|r| r.nm_value).collect::<Vec<_>>(),
        ),
        Column::new(
            "change_perc".into(),
            rows.iter().map(|r| r.pct_change).collect::<Vec<_>>(),
        ),
    ])?;

    Ok(df)
}

/// Pivot statement rows into one row per item and one column per fiscal date.
///
/// Items follow the model display order; codes with values but no model entry
/// are appended with an empty name. Items without a value in any kept period
/// are dropped. Periods are most recent first.
fn pivot_statements(
    statements: &[StatementRow],
    models: &[ModelRow],
    limit: Option<usize>,
) -> Result<DataFrame> {
    let mut periods: Vec<&str> = statements
        .iter()
        .map(|s| s.fiscal_date.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();
    if let Some(limit) = limit {
        periods.truncate(limit);
    }

    let values: HashMap<(i64, &str), f64> = statements
        .iter()
        .filter_map(|s| Some(((s.item_code, s.fiscal_date.as_str()), s.numeric_value?)))
        .collect();

    let mut models: Vec<&ModelRow> = models.iter().collect();
    models.sort_by_key(|m| m.display_order.unwrap_or(i64::MAX));

    let mut items: Vec<(i64, String)> = Vec::new();
    let mut seen = BTreeSet::new();
    for model in models {
        if seen.insert(model.item_code) {
            items.push((model.item_code, model.item_name.clone().unwrap_or_default()));
        }
    }
    for statement in statements {
        if seen.insert(statement.item_code) {
            items.push((statement.item_code, String::new()));
        }
    }
    items.retain(|(code, _)| periods.iter().any(|period| values.contains_key(&(*code, *period))));

    let mut columns = vec![
        Column::new(
            "item_code".into(),
            items.iter().map(|(code, _)| *code).collect::<Vec<_>>(),
        ),
        Column::new(
            "item_name".into(),
            items.iter().map(|(_, name)| name.as_str()).collect::<Vec<_>>(),
        ),
    ];
    for period in &periods {
        let column: Vec<Option<f64>> = items
            .iter()
            .map(|(code, _)| values.get(&(*code, *period)).copied())
            .collect();
        columns.push(Column::new((*period).into(), column));
    }

    Ok(DataFrame::new(columns)?)
}

// ============================================================================
// VNDirect API Response Types
// ============================================================================

/// Stock prices response.
#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    data: Vec<PriceRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRow {
    code: Option<String>,
    date: String,
    floor: Option<String>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    average: Option<f64>,
    ad_close: Option<f64>,
    nm_volume: Option<f64>,
    nm_value: Option<f64>,
    pt_volume: Option<f64>,
    pct_change: Option<f64>,
}

/// Financial statements response.
#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(default)]
    data: Vec<StatementRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementRow {
    item_code: i64,
    fiscal_date: String,
    numeric_value: Option<f64>,
}

/// Financial models response.
#[derive(Debug, Deserialize)]
struct ModelResponse {
    #[serde(default)]
    data: Vec<ModelRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelRow {
    item_code: i64,
    item_name: Option<String>,
    display_order: Option<i64>,
}
