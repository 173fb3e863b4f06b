//! Stock data, info and income statement accessors.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use vn_cache::write_csv;
use vn_core::{
    DataError, FundamentalDataProvider, PriceDataProvider, ReportPeriod, Result, StockInfo,
    Symbol, normalize_columns, parse_date,
};

/// Accessors for Vietnamese stock data.
///
/// Wraps a price provider and, optionally, a fundamentals provider. Every
/// fetch follows one error policy: a valid request without rows is
/// `Ok(empty frame)`, anything that goes wrong is `Err` and is logged.
///
/// # Example
///
/// ```rust,ignore
/// use vnquant::{DataConfig, VnQuantUtils};
///
/// let utils = VnQuantUtils::vndirect(&DataConfig::default())?;
/// let df = utils.get_stock_data("VNM", "2023-01-01", "2023-12-31", None).await?;
/// println!("{}", df.head(Some(5)));
/// ```
#[derive(Clone)]
pub struct VnQuantUtils {
    prices: Arc<dyn PriceDataProvider>,
    fundamentals: Option<Arc<dyn FundamentalDataProvider>>,
}

impl std::fmt::Debug for VnQuantUtils {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VnQuantUtils")
            .field("prices", &self.prices.name())
            .field(
                "fundamentals",
                &self.fundamentals.as_ref().map(|p| p.name()),
            )
            .finish()
    }
}

impl VnQuantUtils {
    /// Create accessors over a price provider, without fundamentals.
    #[must_use]
    pub fn new(prices: Arc<dyn PriceDataProvider>) -> Self {
        Self {
            prices,
            fundamentals: None,
        }
    }

    /// Set the fundamentals provider used by [`Self::get_income_stmt`].
    #[must_use]
    pub fn with_fundamentals(mut self, fundamentals: Arc<dyn FundamentalDataProvider>) -> Self {
        self.fundamentals = Some(fundamentals);
        self
    }

    /// Create accessors backed by the VNDirect provider for both prices and
    /// fundamentals.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[cfg(feature = "vndirect")]
    pub fn vndirect(config: &vn_core::DataConfig) -> Result<Self> {
        let provider = Arc::new(vn_vndirect::VndirectProvider::from_config(config)?);
        Ok(Self::new(provider.clone()).with_fundamentals(provider))
    }

    /// Name of the underlying price provider.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.prices.name()
    }

    /// Determines whether a symbol looks like a Vietnamese stock.
    #[must_use]
    pub fn is_vn_stock(symbol: &str) -> bool {
        vn_core::is_vn_stock(symbol)
    }

    /// Retrieves daily prices for a ticker with Yahoo-style column names.
    ///
    /// Dates are `YYYY-MM-DD`. When `save_path` is given and rows were
    /// returned, the frame is also written there as CSV.
    ///
    /// # Errors
    /// Returns an error for a malformed symbol or date, `start > end`, vendor
    /// failures, a symbol missing from a multi-symbol response, or a failed
    /// save.
    pub async fn get_stock_data(
        &self,
        symbol: &str,
        start_date: &str,
        end_date: &str,
        save_path: Option<&Path>,
    ) -> Result<DataFrame> {
        let (symbol, start, end) = parse_request(symbol, start_date, end_date).inspect_err(|e| {
            warn!(
                provider = self.prices.name(),
                symbol,
                error = %e,
                "Rejected stock data request"
            );
        })?;
        self.fetch_prices(&symbol, start, end, save_path).await
    }

    /// Typed form of [`Self::get_stock_data`].
    ///
    /// # Errors
    /// See [`Self::get_stock_data`].
    pub async fn fetch_prices(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        save_path: Option<&Path>,
    ) -> Result<DataFrame> {
        self.fetch_prices_inner(symbol, start, end, save_path)
            .await
            .inspect_err(|e| {
                warn!(
                    provider = self.prices.name(),
                    symbol = %symbol,
                    error = %e,
                    "Error retrieving Vietnamese stock data"
                );
            })
    }

    async fn fetch_prices_inner(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        save_path: Option<&Path>,
    ) -> Result<DataFrame> {
        symbol.validate()?;
        check_range(start, end)?;

        debug!(
            provider = self.prices.name(),
            symbol = %symbol,
            %start,
            %end,
            "Downloading price data"
        );

        let prices = self
            .prices
            .download(std::slice::from_ref(symbol), start, end)
            .await?;
        let df = normalize_columns(prices.into_symbol(symbol)?)?;

        if df.height() == 0 {
            debug!(symbol = %symbol, "Vendor returned no rows");
            return Ok(df);
        }

        if let Some(path) = save_path {
            write_csv(path, &df)?;
            info!(symbol = %symbol, path = %path.display(), "Stock data for {} saved", symbol);
        }

        Ok(df)
    }

    /// Returns the placeholder descriptive record for a ticker.
    ///
    /// No network access; the exchange is guessed from the symbol length.
    #[must_use]
    pub fn get_stock_info(symbol: &str) -> StockInfo {
        StockInfo::placeholder(Symbol::new(symbol))
    }

    /// Retrieves the latest quarterly income statements for a ticker.
    ///
    /// # Errors
    /// Returns an error if no fundamentals provider is configured or the
    /// vendor call fails.
    pub async fn get_income_stmt(&self, symbol: &str) -> Result<DataFrame> {
        self.get_income_stmt_for(symbol, ReportPeriod::Quarter, None)
            .await
    }

    /// Retrieves income statements for a ticker with an explicit period type
    /// and period limit.
    ///
    /// # Errors
    /// See [`Self::get_income_stmt`]. A malformed symbol is also an error.
    pub async fn get_income_stmt_for(
        &self,
        symbol: &str,
        period: ReportPeriod,
        limit: Option<usize>,
    ) -> Result<DataFrame> {
        self.income_stmt_inner(symbol, period, limit)
            .await
            .inspect_err(|e| {
                warn!(
                    provider = self.fundamentals.as_ref().map_or("none", |p| p.name()),
                    symbol,
                    ?period,
                    error = %e,
                    "Error retrieving income statement"
                );
            })
    }

    async fn income_stmt_inner(
        &self,
        symbol: &str,
        period: ReportPeriod,
        limit: Option<usize>,
    ) -> Result<DataFrame> {
        let symbol = Symbol::parse(symbol)?;
        let Some(provider) = &self.fundamentals else {
            return Err(DataError::ProviderNotConfigured(
                "No fundamentals provider registered".to_string(),
            ));
        };

        provider.income_statement(&symbol, period, limit).await
    }
}

/// Parses a caller's symbol and date range.
pub(crate) fn parse_request(
    symbol: &str,
    start_date: &str,
    end_date: &str,
) -> Result<(Symbol, NaiveDate, NaiveDate)> {
    let symbol = Symbol::parse(symbol)?;
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    check_range(start, end)?;
    Ok((symbol, start, end))
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(DataError::InvalidParameter(format!(
            "Start date {start} is after end date {end}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use polars::prelude::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vn_core::{DataProvider, Exchange, VendorPrices};

    #[derive(Debug)]
    struct StubProvider {
        response: VendorPrices,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(response: VendorPrices) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl DataProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn description(&self) -> &str {
            "canned responses"
        }
    }

    #[async_trait]
    impl PriceDataProvider for StubProvider {
        async fn download(
            &self,
            _symbols: &[Symbol],
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<VendorPrices> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    #[derive(Debug)]
    struct StubReports {
        response: std::result::Result<DataFrame, String>,
        requests: Mutex<Vec<(Symbol, ReportPeriod, Option<usize>)>>,
    }

    impl StubReports {
        fn new(response: std::result::Result<DataFrame, String>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(Symbol, ReportPeriod, Option<usize>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl DataProvider for StubReports {
        fn name(&self) -> &str {
            "stub-reports"
        }

        fn description(&self) -> &str {
            "canned income statements"
        }
    }

    #[async_trait]
    impl FundamentalDataProvider for StubReports {
        async fn income_statement(
            &self,
            symbol: &Symbol,
            period: ReportPeriod,
            limit: Option<usize>,
        ) -> Result<DataFrame> {
            self.requests
                .lock()
                .unwrap()
                .push((symbol.clone(), period, limit));
            self.response.clone().map_err(DataError::Network)
        }
    }

    fn income_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("item_code".into(), vec![21001i64, 22001]),
            Column::new("item_name".into(), vec!["Net revenue", "Net profit"]),
            Column::new("2023-12-31".into(), vec![Some(16000.0), Some(2500.0)]),
            Column::new("2023-09-30".into(), vec![Some(15000.0), None]),
        ])
        .unwrap()
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn capture_warnings() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (buffer, tracing::subscriber::set_default(subscriber))
    }

    fn vendor_frame(close: f64) -> DataFrame {
        DataFrame::new(vec![
            Column::new("date".into(), vec!["2023-01-03"]),
            Column::new("open".into(), vec![close - 1.0]),
            Column::new("high".into(), vec![close + 1.0]),
            Column::new("low".into(), vec![close - 2.0]),
            Column::new("close".into(), vec![close]),
            Column::new("adjust".into(), vec![close - 0.5]),
            Column::new("volume".into(), vec![1000.0]),
        ])
        .unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_get_stock_data_renames_columns() {
        let utils = VnQuantUtils::new(StubProvider::new(vendor_frame(79.0).into()));
        let df = utils
            .get_stock_data("vnm", "2023-01-01", "2023-12-31", None)
            .await
            .unwrap();
        assert_eq!(
            names(&df),
            vec!["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]
        );
    }

    #[tokio::test]
    async fn test_get_stock_data_extracts_symbol() {
        let mut groups = BTreeMap::new();
        groups.insert(Symbol::new("FPT"), vendor_frame(90.0));
        groups.insert(Symbol::new("VNM"), vendor_frame(79.0));
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::BySymbol(groups)));

        let df = utils
            .get_stock_data("FPT", "2023-01-01", "2023-12-31", None)
            .await
            .unwrap();
        let close = df
            .column("Close")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(0);
        assert_eq!(close, Some(90.0));

        let err = utils
            .get_stock_data("HPG", "2023-01-01", "2023-12-31", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_stock_data_validates_dates() {
        let stub = StubProvider::new(VendorPrices::empty());
        let utils = VnQuantUtils::new(stub.clone());

        let err = utils
            .get_stock_data("VNM", "2023-13-01", "2023-12-31", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));

        let err = utils
            .get_stock_data("VNM", "2023-12-31", "2023-01-01", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_stock_data_saves_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("vnm.csv");
        let utils = VnQuantUtils::new(StubProvider::new(vendor_frame(79.0).into()));

        utils
            .get_stock_data("VNM", "2023-01-01", "2023-12-31", Some(&path))
            .await
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Open,High,Low,Close,Adj Close,Volume"));
    }

    #[tokio::test]
    async fn test_empty_result_is_not_saved() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.csv");
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::empty()));

        let df = utils
            .get_stock_data("VNM", "2023-01-01", "2023-12-31", Some(&path))
            .await
            .unwrap();
        assert_eq!(df.height(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_get_stock_data_rejects_unsafe_symbols() {
        let tmp = tempfile::tempdir().unwrap();
        let stub = StubProvider::new(vendor_frame(79.0).into());
        let utils = VnQuantUtils::new(stub.clone());

        for symbol in ["", "../../../evil", "VNM~date:gte:1990-01-01&size=1#"] {
            let err = utils
                .get_stock_data(symbol, "2023-01-01", "2023-12-31", Some(&tmp.path().join("x.csv")))
                .await
                .unwrap_err();
            assert!(matches!(err, DataError::InvalidParameter(_)));
        }

        let err = utils
            .fetch_prices(&Symbol::new("../evil"), NaiveDate::MIN, NaiveDate::MAX, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
        assert!(!tmp.path().join("x.csv").exists());
    }

    #[tokio::test]
    async fn test_get_income_stmt_delegates() {
        let reports = StubReports::new(Ok(income_frame()));
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::empty()))
            .with_fundamentals(reports.clone());

        let df = utils.get_income_stmt("vnm").await.unwrap();
        assert_eq!(df.shape(), (2, 4));
        assert_eq!(names(&df)[..2], ["item_code", "item_name"]);

        utils
            .get_income_stmt_for("FPT", ReportPeriod::Annual, Some(4))
            .await
            .unwrap();
        assert_eq!(
            reports.requests(),
            vec![
                (Symbol::new("VNM"), ReportPeriod::Quarter, None),
                (Symbol::new("FPT"), ReportPeriod::Annual, Some(4)),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_income_stmt_empty_report() {
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::empty()))
            .with_fundamentals(StubReports::new(Ok(DataFrame::empty())));

        let df = utils.get_income_stmt("VNM").await.unwrap();
        assert_eq!(df.height(), 0);
    }

    #[tokio::test]
    async fn test_get_income_stmt_vendor_error() {
        let reports = StubReports::new(Err("connection reset".to_string()));
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::empty()))
            .with_fundamentals(reports.clone());

        let err = utils.get_income_stmt("VNM").await.unwrap_err();
        assert!(matches!(err, DataError::Network(_)));

        let err = utils.get_income_stmt("../evil").await.unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
        assert_eq!(reports.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_requests_are_logged() {
        let (logs, _guard) = capture_warnings();
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::empty()));

        utils
            .get_stock_data("VNM", "2023-13-01", "2023-12-31", None)
            .await
            .unwrap_err();
        utils.get_income_stmt("VNM").await.unwrap_err();

        let text = logs.contents();
        assert!(text.contains("Rejected stock data request"), "{text}");
        assert!(text.contains("2023-13-01"), "{text}");
        assert!(text.contains("Error retrieving income statement"), "{text}");
        assert!(text.contains("Provider not configured"), "{text}");
    }

    #[tokio::test]
    async fn test_income_stmt_without_provider() {
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::empty()));
        let err = utils.get_income_stmt("VNM").await.unwrap_err();
        assert!(matches!(err, DataError::ProviderNotConfigured(_)));
    }

    #[test]
    fn test_stock_info_and_classifier() {
        let info = VnQuantUtils::get_stock_info("fpt");
        assert_eq!(info.symbol.as_str(), "FPT");
        assert_eq!(info.market, "Vietnam");
        assert_eq!(info.exchange, Exchange::Hose);

        assert!(VnQuantUtils::is_vn_stock("VIC"));
        assert!(!VnQuantUtils::is_vn_stock("NVDA"));
    }

    #[test]
    fn test_debug_lists_providers() {
        let utils = VnQuantUtils::new(StubProvider::new(VendorPrices::empty()));
        let debug = format!("{utils:?}");
        assert!(debug.contains("stub"));
        assert_eq!(utils.provider_name(), "stub");
    }
}
