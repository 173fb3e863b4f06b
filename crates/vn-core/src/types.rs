//! Record types for Vietnamese market data.
//!
//! - [`PriceRecord`] - One trading day of OHLCV data
//! - [`StockInfo`] - Descriptive record for a ticker
//! - [`ReportPeriod`] - Quarterly or annual financial reports

use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::symbol::{Exchange, Symbol};

/// Date format used for request parameters and cache file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an ISO `YYYY-MM-DD` date string.
///
/// # Errors
/// Returns [`DataError::InvalidParameter`] when the string is not a valid date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        DataError::InvalidParameter(format!("invalid date '{value}' (expected YYYY-MM-DD): {e}"))
    })
}

/// A single trading day keyed by date, in the Yahoo Finance field convention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Trading date.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest price during the session.
    pub high: f64,
    /// Lowest price during the session.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Adjusted closing price.
    pub adj_close: Option<f64>,
}

impl PriceRecord {
    /// Creates a new price record.
    #[must_use]
    pub const fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        }
    }

    /// Sets the adjusted close price.
    #[must_use]
    pub const fn with_adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = Some(adj_close);
        self
    }

    /// Builds a frame with normalized column names from a slice of records.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be assembled.
    pub fn to_frame(records: &[Self]) -> Result<DataFrame> {
        let days: Vec<i32> = records.iter().map(|r| days_since_epoch(r.date)).collect();
        let date_col = Column::new("Date".into(), days).cast(&DataType::Date)?;

        let df = DataFrame::new(vec![
            date_col,
            Column::new("Open".into(), records.iter().map(|r| r.open).collect::<Vec<_>>()),
            Column::new("High".into(), records.iter().map(|r| r.high).collect::<Vec<_>>()),
            Column::new("Low".into(), records.iter().map(|r| r.low).collect::<Vec<_>>()),
            Column::new("Close".into(), records.iter().map(|r| r.close).collect::<Vec<_>>()),
            Column::new("Volume".into(), records.iter().map(|r| r.volume).collect::<Vec<_>>()),
            Column::new(
                "Adj Close".into(),
                records.iter().map(|r| r.adj_close).collect::<Vec<_>>(),
            ),
        ])?;
        Ok(df)
    }
}

/// Extracts typed price records from a frame with normalized column names.
///
/// Rows missing a date or any of open/high/low/close are skipped. A missing
/// `Volume` cell reads as zero.
///
/// # Errors
/// Returns an error if a required column is absent or has an unusable type.
pub fn price_records(df: &DataFrame) -> Result<Vec<PriceRecord>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let dates = date_values(df.column("Date")?)?;
    let opens = f64_values(df, "Open")?;
    let highs = f64_values(df, "High")?;
    let lows = f64_values(df, "Low")?;
    let closes = f64_values(df, "Close")?;
    let volumes = f64_values(df, "Volume")?;
    let has_adj = df.get_column_names().iter().any(|c| c.as_str() == "Adj Close");
    let adj = if has_adj {
        f64_values(df, "Adj Close")?
    } else {
        vec![None; df.height()]
    };

    let records = (0..df.height())
        .filter_map(|i| {
            Some(PriceRecord {
                date: dates[i]?,
                open: opens[i]?,
                high: highs[i]?,
                low: lows[i]?,
                close: closes[i]?,
                volume: volumes[i].unwrap_or_default(),
                adj_close: adj[i],
            })
        })
        .collect();
    Ok(records)
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn date_values(column: &Column) -> Result<Vec<Option<NaiveDate>>> {
    let series = column.as_materialized_series();
    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            Ok(days.i32()?.into_iter().map(|d| d.and_then(date_from_days)).collect())
        }
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|s| s.and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok()))
            .collect()),
        other => Err(DataError::Parse(format!(
            "unsupported date column type: {other}"
        ))),
    }
}

/// Days since the Unix epoch, the physical representation of a polars `Date`.
#[must_use]
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

fn date_from_days(days: i32) -> Option<NaiveDate> {
    DateTime::from_timestamp(i64::from(days) * 86_400, 0).map(|dt| dt.date_naive())
}

/// Descriptive record for a ticker.
///
/// Built without network access; `short_name` and `exchange` are
/// placeholders, not verified reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Display name (the symbol until a reference source is wired in).
    pub short_name: String,
    /// Market name, always `Vietnam`.
    pub market: String,
    /// Guessed listing exchange.
    pub exchange: Exchange,
}

impl StockInfo {
    /// Creates the placeholder record for a symbol.
    #[must_use]
    pub fn placeholder(symbol: Symbol) -> Self {
        let exchange = Exchange::guess(&symbol);
        Self {
            short_name: symbol.to_string(),
            market: "Vietnam".to_string(),
            exchange,
            symbol,
        }
    }
}

/// Period type for financial reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportPeriod {
    /// Quarterly reports.
    #[default]
    Quarter,
    /// Annual reports.
    Annual,
}

impl ReportPeriod {
    /// Returns the vendor's `reportType` value.
    #[must_use]
    pub const fn as_vendor_str(&self) -> &'static str {
        match self {
            Self::Quarter => "QUARTER",
            Self::Annual => "ANNUAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2023-01-01").unwrap(), date(2023, 1, 1));
        assert!(matches!(
            parse_date("01/01/2023"),
            Err(DataError::InvalidParameter(_))
        ));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_records_frame_round_trip() {
        let records = vec![
            PriceRecord::new(date(2023, 1, 3), 78.0, 79.5, 77.8, 79.1, 1_200_000.0)
                .with_adj_close(75.2),
            PriceRecord::new(date(2023, 1, 4), 79.1, 80.0, 78.9, 79.9, 980_000.0),
        ];

        let df = PriceRecord::to_frame(&records).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("Date").unwrap().dtype(), &DataType::Date);

        let back = price_records(&df).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_price_records_accepts_string_dates() {
        let df = DataFrame::new(vec![
            Column::new("Date".into(), vec!["2023-02-01", "not a date"]),
            Column::new("Open".into(), vec![1.0, 2.0]),
            Column::new("High".into(), vec![1.5, 2.5]),
            Column::new("Low".into(), vec![0.5, 1.5]),
            Column::new("Close".into(), vec![1.2, 2.2]),
            Column::new("Volume".into(), vec![100_i64, 200]),
        ])
        .unwrap();

        let records = price_records(&df).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, date(2023, 2, 1));
        assert_eq!(records[0].volume, 100.0);
        assert_eq!(records[0].adj_close, None);
    }

    #[test]
    fn test_price_records_empty_frame() {
        assert!(price_records(&DataFrame::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_stock_info_placeholder() {
        let info = StockInfo::placeholder(Symbol::new("vnm"));
        assert_eq!(info.symbol.as_str(), "VNM");
        assert_eq!(info.short_name, "VNM");
        assert_eq!(info.market, "Vietnam");
        assert_eq!(info.exchange, Exchange::Hose);

        let info = StockInfo::placeholder(Symbol::new("SHBHNX"));
        assert_eq!(info.exchange, Exchange::Hnx);
    }

    #[test]
    fn test_report_period_vendor_str() {
        assert_eq!(ReportPeriod::default().as_vendor_str(), "QUARTER");
        assert_eq!(ReportPeriod::Annual.as_vendor_str(), "ANNUAL");
    }
}
