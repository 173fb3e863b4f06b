#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vnquant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for Vietnamese equity data.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`is_vn_stock`](symbol::is_vn_stock) - Ticker classifier
//! - [`VendorPrices`](frame::VendorPrices) - Single vs. multi-symbol vendor layout
//! - [`normalize_columns`](columns::normalize_columns) - Vendor to Yahoo-style column names
//! - [`PriceDataProvider`](provider::PriceDataProvider) - Price history downloads
//! - [`FundamentalDataProvider`](provider::FundamentalDataProvider) - Financial reports
//! - [`PriceCache`](cache::PriceCache) - Caching abstraction
//! - [`DataConfig`](config::DataConfig) - Explicitly passed configuration

/// Cache trait for storing fetched price data.
pub mod cache;
/// Column renaming to the Yahoo Finance schema.
pub mod columns;
/// Configuration threaded through constructors.
pub mod config;
/// Error types for data operations.
pub mod error;
/// Vendor response layouts.
pub mod frame;
/// Structured fetch status.
pub mod outcome;
/// Provider traits for fetching market data.
pub mod provider;
/// Ticker symbols and the Vietnamese-market classifier.
pub mod symbol;
/// Record types (price rows, stock info, report periods).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{PROVIDER_TAG, PriceCache};
pub use columns::{COLUMN_MAPPING, normalize_columns, target_name};
pub use config::DataConfig;
pub use error::{DataError, Result};
pub use frame::VendorPrices;
pub use outcome::FetchStatus;
pub use provider::{DataProvider, FundamentalDataProvider, PriceDataProvider};
pub use symbol::{Exchange, MAX_SYMBOL_LEN, Symbol, VN_EXCHANGE_SUFFIXES, is_vn_stock};
pub use types::{PriceRecord, ReportPeriod, StockInfo, parse_date, price_records};
