#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vnquant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Data access for Vietnamese equities.
//!
//! This crate re-exports the core types and cache implementations, and adds
//! the caller-facing layer: [`VnQuantUtils`] for direct frame access and the
//! interface functions that return a structured [`PriceReport`].
//!
//! # Features
//!
//! - `vndirect` - VNDirect provider and [`VnQuantUtils::vndirect`] (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use vnquant::{CsvFileCache, DataConfig, VnQuantUtils, get_vnquant_data};
//!
//! #[tokio::main]
//! async fn main() -> vnquant::Result<()> {
//!     let config = DataConfig::from_env()?;
//!     let utils = VnQuantUtils::vndirect(&config)?;
//!     let cache = CsvFileCache::new(&config.data_cache_dir)?;
//!
//!     let report = get_vnquant_data(&utils, &cache, "VNM", "2023-01-01", "2023-12-31").await;
//!     println!("{}", report.preview(config.preview_chars));
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use vn_core::*;

// Cache implementations
pub use vn_cache::{CsvFileCache, InMemoryCache, NoopCache, read_csv, to_csv_string, write_csv};

// Providers
#[cfg(feature = "vndirect")]
pub use vn_vndirect::VndirectProvider;

mod interface;
mod preview;
mod utils;

pub use interface::{get_vnquant_data, get_vnquant_data_online};
pub use preview::{PriceReport, preview};
pub use utils::VnQuantUtils;
