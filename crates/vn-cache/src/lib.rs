#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vnquant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for Vietnamese equity price data.
//!
//! This crate provides implementations of the [`PriceCache`] trait from `vn-core`:
//!
//! - [`CsvFileCache`] - Persistent one-file-per-query CSV cache
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// CSV file cache and CSV helpers.
pub mod file;
/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use vn_core::PriceCache;

// Re-export implementations
pub use file::{CsvFileCache, read_csv, to_csv_string, write_csv};
pub use memory::InMemoryCache;
pub use noop::NoopCache;
