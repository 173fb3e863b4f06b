//! CSV file cache.
//!
//! Each request key maps to exactly one file:
//! `<root>/market_data/price_data/<SYMBOL>-<provider>-data-<start>-<end>.csv`.
//! A file that exists is a hit, forever. There is no locking; two writers
//! for the same key race on the same path.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, instrument};
use vn_core::config::price_data_dir;
use vn_core::types::DATE_FORMAT;
use vn_core::{DataError, PriceCache, Result, Symbol};

/// Writes a frame as CSV with a header row, creating parent directories.
///
/// # Errors
/// Returns an error if the file cannot be created or polars fails to serialize.
pub fn write_csv(path: &Path, df: &DataFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Reads a CSV file with a header row, parsing ISO dates into `Date` columns.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|opts| opts.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Serializes a frame to CSV text with a header row.
///
/// # Errors
/// Returns an error if polars fails to serialize.
pub fn to_csv_string(df: &DataFrame) -> Result<String> {
    let mut buf = Vec::new();
    let mut df = df.clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)?;
    String::from_utf8(buf).map_err(|e| DataError::Parse(e.to_string()))
}

/// One-CSV-file-per-query price cache.
#[derive(Debug, Clone)]
pub struct CsvFileCache {
    dir: PathBuf,
}

impl CsvFileCache {
    /// Create a cache rooted at `data_cache_dir`.
    ///
    /// Files are stored in `<data_cache_dir>/market_data/price_data`, which is
    /// created if missing.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(data_cache_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = price_data_dir(data_cache_dir.as_ref());
        fs::create_dir_all(&dir).map_err(|e| {
            DataError::Cache(format!("cannot create {}: {e}", dir.display()))
        })?;
        debug!(dir = %dir.display(), "CSV cache directory ready");
        Ok(Self { dir })
    }

    /// Directory holding the cache files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a request key.
    #[must_use]
    pub fn file_name(provider: &str, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}-{}-data-{}-{}.csv",
            symbol.as_str(),
            provider,
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        )
    }

    /// Full path for a request key.
    #[must_use]
    pub fn entry_path(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PathBuf {
        self.dir.join(Self::file_name(provider, symbol, start, end))
    }
}

#[async_trait]
impl PriceCache for CsvFileCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<DataFrame>> {
        symbol.validate()?;
        let path = self.entry_path(provider, symbol, start, end);
        if !path.is_file() {
            debug!(path = %path.display(), "Cache miss for price data");
            return Ok(None);
        }

        let df = tokio::task::spawn_blocking({
            let path = path.clone();
            move || read_csv(&path)
        })
        .await
        .map_err(|e| DataError::Cache(e.to_string()))?
        .map_err(|e| DataError::Cache(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), rows = df.height(), "Cache hit for price data");
        Ok(Some(df))
    }

    #[instrument(skip(self, data), fields(provider = %provider, symbol = %symbol, rows = data.height()))]
    async fn put_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        data: &DataFrame,
    ) -> Result<()> {
        symbol.validate()?;
        let path = self.entry_path(provider, symbol, start, end);

        tokio::task::spawn_blocking({
            let path = path.clone();
            let data = data.clone();
            move || write_csv(&path, &data)
        })
        .await
        .map_err(|e| DataError::Cache(e.to_string()))?
        .map_err(|e| DataError::Cache(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), "Cached price data");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(DataError::Cache(e.to_string())),
        };

        let mut removed = 0usize;
        for entry in entries {
            let path = entry.map_err(|e| DataError::Cache(e.to_string()))?.path();
            let is_csv = path.extension().is_some_and(|ext| ext == "csv");
            if path.is_file() && is_csv {
                fs::remove_file(&path).map_err(|e| DataError::Cache(e.to_string()))?;
                removed += 1;
            }
        }

        debug!("Removed {} cache files", removed);
        Ok(removed)
    }
}
