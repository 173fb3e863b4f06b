//! Configuration passed explicitly to providers, caches and interface calls.
//!
//! There is no process-wide config: build a [`DataConfig`] once and hand it
//! to whatever needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "data_cache";

/// Default number of characters kept in a text preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Default VNDirect API base URL.
pub const DEFAULT_VENDOR_BASE_URL: &str = "https://finfo-api.vndirect.com.vn";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root directory for cached data; price files live under
    /// `market_data/price_data` inside it.
    pub data_cache_dir: PathBuf,
    /// Characters kept when previewing a report.
    pub preview_chars: usize,
    /// Vendor API base URL.
    pub vendor_base_url: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            vendor_base_url: DEFAULT_VENDOR_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DataConfig {
    /// Reads configuration from `VNQUANT_*` environment variables, falling
    /// back to defaults for anything unset.
    ///
    /// - `VNQUANT_DATA_CACHE_DIR`
    /// - `VNQUANT_PREVIEW_CHARS`
    /// - `VNQUANT_VENDOR_BASE_URL`
    /// - `VNQUANT_REQUEST_TIMEOUT_SECS`
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if a numeric value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("VNQUANT_DATA_CACHE_DIR") {
            config.data_cache_dir = PathBuf::from(dir);
        }
        if let Some(chars) = lookup("VNQUANT_PREVIEW_CHARS") {
            config.preview_chars = parse_number("VNQUANT_PREVIEW_CHARS", &chars)?;
        }
        if let Some(url) = lookup("VNQUANT_VENDOR_BASE_URL") {
            config.vendor_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("VNQUANT_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_number("VNQUANT_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        Ok(config)
    }

    /// Sets the cache root.
    #[must_use]
    pub fn with_data_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_cache_dir = dir.into();
        self
    }

    /// Sets the preview length.
    #[must_use]
    pub const fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Directory holding cached price files.
    #[must_use]
    pub fn price_data_dir(&self) -> PathBuf {
        price_data_dir(&self.data_cache_dir)
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `<root>/market_data/price_data`.
#[must_use]
pub fn price_data_dir(root: &Path) -> PathBuf {
    root.join("market_data").join("price_data")
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DataError::InvalidParameter(format!("{key}={value}: {e}")))
}
