//! Cache-first price retrieval with a structured report.

use tracing::{debug, info, instrument, warn};

use vn_core::{FetchStatus, PROVIDER_TAG, PriceCache, Symbol};

use crate::preview::PriceReport;
use crate::utils::{VnQuantUtils, parse_request};

/// Retrieves daily prices for a Vietnamese ticker, reading and populating a
/// cache.
///
/// On a cache hit the stored frame is returned with
/// [`FetchStatus::Cached`]. On a miss the vendor is called; non-empty results
/// are written to the cache and reported as [`FetchStatus::Fetched`]. A
/// failed cache write is logged and does not change the status.
///
/// This function does not return `Err`; failures are reported as
/// [`FetchStatus::Error`] with the message attached. A malformed symbol or
/// date range fails before the cache or vendor is touched.
#[instrument(skip(utils, cache), fields(provider = utils.provider_name()))]
pub async fn get_vnquant_data(
    utils: &VnQuantUtils,
    cache: &dyn PriceCache,
    symbol: &str,
    start_date: &str,
    end_date: &str,
) -> PriceReport {
    let (symbol, start, end) = match parse_request(symbol, start_date, end_date) {
        Ok(request) => request,
        Err(e) => {
            warn!(symbol, error = %e, "Rejected price request");
            return PriceReport::failed(Symbol::new(symbol), start_date, end_date, &e);
        }
    };

    match cache.get_prices(PROVIDER_TAG, &symbol, start, end).await {
        Ok(Some(df)) => {
            debug!(symbol = %symbol, rows = df.height(), "Serving price data from cache");
            return PriceReport::with_data(symbol, start_date, end_date, FetchStatus::Cached, df);
        }
        Ok(None) => {}
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Failed to read cached price data");
            return PriceReport::failed(symbol, start_date, end_date, &e);
        }
    }

    let df = match utils.fetch_prices(&symbol, start, end, None).await {
        Ok(df) => df,
        Err(e) => return PriceReport::failed(symbol, start_date, end_date, &e),
    };

    if df.height() == 0 {
        info!(symbol = %symbol, "No price data returned");
        return PriceReport::with_data(symbol, start_date, end_date, FetchStatus::Empty, df);
    }

    if let Err(e) = cache.put_prices(PROVIDER_TAG, &symbol, start, end, &df).await {
        warn!(symbol = %symbol, error = %e, "Failed to cache price data");
    }

    info!(symbol = %symbol, rows = df.height(), "Fetched price data");
    PriceReport::with_data(symbol, start_date, end_date, FetchStatus::Fetched, df)
}

/// Same as [`get_vnquant_data`] without a cache.
///
/// The result is either [`FetchStatus::Fetched`], [`FetchStatus::Empty`] or
/// [`FetchStatus::Error`].
pub async fn get_vnquant_data_online(
    utils: &VnQuantUtils,
    symbol: &str,
    start_date: &str,
    end_date: &str,
) -> PriceReport {
    get_vnquant_data(utils, &vn_cache::NoopCache, symbol, start_date, end_date).await
}
