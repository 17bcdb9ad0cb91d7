/// USGS NWIS Daily Values (DV) API client.
///
/// Handles URL construction and retrieval for the USGS Water Services DV
/// endpoint:
///   https://waterservices.usgs.gov/nwis/dv/
///
/// Daily mean discharge is requested in RDB format so that downloaded and
/// hand-saved files go through the same parser (`ingest::rdb`).

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::ingest::rdb::{parse_daily_values, Ingested};
use crate::model::{FlowStatsError, PARAM_DISCHARGE, STAT_DAILY_MEAN};

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

const DV_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/dv/";

/// Builds a USGS DV API URL requesting daily mean discharge for one site
/// between `start` and `end` (inclusive), in RDB format.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use flowstats_service::ingest::usgs::build_dv_rdb_url;
///
/// let url = build_dv_rdb_url(
///     "03335000",
///     NaiveDate::from_ymd_opt(1969, 10, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2019, 9, 30).unwrap(),
/// );
/// assert!(url.contains("format=rdb"));
/// ```
pub fn build_dv_rdb_url(site: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}?sites={}&parameterCd={}&statCd={}&startDT={}&endDT={}&format=rdb",
        DV_BASE_URL,
        site,
        PARAM_DISCHARGE,
        STAT_DAILY_MEAN,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
    )
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// Downloads daily mean discharge for `site` and parses it.
///
/// # Errors
/// - `FlowStatsError::Request` - the request could not be sent or the body read.
/// - `FlowStatsError::Http` - non-2xx response from the USGS API.
/// - any error from `parse_daily_values`.
pub fn fetch_daily_values(
    client: &reqwest::blocking::Client,
    site: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Ingested, FlowStatsError> {
    let url = build_dv_rdb_url(site, start, end);
    info!(site, %start, %end, "Fetching NWIS daily values");
    debug!(%url, "DV request");

    let response = client
        .get(&url)
        .send()
        .map_err(|e| FlowStatsError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FlowStatsError::Http(status.as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| FlowStatsError::Request(e.to_string()))?;

    parse_daily_values(&body).map_err(|e| match e {
        FlowStatsError::NoData(_) => FlowStatsError::NoData(format!("NWIS DV response for {}", site)),
        other => other,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
