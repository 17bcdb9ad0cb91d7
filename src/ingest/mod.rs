/// Daily streamflow ingestion.
///
/// - `rdb`      - USGS RDB daily-value parser (files on disk or API bodies).
/// - `usgs`     - NWIS DV API URL construction and download.
/// - `fixtures` - (test only) representative RDB payloads.
///
/// Each data source gets its own file here; the statistics engine only ever
/// sees the `TimeSeries` they produce.

pub mod rdb;
pub mod usgs;

#[cfg(test)]
pub(crate) mod fixtures;
