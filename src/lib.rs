/// flowstats_service: daily streamflow statistics for USGS gauge stations.
///
/// # Module structure
///
/// ```text
/// flowstats_service
/// ├── model       - shared data types (Observation, TimeSeries, StatsRecords, FlowStatsError, …)
/// ├── config      - analysis window and station list loader (stations.toml)
/// ├── ingest
/// │   ├── rdb     - USGS RDB daily-value parser
/// │   ├── usgs    - USGS NWIS DV API: URL construction + download
/// │   └── fixtures (test only) - representative RDB payloads
/// ├── analysis
/// │   ├── periods  - water-year and calendar-month segmentation
/// │   ├── metrics  - per-period flow metrics (CV, skew, R-B index, 7Q, …)
/// │   ├── annual   - one record per water year
/// │   ├── monthly  - one record per calendar month
/// │   └── averages - long-term annual and per-calendar-month means
/// ├── pipeline    - per-station ingest → clip → analyze, thread-pooled
/// └── output      - CSV/TSV tables and JSON report
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod model;
pub mod output;
pub mod pipeline;
