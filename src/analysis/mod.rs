/// Streamflow statistics engine.
///
/// Submodules, leaves first:
/// - `periods`  - cuts a daily series into water years or calendar months.
/// - `metrics`  - per-period metric functions (mean, CV, skew, Tqmean, R-B, 7Q, ...).
/// - `annual`   - one statistics record per water year.
/// - `monthly`  - one statistics record per month-year.
/// - `averages` - long-term annual means and calendar-month means.
///
/// Everything here is a pure function of its input series; no I/O, no
/// shared state.

pub mod annual;
pub mod averages;
pub mod metrics;
pub mod monthly;
pub mod periods;
