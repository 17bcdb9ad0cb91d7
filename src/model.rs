/// Core data types for the streamflow statistics service.
///
/// This module defines the shared domain model imported by all other modules:
/// observations and time series on the input side, per-period statistics
/// records and long-term averages on the output side, and the crate error
/// type. Apart from the `TimeSeries` invariant checks it contains no logic.

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS statistic code for a daily mean value.
pub const STAT_DAILY_MEAN: &str = "00003";

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One daily discharge value from a USGS gauge station.
///
/// `discharge_cfs` is `None` when the source row was blank or carried one
/// of the USGS no-data tokens ("Eqp", "Ice", ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub discharge_cfs: Option<f64>,
    pub site_code: String,
    pub quality: String, // "A" = approved, "P" = provisional, may carry "e" etc.
}

/// Daily observations for one site, strictly increasing by date.
///
/// The only way to build one is `TimeSeries::new`, which enforces the
/// ordering invariant. Segmentation relies on it for binary search.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Builds a series, rejecting duplicate or out-of-order dates.
    pub fn new(observations: Vec<Observation>) -> Result<Self, FlowStatsError> {
        for pair in observations.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(FlowStatsError::UnorderedDates {
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Number of observations tagged missing.
    pub fn missing_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| o.discharge_cfs.is_none())
            .count()
    }

    /// Returns the sub-series with `start <= date <= end`, plus the number
    /// of missing observations inside that window.
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> (TimeSeries, usize) {
        let lo = self.observations.partition_point(|o| o.date < start);
        let hi = self.observations.partition_point(|o| o.date <= end);
        let observations = if lo < hi {
            self.observations[lo..hi].to_vec()
        } else {
            Vec::new()
        };
        let clipped = TimeSeries { observations };
        let missing = clipped.missing_count();
        (clipped, missing)
    }
}

// ---------------------------------------------------------------------------
// Period types
// ---------------------------------------------------------------------------

/// How a series is cut into periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    /// October 1 through September 30, labeled by the ending year.
    WaterYear,
    CalendarMonth,
}

/// Identifies a single period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodLabel {
    WaterYear(i32),
    Month { year: i32, month: u32 },
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

/// Statistics for one water year. `None` marks an undefined metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualStatsRecord {
    pub water_year: i32,
    /// October 1 of the preceding calendar year; used as the row key on output.
    pub start_date: NaiveDate,
    pub site_code: Option<String>,
    pub mean_flow: Option<f64>,
    pub peak_flow: Option<f64>,
    pub median_flow: Option<f64>,
    pub coeff_var: Option<f64>,
    pub skew: Option<f64>,
    pub tqmean: Option<f64>,
    pub rb_index: Option<f64>,
    pub seven_q: Option<f64>,
    pub exceed_3x_median: Option<usize>,
}

/// Statistics for one calendar month of one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStatsRecord {
    pub year: i32,
    pub month: u32,
    pub start_date: NaiveDate,
    pub site_code: Option<String>,
    pub mean_flow: Option<f64>,
    pub coeff_var: Option<f64>,
    pub tqmean: Option<f64>,
    pub rb_index: Option<f64>,
}

/// Long-term mean of every annual metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualAverages {
    pub site_code: Option<String>,
    pub mean_flow: Option<f64>,
    pub peak_flow: Option<f64>,
    pub median_flow: Option<f64>,
    pub coeff_var: Option<f64>,
    pub skew: Option<f64>,
    pub tqmean: Option<f64>,
    pub rb_index: Option<f64>,
    pub seven_q: Option<f64>,
    pub exceed_3x_median: Option<f64>,
}

/// Long-term mean of the monthly metrics for one calendar month (1 = January).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub month: u32,
    pub site_code: Option<String>,
    pub mean_flow: Option<f64>,
    pub coeff_var: Option<f64>,
    pub tqmean: Option<f64>,
    pub rb_index: Option<f64>,
}

/// Everything computed for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReport {
    pub station: String,
    /// Missing days in the full ingested record.
    pub raw_missing_days: usize,
    /// Missing days inside the analysis window.
    pub clipped_missing_days: usize,
    pub annual: Vec<AnnualStatsRecord>,
    pub monthly: Vec<MonthlyStatsRecord>,
    pub annual_averages: AnnualAverages,
    pub monthly_averages: Vec<MonthlyAverage>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Hard failures from the I/O layers around the statistics core.
///
/// The core itself never fails: insufficient or degenerate data yields
/// `None` cells instead.
#[derive(Debug, PartialEq)]
pub enum FlowStatsError {
    /// A file could not be read or written.
    Io { path: String, message: String },
    /// Non-2xx HTTP response from the USGS API.
    Http(u16),
    /// The request to the USGS API failed before a response arrived.
    Request(String),
    /// A data row could not be parsed. `line` is 1-based.
    Parse { line: usize, message: String },
    /// A required column is absent from the RDB header.
    MissingColumn(String),
    /// The source contained no data rows.
    NoData(String),
    /// Two observations were out of order or shared a date.
    UnorderedDates { previous: NaiveDate, current: NaiveDate },
    /// The configuration file is unreadable or invalid.
    Config(String),
    /// A station job ended without reporting a result.
    Worker(String),
}

impl std::fmt::Display for FlowStatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowStatsError::Io { path, message } => write!(f, "I/O error on {}: {}", path, message),
            FlowStatsError::Http(code) => write!(f, "HTTP error: {}", code),
            FlowStatsError::Request(msg) => write!(f, "Request failed: {}", msg),
            FlowStatsError::Parse { line, message } => {
                write!(f, "Parse error at line {}: {}", line, message)
            }
            FlowStatsError::MissingColumn(col) => write!(f, "Missing column: {}", col),
            FlowStatsError::NoData(source) => write!(f, "No data rows in {}", source),
            FlowStatsError::UnorderedDates { previous, current } => write!(
                f,
                "Dates must be strictly increasing: {} followed by {}",
                previous, current
            ),
            FlowStatsError::Config(msg) => write!(f, "Configuration error: {}", msg),
            FlowStatsError::Worker(station) => write!(f, "Worker for station '{}' exited without a result", station),
        }
    }
}

impl std::error::Error for FlowStatsError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
