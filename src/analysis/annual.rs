/// Water-year statistics table.
///
/// Applies the metric library to every water-year period of a series and
/// returns one `AnnualStatsRecord` per water year in chronological order.
/// Empty or partial years still get a row; their undefined metrics are `None`.

use tracing::debug;

use crate::analysis::metrics;
use crate::analysis::periods::{segment, water_year_of, Period};
use crate::model::{AnnualStatsRecord, PeriodKind, PeriodLabel, TimeSeries};

/// Computes the annual statistics table for `series`.
pub fn annual_statistics(series: &TimeSeries) -> Vec<AnnualStatsRecord> {
    let records: Vec<AnnualStatsRecord> = segment(series, PeriodKind::WaterYear)
        .map(|period| annual_record(&period))
        .collect();

    debug!(water_years = records.len(), "Computed annual statistics");
    records
}

/// Statistics for a single water-year period.
pub fn annual_record(period: &Period<'_>) -> AnnualStatsRecord {
    let values = period.values();
    let water_year = match period.label {
        PeriodLabel::WaterYear(year) => year,
        PeriodLabel::Month { .. } => water_year_of(period.start),
    };

    AnnualStatsRecord {
        water_year,
        start_date: period.start,
        site_code: period.site_code(),
        mean_flow: metrics::mean(&values),
        peak_flow: metrics::max(&values),
        median_flow: metrics::median(&values),
        coeff_var: metrics::coefficient_of_variation(&values),
        skew: metrics::skew(&values),
        tqmean: metrics::tqmean(&values),
        rb_index: metrics::rb_index(&values),
        seven_q: metrics::seven_day_low_flow(&values),
        exceed_3x_median: metrics::exceed_three_times_median(&values),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
