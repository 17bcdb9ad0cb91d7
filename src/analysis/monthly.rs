/// Calendar-month statistics table.
///
/// One `MonthlyStatsRecord` per (year, month) covering the series' span,
/// chronological, with empty months kept as rows of undefined metrics.

use chrono::Datelike;
use tracing::debug;

use crate::analysis::metrics;
use crate::analysis::periods::{segment, Period};
use crate::model::{MonthlyStatsRecord, PeriodKind, PeriodLabel, TimeSeries};

pub fn monthly_statistics(series: &TimeSeries) -> Vec<MonthlyStatsRecord> {
    let records: Vec<MonthlyStatsRecord> = segment(series, PeriodKind::CalendarMonth)
        .map(|period| monthly_record(&period))
        .collect();

    debug!(months = records.len(), "Computed monthly statistics");
    records
}

pub fn monthly_record(period: &Period<'_>) -> MonthlyStatsRecord {
    let values = period.values();
    let (year, month) = match period.label {
        PeriodLabel::Month { year, month } => (year, month),
        PeriodLabel::WaterYear(_) => (period.start.year(), period.start.month()),
    };

    MonthlyStatsRecord {
        year,
        month,
        start_date: period.start,
        site_code: period.site_code(),
        mean_flow: metrics::mean(&values),
        coeff_var: metrics::coefficient_of_variation(&values),
        tqmean: metrics::tqmean(&values),
        rb_index: metrics::rb_index(&values),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
