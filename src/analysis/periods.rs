/// Period segmentation: cuts a daily series into water years or calendar months.
///
/// `segment` returns a lazy iterator of `Period`s covering the series' date
/// span. Each period borrows the slice of observations falling inside its
/// half-open interval `[start, end)`; because `TimeSeries` is strictly
/// increasing, the slice bounds are found by binary search and consecutive
/// periods never overlap.
///
/// Water-year boundaries are fixed at October 1, so the first and last
/// periods may be partial. Periods with no observations are still emitted
/// so that downstream tables have no gaps in their chronology.

use chrono::{Datelike, NaiveDate};

use crate::model::{Observation, PeriodKind, PeriodLabel, TimeSeries};

/// Month on which the USGS water year begins.
pub const WATER_YEAR_START_MONTH: u32 = 10;

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

/// Water year containing `date`: dates from October onward belong to the
/// following year's label.
pub fn water_year_of(date: NaiveDate) -> i32 {
    if date.month() >= WATER_YEAR_START_MONTH {
        date.year() + 1
    } else {
        date.year()
    }
}

/// First day of water year `year` (October 1 of `year - 1`).
pub fn water_year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year - 1, WATER_YEAR_START_MONTH, 1)
}

fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        month_start(date.year() + 1, 1)
    } else {
        month_start(date.year(), date.month() + 1)
    }
}

/// Start of the period of `kind` that contains `date`.
fn period_start(date: NaiveDate, kind: PeriodKind) -> Option<NaiveDate> {
    match kind {
        PeriodKind::WaterYear => water_year_start(water_year_of(date)),
        PeriodKind::CalendarMonth => month_start(date.year(), date.month()),
    }
}

/// Exclusive end of the period of `kind` that starts at `start`.
fn period_end(start: NaiveDate, kind: PeriodKind) -> Option<NaiveDate> {
    match kind {
        PeriodKind::WaterYear => NaiveDate::from_ymd_opt(start.year() + 1, WATER_YEAR_START_MONTH, 1),
        PeriodKind::CalendarMonth => next_month_start(start),
    }
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// One water year or calendar month together with its observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Period<'a> {
    pub label: PeriodLabel,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub observations: &'a [Observation],
}

impl<'a> Period<'a> {
    /// Retained (non-missing) discharge values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.observations
            .iter()
            .filter_map(|o| o.discharge_cfs)
            .collect()
    }

    pub fn missing_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| o.discharge_cfs.is_none())
            .count()
    }

    /// Site code of the period, taken from its first observation.
    pub fn site_code(&self) -> Option<String> {
        self.observations.first().map(|o| o.site_code.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

/// Lazy iterator over the periods of a series. A clone continues
/// independently from the same position.
#[derive(Debug, Clone)]
pub struct Periods<'a> {
    observations: &'a [Observation],
    kind: PeriodKind,
    /// Start of the next period to emit, `None` once exhausted.
    cursor: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    /// Index of the first observation not yet assigned to a period.
    offset: usize,
}

/// Segments `series` into consecutive periods of `kind`.
///
/// Calling `segment` again on the same series yields an identical sequence.
pub fn segment(series: &TimeSeries, kind: PeriodKind) -> Periods<'_> {
    let cursor = series.first_date().and_then(|d| period_start(d, kind));
    Periods {
        observations: series.observations(),
        kind,
        cursor,
        last_date: series.last_date(),
        offset: 0,
    }
}

impl<'a> Iterator for Periods<'a> {
    type Item = Period<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor?;
        let last_date = self.last_date?;
        if start > last_date {
            self.cursor = None;
            return None;
        }

        let Some(end) = period_end(start, self.kind) else {
            self.cursor = None;
            return None;
        };

        let remaining = &self.observations[self.offset..];
        let count = remaining.partition_point(|o| o.date < end);
        let observations = &remaining[..count];
        self.offset += count;
        self.cursor = Some(end);

        let label = match self.kind {
            PeriodKind::WaterYear => PeriodLabel::WaterYear(end.year()),
            PeriodKind::CalendarMonth => PeriodLabel::Month {
                year: start.year(),
                month: start.month(),
            },
        };

        Some(Period { label, start, end, observations })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
