/// Long-term averages of the annual and monthly statistics tables.
///
/// The annual case collapses every water-year row into one row of column
/// means. The monthly case regroups the month-year rows into twelve rows in
/// calendar order (1 = January). Monthly tables run in water-year order, so
/// a record's offset within its water year (its cycle position: October is
/// 0, September is 11) is translated back to a calendar month through
/// `CYCLE_POSITION_TO_CALENDAR_MONTH`.
///
/// Averages use `metrics::mean_of_defined`: undefined cells are skipped, and
/// a column with no defined cell stays undefined.

use crate::analysis::metrics::mean_of_defined;
use crate::analysis::periods::WATER_YEAR_START_MONTH;
use crate::model::{AnnualAverages, AnnualStatsRecord, MonthlyAverage, MonthlyStatsRecord};

/// Calendar month (1-12) for each cycle position (0 = October).
pub const CYCLE_POSITION_TO_CALENDAR_MONTH: [u32; 12] = [10, 11, 12, 1, 2, 3, 4, 5, 6, 7, 8, 9];

/// Offset of `month` within the water year: October = 0 ... September = 11.
pub fn cycle_position(month: u32) -> usize {
    ((month + 12 - WATER_YEAR_START_MONTH) % 12) as usize
}

/// Calendar month of a cycle position. Positions wrap every 12 months, so
/// the position of the n-th record of an October-first table is `n % 12`.
pub fn calendar_month_for_position(position: usize) -> u32 {
    CYCLE_POSITION_TO_CALENDAR_MONTH[position % 12]
}

/// First site code present in a column of optional site codes.
fn first_site<'a, I>(codes: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Option<String>>,
{
    codes.into_iter().flatten().next().cloned()
}

// ---------------------------------------------------------------------------
// Annual
// ---------------------------------------------------------------------------

pub fn annual_averages(records: &[AnnualStatsRecord]) -> AnnualAverages {
    AnnualAverages {
        site_code: first_site(records.iter().map(|r| &r.site_code)),
        mean_flow: mean_of_defined(records.iter().map(|r| r.mean_flow)),
        peak_flow: mean_of_defined(records.iter().map(|r| r.peak_flow)),
        median_flow: mean_of_defined(records.iter().map(|r| r.median_flow)),
        coeff_var: mean_of_defined(records.iter().map(|r| r.coeff_var)),
        skew: mean_of_defined(records.iter().map(|r| r.skew)),
        tqmean: mean_of_defined(records.iter().map(|r| r.tqmean)),
        rb_index: mean_of_defined(records.iter().map(|r| r.rb_index)),
        seven_q: mean_of_defined(records.iter().map(|r| r.seven_q)),
        exceed_3x_median: mean_of_defined(
            records.iter().map(|r| r.exceed_3x_median.map(|c| c as f64)),
        ),
    }
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

/// Twelve rows, January through December.
///
/// Records are grouped by cycle position and each group is labelled with
/// the calendar month from `CYCLE_POSITION_TO_CALENDAR_MONTH`.
pub fn monthly_averages(records: &[MonthlyStatsRecord]) -> Vec<MonthlyAverage> {
    let mut rows: Vec<MonthlyAverage> = (0..CYCLE_POSITION_TO_CALENDAR_MONTH.len())
        .map(|position| {
            let group: Vec<&MonthlyStatsRecord> = records
                .iter()
                .filter(|r| cycle_position(r.month) == position)
                .collect();

            MonthlyAverage {
                month: calendar_month_for_position(position),
                site_code: first_site(group.iter().map(|r| &r.site_code)),
                mean_flow: mean_of_defined(group.iter().map(|r| r.mean_flow)),
                coeff_var: mean_of_defined(group.iter().map(|r| r.coeff_var)),
                tqmean: mean_of_defined(group.iter().map(|r| r.tqmean)),
                rb_index: mean_of_defined(group.iter().map(|r| r.rb_index)),
            }
        })
        .collect();

    rows.sort_by_key(|row| row.month);
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
