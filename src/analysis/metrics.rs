/// Hydrologic metric library.
///
/// Every function takes the retained discharge values of one period, in
/// chronological order, with missing days already removed. Results are
/// `Option`s: `None` means the metric is undefined for this input (empty,
/// too few values, or a zero denominator). Undefined never becomes zero;
/// it is carried into the statistics tables and handled by
/// `mean_of_defined` when averaging.

/// Width of the moving-average window used for the 7-day low flow.
pub const LOW_FLOW_WINDOW: usize = 7;

/// Multiple of the period median above which a day counts as a high-flow day.
pub const HIGH_FLOW_MEDIAN_MULTIPLE: f64 = 3.0;

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Peak value of the period.
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Median; for an even count, the mean of the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Coefficient of variation in percent: sample std dev / mean * 100.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let sd = sample_std_dev(values)?;
    let m = mean(values)?;
    if m == 0.0 {
        return None;
    }
    Some(sd / m * 100.0)
}

/// Relative variance floor below which skew is treated as undefined.
const SKEW_RELATIVE_TOLERANCE: f64 = 1e-15;

/// Bias-corrected sample skewness (adjusted Fisher-Pearson coefficient).
///
/// G1 = sqrt(n(n-1)) / (n-2) * m3 / m2^1.5, with m2 and m3 the biased
/// central moments. Undefined below 3 values or for a constant series.
pub fn skew(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    if values.iter().all(|&v| v == values[0]) {
        return None;
    }
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    // Variance at rounding-error level relative to the mean
    if m2 <= (SKEW_RELATIVE_TOLERANCE * m).powi(2) {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    Some((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1)
}

// ---------------------------------------------------------------------------
// Flow-regime metrics
// ---------------------------------------------------------------------------

/// Fraction of days whose flow is strictly greater than the period mean.
///
/// Days exactly at the mean do not count, so a constant series gives 0.
pub fn tqmean(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let above = values.iter().filter(|&&v| v > m).count();
    Some(above as f64 / values.len() as f64)
}

/// Richards-Baker flashiness index: sum of |day-to-day change| / total flow.
///
/// Differences are taken between consecutive retained values, so a gap left
/// by removed missing days is treated as contiguous data.
pub fn rb_index(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return None;
    }
    let path_length: f64 = values
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|d| d.is_finite())
        .sum();
    Some(path_length / total)
}

/// 7-day low flow: the minimum trailing 7-point moving average.
pub fn seven_day_low_flow(values: &[f64]) -> Option<f64> {
    values
        .windows(LOW_FLOW_WINDOW)
        .map(|w| w.iter().sum::<f64>() / LOW_FLOW_WINDOW as f64)
        .reduce(f64::min)
}

/// Number of days with flow strictly above three times the period median.
pub fn exceed_three_times_median(values: &[f64]) -> Option<usize> {
    let threshold = HIGH_FLOW_MEDIAN_MULTIPLE * median(values)?;
    Some(values.iter().filter(|&&v| v > threshold).count())
}

// ---------------------------------------------------------------------------
// Undefined propagation
// ---------------------------------------------------------------------------

/// Mean of the defined entries; `None` if no entry is defined.
pub fn mean_of_defined<I>(entries: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = entries
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("metric should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    // --- Descriptive ---------------------------------------------------------

    #[test]
    fn test_basic_statistics() {
        let values = [4.0, 1.0, 3.0, 2.0];
        approx(mean(&values), 2.5);
        approx(max(&values), 4.0);
        approx(median(&values), 2.5);
        approx(median(&[5.0, 1.0, 3.0]), 3.0);
    }

    #[test]
    fn test_empty_input_is_undefined_everywhere() {
        let empty: [f64; 0] = [];
        assert_eq!(mean(&empty), None);
        assert_eq!(max(&empty), None);
        assert_eq!(median(&empty), None);
        assert_eq!(coefficient_of_variation(&empty), None);
        assert_eq!(skew(&empty), None);
        assert_eq!(tqmean(&empty), None);
        assert_eq!(rb_index(&empty), None);
        assert_eq!(seven_day_low_flow(&empty), None);
        assert_eq!(exceed_three_times_median(&empty), None);
    }

    #[test]
    fn test_coefficient_of_variation() {
        // mean 5, sample sd = sqrt(32/7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        approx(coefficient_of_variation(&values), (32.0f64 / 7.0).sqrt() / 5.0 * 100.0);
    }

    #[test]
    fn test_coefficient_of_variation_degenerate_cases() {
        assert_eq!(coefficient_of_variation(&[3.0]), None, "needs two values");
        assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), None, "zero mean");
    }

    #[test]
    fn test_skew_matches_bias_corrected_formula() {
        // sqrt(12)/2 * 45 / 12.5^1.5
        let values = [1.0, 2.0, 3.0, 10.0];
        let s = skew(&values).unwrap();
        assert!((s - 1.763_632_6).abs() < 1e-6, "got {}", s);
    }

    #[test]
    fn test_skew_symmetric_and_degenerate() {
        approx(skew(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(skew(&[1.0, 2.0]), None, "needs three values");
        assert_eq!(skew(&[4.0, 4.0, 4.0, 4.0]), None, "constant series");
    }

    #[test]
    fn test_skew_constant_inexact_values_are_undefined() {
        assert_eq!(skew(&[0.1; 3]), None);
        assert_eq!(skew(&[2.7; 3]), None);
        assert_eq!(skew(&[0.1; 30]), None);
        assert_eq!(skew(&[123.4; 366]), None);
    }

    #[test]
    fn test_skew_near_constant_is_undefined() {
        // one ulp of spread around 0.1 is below the variance floor
        let next = f64::from_bits(0.1f64.to_bits() + 1);
        let values = [0.1, next, 0.1, next, 0.1];
        assert_eq!(skew(&values), None);
    }

    // --- Tqmean --------------------------------------------------------------

    #[test]
    fn test_tqmean_constant_series_is_zero() {
        assert_eq!(tqmean(&[5.0; 10]), Some(0.0));
    }

    #[test]
    fn test_tqmean_counts_strictly_above_mean() {
        // mean = 2.5; 3 and 4 are above
        approx(tqmean(&[1.0, 2.0, 3.0, 4.0]), 0.5);
        // mean = 2; only 4 is above, the 2s sit on the mean
        approx(tqmean(&[0.0, 2.0, 2.0, 4.0]), 0.25);
    }

    // --- R-B Index -----------------------------------------------------------

    #[test]
    fn test_rb_index_monotonic_series() {
        approx(rb_index(&[1.0, 2.0, 3.0, 4.0, 5.0]), 4.0 / 15.0);
    }

    #[test]
    fn test_rb_index_counts_falls_and_rises() {
        // |3-1| + |1-3| + |4-1| = 7 over 9
        approx(rb_index(&[1.0, 3.0, 1.0, 4.0]), 7.0 / 9.0);
    }

    #[test]
    fn test_rb_index_degenerate_cases() {
        assert_eq!(rb_index(&[5.0]), None, "single value");
        assert_eq!(rb_index(&[0.0, 0.0, 0.0]), None, "zero total flow");
    }

    // --- 7Q ------------------------------------------------------------------

    #[test]
    fn test_seven_q_picks_lowest_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        approx(seven_day_low_flow(&values), 4.0);
    }

    #[test]
    fn test_seven_q_finds_trough_in_middle() {
        let values = [10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 10.0];
        approx(seven_day_low_flow(&values), 1.0);
    }

    #[test]
    fn test_seven_q_undefined_below_window() {
        assert_eq!(seven_day_low_flow(&[1.0; 6]), None);
        approx(seven_day_low_flow(&[2.0; 7]), 2.0);
    }

    // --- 3x median -----------------------------------------------------------

    #[test]
    fn test_exceed_three_times_median() {
        assert_eq!(exceed_three_times_median(&[1.0, 1.0, 1.0, 10.0, 10.0]), Some(2));
        // exactly at the threshold does not count
        assert_eq!(exceed_three_times_median(&[1.0, 1.0, 3.0]), Some(0));
    }

    // --- Propagation ---------------------------------------------------------

    #[test]
    fn test_mean_of_defined_ignores_undefined() {
        approx(mean_of_defined(vec![Some(1.0), None, Some(3.0)]), 2.0);
        assert_eq!(mean_of_defined(vec![None, None]), None);
        assert_eq!(mean_of_defined(Vec::<Option<f64>>::new()), None);
    }
}
