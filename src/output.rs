/// Output tables for station reports.
///
/// Writes the four result tables with stable column names: per-water-year
/// and per-month metrics as CSV, long-term averages as tab-delimited text.
/// Every table carries a trailing `Station` column so several stations can
/// share one file. Undefined metrics are written as empty fields.

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::model::{FlowStatsError, StationReport};

pub const ANNUAL_METRICS_FILE: &str = "Annual_Metrics.csv";
pub const MONTHLY_METRICS_FILE: &str = "Monthly_Metrics.csv";
pub const ANNUAL_AVERAGES_FILE: &str = "Average_Annual_Metrics.txt";
pub const MONTHLY_AVERAGES_FILE: &str = "Average_Monthly_Metrics.txt";

// ---------------------------------------------------------------------------
// Row layouts
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AnnualRow<'a> {
    /// Water-year start (October 1).
    #[serde(rename = "Date")]
    date: NaiveDate,
    site_no: Option<&'a str>,
    #[serde(rename = "Mean Flow")]
    mean_flow: Option<f64>,
    #[serde(rename = "Peak Flow")]
    peak_flow: Option<f64>,
    #[serde(rename = "Median")]
    median: Option<f64>,
    #[serde(rename = "Coeff Var")]
    coeff_var: Option<f64>,
    #[serde(rename = "Skew")]
    skew: Option<f64>,
    #[serde(rename = "TQmean")]
    tqmean: Option<f64>,
    #[serde(rename = "R-B Index")]
    rb_index: Option<f64>,
    #[serde(rename = "7Q")]
    seven_q: Option<f64>,
    #[serde(rename = "3xMedian")]
    exceed_3x_median: Option<usize>,
    #[serde(rename = "Station")]
    station: &'a str,
}

#[derive(Serialize)]
struct MonthlyRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    site_no: Option<&'a str>,
    #[serde(rename = "Mean Flow")]
    mean_flow: Option<f64>,
    #[serde(rename = "Coeff Var")]
    coeff_var: Option<f64>,
    #[serde(rename = "TQmean")]
    tqmean: Option<f64>,
    #[serde(rename = "R-B Index")]
    rb_index: Option<f64>,
    #[serde(rename = "Station")]
    station: &'a str,
}

#[derive(Serialize)]
struct AnnualAverageRow<'a> {
    site_no: Option<&'a str>,
    #[serde(rename = "Mean Flow")]
    mean_flow: Option<f64>,
    #[serde(rename = "Peak Flow")]
    peak_flow: Option<f64>,
    #[serde(rename = "Median")]
    median: Option<f64>,
    #[serde(rename = "Coeff Var")]
    coeff_var: Option<f64>,
    #[serde(rename = "Skew")]
    skew: Option<f64>,
    #[serde(rename = "TQmean")]
    tqmean: Option<f64>,
    #[serde(rename = "R-B Index")]
    rb_index: Option<f64>,
    #[serde(rename = "7Q")]
    seven_q: Option<f64>,
    #[serde(rename = "3xMedian")]
    exceed_3x_median: Option<f64>,
    #[serde(rename = "Station")]
    station: &'a str,
}

#[derive(Serialize)]
struct MonthlyAverageRow<'a> {
    /// Calendar month, 1 = January.
    #[serde(rename = "Month")]
    month: u32,
    site_no: Option<&'a str>,
    #[serde(rename = "Mean Flow")]
    mean_flow: Option<f64>,
    #[serde(rename = "Coeff Var")]
    coeff_var: Option<f64>,
    #[serde(rename = "TQmean")]
    tqmean: Option<f64>,
    #[serde(rename = "R-B Index")]
    rb_index: Option<f64>,
    #[serde(rename = "Station")]
    station: &'a str,
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn io_error(path: &str, e: impl std::fmt::Display) -> FlowStatsError {
    FlowStatsError::Io { path: path.to_string(), message: e.to_string() }
}

/// Serializes `rows` with a header line. `table` names the output in errors.
fn write_table<W, R, I>(writer: W, delimiter: u8, table: &str, rows: I) -> Result<(), FlowStatsError>
where
    W: Write,
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut csv_writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_writer(writer);

    for row in rows {
        csv_writer.serialize(row).map_err(|e| io_error(table, e))?;
    }
    csv_writer.flush().map_err(|e| io_error(table, e))?;
    Ok(())
}

/// One row per water year per station, keyed by the water-year start date.
pub fn write_annual_metrics<W: Write>(reports: &[StationReport], writer: W) -> Result<(), FlowStatsError> {
    let rows = reports.iter().flat_map(|report| {
        report.annual.iter().map(move |r| AnnualRow {
            date: r.start_date,
            site_no: r.site_code.as_deref(),
            mean_flow: r.mean_flow,
            peak_flow: r.peak_flow,
            median: r.median_flow,
            coeff_var: r.coeff_var,
            skew: r.skew,
            tqmean: r.tqmean,
            rb_index: r.rb_index,
            seven_q: r.seven_q,
            exceed_3x_median: r.exceed_3x_median,
            station: &report.station,
        })
    });
    write_table(writer, b',', ANNUAL_METRICS_FILE, rows)
}

/// One row per month per station, keyed by the first day of the month.
pub fn write_monthly_metrics<W: Write>(reports: &[StationReport], writer: W) -> Result<(), FlowStatsError> {
    let rows = reports.iter().flat_map(|report| {
        report.monthly.iter().map(move |r| MonthlyRow {
            date: r.start_date,
            site_no: r.site_code.as_deref(),
            mean_flow: r.mean_flow,
            coeff_var: r.coeff_var,
            tqmean: r.tqmean,
            rb_index: r.rb_index,
            station: &report.station,
        })
    });
    write_table(writer, b',', MONTHLY_METRICS_FILE, rows)
}

/// One row per station.
pub fn write_annual_averages<W: Write>(reports: &[StationReport], writer: W) -> Result<(), FlowStatsError> {
    let rows = reports.iter().map(|report| {
        let a = &report.annual_averages;
        AnnualAverageRow {
            site_no: a.site_code.as_deref(),
            mean_flow: a.mean_flow,
            peak_flow: a.peak_flow,
            median: a.median_flow,
            coeff_var: a.coeff_var,
            skew: a.skew,
            tqmean: a.tqmean,
            rb_index: a.rb_index,
            seven_q: a.seven_q,
            exceed_3x_median: a.exceed_3x_median,
            station: &report.station,
        }
    });
    write_table(writer, b'\t', ANNUAL_AVERAGES_FILE, rows)
}

/// Twelve rows per station, calendar months 1-12.
pub fn write_monthly_averages<W: Write>(reports: &[StationReport], writer: W) -> Result<(), FlowStatsError> {
    let rows = reports.iter().flat_map(|report| {
        report.monthly_averages.iter().map(move |m| MonthlyAverageRow {
            month: m.month,
            site_no: m.site_code.as_deref(),
            mean_flow: m.mean_flow,
            coeff_var: m.coeff_var,
            tqmean: m.tqmean,
            rb_index: m.rb_index,
            station: &report.station,
        })
    });
    write_table(writer, b'\t', MONTHLY_AVERAGES_FILE, rows)
}

/// Writes all station reports as pretty-printed JSON.
pub fn write_json_report<W: Write>(reports: &[StationReport], writer: W) -> Result<(), FlowStatsError> {
    serde_json::to_writer_pretty(writer, reports).map_err(|e| io_error("JSON report", e))
}

fn create(path: &Path) -> Result<File, FlowStatsError> {
    File::create(path).map_err(|e| io_error(&path.display().to_string(), e))
}

/// Writes the four tables into `dir`, creating it if needed.
pub fn write_all(reports: &[StationReport], dir: &Path) -> Result<(), FlowStatsError> {
    fs::create_dir_all(dir).map_err(|e| io_error(&dir.display().to_string(), e))?;

    write_annual_metrics(reports, create(&dir.join(ANNUAL_METRICS_FILE))?)?;
    write_monthly_metrics(reports, create(&dir.join(MONTHLY_METRICS_FILE))?)?;
    write_annual_averages(reports, create(&dir.join(ANNUAL_AVERAGES_FILE))?)?;
    write_monthly_averages(reports, create(&dir.join(MONTHLY_AVERAGES_FILE))?)?;

    debug!(stations = reports.len(), "Wrote output tables");
    info!(dir = %dir.display(), "Output tables written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnualAverages, AnnualStatsRecord, MonthlyAverage, MonthlyStatsRecord};
    use std::env;

    fn sample_report(station: &str) -> StationReport {
        let start = NaiveDate::from_ymd_opt(1969, 10, 1).unwrap();
        StationReport {
            station: station.to_string(),
            raw_missing_days: 3,
            clipped_missing_days: 1,
            annual: vec![AnnualStatsRecord {
                water_year: 1970,
                start_date: start,
                site_code: Some("03335000".to_string()),
                mean_flow: Some(12.5),
                peak_flow: Some(80.0),
                median_flow: Some(10.0),
                coeff_var: Some(50.0),
                skew: None,
                tqmean: Some(0.25),
                rb_index: Some(0.1),
                seven_q: None,
                exceed_3x_median: Some(2),
            }],
            monthly: vec![MonthlyStatsRecord {
                year: 1969,
                month: 10,
                start_date: start,
                site_code: Some("03335000".to_string()),
                mean_flow: Some(12.5),
                coeff_var: None,
                tqmean: Some(0.5),
                rb_index: Some(0.2),
            }],
            annual_averages: AnnualAverages {
                site_code: Some("03335000".to_string()),
                mean_flow: Some(12.5),
                peak_flow: Some(80.0),
                median_flow: Some(10.0),
                coeff_var: Some(50.0),
                skew: None,
                tqmean: Some(0.25),
                rb_index: Some(0.1),
                seven_q: None,
                exceed_3x_median: Some(2.0),
            },
            monthly_averages: (1..=12)
                .map(|month| MonthlyAverage {
                    month,
                    site_code: Some("03335000".to_string()),
                    mean_flow: if month == 10 { Some(12.5) } else { None },
                    coeff_var: None,
                    tqmean: None,
                    rb_index: None,
                })
                .collect(),
        }
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), FlowStatsError>,
    {
        let mut buf = Vec::new();
        write(&mut buf).expect("write should succeed");
        String::from_utf8(buf).expect("output should be UTF-8")
    }

    #[test]
    fn test_annual_metrics_header_and_row() {
        let reports = vec![sample_report("Wildcat")];
        let text = render(|buf| write_annual_metrics(&reports, buf));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Date,site_no,Mean Flow,Peak Flow,Median,Coeff Var,Skew,TQmean,R-B Index,7Q,3xMedian,Station"
        );
        assert_eq!(lines[1], "1969-10-01,03335000,12.5,80.0,10.0,50.0,,0.25,0.1,,2,Wildcat");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_monthly_metrics_rows_for_each_station() {
        let reports = vec![sample_report("Wildcat"), sample_report("Tippe")];
        let text = render(|buf| write_monthly_metrics(&reports, buf));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,site_no,Mean Flow,Coeff Var,TQmean,R-B Index,Station");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",Wildcat"));
        assert!(lines[2].ends_with(",Tippe"));
    }

    #[test]
    fn test_annual_averages_are_tab_delimited() {
        let reports = vec![sample_report("Wildcat")];
        let text = render(|buf| write_annual_averages(&reports, buf));
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("site_no\tMean Flow\tPeak Flow"), "got: {}", header);
        assert!(header.ends_with("\tStation"));
    }

    #[test]
    fn test_monthly_averages_twelve_rows_per_station() {
        let reports = vec![sample_report("Wildcat"), sample_report("Tippe")];
        let text = render(|buf| write_monthly_averages(&reports, buf));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + 24);
        assert_eq!(lines[0], "Month\tsite_no\tMean Flow\tCoeff Var\tTQmean\tR-B Index\tStation");
        assert_eq!(lines[1], "1\t03335000\t\t\t\t\tWildcat");
        assert_eq!(lines[10], "10\t03335000\t12.5\t\t\t\tWildcat");
        assert!(lines[13].starts_with("1\t"), "second station restarts at January");
    }

    #[test]
    fn test_json_report_round_trips_station_names() {
        let reports = vec![sample_report("Wildcat")];
        let text = render(|buf| write_json_report(&reports, buf));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["station"], "Wildcat");
        assert_eq!(value[0]["annual"][0]["water_year"], 1970);
        assert!(value[0]["annual"][0]["skew"].is_null());
    }

    #[test]
    fn test_write_all_creates_four_files() {
        let dir = env::temp_dir().join("flowstats_output_write_all");
        let _ = fs::remove_dir_all(&dir);

        write_all(&[sample_report("Wildcat")], &dir).unwrap();

        for name in [ANNUAL_METRICS_FILE, MONTHLY_METRICS_FILE, ANNUAL_AVERAGES_FILE, MONTHLY_AVERAGES_FILE] {
            let path = dir.join(name);
            assert!(path.exists(), "{} should exist", name);
            assert!(!fs::read_to_string(&path).unwrap().is_empty());
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
