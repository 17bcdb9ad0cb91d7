/// USGS daily-value RDB parser.
///
/// Parses the tab-delimited RDB (Research Data BYte-stream) files served by
/// the NWIS Daily Values service and saved by hand from the NWIS web UI:
///
/// ```text
/// # comment lines (site metadata, parameter descriptions)
/// agency_cd	site_no	datetime	84537_00060_00003	84537_00060_00003_cd
/// 5s	15s	20d	14n	10s
/// USGS	03335000	1954-06-01	47.0	A
/// USGS	03335000	1954-06-02	Eqp	A
/// ```
///
/// Discharge cells that are blank or hold one of the USGS no-data codes
/// become missing observations. Calendar days absent from the file are not
/// inserted, but they are included in the returned missing-day count.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::model::{FlowStatsError, Observation, TimeSeries};

/// Cell values USGS writes in place of a discharge when none is available.
pub const NO_DATA_TOKENS: &[&str] = &[
    "Eqp", "Ice", "Ssn", "Dis", "Bkw", "Fld", "Mnt", "Pr", "Rat", "Zfl", "***", "--", "-999999",
];

/// Spellings spreadsheet and dataframe exports use for an empty cell.
/// Matched case-insensitively.
pub const NA_SPELLINGS: &[&str] = &[
    "NaN", "-NaN", "NA", "N/A", "#N/A", "#NA", "<NA>", "NULL", "None",
];

/// Columns of the hand-saved layout, used when a header name
/// cannot be resolved: agency_cd, site_no, Date, Discharge, Quality.
const FALLBACK_SITE_COL: usize = 1;
const FALLBACK_DATE_COL: usize = 2;
const FALLBACK_DISCHARGE_COL: usize = 3;
const FALLBACK_QUALITY_COL: usize = 4;

/// A parsed daily-value series and its missing-day count.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub series: TimeSeries,
    /// Tagged-missing rows plus calendar days absent between the first and last date.
    pub missing_days: usize,
}

/// Resolved column positions for one RDB header.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Columns {
    site: usize,
    date: usize,
    discharge: usize,
    quality: usize,
}

fn split_fields(line: &str) -> Vec<&str> {
    if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split_whitespace().collect()
    }
}

/// True for an RDB format-descriptor line such as `5s 15s 20d 14n 10s`.
fn is_format_line(fields: &[&str]) -> bool {
    let mut seen = false;
    for field in fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        let Some(kind) = field.chars().last() else {
            return false;
        };
        let width = &field[..field.len() - kind.len_utf8()];
        if !kind.is_ascii_alphabetic() || width.parse::<usize>().is_err() {
            return false;
        }
        seen = true;
    }
    seen
}

fn resolve_columns(headers: &[&str]) -> Columns {
    let col_map: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.trim(), idx))
        .collect();

    let site = col_map.get("site_no").copied().unwrap_or(FALLBACK_SITE_COL);

    let date = ["datetime", "Date", "date"]
        .iter()
        .find_map(|name| col_map.get(name).copied())
        .unwrap_or(FALLBACK_DATE_COL);

    let discharge_name = headers
        .iter()
        .map(|h| h.trim())
        .find(|h| h.ends_with("_00060_00003") || *h == "Discharge");

    let discharge = discharge_name
        .and_then(|name| col_map.get(name).copied())
        .unwrap_or(FALLBACK_DISCHARGE_COL);

    let quality = discharge_name
        .and_then(|name| col_map.get(format!("{}_cd", name).as_str()).copied())
        .or_else(|| col_map.get("Quality").copied())
        .unwrap_or(FALLBACK_QUALITY_COL);

    Columns { site, date, discharge, quality }
}

/// Parses one discharge cell; `Ok(None)` for blanks, no-data codes and NA
/// spellings. Infinite values are rejected.
pub fn parse_discharge(cell: &str) -> Result<Option<f64>, String> {
    let cell = cell.trim();
    if cell.is_empty()
        || NO_DATA_TOKENS.contains(&cell)
        || NA_SPELLINGS.iter().any(|na| na.eq_ignore_ascii_case(cell))
    {
        return Ok(None);
    }
    let value = cell
        .parse::<f64>()
        .map_err(|e| format!("Invalid discharge '{}': {}", cell, e))?;
    if !value.is_finite() {
        return Err(format!("Invalid discharge '{}': not a finite number", cell));
    }
    Ok(Some(value))
}

/// Parses USGS daily-value RDB text into a `TimeSeries`.
///
/// # Errors
/// - `FlowStatsError::MissingColumn` - the header has too few columns to
///   locate a date and a discharge.
/// - `FlowStatsError::Parse` - an unparsable date or discharge cell.
/// - `FlowStatsError::UnorderedDates` - the same date appears twice.
/// - `FlowStatsError::NoData` - no data rows after the header.
pub fn parse_daily_values(rdb_text: &str) -> Result<Ingested, FlowStatsError> {
    // Keep 1-based line numbers for error messages
    let mut data_lines = rdb_text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().starts_with('#') && !line.trim().is_empty())
        .peekable();

    let (_, header_line) = data_lines
        .next()
        .ok_or_else(|| FlowStatsError::NoData("RDB text (no header line)".to_string()))?;
    let headers = split_fields(header_line);
    let columns = resolve_columns(&headers);

    if headers.len() <= columns.date.max(columns.discharge) {
        return Err(FlowStatsError::MissingColumn(format!(
            "need date and discharge columns, header has {} fields",
            headers.len()
        )));
    }

    // Second non-comment line is usually the format descriptor
    if let Some((_, line)) = data_lines.peek() {
        if is_format_line(&split_fields(line)) {
            data_lines.next();
        }
    }

    let mut observations = Vec::new();
    for (line_no, line) in data_lines {
        let fields = split_fields(line);

        let date_str = fields
            .get(columns.date)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FlowStatsError::Parse {
                line: line_no,
                message: "Missing date value".to_string(),
            })?;

        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            FlowStatsError::Parse {
                line: line_no,
                message: format!("Invalid date '{}': {}", date_str, e),
            }
        })?;

        // A row cut short before the discharge column counts as missing
        let discharge_cfs = match fields.get(columns.discharge) {
            Some(cell) => parse_discharge(cell)
                .map_err(|message| FlowStatsError::Parse { line: line_no, message })?,
            None => None,
        };

        let site_code = fields
            .get(columns.site)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let quality = fields
            .get(columns.quality)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        observations.push(Observation { date, discharge_cfs, site_code, quality });
    }

    if observations.is_empty() {
        return Err(FlowStatsError::NoData("RDB text".to_string()));
    }

    observations.sort_by_key(|o| o.date);
    let series = TimeSeries::new(observations)?;

    let tagged = series.missing_count();
    let absent = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => {
            let span = (last - first).num_days() as usize + 1;
            span - series.len()
        }
        _ => 0,
    };

    debug!(rows = series.len(), tagged, absent, "Parsed daily-value RDB");

    Ok(Ingested { series, missing_days: tagged + absent })
}

/// Reads and parses an RDB file from disk.
pub fn read_daily_values(path: impl AsRef<Path>) -> Result<Ingested, FlowStatsError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| FlowStatsError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    parse_daily_values(&contents).map_err(|e| match e {
        FlowStatsError::NoData(_) => FlowStatsError::NoData(path.display().to_string()),
        other => other,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
