/// Analysis configuration loader - parses stations.toml
///
/// Separates the station list and analysis window from code, making it
/// easy to add gauges or move the clip window without recompiling.
///
/// ```toml
/// [analysis]
/// start_date = "1969-10-01"
/// end_date = "2019-09-30"
///
/// [[station]]
/// name = "Wildcat"
/// file = "data/WildcatCreek_Discharge_03335000_19540601-20200315.txt"
/// ```
///
/// Dates must be quoted strings (`YYYY-MM-DD`).

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::FlowStatsError;

/// Config file read when nothing else is specified.
pub const DEFAULT_CONFIG_PATH: &str = "stations.toml";

/// Environment variable (or `.env` entry) overriding the config path.
pub const CONFIG_ENV_VAR: &str = "FLOWSTATS_CONFIG";

/// One gauge to analyze. Exactly where the data comes from is decided by
/// `source()`: a local RDB file wins over a USGS download.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StationConfig {
    /// Label written to the `Station` column of every output table.
    pub name: String,
    /// Local RDB daily-value file.
    pub file: Option<PathBuf>,
    /// USGS site number to download when no file is given.
    pub site_code: Option<String>,
}

/// Where a station's daily values come from.
#[derive(Debug, Clone, PartialEq)]
pub enum StationSource<'a> {
    File(&'a Path),
    Nwis(&'a str),
}

impl StationConfig {
    pub fn source(&self) -> Option<StationSource<'_>> {
        match (&self.file, &self.site_code) {
            (Some(path), _) => Some(StationSource::File(path)),
            (None, Some(site)) => Some(StationSource::Nwis(site)),
            (None, None) => None,
        }
    }
}

/// Analysis window and run settings from the `[analysis]` table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    /// Clip window, inclusive on both ends.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_workers() -> usize {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub analysis: AnalysisSettings,
    #[serde(rename = "station")]
    pub stations: Vec<StationConfig>,
}

impl AnalysisConfig {
    /// Checks the rules serde cannot express.
    pub fn validate(&self) -> Result<(), FlowStatsError> {
        if self.stations.is_empty() {
            return Err(FlowStatsError::Config("at least one [[station]] is required".to_string()));
        }
        if self.analysis.start_date > self.analysis.end_date {
            return Err(FlowStatsError::Config(format!(
                "start_date {} is after end_date {}",
                self.analysis.start_date, self.analysis.end_date
            )));
        }
        if self.analysis.workers == 0 {
            return Err(FlowStatsError::Config("workers must be at least 1".to_string()));
        }

        let mut names = HashSet::new();
        for station in &self.stations {
            if station.name.trim().is_empty() {
                return Err(FlowStatsError::Config("station name must not be empty".to_string()));
            }
            if !names.insert(station.name.as_str()) {
                return Err(FlowStatsError::Config(format!("duplicate station name '{}'", station.name)));
            }
            if station.source().is_none() {
                return Err(FlowStatsError::Config(format!(
                    "station '{}' needs a file or a site_code",
                    station.name
                )));
            }
        }
        Ok(())
    }
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<AnalysisConfig, FlowStatsError> {
    let config: AnalysisConfig =
        toml::from_str(contents).map_err(|e| FlowStatsError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, FlowStatsError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        FlowStatsError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    parse_config(&contents)
}

/// Config path to use: `FLOWSTATS_CONFIG` (after loading `.env` if present),
/// otherwise `stations.toml` in the current directory.
pub fn config_path() -> PathBuf {
    dotenv::dotenv().ok();
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[analysis]
start_date = "1969-10-01"
end_date = "2019-09-30"
workers = 2
output_dir = "out"

[[station]]
name = "Wildcat"
file = "data/wildcat.txt"

[[station]]
name = "Tippe"
site_code = "03331500"
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = parse_config(SAMPLE).expect("sample should parse");
        assert_eq!(config.analysis.start_date, NaiveDate::from_ymd_opt(1969, 10, 1).unwrap());
        assert_eq!(config.analysis.end_date, NaiveDate::from_ymd_opt(2019, 9, 30).unwrap());
        assert_eq!(config.analysis.workers, 2);
        assert_eq!(config.analysis.output_dir, PathBuf::from("out"));
        assert_eq!(config.stations.len(), 2);
    }

    #[test]
    fn test_station_sources() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(
            config.stations[0].source(),
            Some(StationSource::File(Path::new("data/wildcat.txt")))
        );
        assert_eq!(config.stations[1].source(), Some(StationSource::Nwis("03331500")));
    }

    #[test]
    fn test_defaults_apply() {
        let text = r#"
[analysis]
start_date = "2000-10-01"
end_date = "2001-09-30"

[[station]]
name = "Only"
site_code = "03335000"
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.analysis.workers, 1);
        assert_eq!(config.analysis.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let text = SAMPLE.replace("start_date = \"1969-10-01\"", "start_date = \"2020-10-01\"");
        assert!(matches!(parse_config(&text), Err(FlowStatsError::Config(_))));
    }

    #[test]
    fn test_duplicate_station_names_are_rejected() {
        let text = SAMPLE.replace("name = \"Tippe\"", "name = \"Wildcat\"");
        let err = parse_config(&text).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "got: {}", err);
    }

    #[test]
    fn test_station_without_source_is_rejected() {
        let text = SAMPLE.replace("site_code = \"03331500\"", "");
        let err = parse_config(&text).unwrap_err();
        assert!(err.to_string().contains("Tippe"), "got: {}", err);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let text = SAMPLE.replace("workers = 2", "workers = 0");
        assert!(parse_config(&text).is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(parse_config("[analysis"), Err(FlowStatsError::Config(_))));
    }

    #[test]
    fn test_shipped_stations_toml_loads() {
        let config = load_config(DEFAULT_CONFIG_PATH).expect("stations.toml should be valid");
        assert!(config.stations.iter().any(|s| s.name == "Wildcat"));
        assert!(config.stations.iter().any(|s| s.name == "Tippe"));
    }
}
