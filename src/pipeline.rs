/// Per-station batch driver.
///
/// `analyze_series` is the pure core: one `TimeSeries` in, one
/// `StationReport` out. `run_station` wraps it with ingestion and clipping,
/// and `run_stations` fans the configured stations out over a thread pool.

use std::sync::mpsc;
use std::time::Duration;

use threadpool::ThreadPool;
use tracing::{debug, info, warn};

use crate::analysis::annual::annual_statistics;
use crate::analysis::averages::{annual_averages, monthly_averages};
use crate::analysis::monthly::monthly_statistics;
use crate::config::{AnalysisConfig, AnalysisSettings, StationConfig, StationSource};
use crate::ingest::rdb::read_daily_values;
use crate::ingest::usgs::fetch_daily_values;
use crate::model::{FlowStatsError, StationReport, TimeSeries};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Computes every table for one station's series.
///
/// Both missing-day counts are set to the series' tagged-missing count;
/// `run_station` replaces them with the ingest and clip counts.
pub fn analyze_series(name: &str, series: &TimeSeries) -> StationReport {
    let annual = annual_statistics(series);
    let monthly = monthly_statistics(series);
    let annual_avg = annual_averages(&annual);
    let monthly_avg = monthly_averages(&monthly);
    let missing = series.missing_count();

    debug!(
        station = name,
        annual_rows = annual.len(),
        monthly_rows = monthly.len(),
        "Computed station tables"
    );

    StationReport {
        station: name.to_string(),
        raw_missing_days: missing,
        clipped_missing_days: missing,
        annual,
        monthly,
        annual_averages: annual_avg,
        monthly_averages: monthly_avg,
    }
}

/// Ingests, clips and analyzes one configured station.
pub fn run_station(
    settings: &AnalysisSettings,
    station: &StationConfig,
    client: &reqwest::blocking::Client,
) -> Result<StationReport, FlowStatsError> {
    let ingested = match station.source() {
        Some(StationSource::File(path)) => read_daily_values(path)?,
        Some(StationSource::Nwis(site)) => {
            fetch_daily_values(client, site, settings.start_date, settings.end_date)?
        }
        None => {
            return Err(FlowStatsError::Config(format!(
                "station '{}' needs a file or a site_code",
                station.name
            )));
        }
    };
    info!(
        station = %station.name,
        rows = ingested.series.len(),
        missing_days = ingested.missing_days,
        "Ingested daily values"
    );

    let (clipped, clipped_missing) = ingested.series.clip(settings.start_date, settings.end_date);
    info!(
        station = %station.name,
        rows = clipped.len(),
        missing_days = clipped_missing,
        start = %settings.start_date,
        end = %settings.end_date,
        "Clipped to analysis window"
    );

    Ok(StationReport {
        raw_missing_days: ingested.missing_days,
        clipped_missing_days: clipped_missing,
        ..analyze_series(&station.name, &clipped)
    })
}

/// Runs every configured station on `config.analysis.workers` threads.
///
/// Results come back in configuration order, one per station.
pub fn run_stations(config: &AnalysisConfig) -> Vec<Result<StationReport, FlowStatsError>> {
    let client = match reqwest::blocking::Client::builder().timeout(HTTP_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            let message = e.to_string();
            return config
                .stations
                .iter()
                .map(|_| Err(FlowStatsError::Request(message.clone())))
                .collect();
        }
    };

    let workers = config.analysis.workers.clamp(1, config.stations.len().max(1));
    let pool = ThreadPool::new(workers);
    let (tx, rx) = mpsc::channel();

    info!(stations = config.stations.len(), workers, "Starting station analysis");

    for (index, station) in config.stations.iter().cloned().enumerate() {
        let tx = tx.clone();
        let settings = config.analysis.clone();
        let client = client.clone();
        pool.execute(move || {
            let result = run_station(&settings, &station, &client);
            if let Err(e) = &result {
                warn!(station = %station.name, error = %e, "Station failed");
            }
            // The receiver outlives the pool, so a send error cannot occur.
            let _ = tx.send((index, result));
        });
    }
    drop(tx);

    let mut slots: Vec<Option<Result<StationReport, FlowStatsError>>> =
        config.stations.iter().map(|_| None).collect();
    for (index, result) in rx {
        slots[index] = Some(result);
    }

    slots
        .into_iter()
        .zip(&config.stations)
        .map(|(slot, station)| {
            slot.unwrap_or_else(|| Err(FlowStatsError::Worker(station.name.clone())))
        })
        .collect()
}
