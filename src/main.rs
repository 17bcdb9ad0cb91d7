//! Streamflow Statistics - Batch Driver
//!
//! For every station in the configuration:
//! 1. Ingests daily mean discharge from a saved RDB file or USGS NWIS
//! 2. Clips the record to the analysis window
//! 3. Computes water-year and monthly flow metrics plus long-term averages
//! 4. Writes the four result tables (and optionally a JSON report)
//!
//! Usage:
//!   cargo run --release                                  # uses stations.toml
//!   cargo run --release -- --config my.toml --workers 4
//!   cargo run --release -- --json output/report.json
//!
//! Environment:
//!   FLOWSTATS_CONFIG - config path when --config is not given (.env is read)
//!   RUST_LOG         - log filter, default "info"

use clap::Parser;
use flowstats_service::config::{config_path, load_config};
use flowstats_service::model::StationReport;
use flowstats_service::{output, pipeline};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flowstats")]
#[command(about = "Compute streamflow statistics for USGS gauge stations", long_about = None)]
struct Args {
    /// Station configuration file (defaults to $FLOWSTATS_CONFIG or stations.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for the result tables (overrides [analysis] output_dir)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Number of stations analyzed in parallel (overrides [analysis] workers)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Also write all station reports as JSON to this path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = Args::parse();

    println!("🌊 Streamflow Statistics");
    println!("========================\n");

    let path = args.config.unwrap_or_else(config_path);
    let mut config = load_config(&path)?;
    if let Some(workers) = args.workers {
        config.analysis.workers = workers;
    }
    if let Some(dir) = args.output_dir {
        config.analysis.output_dir = dir;
    }
    config.validate()?;

    println!("📋 Config: {}", path.display());
    println!(
        "   Window: {} to {}",
        config.analysis.start_date, config.analysis.end_date
    );
    println!(
        "   {} stations, {} workers\n",
        config.stations.len(),
        config.analysis.workers
    );

    let results = pipeline::run_stations(&config);

    let mut reports: Vec<StationReport> = Vec::new();
    for (station, result) in config.stations.iter().zip(results) {
        match result {
            Ok(report) => {
                println!(
                    "   ✓ {} - {} water years, {} missing days ({} in window)",
                    report.station,
                    report.annual.len(),
                    report.raw_missing_days,
                    report.clipped_missing_days
                );
                reports.push(report);
            }
            Err(e) => {
                warn!(station = %station.name, error = %e, "Skipping station");
                eprintln!("   ✗ {} - {}", station.name, e);
            }
        }
    }

    if reports.is_empty() {
        return Err(format!("all {} stations failed", config.stations.len()).into());
    }

    output::write_all(&reports, &config.analysis.output_dir)?;
    println!("\n📁 Tables written to {}", config.analysis.output_dir.display());

    if let Some(json_path) = args.json {
        let file = File::create(&json_path)
            .map_err(|e| format!("failed to create {}: {}", json_path.display(), e))?;
        output::write_json_report(&reports, BufWriter::new(file))?;
        info!(path = %json_path.display(), "JSON report written");
        println!("📄 JSON report written to {}", json_path.display());
    }

    println!(
        "\n✓ {} of {} stations analyzed",
        reports.len(),
        config.stations.len()
    );
    Ok(())
}
