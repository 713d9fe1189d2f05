use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::PipelineConfig;
use crate::data::filter::filter_airport_trips;
use crate::data::loader::load_trips;
use crate::data::model::TripTable;
use crate::data::window::TestWindow;
use crate::data::writer::write_csv;

/// Row counts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub source_rows: usize,
    pub airport_rows: usize,
    pub train_rows: usize,
    /// `(label, rows)` per test window, in configuration order.
    pub test_rows: Vec<(String, usize)>,
}

/// Load, filter once, then write the training sample and every test slice.
///
/// Any failure aborts the run; artifacts already written are left in place.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output directory {}", config.output_dir.display()))?;

    info!("Reading Parquet...");
    let trips = load_trips(&config.source_path)
        .with_context(|| format!("loading {}", config.source_path.display()))?;

    info!("Filtering airport-related trips...");
    let airport = filter_airport_trips(&trips, &config.airport_ids)
        .context("filtering airport trips")?;
    info!("{} of {} trips touch an airport", airport.len(), trips.len());
    if airport.is_empty() {
        warn!("no airport trips in {}; artifacts will hold only headers", config.source_path.display());
    }

    info!(
        "Generating training set from {} to {}...",
        config.train_start, config.train_end
    );
    let train = config.sampler().sample(&airport).context("sampling training set")?;
    write_csv(&train, &config.output_dir.join(config.train_file_name()))?;
    info!("Saved training set: {} rows", train.len());

    info!("Extracting 1-minute test windows...");
    let mut test_rows = Vec::with_capacity(config.test_windows.len());
    for window in &config.test_windows {
        let rows = extract_test_window(&airport, window, &config.output_dir)?;
        test_rows.push((window.label.clone(), rows));
    }

    Ok(RunSummary {
        source_rows: trips.len(),
        airport_rows: airport.len(),
        train_rows: train.len(),
        test_rows,
    })
}

/// Slice one window out of `airport` and write `test_<label>.csv`. Returns the row count.
pub fn extract_test_window(airport: &TripTable, window: &TestWindow, output_dir: &Path) -> Result<usize> {
    let slice = window
        .extract(airport)
        .with_context(|| format!("slicing test window '{}'", window.label))?;
    write_csv(&slice, &output_dir.join(window.file_name()))?;
    info!("Saved test slice '{}': {} rows", window.label, slice.len());
    Ok(slice.len())
}
