use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::data::filter::AirportIds;
use crate::data::sample::StratifiedSampler;
use crate::data::window::TestWindow;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Everything a run needs, fixed before the pipeline starts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Trip-record source file.
    pub source_path: PathBuf,
    /// Directory receiving every CSV artifact; created when absent.
    pub output_dir: PathBuf,
    /// Taxi zones counted as airports (JFK, LGA, EWR).
    pub airport_ids: AirportIds,
    /// Period tag used in the training file name.
    pub train_period: String,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub sample_fraction: f64,
    pub seed: u64,
    pub test_windows: Vec<TestWindow>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("calendar constant")
}

fn minute(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    day.and_hms_opt(h, m, 0).expect("clock constant")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("data/yellow_tripdata_2025-02.parquet"),
            output_dir: PathBuf::from("data/"),
            airport_ids: [1, 132, 138].into_iter().collect(),
            train_period: "2025-02".to_string(),
            train_start: date(2025, 2, 1),
            train_end: date(2025, 2, 7),
            sample_fraction: 0.1,
            seed: 2425,
            test_windows: vec![
                // Monday morning commute
                TestWindow::new("peak_2025-02-24_0800", minute(date(2025, 2, 24), 8, 0)),
                // Tuesday lunch hour
                TestWindow::new("offpeak_2025-02-25_1300", minute(date(2025, 2, 25), 13, 0)),
                // Valentine's Day, late
                TestWindow::new("latenight_2025-02-14_2300", minute(date(2025, 2, 14), 23, 0)),
            ],
        }
    }
}

impl PipelineConfig {
    pub fn sampler(&self) -> StratifiedSampler {
        StratifiedSampler {
            start: self.train_start,
            end: self.train_end,
            fraction: self.sample_fraction,
            seed: self.seed,
        }
    }

    /// `train_airport_sample_<period>.csv`
    pub fn train_file_name(&self) -> String {
        format!("train_airport_sample_{}.csv", self.train_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_february_run() {
        let config = PipelineConfig::default();
        assert_eq!(config.airport_ids.iter().copied().collect::<Vec<_>>(), vec![1, 132, 138]);
        assert_eq!(config.train_file_name(), "train_airport_sample_2025-02.csv");

        let names: Vec<String> = config.test_windows.iter().map(|w| w.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "test_peak_2025-02-24_0800.csv",
                "test_offpeak_2025-02-25_1300.csv",
                "test_latenight_2025-02-14_2300.csv",
            ]
        );
    }

    #[test]
    fn sampler_carries_range_fraction_and_seed() {
        let sampler = PipelineConfig::default().sampler();
        assert_eq!(sampler.start, date(2025, 2, 1));
        assert_eq!(sampler.end, date(2025, 2, 7));
        assert_eq!(sampler.fraction, 0.1);
        assert_eq!(sampler.seed, 2425);
    }
}
