use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;

use super::error::TableError;
use super::model::TripTable;

/// Row indices of a table grouped by pickup calendar date.
///
/// `BTreeMap` fixes the iteration order to ascending date, which in turn
/// fixes the concatenation order of the sample.
pub type DateGroups = BTreeMap<NaiveDate, Vec<usize>>;

/// Tolerance for treating `fraction × len` as a whole number.
const FRACTION_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// StratifiedSampler – per-day fractional sample over a date range
// ---------------------------------------------------------------------------

/// Draws the same fraction of trips from every pickup date in `[start, end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StratifiedSampler {
    /// First pickup date included.
    pub start: NaiveDate,
    /// Last pickup date included.
    pub end: NaiveDate,
    /// Share of each day's trips to keep, in `[0, 1]`.
    pub fraction: f64,
    /// Seed applied afresh to every day's draw.
    pub seed: u64,
}

impl StratifiedSampler {
    /// Group rows whose pickup date falls within the range. Null pickups are skipped.
    pub fn group_by_date(&self, table: &TripTable) -> DateGroups {
        let mut groups = DateGroups::new();
        for (row, pickup) in table.pickup_times().into_iter().enumerate() {
            let Some(pickup) = pickup else { continue };
            let date = pickup.date();
            if date >= self.start && date <= self.end {
                groups.entry(date).or_default().push(row);
            }
        }
        groups
    }

    /// Rows drawn from a group of `group_len`; fractional counts are truncated.
    ///
    /// A product within rounding noise of a whole number counts as that
    /// number, so `0.57 × 100` yields 57 and not 56.
    pub fn sample_size(&self, group_len: usize) -> usize {
        let exact = self.fraction * group_len as f64;
        let nearest = exact.round();
        let count = if (exact - nearest).abs() < FRACTION_EPSILON {
            nearest
        } else {
            exact.floor()
        };
        (count as usize).min(group_len)
    }

    /// Indices of the sampled rows: dates ascending, draw order within a date.
    pub fn sample_indices(&self, table: &TripTable) -> Result<Vec<usize>, TableError> {
        if !(0.0..=1.0).contains(&self.fraction) {
            return Err(TableError::InvalidFraction(self.fraction));
        }

        let mut picked = Vec::new();
        for (date, rows) in self.group_by_date(table) {
            let amount = self.sample_size(rows.len());
            log::debug!("{date}: sampling {amount} of {} trips", rows.len());

            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
            picked.extend(
                index::sample(&mut rng, rows.len(), amount)
                    .into_iter()
                    .map(|i| rows[i]),
            );
        }
        Ok(picked)
    }

    /// The stratified sample as a new table.
    pub fn sample(&self, table: &TripTable) -> Result<TripTable, TableError> {
        let indices = self.sample_indices(table)?;
        table.select(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{sparse_trip_table, trip_ids, trip_table};

    use std::collections::BTreeSet;

    fn sampler() -> StratifiedSampler {
        StratifiedSampler {
            start: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 2, 7).unwrap(),
            fraction: 0.1,
            seed: 2425,
        }
    }

    /// `(date, count)` pairs expanded into trips spread over each day.
    fn trips_per_day(days: &[(&str, usize)]) -> TripTable {
        let rows: Vec<(String, i32, i32)> = days
            .iter()
            .flat_map(|&(day, n)| {
                (0..n).map(move |i| {
                    let ts = format!("{day} {:02}:{:02}:00", (i / 60) % 24, i % 60);
                    (ts, 132, 48)
                })
            })
            .collect();
        trip_table(&rows)
    }

    #[test]
    fn each_day_contributes_its_own_tenth() {
        let table = trips_per_day(&[
            ("2025-01-31", 50),
            ("2025-02-01", 25),
            ("2025-02-02", 7),
            ("2025-02-04", 130),
            ("2025-02-07", 40),
            ("2025-02-08", 90),
        ]);
        let s = sampler();
        let sample = s.sample(&table).unwrap();

        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for t in sample.pickup_times() {
            *per_day.entry(t.unwrap().date()).or_default() += 1;
        }
        let day = |d| NaiveDate::from_ymd_opt(2025, 2, d).unwrap();
        assert_eq!(
            per_day,
            BTreeMap::from([(day(1), 2), (day(4), 13), (day(7), 4)])
        );
    }

    #[test]
    fn sample_has_no_duplicate_rows() {
        let table = trips_per_day(&[("2025-02-03", 200), ("2025-02-05", 120)]);
        let ids = trip_ids(&sampler().sample(&table).unwrap());
        let unique: BTreeSet<i64> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 32);
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn same_seed_same_rows() {
        let table = trips_per_day(&[("2025-02-01", 300), ("2025-02-06", 77)]);
        let s = sampler();
        assert_eq!(s.sample_indices(&table).unwrap(), s.sample_indices(&table).unwrap());

        let other = StratifiedSampler { seed: 7, ..s.clone() };
        assert_ne!(s.sample_indices(&table).unwrap(), other.sample_indices(&table).unwrap());
    }

    #[test]
    fn groups_concatenate_in_date_order() {
        // Later date first in the table; the sample still lists Feb 2 before Feb 5.
        let mut rows: Vec<(String, i32, i32)> = (0..20)
            .map(|i| (format!("2025-02-05 10:{i:02}:00"), 1, 1))
            .collect();
        rows.extend((0..20).map(|i| (format!("2025-02-02 10:{i:02}:00"), 1, 1)));
        let table = trip_table(&rows);

        let dates: Vec<NaiveDate> = sampler()
            .sample(&table)
            .unwrap()
            .pickup_times()
            .into_iter()
            .map(|t| t.unwrap().date())
            .collect();
        let feb = |d| NaiveDate::from_ymd_opt(2025, 2, d).unwrap();
        assert_eq!(dates, vec![feb(2), feb(2), feb(5), feb(5)]);
    }

    #[test]
    fn range_is_inclusive_on_calendar_dates() {
        let table = trip_table(&[
            ("2025-01-31 23:59:59", 1, 1),
            ("2025-02-01 00:00:00", 1, 1),
            ("2025-02-07 23:59:59.999", 1, 1),
            ("2025-02-08 00:00:00", 1, 1),
        ]);
        let groups = sampler().group_by_date(&table);
        let rows: Vec<usize> = groups.values().flatten().copied().collect();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn small_groups_truncate_to_zero() {
        let s = sampler();
        assert_eq!(s.sample_size(3), 0);
        assert_eq!(s.sample_size(9), 0);
        assert_eq!(s.sample_size(10), 1);
        assert_eq!(s.sample_size(19), 1);

        let table = trips_per_day(&[("2025-02-03", 3)]);
        assert!(s.sample(&table).unwrap().is_empty());
    }

    #[test]
    fn sample_size_survives_float_error_below_an_integer() {
        let s = StratifiedSampler { fraction: 0.57, ..sampler() };
        assert_eq!(s.sample_size(100), 57);
        assert_eq!(s.sample_size(101), 57);

        let table = trips_per_day(&[("2025-02-03", 100)]);
        assert_eq!(s.sample(&table).unwrap().len(), 57);

        let s = StratifiedSampler { fraction: 0.29, ..sampler() };
        assert_eq!(s.sample_size(100), 29);
    }

    #[test]
    fn null_pickup_rows_are_never_grouped() {
        let table = sparse_trip_table(&[
            (Some("2025-02-03 09:00:00"), Some(132), Some(48)),
            (None, Some(132), Some(48)),
            (Some("2025-02-03 09:05:00"), Some(1), Some(1)),
        ]);
        let groups = sampler().group_by_date(&table);
        let rows: Vec<usize> = groups.values().flatten().copied().collect();
        assert_eq!(rows, vec![0, 2]);

        let s = StratifiedSampler { fraction: 1.0, ..sampler() };
        let mut ids = trip_ids(&s.sample(&table).unwrap());
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn fraction_outside_unit_interval_is_rejected() {
        let table = trips_per_day(&[("2025-02-03", 3)]);
        for fraction in [-0.1, 1.5, f64::NAN] {
            let s = StratifiedSampler { fraction, ..sampler() };
            assert!(matches!(s.sample_indices(&table), Err(TableError::InvalidFraction(_))));
        }
    }

    #[test]
    fn full_fraction_keeps_every_row() {
        let table = trips_per_day(&[("2025-02-03", 12)]);
        let s = StratifiedSampler { fraction: 1.0, ..sampler() };
        let mut ids = trip_ids(&s.sample(&table).unwrap());
        ids.sort_unstable();
        assert_eq!(ids, (0..12).collect::<Vec<i64>>());
    }
}
