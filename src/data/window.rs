use arrow::array::BooleanArray;
use chrono::{Duration, NaiveDateTime};

use super::error::TableError;
use super::model::TripTable;

/// Labelled one-minute test slice `[start, start + 1 min)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestWindow {
    pub label: String,
    pub start: NaiveDateTime,
}

impl TestWindow {
    pub fn new(label: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            label: label.into(),
            start,
        }
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(1)
    }

    /// Output file name, `test_<label>.csv`.
    pub fn file_name(&self) -> String {
        format!("test_{}.csv", self.label)
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t < self.end()
    }

    /// Trips picked up inside the window, in table order.
    pub fn extract(&self, table: &TripTable) -> Result<TripTable, TableError> {
        let mask: BooleanArray = table
            .pickup_times()
            .into_iter()
            .map(|t| Some(t.is_some_and(|t| self.contains(t))))
            .collect();
        table.filter(&mask)
    }
}
