use arrow::array::{Array, AsArray, BooleanArray, Int64Array, TimestampNanosecondArray, UInt64Array};
use arrow::compute::{cast, filter_record_batch, take_record_batch};
use arrow::datatypes::{DataType, Int64Type, TimeUnit, TimestampNanosecondType};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::timestamp_ns_to_datetime;
use chrono::NaiveDateTime;

use super::error::TableError;

// ---------------------------------------------------------------------------
// Column names of the TLC yellow-taxi schema
// ---------------------------------------------------------------------------

/// Raw pickup time as stored in the source file.
pub const PICKUP_DATETIME: &str = "tpep_pickup_datetime";
/// Pickup taxi-zone identifier.
pub const PICKUP_LOCATION: &str = "PULocationID";
/// Dropoff taxi-zone identifier.
pub const DROPOFF_LOCATION: &str = "DOLocationID";
/// Derived pickup time, normalised to naive nanosecond timestamps.
pub const PICKUP_DT: &str = "pickup_dt";

/// Type of the derived [`PICKUP_DT`] column.
pub fn pickup_dt_type() -> DataType {
    DataType::Timestamp(TimeUnit::Nanosecond, None)
}

// ---------------------------------------------------------------------------
// TripTable – the in-memory trip records
// ---------------------------------------------------------------------------

/// Trip records held as one Arrow batch.
///
/// Every source column is carried through untouched; the only addition is
/// the [`PICKUP_DT`] column, which is guaranteed present with type
/// [`pickup_dt_type`]. Tables are never mutated: slicing operations return a
/// new table and leave `self` as it was.
#[derive(Debug, Clone)]
pub struct TripTable {
    batch: RecordBatch,
}

impl TripTable {
    /// Wrap a batch that already carries the derived pickup column.
    pub fn new(batch: RecordBatch) -> Result<Self, TableError> {
        let schema = batch.schema();
        let field = schema
            .field_with_name(PICKUP_DT)
            .map_err(|_| TableError::MissingColumn(PICKUP_DT.to_string()))?;
        if field.data_type() != &pickup_dt_type() {
            return Err(TableError::UnsupportedColumnType {
                column: PICKUP_DT.to_string(),
                data_type: field.data_type().clone(),
            });
        }
        Ok(Self { batch })
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table holds no trips.
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    fn pickup_column(&self) -> &TimestampNanosecondArray {
        // Presence and type are checked in `new`.
        self.batch
            .column_by_name(PICKUP_DT)
            .map(|col| col.as_primitive::<TimestampNanosecondType>())
            .unwrap_or_else(|| unreachable!("pickup_dt validated on construction"))
    }

    /// Pickup time of each row; `None` where the source value was null.
    pub fn pickup_times(&self) -> Vec<Option<NaiveDateTime>> {
        self.pickup_column()
            .iter()
            .map(|ns| ns.and_then(timestamp_ns_to_datetime))
            .collect()
    }

    /// View an integer location column as `Int64`.
    pub fn location_ids(&self, column: &str) -> Result<Int64Array, TableError> {
        let col = self
            .batch
            .column_by_name(column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
        if !col.data_type().is_integer() {
            return Err(TableError::UnsupportedColumnType {
                column: column.to_string(),
                data_type: col.data_type().clone(),
            });
        }
        let ids = cast(col, &DataType::Int64)?;
        Ok(ids.as_primitive::<Int64Type>().clone())
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Result<Self, TableError> {
        let indices = UInt64Array::from_iter_values(indices.iter().map(|&i| i as u64));
        let batch = take_record_batch(&self.batch, &indices)?;
        Ok(Self { batch })
    }

    /// Rows where `mask` is true, in original order. Null mask slots drop the row.
    pub fn filter(&self, mask: &BooleanArray) -> Result<Self, TableError> {
        let batch = filter_record_batch(&self.batch, mask)?;
        Ok(Self { batch })
    }
}
