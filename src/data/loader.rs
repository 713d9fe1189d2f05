use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray, TimestampNanosecondArray};
use arrow::compute::{cast, concat_batches};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef, TimeUnit, TimestampNanosecondType};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::TableError;
use super::model::{PICKUP_DATETIME, PICKUP_DT, TripTable, pickup_dt_type};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load trip records from a file and derive the `pickup_dt` column.
///
/// Supported formats:
/// * `.parquet` – TLC trip-record file (the normal input)
/// * `.csv`     – header row, schema inferred from the contents
pub fn load_trips(path: &Path) -> Result<TripTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let batch = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path)?,
        "csv" => read_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    derive_pickup_dt(batch).with_context(|| format!("deriving {PICKUP_DT} for {}", path.display()))
}

/// Append (or replace) the `pickup_dt` column parsed from `tpep_pickup_datetime`.
pub fn derive_pickup_dt(batch: RecordBatch) -> Result<TripTable, TableError> {
    let schema = batch.schema();
    let raw = batch
        .column_by_name(PICKUP_DATETIME)
        .ok_or_else(|| TableError::MissingColumn(PICKUP_DATETIME.to_string()))?;
    let pickup = normalize_pickup(raw)?;

    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    if let Ok(idx) = schema.index_of(PICKUP_DT) {
        fields.remove(idx);
        columns.remove(idx);
    }
    fields.push(Arc::new(Field::new(PICKUP_DT, pickup_dt_type(), true)));
    columns.push(Arc::new(pickup));

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    TripTable::new(batch)
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context("reading parquet record batch")?;
    log::debug!("read {} record batches from {}", batches.len(), path.display());

    concat(&schema, &batches)
}

fn read_csv(path: &Path) -> Result<RecordBatch> {
    let format = Format::default().with_header(true);
    let file = File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let (schema, _) = format
        .infer_schema(file, None)
        .context("inferring CSV schema")?;
    let schema = Arc::new(schema);

    let file = File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(file)
        .context("building CSV reader")?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context("reading CSV record batch")?;

    concat(&schema, &batches)
}

fn concat(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<RecordBatch> {
    concat_batches(schema, batches).context("concatenating record batches")
}

// ---------------------------------------------------------------------------
// Pickup timestamp normalisation
// ---------------------------------------------------------------------------

/// Text layouts accepted for string-typed pickup columns.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp in one of the accepted layouts. A bare date means midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn normalize_pickup(col: &ArrayRef) -> Result<TimestampNanosecondArray, TableError> {
    match col.data_type() {
        // Zoned values keep their instant and are read as UTC wall-clock time.
        DataType::Timestamp(_, tz) => {
            let ns = cast(col, &DataType::Timestamp(TimeUnit::Nanosecond, tz.clone()))?;
            Ok(ns
                .as_primitive::<TimestampNanosecondType>()
                .clone()
                .with_timezone_opt(None::<String>))
        }
        DataType::Date32 | DataType::Date64 => {
            let ns = cast(col, &pickup_dt_type())?;
            Ok(ns.as_primitive::<TimestampNanosecondType>().clone())
        }
        DataType::Utf8 => parse_strings(col.as_string::<i32>().iter()),
        DataType::LargeUtf8 => parse_strings(col.as_string::<i64>().iter()),
        other => Err(TableError::UnsupportedColumnType {
            column: PICKUP_DATETIME.to_string(),
            data_type: other.clone(),
        }),
    }
}

fn parse_strings<'a>(
    values: impl Iterator<Item = Option<&'a str>>,
) -> Result<TimestampNanosecondArray, TableError> {
    values
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_timestamp(s)
                .and_then(|dt| dt.and_utc().timestamp_nanos_opt())
                .map(Some)
                .ok_or_else(|| TableError::UnparseableTimestamp {
                    row,
                    value: s.to_string(),
                }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(TimestampNanosecondArray::from)
}
