//! Writes a synthetic February 2025 yellow-taxi parquet file for local runs.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const OUTPUT_PATH: &str = "data/yellow_tripdata_2025-02.parquet";
const TRIPS: usize = 200_000;
const AIRPORT_IDS: [i32; 3] = [1, 132, 138];
/// Share of trips with at least one airport endpoint.
const AIRPORT_SHARE: f64 = 0.12;

fn zone(rng: &mut ChaCha8Rng) -> i32 {
    rng.gen_range(2..=265)
}

fn main() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let month_start = NaiveDate::from_ymd_opt(2025, 2, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("month start")?
        .and_utc()
        .timestamp_micros();
    let month_micros: i64 = 28 * 24 * 3600 * 1_000_000;

    let mut vendor: Vec<i32> = Vec::with_capacity(TRIPS);
    let mut pickup = Vec::with_capacity(TRIPS);
    let mut dropoff = Vec::with_capacity(TRIPS);
    let mut pu_zone = Vec::with_capacity(TRIPS);
    let mut do_zone = Vec::with_capacity(TRIPS);
    let mut fare = Vec::with_capacity(TRIPS);
    let mut flag = Vec::with_capacity(TRIPS);

    for _ in 0..TRIPS {
        let start = month_start + rng.gen_range(0..month_micros);
        let minutes = rng.gen_range(3..90);

        let (pu, dl) = if rng.gen_bool(AIRPORT_SHARE) {
            let airport = AIRPORT_IDS[rng.gen_range(0..AIRPORT_IDS.len())];
            if rng.gen_bool(0.5) {
                (airport, zone(&mut rng))
            } else {
                (zone(&mut rng), airport)
            }
        } else {
            (zone(&mut rng), zone(&mut rng))
        };

        vendor.push(rng.gen_range(1..=2));
        pickup.push(start);
        dropoff.push(start + minutes * 60 * 1_000_000);
        pu_zone.push(pu);
        do_zone.push(dl);
        fare.push(((3.0 + minutes as f64 * 0.9) * 100.0).round() / 100.0);
        flag.push(if rng.gen_bool(0.01) { "Y" } else { "N" });
    }

    let timestamp = DataType::Timestamp(TimeUnit::Microsecond, None);
    let schema = Arc::new(Schema::new(vec![
        Field::new("VendorID", DataType::Int32, true),
        Field::new("tpep_pickup_datetime", timestamp.clone(), true),
        Field::new("tpep_dropoff_datetime", timestamp, true),
        Field::new("store_and_fwd_flag", DataType::Utf8, true),
        Field::new("PULocationID", DataType::Int32, true),
        Field::new("DOLocationID", DataType::Int32, true),
        Field::new("fare_amount", DataType::Float64, true),
        Field::new("trip_seq", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(vendor)),
            Arc::new(TimestampMicrosecondArray::from(pickup)),
            Arc::new(TimestampMicrosecondArray::from(dropoff)),
            Arc::new(StringArray::from(flag)),
            Arc::new(Int32Array::from(pu_zone)),
            Arc::new(Int32Array::from(do_zone)),
            Arc::new(Float64Array::from(fare)),
            Arc::new(Int64Array::from_iter_values(0..TRIPS as i64)),
        ],
    )
    .context("building record batch")?;

    let path = Path::new(OUTPUT_PATH);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("creating output directory")?;
    }
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    println!("Wrote {TRIPS} synthetic trips to {OUTPUT_PATH}");
    Ok(())
}
