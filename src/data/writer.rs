use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::util::display::{ArrayFormatter, FormatOptions};

use super::model::TripTable;

/// Timestamp layout for CSV cells; the fraction is printed only when non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Write a table as comma-separated text: header row, no index column.
/// An existing file at `path` is replaced.
pub fn write_csv(table: &TripTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_records(table, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))
}

/// Stream header and rows into an existing CSV writer.
pub fn write_records<W: Write>(table: &TripTable, writer: &mut csv::Writer<W>) -> Result<()> {
    let batch = table.batch();
    let schema = batch.schema();
    writer
        .write_record(schema.fields().iter().map(|f| f.name()))
        .context("writing CSV header")?;

    let options = FormatOptions::default()
        .with_timestamp_format(Some(TIMESTAMP_FORMAT))
        .with_null("");
    let formatters = batch
        .columns()
        .iter()
        .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()
        .context("preparing column formatters")?;

    let mut record = csv::StringRecord::with_capacity(256, formatters.len());
    for row in 0..batch.num_rows() {
        record.clear();
        for formatter in &formatters {
            record.push_field(&formatter.value(row).to_string());
        }
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    Ok(())
}
