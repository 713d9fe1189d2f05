use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use thiserror::Error;

/// Failures raised while shaping or slicing a trip table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: DataType },

    #[error("row {row}: cannot parse '{value}' as a timestamp")]
    UnparseableTimestamp { row: usize, value: String },

    #[error("sampling fraction {0} is outside [0, 1]")]
    InvalidFraction(f64),

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}
