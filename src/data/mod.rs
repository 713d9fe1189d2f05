//! Data layer: trip table, loading, filtering, sampling, slicing and writing.
//!
//! Architecture:
//! ```text
//!  .parquet / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read file, derive pickup_dt → TripTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  pickup or dropoff zone ∈ airport ids
//!   └──────────┘
//!        │
//!        ├───────────────┐
//!        ▼               ▼
//!   ┌──────────┐    ┌──────────┐
//!   │  sample   │    │  window   │  per-day fraction / one-minute slice
//!   └──────────┘    └──────────┘
//!        │               │
//!        └──────┬────────┘
//!               ▼
//!         ┌──────────┐
//!         │  writer   │  header + rows → .csv
//!         └──────────┘
//! ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod sample;
pub mod window;
pub mod writer;
