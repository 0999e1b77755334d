//! Ingestion and export layer for the dose/glucose pipeline.
//!
//! Reads Omnipod pump log and Dexcom CGM CSV exports into the core record
//! types, and writes the pipeline's tabular, aligned, and flag datasets back
//! out as CSV.
//!
//! # Ingestion contracts
//!
//! - [`read_omnipod_log`] deduplicates exact repeat rows and normalizes empty
//!   value cells, but performs no classification; rows come back in file
//!   order as [`bg_core::DoseEventRaw`].
//! - [`read_dexcom_export`] returns readings sorted ascending by timestamp
//!   with duplicate timestamps collapsed, the ordering the core alignment
//!   routines rely on.

use thiserror::Error;

pub mod dexcom;
pub mod export;
pub mod omnipod;

pub use dexcom::read_dexcom_export;
pub use export::{
    generated_file_name, write_aligned_csv, write_flags_csv, write_tabular_csv,
};
pub use omnipod::read_omnipod_log;

/// Ingestion and export errors.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An error from the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// An error from the CSV layer.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// A required column was missing from the header row.
    #[error("missing column {column:?} in {file}")]
    MissingColumn { file: String, column: String },
    /// A date or time cell failed to parse.
    #[error("invalid timestamp cell: {value:?}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
