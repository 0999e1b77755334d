//! CSV writers for the pipeline's output datasets.

use std::path::Path;

use chrono::Local;
use serde::Serialize;

use bg_core::{AlignedRecord, GlucoseBolusFlagRecord, TabularDoseRecord};

use crate::IngestError;

/// Writes the tabular dose dataset to a CSV file.
pub fn write_tabular_csv(path: &Path, records: &[TabularDoseRecord]) -> Result<(), IngestError> {
    write_csv(path, records)
}

/// Writes the aligned dose/glucose dataset to a CSV file.
pub fn write_aligned_csv(path: &Path, records: &[AlignedRecord]) -> Result<(), IngestError> {
    write_csv(path, records)
}

/// Writes the glucose/bolus flag series to a CSV file.
pub fn write_flags_csv(
    path: &Path,
    records: &[GlucoseBolusFlagRecord],
) -> Result<(), IngestError> {
    write_csv(path, records)
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// File name for a generated dataset, stamped with the local wall clock so
/// repeated runs never clobber earlier output.
#[must_use]
pub fn generated_file_name(prefix: &str) -> String {
    format!("{prefix}_{}.csv", Local::now().format("%Y%m%d-%H%M%S"))
}
