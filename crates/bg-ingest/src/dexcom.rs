//! Dexcom CGM export ingestion.

use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;

use bg_core::GlucoseReading;

use crate::IngestError;

/// Reads a Dexcom CGM export CSV into glucose readings.
///
/// Dexcom headers embed the unit in parentheses, so columns are located by
/// prefix. Leading metadata rows (patient name, device info) have an empty
/// timestamp cell and are skipped, as are the `Low`/`High` clamp sentinels
/// the sensor emits outside its measurable range.
///
/// Output is sorted ascending by timestamp with duplicate timestamps
/// collapsed to the first reading.
pub fn read_dexcom_export(path: &Path) -> Result<Vec<GlucoseReading>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let file = path.display().to_string();
    let timestamp_idx = column_prefix_index(&headers, &file, "Timestamp")?;
    let glucose_idx = column_prefix_index(&headers, &file, "Glucose Value")?;

    let mut readings = Vec::new();
    for result in reader.records() {
        let record = result?;
        let timestamp_cell = cell(&record, timestamp_idx);
        if timestamp_cell.is_empty() {
            continue;
        }
        let glucose_cell = cell(&record, glucose_idx);
        if glucose_cell.eq_ignore_ascii_case("low") || glucose_cell.eq_ignore_ascii_case("high")
        {
            tracing::warn!(
                timestamp = timestamp_cell,
                sentinel = glucose_cell,
                "skipping out-of-range glucose reading"
            );
            continue;
        }
        let Ok(value) = glucose_cell.parse::<f64>() else {
            tracing::warn!(
                timestamp = timestamp_cell,
                cell = glucose_cell,
                "skipping non-numeric glucose cell"
            );
            continue;
        };
        readings.push(GlucoseReading {
            timestamp: parse_timestamp(timestamp_cell)?,
            value,
        });
    }

    readings.sort_by_key(|r| r.timestamp);
    readings.dedup_by_key(|r| r.timestamp);

    tracing::info!(count = readings.len(), path = %path.display(), "read CGM export");
    Ok(readings)
}

fn cell<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

fn column_prefix_index(
    headers: &StringRecord,
    file: &str,
    prefix: &str,
) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h.trim().starts_with(prefix))
        .ok_or_else(|| IngestError::MissingColumn {
            file: file.to_string(),
            column: prefix.to_string(),
        })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, IngestError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|source| IngestError::Timestamp {
            value: value.to_string(),
            source,
        })
}
