//! Omnipod pump log ingestion.

use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use csv::StringRecord;

use bg_core::DoseEventRaw;

use crate::IngestError;

/// Fill value for pump rows that carry no dose amount.
///
/// The zero amount and sentinel unit let such rows flow through value
/// parsing without a special case downstream.
const EMPTY_VALUE_FILL: &str = "0 NoDescription";

/// Reads an Omnipod pump log CSV into raw dose events, in file order.
///
/// Exact repeat rows (the pump re-exports overlapping ranges) are dropped,
/// keeping the first occurrence. Empty value cells are normalized to the
/// zero-dose fill.
pub fn read_omnipod_log(path: &Path) -> Result<Vec<DoseEventRaw>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let file = path.display().to_string();
    let date_idx = column_index(&headers, &file, "Date")?;
    let time_idx = column_index(&headers, &file, "Time")?;
    let type_idx = column_index(&headers, &file, "Type")?;
    let description_idx = column_index(&headers, &file, "Description")?;
    let value_idx = column_index(&headers, &file, "Value")?;
    let comment_idx = column_index(&headers, &file, "Comment")?;

    let mut seen: HashSet<(NaiveDate, NaiveTime, String, String, String, String)> =
        HashSet::new();
    let mut events = Vec::new();
    for result in reader.records() {
        let record = result?;
        let date_cell = cell(&record, date_idx);
        if date_cell.is_empty() {
            tracing::debug!("skipping pump row with empty date cell");
            continue;
        }
        let date = parse_date(date_cell)?;
        let time = parse_time(cell(&record, time_idx))?;
        let raw_type = cell(&record, type_idx).to_string();
        let description = cell(&record, description_idx).to_string();
        let comment = cell(&record, comment_idx).to_string();
        let value_cell = cell(&record, value_idx);
        let value = if value_cell.is_empty() {
            EMPTY_VALUE_FILL.to_string()
        } else {
            value_cell.to_string()
        };

        let key = (
            date,
            time,
            raw_type.clone(),
            description.clone(),
            value.clone(),
            comment.clone(),
        );
        if !seen.insert(key) {
            continue;
        }

        events.push(DoseEventRaw {
            date,
            time,
            raw_type,
            description,
            value,
            comment,
        });
    }

    tracing::info!(count = events.len(), path = %path.display(), "read pump log");
    Ok(events)
}

fn cell<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

fn column_index(
    headers: &StringRecord,
    file: &str,
    column: &str,
) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| IngestError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        })
}

fn parse_date(value: &str) -> Result<NaiveDate, IngestError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .map_err(|source| IngestError::Timestamp {
            value: value.to_string(),
            source,
        })
}

fn parse_time(value: &str) -> Result<NaiveTime, IngestError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|source| IngestError::Timestamp {
            value: value.to_string(),
            source,
        })
}
