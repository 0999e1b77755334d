//! Dose and glucose record types flowing through the pipeline.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::kind::BolusKind;

/// A raw pump log record as ingested, before classification.
///
/// Timestamps are naive: pump and CGM device clocks carry no zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseEventRaw {
    /// Calendar date of the record.
    pub date: NaiveDate,
    /// Time of day of the record.
    pub time: NaiveTime,
    /// Record type string as written by the pump.
    #[serde(rename = "type")]
    pub raw_type: String,
    /// Free-text description, used for classification rule matching.
    pub description: String,
    /// Value cell, typically "<amount> <unit>".
    pub value: String,
    /// Comment cell, scanned for IOB values and the manual override marker.
    pub comment: String,
}

impl DoseEventRaw {
    /// Combines the date and time cells into a single timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// A classified dose event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseEvent {
    pub timestamp: NaiveDateTime,
    /// Numeric dose amount parsed from the value cell.
    pub amount: f64,
    /// Unit suffix from the value cell, empty when absent.
    pub unit: String,
    pub kind: BolusKind,
    /// Carbohydrate grams, populated only for meal records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_carbs: Option<f64>,
    /// Insulin-on-board from prior meals, extracted from the comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_iob: Option<f64>,
    /// Insulin-on-board from prior corrections, extracted from the comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction_iob: Option<f64>,
    /// Whether the pump's suggested dose was manually overridden.
    pub manual_override: bool,
}

/// A single CGM glucose reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseReading {
    pub timestamp: NaiveDateTime,
    /// Glucose concentration in mg/dL.
    pub value: f64,
}
