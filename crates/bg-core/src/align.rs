//! Dose-anchored alignment of glucose readings against the tabular dataset.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use thiserror::Error;

use crate::event::GlucoseReading;
use crate::nearest::nearest_within;
use crate::tabular::TabularDoseRecord;
use crate::types::DayPeriod;

/// Maximum distance between a dose and the glucose reading matched to it.
///
/// 4.5 minutes, just under the 5-minute CGM sampling cadence, so each dose
/// matches at most the single reading closest to it.
#[must_use]
pub fn match_tolerance() -> Duration {
    Duration::seconds(270)
}

/// Default lower window bound, predating any supported device data.
fn epoch_floor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .expect("valid calendar date")
        .and_hms_opt(0, 0, 0)
        .expect("valid midnight")
}

/// Errors raised while configuring or running an alignment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// A window bound string matched none of the accepted formats.
    #[error("unparseable window bound: {value:?}")]
    InvalidBound { value: String },

    /// The window's lower bound exceeds its upper bound.
    #[error("empty analysis window: {min} > {max}")]
    EmptyWindow {
        min: NaiveDateTime,
        max: NaiveDateTime,
    },

    /// The glucose shift must move forward in time.
    #[error("shift must be positive, got {minutes} minutes")]
    NonPositiveShift { minutes: i64 },
}

/// Inclusive timestamp range the alignment restricts itself to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    min: NaiveDateTime,
    max: NaiveDateTime,
}

impl AnalysisWindow {
    /// Builds a window from optional bounds.
    ///
    /// A missing lower bound falls back to 2000-01-01 and a missing upper
    /// bound to the current local time.
    pub fn new(
        min: Option<NaiveDateTime>,
        max: Option<NaiveDateTime>,
    ) -> Result<Self, AlignError> {
        let min = min.unwrap_or_else(epoch_floor);
        let max = max.unwrap_or_else(|| Local::now().naive_local());
        if min > max {
            return Err(AlignError::EmptyWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// Builds a window from optional bound strings.
    ///
    /// Accepts `2024-03-15T08:00:00`, `2024-03-15 08:00:00`, or a bare date,
    /// which is taken as midnight.
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self, AlignError> {
        let min = min.map(parse_bound).transpose()?;
        let max = max.map(parse_bound).transpose()?;
        Self::new(min, max)
    }

    #[must_use]
    pub const fn min(&self) -> NaiveDateTime {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> NaiveDateTime {
        self.max
    }

    /// Whether a timestamp falls inside the window, bounds inclusive.
    #[must_use]
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.min <= timestamp && timestamp <= self.max
    }
}

fn parse_bound(value: &str) -> Result<NaiveDateTime, AlignError> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }
    Err(AlignError::InvalidBound {
        value: value.to_string(),
    })
}

/// One dose with its matched glucose readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRecord {
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub dose_time: NaiveTime,
    pub meal_carbs: f64,
    pub meal_bolus: f64,
    pub bolus_insulin: f64,
    pub correction_bolus: f64,
    pub extended_meal_bolus: f64,
    pub total_bolus: f64,
    /// Reading nearest the dose, within tolerance.
    pub glucose_at_dose: Option<f64>,
    /// Reading nearest the dose shifted forward, within tolerance.
    pub glucose_after_shift: Option<f64>,
    pub period: DayPeriod,
}

/// Matches each dose against the glucose series at the dose time and again
/// `shift_minutes` later, keeping only rows where a bolus was delivered and
/// both matches found a positive reading inside the window.
///
/// `glucose` must be sorted ascending by timestamp; ingestion guarantees
/// this. Output rows inherit the order of `doses`. Doses whose matches miss
/// the tolerance are dropped without distinction from doses with no nearby
/// reading at all, so only the output row count reflects the loss.
pub fn align(
    doses: &[TabularDoseRecord],
    glucose: &[GlucoseReading],
    shift_minutes: i64,
    window: &AnalysisWindow,
) -> Result<Vec<AlignedRecord>, AlignError> {
    if shift_minutes <= 0 {
        return Err(AlignError::NonPositiveShift {
            minutes: shift_minutes,
        });
    }
    debug_assert!(
        glucose.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
        "glucose readings must be sorted ascending"
    );

    let shift = Duration::minutes(shift_minutes);
    let records = doses
        .iter()
        .filter(|dose| window.contains(dose.timestamp))
        .filter_map(|dose| {
            let at_dose = nearest_within(glucose, dose.timestamp, match_tolerance(), |g| {
                g.timestamp
            })
            .map(|g| g.value);
            let after_shift =
                nearest_within(glucose, dose.timestamp + shift, match_tolerance(), |g| {
                    g.timestamp
                })
                .map(|g| g.value);

            let retained = dose.total_bolus() > 0.0
                && at_dose.is_some_and(|v| v > 0.0)
                && after_shift.is_some_and(|v| v > 0.0);
            if !retained {
                return None;
            }

            Some(AlignedRecord {
                timestamp: dose.timestamp,
                date: dose.date,
                dose_time: dose.time,
                meal_carbs: dose.meal_carbs,
                meal_bolus: dose.meal_bolus,
                bolus_insulin: dose.bolus_insulin,
                correction_bolus: dose.correction_bolus,
                extended_meal_bolus: dose.extended_meal_bolus,
                total_bolus: dose.total_bolus(),
                glucose_at_dose: at_dose,
                glucose_after_shift: after_shift,
                period: DayPeriod::from_hour(dose.timestamp.hour()),
            })
        })
        .collect();
    Ok(records)
}
