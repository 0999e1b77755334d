//! Glucose-anchored bolus flag series for charting.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::align::{match_tolerance, AnalysisWindow};
use crate::event::GlucoseReading;
use crate::nearest::nearest_within;
use crate::tabular::TabularDoseRecord;

/// One glucose reading annotated with whether a bolus landed near it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlucoseBolusFlagRecord {
    pub timestamp: NaiveDateTime,
    pub glucose: f64,
    /// The reading's own glucose value when a bolus was delivered within
    /// tolerance, 0.0 otherwise. Charting overlays the nonzero values on
    /// the glucose trace to mark dose times.
    pub bolus_flag: f64,
}

/// Inverts the dose-anchored join: walks the glucose series and flags each
/// reading that has a bolus-delivering dose within tolerance.
///
/// Only doses with a positive total bolus qualify as flag candidates.
/// `glucose` must be sorted ascending by timestamp.
#[must_use]
pub fn build_flag_series(
    doses: &[TabularDoseRecord],
    glucose: &[GlucoseReading],
    window: &AnalysisWindow,
) -> Vec<GlucoseBolusFlagRecord> {
    debug_assert!(
        glucose.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
        "glucose readings must be sorted ascending"
    );

    let mut qualifying: Vec<NaiveDateTime> = doses
        .iter()
        .filter(|dose| dose.total_bolus() > 0.0)
        .map(|dose| dose.timestamp)
        .collect();
    qualifying.sort_unstable();

    glucose
        .iter()
        .filter(|reading| window.contains(reading.timestamp))
        .map(|reading| {
            let matched =
                nearest_within(&qualifying, reading.timestamp, match_tolerance(), |t| *t)
                    .is_some();
            GlucoseBolusFlagRecord {
                timestamp: reading.timestamp,
                glucose: reading.value,
                bolus_flag: if matched { reading.value } else { 0.0 },
            }
        })
        .collect()
}
