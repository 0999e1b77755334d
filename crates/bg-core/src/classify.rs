//! Rule-based classification of raw pump records into dose events.

use std::num::ParseFloatError;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;

use crate::event::{DoseEvent, DoseEventRaw};
use crate::kind::BolusKind;

/// Errors raised while classifying a raw pump record.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The numeric prefix of a value cell failed to parse.
    #[error("malformed value cell: {value:?}")]
    MalformedValue {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Record types that describe the log itself rather than a dose.
const METADATA_TYPES: [&str; 4] = ["Insulin Summary", "Notes", "Pump Alarm", "Glucose"];

/// Ordered classification rules, first match wins.
///
/// Order matters: "Reverse Corrected" descriptions also contain "Correction",
/// so the more specific needle must be tried first.
const RULES: [(&str, BolusKind); 8] = [
    ("Reverse Corrected", BolusKind::ReverseCorrected),
    ("Bolus-Meal", BolusKind::MealBolus),
    ("Correction", BolusKind::CorrectionBolus),
    ("Extended", BolusKind::ExtendedMealBolus),
    ("Basal suspended", BolusKind::BasalSuspended),
    ("Temporary basal rate set", BolusKind::TempBasal),
    ("Pod deactivated", BolusKind::PodDeactivated),
    ("Basal resumed", BolusKind::BasalResumed),
];

static MEAL_IOB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Meal IOB: (\d{0,2}\.\d{1,2})").expect("valid regex")
});

static CORRECTION_IOB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Correction IOB: (\d{0,2}\.\d{0,2})").expect("valid regex")
});

/// Classifies one raw pump record.
///
/// Returns `Ok(None)` for metadata records, which carry no dose. Rules from
/// the ordered table are matched against the description; IOB values and the
/// override marker come from the comment. Records matching no rule keep
/// their pump type verbatim as [`BolusKind::Other`].
pub fn classify(raw: &DoseEventRaw) -> Result<Option<DoseEvent>, ClassifyError> {
    if METADATA_TYPES.contains(&raw.raw_type.as_str()) {
        return Ok(None);
    }

    let (amount, unit) = parse_value(&raw.value)?;

    let kind = RULES
        .iter()
        .find(|(needle, _)| raw.description.contains(needle))
        .map_or_else(|| BolusKind::Other(raw.raw_type.clone()), |(_, kind)| kind.clone());

    let meal_carbs = match &kind {
        BolusKind::Other(name) if name == "Meal" => Some(amount),
        _ => None,
    };

    Ok(Some(DoseEvent {
        timestamp: raw.timestamp(),
        amount,
        unit,
        kind,
        meal_carbs,
        meal_iob: extract_iob(&MEAL_IOB_RE, &raw.comment),
        correction_iob: extract_iob(&CORRECTION_IOB_RE, &raw.comment),
        manual_override: raw.comment.contains("Override"),
    }))
}

/// Classifies a batch of raw records in parallel, preserving input order.
///
/// Malformed records are logged and dropped rather than failing the batch.
#[must_use]
pub fn classify_all(raws: &[DoseEventRaw]) -> Vec<DoseEvent> {
    raws.par_iter()
        .filter_map(|raw| match classify(raw) {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(
                    timestamp = %raw.timestamp(),
                    %error,
                    "skipping malformed pump record"
                );
                None
            }
        })
        .collect()
}

/// Splits a value cell into its numeric amount and unit suffix.
fn parse_value(value: &str) -> Result<(f64, String), ClassifyError> {
    let (number, unit) = value.split_once(' ').unwrap_or((value, ""));
    let amount = number
        .trim()
        .parse::<f64>()
        .map_err(|source| ClassifyError::MalformedValue {
            value: value.to_string(),
            source,
        })?;
    Ok((amount, unit.trim().to_string()))
}

fn extract_iob(re: &Regex, comment: &str) -> Option<f64> {
    re.captures(comment)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
