//! Bolus kind enum as the single source of truth for dose category strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical dose categories recognized by the classifier.
///
/// The closed variants cover every category the downstream tabular and
/// alignment stages operate on. Pump records whose type matches none of the
/// classification rules are preserved verbatim in [`BolusKind::Other`] so no
/// information is lost before the pivot stage decides what to keep.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BolusKind {
    MealBolus,
    CorrectionBolus,
    ExtendedMealBolus,
    ReverseCorrected,
    BasalSuspended,
    BasalResumed,
    TempBasal,
    PodDeactivated,
    /// Unclassified pump record type, carried verbatim.
    Other(String),
}

impl BolusKind {
    /// String representation used in serialized output columns.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MealBolus => "Meal Bolus",
            Self::CorrectionBolus => "Correction Bolus",
            Self::ExtendedMealBolus => "Extended Meal Bolus",
            Self::ReverseCorrected => "Reverse Corrected",
            Self::BasalSuspended => "Basal Suspended",
            Self::BasalResumed => "Basal Resumed",
            Self::TempBasal => "Temp Basal",
            Self::PodDeactivated => "Pod Deactivated",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for BolusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BolusKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Meal Bolus" => Self::MealBolus,
            "Correction Bolus" => Self::CorrectionBolus,
            "Extended Meal Bolus" => Self::ExtendedMealBolus,
            "Reverse Corrected" => Self::ReverseCorrected,
            "Basal Suspended" => Self::BasalSuspended,
            "Basal Resumed" => Self::BasalResumed,
            "Temp Basal" => Self::TempBasal,
            "Pod Deactivated" => Self::PodDeactivated,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Serialize for BolusKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BolusKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|never| match never {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_closed_variants() {
        let variants = [
            BolusKind::MealBolus,
            BolusKind::CorrectionBolus,
            BolusKind::ExtendedMealBolus,
            BolusKind::ReverseCorrected,
            BolusKind::BasalSuspended,
            BolusKind::BasalResumed,
            BolusKind::TempBasal,
            BolusKind::PodDeactivated,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: BolusKind = s.parse().expect("infallible");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn unknown_string_becomes_other() {
        let parsed: BolusKind = "Basal Insulin".parse().expect("infallible");
        assert_eq!(parsed, BolusKind::Other("Basal Insulin".to_string()));
        assert_eq!(parsed.as_str(), "Basal Insulin");
    }

    #[test]
    fn serde_roundtrip_preserves_other() {
        let kind = BolusKind::Other("Meal".to_string());
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"Meal\"");
        let parsed: BolusKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn serde_roundtrip_closed_variant() {
        let kind = BolusKind::MealBolus;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"Meal Bolus\"");
        let parsed: BolusKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kind);
    }
}
