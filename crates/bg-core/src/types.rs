//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid day period value.
    #[error("invalid day period: {value}")]
    InvalidDayPeriod { value: String },
}

/// Time-of-day bucket assigned to each aligned dose record.
///
/// Buckets are defined by the hour boundaries 8, 12, and 16: hours before 8
/// are [`Morning`](Self::Morning), 8 through 11 are
/// [`Afternoon`](Self::Afternoon), 12 through 15 are
/// [`Evening`](Self::Evening), and 16 onward is
/// [`PostEvening`](Self::PostEvening). The labels follow the household
/// schedule the boundaries were tuned for, not clock convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    PostEvening,
}

impl DayPeriod {
    /// Buckets an hour of day (0-23) into its period.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        if hour < 8 {
            Self::Morning
        } else if hour < 12 {
            Self::Afternoon
        } else if hour < 16 {
            Self::Evening
        } else {
            Self::PostEvening
        }
    }

    /// String representation for serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::PostEvening => "post_evening",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DayPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            "post_evening" => Ok(Self::PostEvening),
            _ => Err(ValidationError::InvalidDayPeriod {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hour_boundaries() {
        assert_eq!(DayPeriod::from_hour(0), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(7), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(8), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(11), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(12), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(15), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(16), DayPeriod::PostEvening);
        assert_eq!(DayPeriod::from_hour(23), DayPeriod::PostEvening);
    }

    #[test]
    fn periods_order_chronologically() {
        assert!(DayPeriod::Morning < DayPeriod::Afternoon);
        assert!(DayPeriod::Afternoon < DayPeriod::Evening);
        assert!(DayPeriod::Evening < DayPeriod::PostEvening);
    }

    #[test]
    fn from_str_roundtrip() {
        for period in [
            DayPeriod::Morning,
            DayPeriod::Afternoon,
            DayPeriod::Evening,
            DayPeriod::PostEvening,
        ] {
            let parsed: DayPeriod = period.as_str().parse().expect("should parse");
            assert_eq!(parsed, period);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        let result: Result<DayPeriod, _> = "midnight".parse();
        assert_eq!(
            result,
            Err(ValidationError::InvalidDayPeriod {
                value: "midnight".to_string()
            })
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&DayPeriod::PostEvening).unwrap();
        assert_eq!(json, "\"post_evening\"");
        let parsed: DayPeriod = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, DayPeriod::PostEvening);
    }
}
