//! Pivots classified dose events into one wide record per timestamp.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::DoseEvent;
use crate::kind::BolusKind;

/// Errors raised while tabularizing dose events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TabularError {
    /// A pivoted timestamp had no matching auxiliary record.
    #[error("no auxiliary record for pivoted timestamp {timestamp}")]
    Consistency { timestamp: NaiveDateTime },
}

/// One wide row of the tabular dataset, keyed by timestamp.
///
/// Dose columns hold 0.0 when no event of that kind occurred at the
/// timestamp; the auxiliary IOB columns stay `None` when the pump never
/// reported them, since 0.0 insulin-on-board is a meaningful measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularDoseRecord {
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub meal_carbs: f64,
    pub meal_bolus: f64,
    pub bolus_insulin: f64,
    pub correction_bolus: f64,
    pub extended_meal_bolus: f64,
    pub reverse_corrected: f64,
    pub basal_insulin: f64,
    pub basal_resumed: f64,
    pub basal_suspended: f64,
    pub temp_basal: f64,
    pub pod_deactivated: f64,
    pub meal_iob: Option<f64>,
    pub correction_iob: Option<f64>,
    pub manual_override: bool,
}

impl TabularDoseRecord {
    fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            date: timestamp.date(),
            time: timestamp.time(),
            meal_carbs: 0.0,
            meal_bolus: 0.0,
            bolus_insulin: 0.0,
            correction_bolus: 0.0,
            extended_meal_bolus: 0.0,
            reverse_corrected: 0.0,
            basal_insulin: 0.0,
            basal_resumed: 0.0,
            basal_suspended: 0.0,
            temp_basal: 0.0,
            pod_deactivated: 0.0,
            meal_iob: None,
            correction_iob: None,
            manual_override: false,
        }
    }

    /// Sum of the three bolus delivery columns.
    #[must_use]
    pub fn total_bolus(&self) -> f64 {
        self.meal_bolus + self.correction_bolus + self.bolus_insulin
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct AuxRecord {
    meal_iob: Option<f64>,
    correction_iob: Option<f64>,
    manual_override: bool,
}

/// Pivots classified events into one record per timestamp, ascending.
///
/// Each event writes its amount into the column for its kind; duplicate
/// `(timestamp, kind)` cells resolve last-write-wins in input order.
/// Unclassified kinds with no column are dropped. IOB and override
/// auxiliaries are re-joined per timestamp: the first reported IOB value
/// wins, and any override at the timestamp marks the whole row.
pub fn tabularize(events: &[DoseEvent]) -> Result<Vec<TabularDoseRecord>, TabularError> {
    let mut pivot: BTreeMap<NaiveDateTime, TabularDoseRecord> = BTreeMap::new();
    let mut aux: HashMap<NaiveDateTime, AuxRecord> = HashMap::new();

    for event in events {
        let entry = aux.entry(event.timestamp).or_default();
        if entry.meal_iob.is_none() {
            entry.meal_iob = event.meal_iob;
        }
        if entry.correction_iob.is_none() {
            entry.correction_iob = event.correction_iob;
        }
        entry.manual_override |= event.manual_override;

        let Some(slot) = column_slot(&event.kind) else {
            tracing::debug!(kind = %event.kind, "dropping event with no tabular column");
            continue;
        };
        let record = pivot
            .entry(event.timestamp)
            .or_insert_with(|| TabularDoseRecord::empty(event.timestamp));
        *slot(record) = event.amount;
    }

    pivot
        .into_values()
        .map(|mut record| {
            let found = aux
                .get(&record.timestamp)
                .ok_or(TabularError::Consistency {
                    timestamp: record.timestamp,
                })?;
            record.meal_iob = found.meal_iob;
            record.correction_iob = found.correction_iob;
            record.manual_override = found.manual_override;
            Ok(record)
        })
        .collect()
}

/// Maps a dose kind to the tabular column it writes, `None` for kinds the
/// dataset has no column for.
fn column_slot(kind: &BolusKind) -> Option<fn(&mut TabularDoseRecord) -> &mut f64> {
    match kind {
        BolusKind::MealBolus => Some(|r| &mut r.meal_bolus),
        BolusKind::CorrectionBolus => Some(|r| &mut r.correction_bolus),
        BolusKind::ExtendedMealBolus => Some(|r| &mut r.extended_meal_bolus),
        BolusKind::ReverseCorrected => Some(|r| &mut r.reverse_corrected),
        BolusKind::BasalSuspended => Some(|r| &mut r.basal_suspended),
        BolusKind::BasalResumed => Some(|r| &mut r.basal_resumed),
        BolusKind::TempBasal => Some(|r| &mut r.temp_basal),
        BolusKind::PodDeactivated => Some(|r| &mut r.pod_deactivated),
        BolusKind::Other(name) => match name.as_str() {
            "Meal" => Some(|r| &mut r.meal_carbs),
            "Bolus Insulin" => Some(|r| &mut r.bolus_insulin),
            "Basal Insulin" => Some(|r| &mut r.basal_insulin),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ts: &str, kind: BolusKind, amount: f64) -> DoseEvent {
        DoseEvent {
            timestamp: ts.parse().unwrap(),
            amount,
            unit: "u".to_string(),
            kind,
            meal_carbs: None,
            meal_iob: None,
            correction_iob: None,
            manual_override: false,
        }
    }

    #[test]
    fn pivots_kinds_into_columns() {
        let events = vec![
            event("2024-03-15T08:00:00", BolusKind::MealBolus, 3.5),
            event(
                "2024-03-15T08:00:00",
                BolusKind::Other("Meal".to_string()),
                45.0,
            ),
            event("2024-03-15T12:30:00", BolusKind::CorrectionBolus, 1.2),
        ];
        let records = tabularize(&events).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert!((first.meal_bolus - 3.5).abs() < f64::EPSILON);
        assert!((first.meal_carbs - 45.0).abs() < f64::EPSILON);
        assert!((first.correction_bolus).abs() < f64::EPSILON);

        let second = &records[1];
        assert!((second.correction_bolus - 1.2).abs() < f64::EPSILON);
        assert!((second.meal_bolus).abs() < f64::EPSILON);
    }

    #[test]
    fn output_is_timestamp_ascending() {
        let events = vec![
            event("2024-03-15T12:30:00", BolusKind::CorrectionBolus, 1.2),
            event("2024-03-15T08:00:00", BolusKind::MealBolus, 3.5),
        ];
        let records = tabularize(&events).unwrap();
        assert!(records[0].timestamp < records[1].timestamp);
    }

    #[test]
    fn duplicate_cell_last_write_wins() {
        let events = vec![
            event("2024-03-15T08:00:00", BolusKind::MealBolus, 3.5),
            event("2024-03-15T08:00:00", BolusKind::MealBolus, 4.0),
        ];
        let records = tabularize(&events).unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].meal_bolus - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_kind_is_dropped() {
        let events = vec![
            event("2024-03-15T08:00:00", BolusKind::MealBolus, 3.5),
            event(
                "2024-03-15T09:00:00",
                BolusKind::Other("Date Changed".to_string()),
                0.0,
            ),
        ];
        let records = tabularize(&events).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].timestamp,
            "2024-03-15T08:00:00".parse().unwrap()
        );
    }

    #[test]
    fn aux_first_iob_wins_and_override_ors() {
        let mut a = event("2024-03-15T08:00:00", BolusKind::MealBolus, 3.5);
        a.meal_iob = Some(1.25);
        let mut b = event("2024-03-15T08:00:00", BolusKind::CorrectionBolus, 1.0);
        b.meal_iob = Some(9.99);
        b.correction_iob = Some(0.5);
        b.manual_override = true;

        let records = tabularize(&[a, b]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].meal_iob, Some(1.25));
        assert_eq!(records[0].correction_iob, Some(0.5));
        assert!(records[0].manual_override);
    }

    #[test]
    fn total_bolus_sums_delivery_columns() {
        let events = vec![
            event("2024-03-15T08:00:00", BolusKind::MealBolus, 3.5),
            event("2024-03-15T08:00:00", BolusKind::CorrectionBolus, 1.0),
            event(
                "2024-03-15T08:00:00",
                BolusKind::Other("Bolus Insulin".to_string()),
                2.0,
            ),
            event(
                "2024-03-15T08:00:00",
                BolusKind::ExtendedMealBolus,
                0.5,
            ),
        ];
        let records = tabularize(&events).unwrap();
        assert!((records[0].total_bolus() - 6.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(tabularize(&[]).unwrap(), Vec::new());
    }
}
