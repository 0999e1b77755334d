//! Summary statistics over the tabular dose dataset.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::tabular::TabularDoseRecord;

/// Bolus columns the aggregators report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BolusColumn {
    MealBolus,
    CorrectionBolus,
    BolusInsulin,
    ExtendedMealBolus,
    ReverseCorrected,
    TotalBolus,
}

impl BolusColumn {
    /// Every reported column, in report order.
    pub const ALL: [Self; 6] = [
        Self::MealBolus,
        Self::CorrectionBolus,
        Self::BolusInsulin,
        Self::ExtendedMealBolus,
        Self::ReverseCorrected,
        Self::TotalBolus,
    ];

    /// Column label used in reports and serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MealBolus => "Meal Bolus",
            Self::CorrectionBolus => "Correction Bolus",
            Self::BolusInsulin => "Bolus Insulin",
            Self::ExtendedMealBolus => "Extended Meal Bolus",
            Self::ReverseCorrected => "Reverse Corrected",
            Self::TotalBolus => "Total Bolus",
        }
    }

    /// Reads this column's value out of a record.
    #[must_use]
    pub fn value(&self, record: &TabularDoseRecord) -> f64 {
        match self {
            Self::MealBolus => record.meal_bolus,
            Self::CorrectionBolus => record.correction_bolus,
            Self::BolusInsulin => record.bolus_insulin,
            Self::ExtendedMealBolus => record.extended_meal_bolus,
            Self::ReverseCorrected => record.reverse_corrected,
            Self::TotalBolus => record.total_bolus(),
        }
    }
}

impl Serialize for BolusColumn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for BolusColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mean of one bolus column over the records where it was nonzero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAverage {
    pub column: BolusColumn,
    /// Mean over nonzero values, `None` when the column never fired.
    pub mean: Option<f64>,
    /// Number of nonzero values contributing to the mean.
    pub count: usize,
}

/// Per-column means over nonzero values only.
///
/// A zero cell means "no dose of this kind at this timestamp", not a
/// measured zero dose, so including zeros would drag every mean toward
/// the pivot's fill value.
#[must_use]
pub fn average_bolus(records: &[TabularDoseRecord]) -> Vec<ColumnAverage> {
    BolusColumn::ALL
        .iter()
        .map(|column| {
            #[expect(clippy::float_cmp, reason = "0.0 is the exact pivot fill value")]
            let values: Vec<f64> = records
                .iter()
                .map(|record| column.value(record))
                .filter(|value| *value != 0.0)
                .collect();
            let count = values.len();
            #[expect(clippy::cast_precision_loss, reason = "counts stay far below 2^52")]
            let mean = if count == 0 {
                None
            } else {
                Some(values.iter().sum::<f64>() / count as f64)
            };
            ColumnAverage {
                column: *column,
                mean,
                count,
            }
        })
        .collect()
}

/// Total bolus delivered on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBolus {
    pub date: NaiveDate,
    pub total_bolus: f64,
}

/// Sums total bolus per calendar date, ascending by date.
#[must_use]
pub fn daily_bolus(records: &[TabularDoseRecord]) -> Vec<DailyBolus> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.date).or_insert(0.0) += record.total_bolus();
    }
    totals
        .into_iter()
        .map(|(date, total_bolus)| DailyBolus { date, total_bolus })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(ts: &str, meal: f64, correction: f64, insulin: f64) -> TabularDoseRecord {
        let timestamp: NaiveDateTime = ts.parse().unwrap();
        TabularDoseRecord {
            timestamp,
            date: timestamp.date(),
            time: timestamp.time(),
            meal_carbs: 0.0,
            meal_bolus: meal,
            bolus_insulin: insulin,
            correction_bolus: correction,
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

    fn column_average(averages: &[ColumnAverage], column: BolusColumn) -> &ColumnAverage {
        averages
            .iter()
            .find(|a| a.column == column)
            .expect("all columns reported")
    }

    #[test]
    fn averages_exclude_zero_cells() {
        let records = vec![
            record("2024-03-15T08:00:00", 3.0, 0.0, 0.0),
            record("2024-03-15T12:00:00", 5.0, 1.0, 0.0),
            record("2024-03-16T08:00:00", 0.0, 0.0, 0.0),
        ];
        let averages = average_bolus(&records);

        let meal = column_average(&averages, BolusColumn::MealBolus);
        assert_eq!(meal.count, 2);
        assert!((meal.mean.unwrap() - 4.0).abs() < f64::EPSILON);

        let correction = column_average(&averages, BolusColumn::CorrectionBolus);
        assert_eq!(correction.count, 1);
        assert!((correction.mean.unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn column_with_no_nonzero_values_has_no_mean() {
        let records = vec![record("2024-03-15T08:00:00", 3.0, 0.0, 0.0)];
        let averages = average_bolus(&records);
        let extended = column_average(&averages, BolusColumn::ExtendedMealBolus);
        assert_eq!(extended.mean, None);
        assert_eq!(extended.count, 0);
    }

    #[test]
    fn total_bolus_average_uses_row_sums() {
        let records = vec![
            record("2024-03-15T08:00:00", 3.0, 1.0, 0.0),
            record("2024-03-15T12:00:00", 0.0, 0.0, 0.0),
        ];
        let averages = average_bolus(&records);
        let total = column_average(&averages, BolusColumn::TotalBolus);
        assert_eq!(total.count, 1);
        assert!((total.mean.unwrap() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn daily_totals_group_by_date_ascending() {
        let records = vec![
            record("2024-03-16T08:00:00", 2.0, 0.0, 0.0),
            record("2024-03-15T08:00:00", 3.0, 1.0, 0.0),
            record("2024-03-15T18:00:00", 0.0, 0.5, 1.5),
        ];
        let daily = daily_bolus(&records);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!((daily[0].total_bolus - 6.0).abs() < f64::EPSILON);
        assert_eq!(daily[1].date, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert!((daily[1].total_bolus - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_records_produce_empty_daily_and_all_none_averages() {
        assert!(daily_bolus(&[]).is_empty());
        let averages = average_bolus(&[]);
        assert_eq!(averages.len(), BolusColumn::ALL.len());
        assert!(averages.iter().all(|a| a.mean.is_none() && a.count == 0));
    }
}
