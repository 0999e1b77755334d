//! Report command summarizing bolus delivery.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use bg_core::{ColumnAverage, DailyBolus};

#[derive(Serialize)]
struct Report {
    records: usize,
    averages: Vec<ColumnAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    daily: Option<Vec<DailyBolus>>,
}

pub fn run<W: Write>(writer: &mut W, input: &Path, daily: bool, json: bool) -> Result<()> {
    let raws = bg_ingest::read_omnipod_log(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let events = bg_core::classify_all(&raws);
    let records = bg_core::tabularize(&events)?;

    let report = Report {
        records: records.len(),
        averages: bg_core::average_bolus(&records),
        daily: daily.then(|| bg_core::daily_bolus(&records)),
    };

    if json {
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Bolus summary ({} dose records)", report.records)?;
    writeln!(writer, "Averages over nonzero doses:")?;
    for average in &report.averages {
        match average.mean {
            Some(mean) => writeln!(
                writer,
                "- {}: {mean:.2} u over {} doses",
                average.column, average.count
            )?,
            None => writeln!(writer, "- {}: no doses", average.column)?,
        }
    }

    if let Some(daily) = &report.daily {
        writeln!(writer, "Daily totals:")?;
        for day in daily {
            writeln!(writer, "- {}: {:.2} u", day.date, day.total_bolus)?;
        }
    }

    Ok(())
}
