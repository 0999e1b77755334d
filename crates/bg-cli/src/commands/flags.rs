//! Flags command producing the charting series.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use bg_core::AnalysisWindow;

use crate::Config;

pub struct FlagsArgs<'a> {
    pub input: &'a Path,
    pub glucose: &'a Path,
    pub min_date: Option<&'a str>,
    pub max_date: Option<&'a str>,
    pub out: Option<&'a Path>,
}

pub fn run<W: Write>(writer: &mut W, args: &FlagsArgs<'_>, config: &Config) -> Result<()> {
    let raws = bg_ingest::read_omnipod_log(args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let events = bg_core::classify_all(&raws);
    let doses = bg_core::tabularize(&events)?;

    let glucose = bg_ingest::read_dexcom_export(args.glucose)
        .with_context(|| format!("failed to read {}", args.glucose.display()))?;

    let window = AnalysisWindow::parse(args.min_date, args.max_date)?;
    let series = bg_core::build_flag_series(&doses, &glucose, &window);

    let path = super::resolve_output(args.out, config, "glucose_flags")?;
    bg_ingest::write_flags_csv(&path, &series)
        .with_context(|| format!("failed to write {}", path.display()))?;

    #[expect(clippy::float_cmp, reason = "0.0 is the exact no-match flag value")]
    let flagged = series
        .iter()
        .filter(|record| record.bolus_flag != 0.0)
        .count();
    writeln!(
        writer,
        "Wrote {} readings ({flagged} flagged) to {}",
        series.len(),
        path.display()
    )?;
    Ok(())
}
