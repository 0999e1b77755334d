//! Align command matching doses against CGM readings.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use bg_core::AnalysisWindow;

use crate::Config;

pub struct AlignArgs<'a> {
    pub input: &'a Path,
    pub glucose: &'a Path,
    pub shift: Option<i64>,
    pub min_date: Option<&'a str>,
    pub max_date: Option<&'a str>,
    pub out: Option<&'a Path>,
}

pub fn run<W: Write>(writer: &mut W, args: &AlignArgs<'_>, config: &Config) -> Result<()> {
    let raws = bg_ingest::read_omnipod_log(args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let events = bg_core::classify_all(&raws);
    let doses = bg_core::tabularize(&events)?;

    let glucose = bg_ingest::read_dexcom_export(args.glucose)
        .with_context(|| format!("failed to read {}", args.glucose.display()))?;

    let window = AnalysisWindow::parse(args.min_date, args.max_date)?;
    let shift = args.shift.unwrap_or(config.shift_minutes);
    let aligned = bg_core::align(&doses, &glucose, shift, &window)?;

    let path = super::resolve_output(args.out, config, "aligned")?;
    bg_ingest::write_aligned_csv(&path, &aligned)
        .with_context(|| format!("failed to write {}", path.display()))?;

    writeln!(
        writer,
        "Aligned {} of {} doses to {}",
        aligned.len(),
        doses.len(),
        path.display()
    )?;
    Ok(())
}
