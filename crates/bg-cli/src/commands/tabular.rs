//! Tabular command producing the wide dose dataset.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::Config;

pub fn run<W: Write>(
    writer: &mut W,
    input: &Path,
    out: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let raws = bg_ingest::read_omnipod_log(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let events = bg_core::classify_all(&raws);
    let records = bg_core::tabularize(&events)?;

    let path = super::resolve_output(out, config, "tabular")?;
    bg_ingest::write_tabular_csv(&path, &records)
        .with_context(|| format!("failed to write {}", path.display()))?;

    writeln!(
        writer,
        "Wrote {} dose records to {}",
        records.len(),
        path.display()
    )?;
    Ok(())
}
