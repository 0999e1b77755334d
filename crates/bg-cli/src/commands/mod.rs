//! CLI subcommand implementations.

pub mod align;
pub mod flags;
pub mod report;
pub mod tabular;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::Config;

/// Resolves where a generated dataset should land and ensures the
/// directory exists.
fn resolve_output(
    out: Option<&Path>,
    config: &Config,
    prefix: &str,
) -> Result<PathBuf> {
    let path = out.map_or_else(
        || config.output_dir.join(bg_ingest::generated_file_name(prefix)),
        Path::to_path_buf,
    );
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(path)
}
