//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Dose/glucose correlation pipeline.
///
/// Ingests Omnipod pump logs and Dexcom CGM exports and produces tabular,
/// aligned, and charting datasets.
#[derive(Debug, Parser)]
#[command(name = "bg", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Pivot a pump log into the tabular dose dataset.
    Tabular {
        /// Path to the Omnipod pump log CSV.
        input: PathBuf,

        /// Output CSV path. Defaults to a timestamped file in the
        /// configured output directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Match doses against CGM readings at dose time and after a shift.
    Align {
        /// Path to the Omnipod pump log CSV.
        input: PathBuf,

        /// Path to the Dexcom CGM export CSV.
        glucose: PathBuf,

        /// Minutes between a dose and its follow-up reading.
        #[arg(long)]
        shift: Option<i64>,

        /// Earliest timestamp to include (e.g. 2024-03-15).
        #[arg(long)]
        min_date: Option<String>,

        /// Latest timestamp to include.
        #[arg(long)]
        max_date: Option<String>,

        /// Output CSV path. Defaults to a timestamped file in the
        /// configured output directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Build the glucose series with bolus markers for charting.
    Flags {
        /// Path to the Omnipod pump log CSV.
        input: PathBuf,

        /// Path to the Dexcom CGM export CSV.
        glucose: PathBuf,

        /// Earliest timestamp to include.
        #[arg(long)]
        min_date: Option<String>,

        /// Latest timestamp to include.
        #[arg(long)]
        max_date: Option<String>,

        /// Output CSV path. Defaults to a timestamped file in the
        /// configured output directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Summarize bolus delivery from a pump log.
    Report {
        /// Path to the Omnipod pump log CSV.
        input: PathBuf,

        /// Include per-day bolus totals.
        #[arg(long)]
        daily: bool,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}
