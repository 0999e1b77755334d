//! Dose/glucose pipeline CLI library.
//!
//! This crate provides the CLI interface for the dose/glucose pipeline.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
