use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bg_cli::commands::{align, flags, report, tabular};
use bg_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Tabular { input, out }) => {
            let config = load_config(cli.config.as_deref())?;
            tabular::run(&mut stdout, input, out.as_deref(), &config)?;
        }
        Some(Commands::Align {
            input,
            glucose,
            shift,
            min_date,
            max_date,
            out,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            align::run(
                &mut stdout,
                &align::AlignArgs {
                    input,
                    glucose,
                    shift: *shift,
                    min_date: min_date.as_deref(),
                    max_date: max_date.as_deref(),
                    out: out.as_deref(),
                },
                &config,
            )?;
        }
        Some(Commands::Flags {
            input,
            glucose,
            min_date,
            max_date,
            out,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            flags::run(
                &mut stdout,
                &flags::FlagsArgs {
                    input,
                    glucose,
                    min_date: min_date.as_deref(),
                    max_date: max_date.as_deref(),
                    out: out.as_deref(),
                },
                &config,
            )?;
        }
        Some(Commands::Report { input, daily, json }) => {
            report::run(&mut stdout, input, *daily, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    stdout.flush()?;
    Ok(())
}
