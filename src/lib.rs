//! Exploratory analysis for tabular data.
//!
//! The analysis modules ([`schema`], [`derive`], [`impute`], [`filter`],
//! [`outliers`], [`correlation`], [`trend`], [`chart`], [`stats`]) are pure
//! functions over immutable [`data::Dataset`] snapshots. [`io_utils`] and the
//! [`commands`] layer connect them to CSV files and the command line.

pub mod chart;
pub mod cli;
pub mod commands;
pub mod correlation;
pub mod data;
pub mod derive;
pub mod error;
pub mod filter;
pub mod impute;
pub mod insights;
pub mod io_utils;
pub mod outliers;
pub mod schema;
pub mod stats;
pub mod table;
pub mod trend;
pub mod view;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_explorer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::View(args) => commands::view::execute(&args),
        Commands::Stats(args) => commands::report::stats(&args),
        Commands::Outliers(args) => commands::report::outliers(&args),
        Commands::Correlate(args) => commands::report::correlate(&args),
        Commands::Trend(args) => commands::report::trend(&args),
        Commands::Chart(args) => commands::chart::execute(&args),
        Commands::Derive(args) => commands::transform::derive(&args),
        Commands::Impute(args) => commands::transform::impute(&args),
    }
}
