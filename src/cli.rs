//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "attack-report-compiler", version, about)]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "report-config.json")]
    pub config: PathBuf,

    /// Override the configured input directory.
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Override the configured output directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Device x month attack-count workbook and chart page for the six
    /// months before the configured reference month.
    Counts,
    /// Activation report for the configured target month: filtered log
    /// copy plus Detail/Summary workbook.
    Activations,
}
