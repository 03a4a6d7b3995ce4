//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// weatherlens - weather CSV analysis and charts
///
/// Loads a daily weather dataset, prints descriptive statistics and
/// renders two PNG chart panels.
///
/// Examples:
///   weatherlens JaipurFinalCleanData.csv
///   weatherlens data.csv --title Delhi --output-dir charts
///   weatherlens data.csv --format json --no-charts
///   weatherlens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Weather CSV file to analyze
    ///
    /// Defaults to JaipurFinalCleanData.csv, or [general].input from the
    /// config file.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Weather CSV file to analyze (alternative to the positional INPUT)
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        env = "WEATHERLENS_INPUT"
    )]
    pub input_flag: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .weatherlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the generated chart files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Dataset name used in banners and chart titles
    #[arg(long, value_name = "NAME")]
    pub title: Option<String>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Number of rows shown from the start of the table
    #[arg(long, value_name = "N")]
    pub head: Option<usize>,

    /// Number of rows shown from the end of the table
    #[arg(long, value_name = "N")]
    pub tail: Option<usize>,

    /// CSV field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .weatherlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text report (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Input path from the positional argument, `--input` or the
    /// environment, in that order.
    pub fn input_path(&self) -> Option<&Path> {
        self.input.as_deref().or(self.input_flag.as_deref())
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.head == Some(0) {
            return Err("--head must be at least 1".to_string());
        }
        if self.tail == Some(0) {
            return Err("--tail must be at least 1".to_string());
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
