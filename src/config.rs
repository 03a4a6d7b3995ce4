//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.weatherlens.toml` files.

use crate::render::ChartStyle;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".weatherlens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Console report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartsConfig,

    /// CSV loader settings.
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Input CSV file.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Dataset title used in banners and the main figure.
    #[serde(default = "default_title")]
    pub title: String,

    /// Directory the chart files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            title: default_title(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("JaipurFinalCleanData.csv")
}

fn default_title() -> String {
    "Jaipur".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Console report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows shown from the start of the table.
    #[serde(default = "default_head_rows")]
    pub head_rows: usize,

    /// Rows shown from the end of the table.
    #[serde(default = "default_tail_rows")]
    pub tail_rows: usize,

    /// Width at which wide tables wrap.
    #[serde(default = "default_display_width")]
    pub display_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            head_rows: default_head_rows(),
            tail_rows: default_tail_rows(),
            display_width: default_display_width(),
        }
    }
}

fn default_head_rows() -> usize {
    10
}

fn default_tail_rows() -> usize {
    5
}

fn default_display_width() -> usize {
    120
}

/// Chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Render charts at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File name of the main figure.
    #[serde(default = "default_main_file")]
    pub main_file: String,

    /// File name of the additional figure.
    #[serde(default = "default_additional_file")]
    pub additional_file: String,

    /// Sizes, fonts and colours.
    #[serde(default)]
    pub style: ChartStyle,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            main_file: default_main_file(),
            additional_file: default_additional_file(),
            style: ChartStyle::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_main_file() -> String {
    "weather_analysis_main.png".to_string()
}

fn default_additional_file() -> String {
    "weather_additional_analysis.png".to_string()
}

/// CSV loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Field delimiter, a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl LoaderConfig {
    /// The delimiter as a byte; only meaningful after [`Config::validate`].
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.bytes().next().unwrap_or(b',')
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(input) = args.input_path() {
            self.general.input = input.to_path_buf();
        }
        if let Some(ref title) = args.title {
            self.general.title = title.clone();
        }
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.clone();
        }

        if let Some(head) = args.head {
            self.report.head_rows = head;
        }
        if let Some(tail) = args.tail {
            self.report.tail_rows = tail;
        }

        if let Some(delimiter) = args.delimiter {
            self.loader.delimiter = delimiter.to_string();
        }

        // Flags always override
        if args.no_charts {
            self.charts.enabled = false;
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let delimiter = &self.loader.delimiter;
        if delimiter.chars().count() != 1 || !delimiter.is_ascii() {
            bail!(
                "Delimiter must be a single ASCII character, got {:?}",
                delimiter
            );
        }
        if self.report.head_rows == 0 || self.report.tail_rows == 0 {
            bail!("head_rows and tail_rows must be at least 1");
        }
        if self.report.display_width == 0 {
            bail!("display_width must be at least 1");
        }
        if self.charts.main_file == self.charts.additional_file {
            bail!("Chart file names must differ");
        }
        self.charts
            .style
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid [charts.style] settings")?;
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
