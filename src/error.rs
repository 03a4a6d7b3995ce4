//! Error taxonomy.
//!
//! The pipeline distinguishes exactly two user-facing failure kinds: the
//! input file is missing, or its contents do not match the expected schema.
//! Everything else falls through to [`WeatherError::Other`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the user by the report pipeline.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The input path does not resolve to a readable file.
    #[error("{} file not found", path.display())]
    InputNotFound { path: PathBuf },

    /// The file was read but its structure or contents are not a weather table.
    #[error("{message}")]
    DataFormat { message: String },

    /// Any other failure (config, chart drawing, PNG encoding, file writes).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeatherError {
    /// Build a [`WeatherError::DataFormat`] from anything printable.
    pub fn data_format(message: impl Into<String>) -> Self {
        WeatherError::DataFormat {
            message: message.into(),
        }
    }

    /// Short label naming the error kind, used in the diagnostic line.
    pub fn kind(&self) -> &'static str {
        match self {
            WeatherError::InputNotFound { .. } => "InputNotFound",
            WeatherError::DataFormat { .. } => "DataFormatError",
            WeatherError::Other(_) => "Error",
        }
    }

    /// The single diagnostic line printed when the run fails.
    pub fn diagnostic(&self) -> String {
        match self {
            WeatherError::InputNotFound { path } => format!(
                "Error: {} file not found! Please check the input path.",
                path.display()
            ),
            WeatherError::DataFormat { message } => {
                format!("Data format error: {}", message)
            }
            WeatherError::Other(e) => format!("An error occurred: {:#}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
