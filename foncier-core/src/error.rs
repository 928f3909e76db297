//! Error handling for the foncier core pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for core pipeline operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Caller-supplied configuration is wrong (bad grouping field, bad join
    /// setup). Fatal: the pipeline aborts instead of degrading.
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Input/Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rendering error: {message}")]
    Render { message: String },
}

impl CoreError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn parse<S: Into<String>>(file: S, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

/// Result type for core pipeline operations
pub type CoreResult<T> = Result<T, CoreError>;
