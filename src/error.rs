use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing data file: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Schema error in {origin}: {message}")]
    Schema { origin: String, message: String },

    #[error("Render validation error: {0}")]
    RenderValidation(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Missing required data: {0}")]
    MissingData(String),
}

impl ProcessingError {
    pub fn schema(origin: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessingError::Schema {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Map an open failure to `MissingFile` when the file does not exist
    pub fn from_open(err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ProcessingError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            ProcessingError::Io(err)
        }
    }

    pub fn is_missing_file(&self) -> bool {
        matches!(self, ProcessingError::MissingFile { .. })
    }
}
