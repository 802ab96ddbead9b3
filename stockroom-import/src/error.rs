//! Error types for stockroom-import
//!
//! Every variant here is a setup failure that stops the job. Per-row
//! database errors are counted in the report instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

pub type Result<T> = std::result::Result<T, ImportError>;
