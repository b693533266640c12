//! Error types for spreadsheet sources.

use namedeck_core::DeckError;
use thiserror::Error;

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading a spreadsheet
#[derive(Debug, Error)]
pub enum DataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to open workbook
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    /// Sheet not found in workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid column designator
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// File extension not recognised as a spreadsheet
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),

    /// CSV parse error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Calamine error
    #[error("Excel error: {0}")]
    Calamine(String),
}

impl DataError {
    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "DATA001",
            Self::WorkbookOpen(_) => "DATA002",
            Self::SheetNotFound(_) => "DATA003",
            Self::InvalidRange(_) => "DATA004",
            Self::UnsupportedFormat(_) => "DATA005",
            Self::Csv(_) => "DATA006",
            Self::Io(_) => "DATA007",
            Self::Calamine(_) => "DATA008",
        }
    }
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Calamine(err.to_string())
    }
}

impl From<DataError> for DeckError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::SheetNotFound(sheet) => DeckError::SheetNotFound(sheet),
            other => DeckError::spreadsheet(other),
        }
    }
}
