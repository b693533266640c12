//! Error types for the namedeck pipeline.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, DeckError>;

/// Boxed error raised by a spreadsheet or presentation backend
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while generating or maintaining a deck
#[derive(Debug, Error)]
pub enum DeckError {
    /// Configuration value is missing or invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configured template slide does not exist
    #[error("Template slide index {index} is out of range (presentation has {count} slides)")]
    TemplateOutOfRange { index: usize, count: usize },

    /// Slide index passed to a presentation operation does not exist
    #[error("Slide index {index} is out of range (presentation has {count} slides)")]
    SlideOutOfRange { index: usize, count: usize },

    /// Sheet tab not present in the spreadsheet
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Failure reported by a spreadsheet or presentation backend
    #[error("{service} error: {source}")]
    Collaborator {
        service: &'static str,
        #[source]
        source: BoxError,
    },
}

impl DeckError {
    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Wrap an error raised by the spreadsheet backend
    pub fn spreadsheet(source: impl Into<BoxError>) -> Self {
        Self::Collaborator {
            service: "Spreadsheet",
            source: source.into(),
        }
    }

    /// Wrap an error raised by the presentation backend
    pub fn presentation(source: impl Into<BoxError>) -> Self {
        Self::Collaborator {
            service: "Presentation",
            source: source.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "DECK001",
            Self::ConfigParse(_) => "DECK002",
            Self::ConfigSerialize(_) => "DECK003",
            Self::Io(_) => "DECK004",
            Self::TemplateOutOfRange { .. } => "DECK005",
            Self::SlideOutOfRange { .. } => "DECK006",
            Self::SheetNotFound(_) => "DECK007",
            Self::Collaborator { .. } => "DECK008",
        }
    }
}
