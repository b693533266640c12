//! Error types for PPTX editing.

use namedeck_core::DeckError;
use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while reading, editing or writing a presentation
#[derive(Error, Debug)]
pub enum PptxError {
    /// ZIP archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A part the package must contain is missing
    #[error("Missing part: {path}")]
    MissingPart { path: String },

    /// Package structure is inconsistent
    #[error("Invalid presentation: {reason}")]
    InvalidPresentation { reason: String },

    /// Slide index out of range
    #[error("Slide index {index} is out of range (presentation has {count} slides)")]
    SlideOutOfRange { index: usize, count: usize },

    /// Shape index out of range on a slide
    #[error("Shape index {shape} is out of range on slide {slide} ({count} shapes)")]
    ShapeOutOfRange {
        slide: usize,
        shape: usize,
        count: usize,
    },
}

impl PptxError {
    /// Create a missing part error
    pub fn missing_part(path: impl Into<String>) -> Self {
        Self::MissingPart { path: path.into() }
    }

    /// Create an invalid presentation error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidPresentation {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::Archive(_) => "PPTX001",
            Self::Io(_) => "PPTX002",
            Self::Xml(_) => "PPTX003",
            Self::MissingPart { .. } => "PPTX004",
            Self::InvalidPresentation { .. } => "PPTX005",
            Self::SlideOutOfRange { .. } => "PPTX006",
            Self::ShapeOutOfRange { .. } => "PPTX007",
        }
    }
}

impl From<PptxError> for DeckError {
    fn from(err: PptxError) -> Self {
        match err {
            PptxError::SlideOutOfRange { index, count } => DeckError::SlideOutOfRange { index, count },
            other => DeckError::presentation(other),
        }
    }
}
