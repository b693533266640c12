//! # namedeck-pptx
//!
//! PowerPoint backend for namedeck. A [`PptxDeck`] holds an unpacked `.pptx`
//! package in memory and implements [`namedeck_core::SlideDeck`]: slides can
//! be duplicated, moved and removed, and the text of individual shapes can be
//! searched and replaced. [`DeckWriter`] produces small decks from scratch,
//! including the starter deck written by `namedeck init`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use namedeck_pptx::PptxDeck;
//!
//! let mut deck = PptxDeck::open("deck.pptx")?;
//! let copy = deck.duplicate_slide(1)?;
//! deck.replace_shape_text(copy, 0, "{{NAME}}", "Ada L.")?;
//! deck.save()?;
//! ```

pub mod archive;
pub mod content_types;
pub mod error;
pub mod presentation;
pub mod relationships;
pub mod text;
pub mod writer;

pub use archive::PptxArchive;
pub use content_types::ContentTypes;
pub use error::{PptxError, Result};
pub use presentation::PptxDeck;
pub use relationships::Relationships;
pub use writer::{DeckWriter, TextShape, TextSlide};

/// PPTX constants
pub mod constants {
    /// Default slide width in EMU (16:9, 13.333")
    pub const SLIDE_WIDTH_EMU: i64 = 12_192_000;

    /// Default slide height in EMU (7.5")
    pub const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// Lowest slide id PowerPoint accepts in `p:sldId`
    pub const MIN_SLIDE_ID: u32 = 256;

    /// Highest slide id PowerPoint accepts in `p:sldId`
    pub const MAX_SLIDE_ID: u32 = 2_147_483_647;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Office document relationships namespace (`r:` prefix)
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Package relationships namespace (`.rels` parts)
    pub const NS_PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Content types namespace
    pub const NS_CONTENT_TYPES: &str =
        "http://schemas.openxmlformats.org/package/2006/content-types";

    /// Main document relationship type (root `.rels`)
    pub const REL_TYPE_OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Slide layout relationship type
    pub const REL_TYPE_SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Notes slide relationship type
    pub const REL_TYPE_NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    /// Slide part content type
    pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

    /// Notes slide part content type
    pub const CT_NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";

    /// Default location of the presentation part
    pub const PRESENTATION_PART: &str = "ppt/presentation.xml";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_dimensions() {
        // 7.5" tall, 16:9
        assert_eq!(
            constants::SLIDE_HEIGHT_EMU,
            (7.5 * constants::EMU_PER_INCH as f64) as i64
        );
        let aspect = constants::SLIDE_WIDTH_EMU as f64 / constants::SLIDE_HEIGHT_EMU as f64;
        assert!((aspect - 16.0 / 9.0).abs() < 0.01);
    }

    #[test]
    fn test_slide_id_bounds() {
        assert!(constants::MIN_SLIDE_ID < constants::MAX_SLIDE_ID);
        assert_eq!(constants::MAX_SLIDE_ID, i32::MAX as u32);
    }
}
