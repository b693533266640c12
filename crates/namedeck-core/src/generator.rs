//! Cloning the template slide once per name.

use tracing::{debug, info};

use crate::error::Result;

/// Text content of one shape on a slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeText {
    /// Position of the shape among the slide's shapes (document order)
    pub index: usize,
    /// Shape name as shown in the selection pane
    pub name: String,
    /// Plain text, paragraphs joined with `\n`
    pub text: String,
}

/// Presentation backend operated on by the generator and maintenance procedures.
///
/// Slide indices are 0-based positions in presentation order.
pub trait SlideDeck {
    /// Number of slides in the presentation
    fn slide_count(&self) -> usize;

    /// Duplicate the slide at `index`; the copy is inserted right after it.
    /// Returns the index of the copy.
    fn duplicate_slide(&mut self, index: usize) -> Result<usize>;

    /// Move the slide at `from` so that it ends up at position `to`
    fn move_slide(&mut self, from: usize, to: usize) -> Result<()>;

    /// Delete the slide at `index`
    fn remove_slide(&mut self, index: usize) -> Result<()>;

    /// Shapes carrying a text body on the slide at `index`
    fn shapes(&self, index: usize) -> Result<Vec<ShapeText>>;

    /// Replace every literal occurrence of `find` in one shape's text.
    /// Returns the number of occurrences replaced.
    fn replace_shape_text(
        &mut self,
        slide: usize,
        shape: usize,
        find: &str,
        replace: &str,
    ) -> Result<usize>;

    /// Persist the presentation
    fn save(&mut self) -> Result<()>;
}

/// Append a copy of the template slide showing `display_name`.
///
/// The template is duplicated, the copy moved to the end of the deck, and
/// every placeholder token found in any of its shapes replaced with the
/// name. Returns the index of the new slide.
pub fn generate_slide<D: SlideDeck + ?Sized>(
    deck: &mut D,
    template_index: usize,
    display_name: &str,
    position: usize,
    placeholders: &[String],
) -> Result<usize> {
    let copy = deck.duplicate_slide(template_index)?;
    let last = deck.slide_count().saturating_sub(1);
    if copy != last {
        deck.move_slide(copy, last)?;
    }

    let mut replaced = 0;
    for shape in deck.shapes(last)? {
        if shape.text.is_empty() {
            continue;
        }
        for token in placeholders {
            if !shape.text.contains(token.as_str()) {
                continue;
            }
            let count = deck.replace_shape_text(last, shape.index, token, display_name)?;
            debug!(
                "Replaced {} x '{}' in shape '{}' on slide {}",
                count, token, shape.name, last
            );
            replaced += count;
        }
    }

    if replaced == 0 {
        debug!("Slide {} has no placeholder tokens", last);
    }

    info!("Created slide {} for {}", position, display_name);
    Ok(last)
}
