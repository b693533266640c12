//! Editing an existing presentation.
//!
//! [`PptxDeck`] keeps the whole package in memory. Slide order lives in the
//! `p:sldIdLst` of the presentation part; each entry points through the
//! presentation's relationships at a slide part. Structural edits update
//! that list, the relationships and `[Content_Types].xml` together, so the
//! package is consistent after every call.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use namedeck_core::{ShapeText, SlideDeck};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};

use crate::archive::PptxArchive;
use crate::constants::{
    CT_SLIDE, MAX_SLIDE_ID, MIN_SLIDE_ID, PRESENTATION_PART, REL_TYPE_NOTES_SLIDE,
    REL_TYPE_OFFICE_DOCUMENT, REL_TYPE_SLIDE,
};
use crate::content_types::{ContentTypes, CONTENT_TYPES_PATH};
use crate::error::{PptxError, Result};
use crate::relationships::{rels_path_for, relative_target, resolve_target, Relationships};
use crate::text;

const ROOT_RELS_PATH: &str = "_rels/.rels";

/// One entry of the slide list
#[derive(Debug, Clone, PartialEq, Eq)]
struct SlideRef {
    /// `id` attribute of `p:sldId`
    id: u32,
    /// Relationship from the presentation part
    rel_id: String,
    /// Archive path of the slide part
    part: String,
}

/// Prefixes used by the existing slide list, reused when it is rewritten
#[derive(Debug, Clone)]
struct ListPrefixes {
    /// Empty when the list is in the default namespace
    element: String,
    relationship: String,
}

impl ListPrefixes {
    fn element(&self, local: &str) -> String {
        if self.element.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.element, local)
        }
    }
}

impl Default for ListPrefixes {
    fn default() -> Self {
        Self {
            element: "p".to_string(),
            relationship: "r".to_string(),
        }
    }
}

/// A presentation opened for editing
#[derive(Debug, Clone)]
pub struct PptxDeck {
    path: Option<PathBuf>,
    archive: PptxArchive,
    content_types: ContentTypes,
    presentation_part: String,
    presentation_rels: Relationships,
    prefixes: ListPrefixes,
    slides: Vec<SlideRef>,
}

impl PptxDeck {
    /// Open a `.pptx` file; [`PptxDeck::save`] writes back to the same path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut deck = Self::from_archive(PptxArchive::open(path)?)?;
        deck.path = Some(path.to_path_buf());
        info!(
            "Opened presentation {} ({} slides)",
            path.display(),
            deck.slides.len()
        );
        Ok(deck)
    }

    /// Load a presentation held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(PptxArchive::from_bytes(bytes)?)
    }

    /// Wrap an unpacked package
    pub fn from_archive(archive: PptxArchive) -> Result<Self> {
        let content_types = ContentTypes::parse(
            archive
                .part(CONTENT_TYPES_PATH)
                .ok_or_else(|| PptxError::missing_part(CONTENT_TYPES_PATH))?,
        )?;

        let presentation_part = match archive.part(ROOT_RELS_PATH) {
            Some(bytes) => Relationships::parse(bytes)?
                .targets_of_type(REL_TYPE_OFFICE_DOCUMENT)
                .next()
                .map(|target| resolve_target("", target)),
            None => None,
        }
        .unwrap_or_else(|| PRESENTATION_PART.to_string());

        let presentation_xml = archive.part_xml(&presentation_part)?;
        let rels_path = rels_path_for(&presentation_part);
        let presentation_rels = Relationships::parse(
            archive
                .part(&rels_path)
                .ok_or_else(|| PptxError::missing_part(&rels_path))?,
        )?;

        let (entries, prefixes) = parse_slide_list(&presentation_xml)?;
        let mut slides = Vec::with_capacity(entries.len());
        for (id, rel_id) in entries {
            let target = presentation_rels.get(&rel_id).ok_or_else(|| {
                PptxError::invalid(format!("slide relationship {} is not declared", rel_id))
            })?;
            let part = resolve_target(&presentation_part, target);
            if !archive.has_part(&part) {
                return Err(PptxError::missing_part(part));
            }
            slides.push(SlideRef { id, rel_id, part });
        }

        debug!(
            "Presentation part {} lists {} slides",
            presentation_part,
            slides.len()
        );

        Ok(Self {
            path: None,
            archive,
            content_types,
            presentation_part,
            presentation_rels,
            prefixes,
            slides,
        })
    }

    /// File the deck was opened from or last saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The underlying package
    pub fn archive(&self) -> &PptxArchive {
        &self.archive
    }

    /// Number of slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Archive paths of the slide parts, in presentation order
    pub fn slide_parts(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.part.as_str()).collect()
    }

    /// Slide ids, in presentation order
    pub fn slide_ids(&self) -> Vec<u32> {
        self.slides.iter().map(|s| s.id).collect()
    }

    /// Raw XML of the slide at `index`
    pub fn slide_xml(&self, index: usize) -> Result<String> {
        let part = &self.slide(index)?.part;
        self.archive.part_xml(part)
    }

    /// Duplicate the slide at `index`, inserting the copy right after it.
    ///
    /// The copy shares the source's layout, media and other relationships.
    /// Speaker notes are not carried over. Returns the index of the copy.
    pub fn duplicate_slide(&mut self, index: usize) -> Result<usize> {
        let source = self.slide(index)?.clone();
        let part = self.next_slide_part(&source.part);

        let xml = self
            .archive
            .part(&source.part)
            .ok_or_else(|| PptxError::missing_part(&source.part))?
            .to_vec();
        self.archive.put(part.clone(), xml);

        let source_rels = self
            .archive
            .part(&rels_path_for(&source.part))
            .map(Relationships::parse)
            .transpose()?;
        if let Some(mut rels) = source_rels {
            rels.retain(|_, rel| rel.rel_type != REL_TYPE_NOTES_SLIDE);
            self.archive.put_xml(rels_path_for(&part), rels.to_xml());
        }

        let content_type = self
            .content_types
            .content_type_of(&source.part)
            .unwrap_or(CT_SLIDE)
            .to_string();
        self.content_types.add_override(&part, content_type);

        let rel_id = self.presentation_rels.add(
            relative_target(&self.presentation_part, &part),
            REL_TYPE_SLIDE,
        );
        let id = self.next_slide_id()?;

        debug!(
            "Duplicated slide {} ({}) as {} with id {}",
            index, source.part, part, id
        );
        self.slides.insert(index + 1, SlideRef { id, rel_id, part });
        self.sync()?;

        Ok(index + 1)
    }

    /// Move the slide at `from` so that it ends up at position `to`
    pub fn move_slide(&mut self, from: usize, to: usize) -> Result<()> {
        self.slide(from)?;
        self.slide(to)?;
        if from == to {
            return Ok(());
        }

        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        debug!("Moved slide {} to {}", from, to);
        self.sync()
    }

    /// Delete the slide at `index` together with its speaker notes
    pub fn remove_slide(&mut self, index: usize) -> Result<()> {
        let slide = self.slide(index)?.clone();
        self.slides.remove(index);
        self.presentation_rels.remove(&slide.rel_id);

        let mut notes: Vec<String> = Vec::new();
        if let Some(bytes) = self.archive.part(&rels_path_for(&slide.part)) {
            let rels = Relationships::parse(bytes)?;
            for target in rels.targets_of_type(REL_TYPE_NOTES_SLIDE) {
                notes.push(resolve_target(&slide.part, target));
            }
        }

        for part in notes.iter().chain(std::iter::once(&slide.part)) {
            self.remove_part(part);
        }

        debug!("Removed slide {} ({})", index, slide.part);
        self.sync()
    }

    /// Shapes with a text body on the slide at `index`
    pub fn shapes(&self, index: usize) -> Result<Vec<ShapeText>> {
        text::list_shapes(&self.slide_xml(index)?)
    }

    /// Replace every occurrence of `find` in one shape's text.
    /// Returns the number of occurrences replaced.
    pub fn replace_shape_text(
        &mut self,
        slide: usize,
        shape: usize,
        find: &str,
        replace: &str,
    ) -> Result<usize> {
        let part = self.slide(slide)?.part.clone();
        let xml = self.archive.part_xml(&part)?;

        match text::replace_in_shape(&xml, shape, find, replace)? {
            Some(replaced) => {
                if replaced.count > 0 {
                    self.archive.put_xml(part, replaced.xml);
                }
                Ok(replaced.count)
            }
            None => Err(PptxError::ShapeOutOfRange {
                slide,
                shape,
                count: text::shape_count(&xml)?,
            }),
        }
    }

    /// Serialize the package
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.archive.to_bytes()
    }

    /// Write back to the file the deck was opened from
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| PptxError::invalid("presentation has no file path; use save_as"))?;
        self.archive.write_to_file(path)?;
        info!("Saved presentation {} ({} slides)", path.display(), self.slides.len());
        Ok(())
    }

    /// Write to `path`; later saves go to the same file
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.path = Some(path.as_ref().to_path_buf());
        PptxDeck::save(self)
    }

    fn slide(&self, index: usize) -> Result<&SlideRef> {
        self.slides.get(index).ok_or(PptxError::SlideOutOfRange {
            index,
            count: self.slides.len(),
        })
    }

    /// Next free `slideN.xml` in the directory of `source`
    fn next_slide_part(&self, source: &str) -> String {
        let dir = source.rsplit_once('/').map_or("", |(dir, _)| dir);
        let prefix = if dir.is_empty() {
            "slide".to_string()
        } else {
            format!("{}/slide", dir)
        };

        let highest = self
            .archive
            .part_names()
            .filter_map(|name| name.strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.strip_suffix(".xml"))
            .filter_map(|number| number.parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        format!("{}{}.xml", prefix, highest + 1)
    }

    fn next_slide_id(&self) -> Result<u32> {
        let highest = self.slides.iter().map(|s| s.id).max();
        let candidate = highest.map_or(MIN_SLIDE_ID, |id| id.saturating_add(1).max(MIN_SLIDE_ID));
        if candidate <= MAX_SLIDE_ID {
            return Ok(candidate);
        }

        let used: HashSet<u32> = self.slides.iter().map(|s| s.id).collect();
        (MIN_SLIDE_ID..=MAX_SLIDE_ID)
            .find(|id| !used.contains(id))
            .ok_or_else(|| PptxError::invalid("no free slide id left"))
    }

    fn remove_part(&mut self, part: &str) {
        self.archive.drop_part(part);
        self.archive.drop_part(&rels_path_for(part));
        self.content_types.remove_override(part);
    }

    /// Write the slide list, relationships and content types back to the package
    fn sync(&mut self) -> Result<()> {
        let xml = self.archive.part_xml(&self.presentation_part)?;
        let updated = write_slide_list(&xml, &self.slides, &self.prefixes)?;

        self.archive.put_xml(self.presentation_part.clone(), updated);
        self.archive.put_xml(
            rels_path_for(&self.presentation_part),
            self.presentation_rels.to_xml(),
        );
        self.archive
            .put_xml(CONTENT_TYPES_PATH, self.content_types.to_xml());
        Ok(())
    }
}

impl SlideDeck for PptxDeck {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn duplicate_slide(&mut self, index: usize) -> namedeck_core::Result<usize> {
        Ok(PptxDeck::duplicate_slide(self, index)?)
    }

    fn move_slide(&mut self, from: usize, to: usize) -> namedeck_core::Result<()> {
        Ok(PptxDeck::move_slide(self, from, to)?)
    }

    fn remove_slide(&mut self, index: usize) -> namedeck_core::Result<()> {
        Ok(PptxDeck::remove_slide(self, index)?)
    }

    fn shapes(&self, index: usize) -> namedeck_core::Result<Vec<ShapeText>> {
        Ok(PptxDeck::shapes(self, index)?)
    }

    fn replace_shape_text(
        &mut self,
        slide: usize,
        shape: usize,
        find: &str,
        replace: &str,
    ) -> namedeck_core::Result<usize> {
        Ok(PptxDeck::replace_shape_text(self, slide, shape, find, replace)?)
    }

    fn save(&mut self) -> namedeck_core::Result<()> {
        Ok(PptxDeck::save(self)?)
    }
}

fn prefix_of(name: &[u8]) -> Option<String> {
    name.iter()
        .position(|&b| b == b':')
        .map(|colon| String::from_utf8_lossy(&name[..colon]).into_owned())
}

/// `(id, relationship id)` pairs of the top-level `sldIdLst`
fn parse_slide_list(xml: &str) -> Result<(Vec<(u32, String)>, ListPrefixes)> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut prefixes = ListPrefixes::default();
    let mut depth = 0usize;
    let mut in_list = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                if depth == 0 {
                    prefixes.element = prefix_of(e.name().as_ref()).unwrap_or_default();
                } else if depth == 1 && e.local_name().as_ref() == b"sldIdLst" {
                    in_list = true;
                    prefixes.element = prefix_of(e.name().as_ref()).unwrap_or_default();
                }
                depth += 1;
            }
            Event::Empty(ref e) if depth == 1 && e.local_name().as_ref() == b"sldIdLst" => {
                prefixes.element = prefix_of(e.name().as_ref()).unwrap_or_default();
            }
            Event::Empty(ref e) if in_list && e.local_name().as_ref() == b"sldId" => {
                let mut id = None;
                let mut rel_id = None;
                for attr in e.attributes().filter_map(|a| a.ok()) {
                    let value = attr.unescape_value().ok().map(|v| v.to_string());
                    if attr.key.local_name().as_ref() != b"id" {
                        continue;
                    }
                    match prefix_of(attr.key.as_ref()) {
                        None => id = value.and_then(|v| v.trim().parse::<u32>().ok()),
                        Some(prefix) => {
                            prefixes.relationship = prefix;
                            rel_id = value;
                        }
                    }
                }

                match (id, rel_id) {
                    (Some(id), Some(rel_id)) => entries.push((id, rel_id)),
                    _ => return Err(PptxError::invalid("sldId without id or r:id")),
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if depth == 1 && e.local_name().as_ref() == b"sldIdLst" {
                    in_list = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((entries, prefixes))
}

/// Replace the top-level `sldIdLst` of a presentation part with `slides`
fn write_slide_list(xml: &str, slides: &[SlideRef], prefixes: &ListPrefixes) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut list_start = None;
    let mut span = None;
    // Where a missing list goes: after the master id lists, else after the root start tag
    let mut insert_at = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => {
                if depth == 0 {
                    insert_at = Some(end);
                } else if depth == 1 && e.local_name().as_ref() == b"sldIdLst" {
                    list_start = Some(start);
                }
                depth += 1;
            }
            Event::Empty(ref e) if depth == 1 => match e.local_name().as_ref() {
                b"sldIdLst" => span = Some(start..end),
                b"sldMasterIdLst" | b"notesMasterIdLst" | b"handoutMasterIdLst" => {
                    insert_at = Some(end)
                }
                _ => {}
            },
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    match e.local_name().as_ref() {
                        b"sldIdLst" => span = list_start.take().map(|s| s..end),
                        b"sldMasterIdLst" | b"notesMasterIdLst" | b"handoutMasterIdLst" => {
                            insert_at = Some(end)
                        }
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }

        if span.is_some() {
            break;
        }
    }

    let list_tag = prefixes.element("sldIdLst");
    let list = if slides.is_empty() {
        format!("<{}/>", list_tag)
    } else {
        let id_tag = prefixes.element("sldId");
        let mut list = format!("<{}>", list_tag);
        for slide in slides {
            list.push_str(&format!(
                r#"<{} id="{}" {}:id="{}"/>"#,
                id_tag,
                slide.id,
                prefixes.relationship,
                text::escape_xml(&slide.rel_id)
            ));
        }
        list.push_str(&format!("</{}>", list_tag));
        list
    };

    let range = match (span, insert_at) {
        (Some(span), _) => span,
        (None, Some(at)) => at..at,
        (None, None) => return Err(PptxError::invalid("presentation part has no root element")),
    };

    let mut out = String::with_capacity(xml.len() + list.len());
    out.push_str(&xml[..range.start]);
    out.push_str(&list);
    out.push_str(&xml[range.end..]);
    Ok(out)
}
