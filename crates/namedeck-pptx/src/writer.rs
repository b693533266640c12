//! PPTX generation from plain text slides.
//!
//! [`DeckWriter`] builds a complete package with one master, one blank
//! layout and text-box shapes. It backs `namedeck init` and the test
//! fixtures; decks with real designs come from PowerPoint.

use std::path::Path;

use crate::archive::PptxArchive;
use crate::constants::*;
use crate::content_types::{ContentTypes, CONTENT_TYPES_PATH};
use crate::error::Result;
use crate::relationships::Relationships;
use crate::text::escape_xml;

const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_NOTES_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE_PROPS: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

const REL_TYPE_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
const REL_TYPE_NOTES_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";
const REL_TYPE_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_TYPE_APP_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A text box: paragraphs of runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextShape {
    /// Shape name (`p:cNvPr/@name`)
    pub name: String,
    /// Paragraphs, each a list of run texts
    pub paragraphs: Vec<Vec<String>>,
}

impl TextShape {
    /// Create an empty text box
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paragraphs: Vec::new(),
        }
    }

    /// Add a paragraph made of a single run
    pub fn with_paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(vec![text.into()]);
        self
    }

    /// Add a paragraph split into several runs
    pub fn with_runs<I, S>(mut self, runs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paragraphs
            .push(runs.into_iter().map(Into::into).collect());
        self
    }
}

/// A slide of text boxes with optional speaker notes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSlide {
    pub shapes: Vec<TextShape>,
    pub notes: Option<String>,
}

impl TextSlide {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape
    pub fn with_shape(mut self, shape: TextShape) -> Self {
        self.shapes.push(shape);
        self
    }

    /// Add a single-paragraph text box
    pub fn with_text(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_shape(TextShape::new(name).with_paragraph(text))
    }

    /// Attach speaker notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// PPTX document writer
#[derive(Debug, Clone, Default)]
pub struct DeckWriter {
    slides: Vec<TextSlide>,
    title: Option<String>,
}

impl DeckWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The deck written by `namedeck init`: a title slide followed by the
    /// template slide carrying the `{{NAME}}` token
    pub fn starter() -> Self {
        Self::new()
            .with_title("Names")
            .with_slide(
                TextSlide::new()
                    .with_text("Title", "Names")
                    .with_text("Subtitle", "One slide per name"),
            )
            .with_slide(TextSlide::new().with_text("Name", "{{NAME}}"))
    }

    /// Set the presentation title (document properties)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a slide
    pub fn with_slide(mut self, slide: TextSlide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Append a slide
    pub fn add_slide(&mut self, slide: TextSlide) {
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[TextSlide] {
        &self.slides
    }

    /// Generate the PPTX as bytes
    pub fn generate(&self) -> Result<Vec<u8>> {
        self.build().to_bytes()
    }

    /// Generate the PPTX into a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.build().write_to_file(path)
    }

    /// Assemble the package
    pub fn build(&self) -> PptxArchive {
        let mut archive = PptxArchive::default();
        let mut types = ContentTypes::default();
        types.add_default("rels", CT_RELATIONSHIPS);
        types.add_default("xml", "application/xml");

        let has_notes = self.slides.iter().any(|s| s.notes.is_some());

        // Package level
        let mut root_rels = Relationships::new();
        root_rels.add(PRESENTATION_PART, REL_TYPE_OFFICE_DOCUMENT);
        root_rels.add("docProps/core.xml", REL_TYPE_CORE_PROPS);
        root_rels.add("docProps/app.xml", REL_TYPE_APP_PROPS);
        archive.put_xml("_rels/.rels", root_rels.to_xml());

        archive.put_xml("docProps/core.xml", self.core_xml());
        types.add_override("docProps/core.xml", CT_CORE_PROPS);
        archive.put_xml("docProps/app.xml", self.app_xml());
        types.add_override("docProps/app.xml", CT_APP_PROPS);

        // Presentation relationships: master, properties, theme, notes master, slides
        let mut pres_rels = Relationships::new();
        let master_rel = pres_rels.add("slideMasters/slideMaster1.xml", REL_TYPE_SLIDE_MASTER);
        pres_rels.add("presProps.xml", REL_TYPE_PRES_PROPS);
        pres_rels.add("theme/theme1.xml", REL_TYPE_THEME);
        let notes_master_rel =
            has_notes.then(|| pres_rels.add("notesMasters/notesMaster1.xml", REL_TYPE_NOTES_MASTER));
        let slide_rels: Vec<String> = (1..=self.slides.len())
            .map(|n| pres_rels.add(format!("slides/slide{}.xml", n), REL_TYPE_SLIDE))
            .collect();

        archive.put_xml(
            PRESENTATION_PART,
            presentation_xml(&master_rel, notes_master_rel.as_deref(), &slide_rels),
        );
        types.add_override(PRESENTATION_PART, CT_PRESENTATION);
        archive.put_xml("ppt/_rels/presentation.xml.rels", pres_rels.to_xml());

        archive.put_xml("ppt/presProps.xml", pres_props_xml());
        types.add_override("ppt/presProps.xml", CT_PRES_PROPS);

        archive.put_xml("ppt/theme/theme1.xml", theme_xml("namedeck"));
        types.add_override("ppt/theme/theme1.xml", CT_THEME);

        // Master and its single layout
        let mut master_rels = Relationships::new();
        let layout_rel = master_rels.add("../slideLayouts/slideLayout1.xml", REL_TYPE_SLIDE_LAYOUT);
        master_rels.add("../theme/theme1.xml", REL_TYPE_THEME);
        archive.put_xml("ppt/slideMasters/slideMaster1.xml", slide_master_xml(&layout_rel));
        archive.put_xml(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            master_rels.to_xml(),
        );
        types.add_override("ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER);

        let mut layout_rels = Relationships::new();
        layout_rels.add("../slideMasters/slideMaster1.xml", REL_TYPE_SLIDE_MASTER);
        archive.put_xml("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml());
        archive.put_xml(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            layout_rels.to_xml(),
        );
        types.add_override("ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT);

        if has_notes {
            let mut rels = Relationships::new();
            rels.add("../theme/theme2.xml", REL_TYPE_THEME);
            archive.put_xml("ppt/notesMasters/notesMaster1.xml", notes_master_xml());
            archive.put_xml(
                "ppt/notesMasters/_rels/notesMaster1.xml.rels",
                rels.to_xml(),
            );
            types.add_override("ppt/notesMasters/notesMaster1.xml", CT_NOTES_MASTER);

            archive.put_xml("ppt/theme/theme2.xml", theme_xml("namedeck notes"));
            types.add_override("ppt/theme/theme2.xml", CT_THEME);
        }

        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            let part = format!("ppt/slides/slide{}.xml", n);

            let mut rels = Relationships::new();
            rels.add("../slideLayouts/slideLayout1.xml", REL_TYPE_SLIDE_LAYOUT);

            if let Some(notes) = &slide.notes {
                let notes_part = format!("ppt/notesSlides/notesSlide{}.xml", n);
                rels.add(format!("../notesSlides/notesSlide{}.xml", n), REL_TYPE_NOTES_SLIDE);

                let mut notes_rels = Relationships::new();
                notes_rels.add("../notesMasters/notesMaster1.xml", REL_TYPE_NOTES_MASTER);
                notes_rels.add(format!("../slides/slide{}.xml", n), REL_TYPE_SLIDE);

                archive.put_xml(notes_part.clone(), notes_slide_xml(notes));
                archive.put_xml(
                    format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", n),
                    notes_rels.to_xml(),
                );
                types.add_override(&notes_part, CT_NOTES_SLIDE);
            }

            archive.put_xml(part.clone(), slide_xml(slide));
            archive.put_xml(
                format!("ppt/slides/_rels/slide{}.xml.rels", n),
                rels.to_xml(),
            );
            types.add_override(&part, CT_SLIDE);
        }

        archive.put_xml(CONTENT_TYPES_PATH, types.to_xml());
        archive
    }

    fn core_xml(&self) -> String {
        let title = self.title.as_deref().unwrap_or("Presentation");
        format!(
            r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>namedeck</dc:creator></cp:coreProperties>"#,
            XML_DECLARATION,
            escape_xml(title)
        )
    }

    fn app_xml(&self) -> String {
        let notes = self.slides.iter().filter(|s| s.notes.is_some()).count();
        format!(
            r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>namedeck</Application><PresentationFormat>Widescreen</PresentationFormat><Slides>{}</Slides><Notes>{}</Notes><AppVersion>{}</AppVersion></Properties>"#,
            XML_DECLARATION,
            self.slides.len(),
            notes,
            namedeck_core::VERSION
        )
    }
}

fn presentation_xml(master_rel: &str, notes_master_rel: Option<&str>, slide_rels: &[String]) -> String {
    let notes_master = notes_master_rel
        .map(|rel| {
            format!(
                r#"<p:notesMasterIdLst><p:notesMasterId r:id="{}"/></p:notesMasterIdLst>"#,
                rel
            )
        })
        .unwrap_or_default();

    let slide_list = if slide_rels.is_empty() {
        "<p:sldIdLst/>".to_string()
    } else {
        let entries: String = slide_rels
            .iter()
            .zip(MIN_SLIDE_ID..)
            .map(|(rel, id)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, id, rel))
            .collect();
        format!("<p:sldIdLst>{}</p:sldIdLst>", entries)
    };

    format!(
        r#"{}
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="{}"/></p:sldMasterIdLst>{}{}<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
        XML_DECLARATION,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        master_rel,
        notes_master,
        slide_list,
        SLIDE_WIDTH_EMU,
        SLIDE_HEIGHT_EMU,
        SLIDE_HEIGHT_EMU,
        SLIDE_WIDTH_EMU
    )
}

fn pres_props_xml() -> String {
    format!(
        r#"{}
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

fn theme_xml(name: &str) -> String {
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let fills = fill.repeat(3);
    let lines: String = [6350, 12700, 19050]
        .iter()
        .map(|w| format!(r#"<a:ln w="{}">{}</a:ln>"#, w, fill))
        .collect();
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);

    format!(
        r#"{}
<a:theme xmlns:a="{}" name="{}"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst>{}</a:fillStyleLst><a:lnStyleLst>{}</a:lnStyleLst><a:effectStyleLst>{}</a:effectStyleLst><a:bgFillStyleLst>{}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#,
        XML_DECLARATION,
        NS_DRAWING,
        escape_xml(name),
        fills,
        lines,
        effects,
        fills
    )
}

/// Empty group properties that open every `p:spTree`
const TREE_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

const CLR_MAP: &str = r#"bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink""#;

fn slide_master_xml(layout_rel: &str) -> String {
    format!(
        r#"{}
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{}</p:spTree></p:cSld><p:clrMap {}/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="{}"/></p:sldLayoutIdLst></p:sldMaster>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, TREE_HEADER, CLR_MAP, layout_rel
    )
}

fn slide_layout_xml() -> String {
    format!(
        r#"{}
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, TREE_HEADER
    )
}

fn notes_master_xml() -> String {
    format!(
        r#"{}
<p:notesMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:clrMap {}/></p:notesMaster>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, TREE_HEADER, CLR_MAP
    )
}

fn paragraphs_xml(paragraphs: &[Vec<String>]) -> String {
    if paragraphs.is_empty() {
        return r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#.to_string();
    }

    paragraphs
        .iter()
        .map(|runs| {
            let runs: String = runs
                .iter()
                .map(|run| {
                    format!(
                        r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#,
                        escape_xml(run)
                    )
                })
                .collect();
            format!("<a:p>{}</a:p>", runs)
        })
        .collect()
}

fn text_box_xml(id: usize, index: usize, shape: &TextShape) -> String {
    let margin = EMU_PER_INCH / 2;
    let height = EMU_PER_INCH;
    let y = margin + index as i64 * (height + margin / 2);

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>"#,
        id,
        escape_xml(&shape.name),
        margin,
        y,
        SLIDE_WIDTH_EMU - 2 * margin,
        height,
        paragraphs_xml(&shape.paragraphs)
    )
}

fn slide_xml(slide: &TextSlide) -> String {
    let shapes: String = slide
        .shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| text_box_xml(i + 2, i, shape))
        .collect();

    format!(
        r#"{}
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, TREE_HEADER, shapes
    )
}

fn notes_slide_xml(notes: &str) -> String {
    let paragraphs: Vec<Vec<String>> = notes.lines().map(|line| vec![line.to_string()]).collect();

    format!(
        r#"{}
<p:notes xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>{}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>"#,
        XML_DECLARATION,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        TREE_HEADER,
        paragraphs_xml(&paragraphs)
    )
}
