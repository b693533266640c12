//! Shape text on a slide: listing and literal find/replace.
//!
//! Slide XML is scanned with a streaming reader that records the byte span of
//! every `a:t` element inside the `p:sp` shapes. Edits are spliced back into
//! the original string, so everything other than the replaced text is kept
//! byte for byte.
//!
//! Replacement works line by line, where a line is the part of a paragraph
//! between `a:br` breaks. An occurrence inside a single run edits that run
//! alone. When an occurrence is split across runs (PowerPoint does this after
//! spell-checking or partial formatting), only the runs it covers are merged:
//! their replaced text goes into the first of them and the others are emptied.

use std::ops::Range;

use namedeck_core::ShapeText;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{PptxError, Result};

/// Line break inside a paragraph (`a:br`) as it appears in [`ShapeText::text`]
pub const LINE_BREAK: char = '\u{b}';

/// Escape special XML characters
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Outcome of [`replace_in_shape`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    /// Slide XML after the edit
    pub xml: String,
    /// Occurrences replaced
    pub count: usize,
}

#[derive(Debug)]
struct Run {
    /// Element content, or the whole element when self-closing
    span: Range<usize>,
    /// Qualified tag name, needed to expand a self-closing element
    tag: Option<String>,
    text: String,
    /// Line of the paragraph, counted in `a:br` breaks
    line: usize,
}

#[derive(Debug, Default)]
struct Paragraph {
    runs: Vec<Run>,
    /// Run text with line breaks, for display
    text: String,
    breaks: usize,
}

#[derive(Debug, Default)]
struct Shape {
    name: Option<String>,
    has_text_body: bool,
    paragraphs: Vec<Paragraph>,
}

/// Shapes that carry a text body, in document order.
///
/// [`ShapeText::index`] counts every `p:sp` on the slide, including shapes
/// without text, so it can be passed straight to [`replace_in_shape`].
pub fn list_shapes(xml: &str) -> Result<Vec<ShapeText>> {
    Ok(scan(xml)?
        .into_iter()
        .enumerate()
        .filter(|(_, shape)| shape.has_text_body)
        .map(|(index, shape)| ShapeText {
            index,
            name: shape.name.unwrap_or_default(),
            text: shape
                .paragraphs
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect())
}

/// Number of `p:sp` shapes on a slide
pub fn shape_count(xml: &str) -> Result<usize> {
    Ok(scan(xml)?.len())
}

/// Replace every literal occurrence of `find` in the text of shape `shape`.
///
/// Returns `None` when the slide has no shape with that index.
pub fn replace_in_shape(
    xml: &str,
    shape: usize,
    find: &str,
    replace: &str,
) -> Result<Option<Replaced>> {
    let mut shapes = scan(xml)?;
    if shape >= shapes.len() {
        return Ok(None);
    }
    let target = shapes.swap_remove(shape);

    if find.is_empty() {
        return Ok(Some(Replaced {
            xml: xml.to_string(),
            count: 0,
        }));
    }

    let mut edits: Vec<(&Run, String)> = Vec::new();
    let mut count = 0;

    for paragraph in &target.paragraphs {
        for line in paragraph.runs.chunk_by(|a, b| a.line == b.line) {
            count += replace_in_line(line, find, replace, &mut edits);
        }
    }

    Ok(Some(Replaced {
        xml: splice(xml, edits),
        count,
    }))
}

/// Runs `first..=last` of a line and the occurrences falling in them
struct Cover {
    first: usize,
    last: usize,
    matches: Vec<Range<usize>>,
}

fn replace_in_line<'a>(
    runs: &'a [Run],
    find: &str,
    replace: &str,
    edits: &mut Vec<(&'a Run, String)>,
) -> usize {
    let joined: String = runs.iter().map(|r| r.text.as_str()).collect();

    let mut starts = Vec::with_capacity(runs.len());
    let mut offset = 0;
    for run in runs {
        starts.push(offset);
        offset += run.text.len();
    }
    // Index of the non-empty run holding byte `pos` of `joined`
    let run_at = |pos: usize| starts.partition_point(|&start| start <= pos) - 1;

    let mut covers: Vec<Cover> = Vec::new();
    for (at, _) in joined.match_indices(find) {
        let found = at..at + find.len();
        let first = run_at(found.start);
        let last = run_at(found.end - 1);
        match covers.last_mut() {
            Some(cover) if cover.last >= first => {
                cover.last = last;
                cover.matches.push(found);
            }
            _ => covers.push(Cover {
                first,
                last,
                matches: vec![found],
            }),
        }
    }

    let mut count = 0;
    for cover in covers {
        count += cover.matches.len();

        let end = starts[cover.last] + runs[cover.last].text.len();
        let mut cursor = starts[cover.first];
        let mut text = String::new();
        for found in &cover.matches {
            text.push_str(&joined[cursor..found.start]);
            text.push_str(replace);
            cursor = found.end;
        }
        text.push_str(&joined[cursor..end]);

        edits.push((&runs[cover.first], text));
        for run in runs[cover.first + 1..=cover.last]
            .iter()
            .filter(|r| !r.text.is_empty())
        {
            edits.push((run, String::new()));
        }
    }
    count
}

fn splice(xml: &str, mut edits: Vec<(&Run, String)>) -> String {
    edits.sort_by_key(|(run, _)| run.span.start);

    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for (run, text) in edits {
        out.push_str(&xml[last..run.span.start]);
        match &run.tag {
            Some(tag) if !text.is_empty() => {
                out.push_str(&format!("<{}>{}</{}>", tag, escape_xml(&text), tag));
            }
            Some(_) => out.push_str(&xml[run.span.clone()]),
            None => out.push_str(&escape_xml(&text)),
        }
        last = run.span.end;
    }
    out.push_str(&xml[last..]);
    out
}

fn scan(xml: &str) -> Result<Vec<Shape>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut shape: Option<Shape> = None;
    let mut paragraph: Option<Paragraph> = None;
    // Content start and text of the open `a:t`
    let mut open_run: Option<(usize, String)> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"sp" if shape.is_none() => {
                        if is_empty {
                            shapes.push(Shape::default());
                        } else {
                            shape = Some(Shape::default());
                        }
                    }
                    b"cNvPr" => {
                        if let Some(shape) = shape.as_mut().filter(|s| s.name.is_none()) {
                            shape.name = e
                                .attributes()
                                .filter_map(|a| a.ok())
                                .find(|a| a.key.as_ref() == b"name")
                                .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()));
                        }
                    }
                    b"txBody" => {
                        if let Some(shape) = shape.as_mut() {
                            shape.has_text_body = true;
                        }
                    }
                    b"p" if shape.is_some() => {
                        if is_empty {
                            if let Some(shape) = shape.as_mut() {
                                shape.paragraphs.push(Paragraph::default());
                            }
                        } else {
                            paragraph = Some(Paragraph::default());
                        }
                    }
                    b"t" => {
                        if let Some(paragraph) = paragraph.as_mut() {
                            if is_empty {
                                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                                paragraph.runs.push(Run {
                                    span: start..end,
                                    tag: Some(tag),
                                    text: String::new(),
                                    line: paragraph.breaks,
                                });
                            } else {
                                open_run = Some((end, String::new()));
                            }
                        }
                    }
                    b"br" => {
                        if let Some(paragraph) = paragraph.as_mut() {
                            paragraph.text.push(LINE_BREAK);
                            paragraph.breaks += 1;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if let Some((_, text)) = open_run.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| PptxError::invalid(format!("bad text content: {}", err)))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(ref e) => {
                if let Some((_, text)) = open_run.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => {
                    if let (Some((content_start, text)), Some(paragraph)) =
                        (open_run.take(), paragraph.as_mut())
                    {
                        paragraph.text.push_str(&text);
                        paragraph.runs.push(Run {
                            span: content_start..start,
                            tag: None,
                            text,
                            line: paragraph.breaks,
                        });
                    }
                }
                b"p" => {
                    if let (Some(done), Some(shape)) = (paragraph.take(), shape.as_mut()) {
                        shape.paragraphs.push(done);
                    }
                }
                b"sp" => {
                    if let Some(done) = shape.take() {
                        shapes.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            shapes
        )
    }

    fn text_shape(id: u32, name: &str, paragraphs: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
            id, name, paragraphs
        )
    }

    const PICTURE_LIKE: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="9" name="Rectangle 8"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#;

    #[test]
    fn test_list_shapes() {
        let xml = slide(&format!(
            "{}{}{}",
            text_shape(2, "Title 1", "<a:p><a:r><a:t>Welcome</a:t></a:r></a:p>"),
            PICTURE_LIKE,
            text_shape(
                3,
                "Body",
                "<a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:rPr b=\"1\"/><a:t>{{NAME}}</a:t></a:r></a:p><a:p><a:r><a:t>line</a:t></a:r><a:br/><a:r><a:t>two</a:t></a:r></a:p>"
            ),
        ));

        let shapes = list_shapes(&xml).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].index, 0);
        assert_eq!(shapes[0].name, "Title 1");
        assert_eq!(shapes[0].text, "Welcome");
        assert_eq!(shapes[1].index, 2);
        assert_eq!(shapes[1].text, "Hello {{NAME}}\nline\u{b}two");
        assert_eq!(shape_count(&xml).unwrap(), 3);
    }

    #[test]
    fn test_grouped_shapes_are_listed() {
        let xml = slide(&format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="4" name="Group 3"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
            text_shape(5, "Inner", "<a:p><a:r><a:t>[NAME]</a:t></a:r></a:p>")
        ));

        let shapes = list_shapes(&xml).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].name, "Inner");
        assert_eq!(shapes[0].text, "[NAME]");
    }

    #[test]
    fn test_replace_within_run_keeps_formatting() {
        let xml = slide(&text_shape(
            2,
            "Body",
            "<a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:rPr b=\"1\"/><a:t>{{NAME}}</a:t></a:r></a:p>",
        ));

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "Ada L.").unwrap().unwrap();
        assert_eq!(replaced.count, 1);
        assert!(replaced
            .xml
            .contains(r#"<a:r><a:rPr b="1"/><a:t>Ada L.</a:t></a:r>"#));
        assert!(replaced.xml.contains("<a:t>Hello </a:t>"));
        assert_eq!(list_shapes(&replaced.xml).unwrap()[0].text, "Hello Ada L.");
    }

    #[test]
    fn test_replace_across_split_runs() {
        let xml = slide(&text_shape(
            2,
            "Body",
            "<a:p><a:r><a:rPr b=\"1\"/><a:t>Hi {{NA</a:t></a:r><a:r><a:rPr/><a:t>ME}}!</a:t></a:r></a:p>",
        ));

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "Ada L.").unwrap().unwrap();
        assert_eq!(replaced.count, 1);
        assert!(replaced
            .xml
            .contains(r#"<a:r><a:rPr b="1"/><a:t>Hi Ada L.!</a:t></a:r><a:r><a:rPr/><a:t></a:t></a:r>"#));
        assert_eq!(list_shapes(&replaced.xml).unwrap()[0].text, "Hi Ada L.!");
    }

    #[test]
    fn test_split_token_before_line_break() {
        let xml = slide(&text_shape(
            2,
            "Body",
            "<a:p><a:r><a:t>Hi {{NA</a:t></a:r><a:r><a:t>ME}}</a:t></a:r><a:br/><a:r><a:t>Welcome</a:t></a:r></a:p>",
        ));

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "Ada L.").unwrap().unwrap();
        assert_eq!(replaced.count, 1);
        assert!(replaced.xml.contains("<a:br/><a:r><a:t>Welcome</a:t></a:r>"));
        assert_eq!(
            list_shapes(&replaced.xml).unwrap()[0].text,
            "Hi Ada L.\u{b}Welcome"
        );
    }

    #[test]
    fn test_split_token_leaves_other_runs_alone() {
        let xml = slide(&text_shape(
            2,
            "Body",
            "<a:p><a:r><a:rPr i=\"1\"/><a:t>Dear </a:t></a:r><a:r><a:t>{{NA</a:t></a:r><a:r><a:t>ME}}</a:t></a:r><a:r><a:rPr b=\"1\"/><a:t>, welcome</a:t></a:r></a:p>",
        ));

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "Bo M.").unwrap().unwrap();
        assert!(replaced.xml.contains(r#"<a:rPr i="1"/><a:t>Dear </a:t>"#));
        assert!(replaced.xml.contains(r#"<a:rPr b="1"/><a:t>, welcome</a:t>"#));
        assert_eq!(
            list_shapes(&replaced.xml).unwrap()[0].text,
            "Dear Bo M., welcome"
        );
    }

    #[test]
    fn test_token_does_not_match_across_line_break() {
        let xml = slide(&text_shape(
            2,
            "Body",
            "<a:p><a:r><a:t>{{NA</a:t></a:r><a:br/><a:r><a:t>ME}}</a:t></a:r></a:p>",
        ));

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "Cy D.").unwrap().unwrap();
        assert_eq!(replaced.count, 0);
        assert_eq!(replaced.xml, xml);
    }

    #[test]
    fn test_replace_every_occurrence() {
        let xml = slide(&text_shape(
            2,
            "Body",
            "<a:p><a:r><a:t>[name] and [name]</a:t></a:r></a:p><a:p><a:r><a:t>[name]</a:t></a:r></a:p>",
        ));

        let replaced = replace_in_shape(&xml, 0, "[name]", "Bo M.").unwrap().unwrap();
        assert_eq!(replaced.count, 3);
        assert_eq!(
            list_shapes(&replaced.xml).unwrap()[0].text,
            "Bo M. and Bo M.\nBo M."
        );
    }

    #[test]
    fn test_replace_escapes_and_unescapes() {
        let xml = slide(&text_shape(
            2,
            "Body",
            "<a:p><a:r><a:t>Tom &amp; {{NAME}}</a:t></a:r></a:p>",
        ));

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "<Jo & Al>").unwrap().unwrap();
        assert!(replaced
            .xml
            .contains("<a:t>Tom &amp; &lt;Jo &amp; Al&gt;</a:t>"));
        assert_eq!(
            list_shapes(&replaced.xml).unwrap()[0].text,
            "Tom & <Jo & Al>"
        );
    }

    #[test]
    fn test_replace_only_touches_target_shape() {
        let xml = slide(&format!(
            "{}{}",
            text_shape(2, "A", "<a:p><a:r><a:t>{{NAME}}</a:t></a:r></a:p>"),
            text_shape(3, "B", "<a:p><a:r><a:t>{{NAME}}</a:t></a:r></a:p>"),
        ));

        let replaced = replace_in_shape(&xml, 1, "{{NAME}}", "Cy D.").unwrap().unwrap();
        let shapes = list_shapes(&replaced.xml).unwrap();
        assert_eq!(shapes[0].text, "{{NAME}}");
        assert_eq!(shapes[1].text, "Cy D.");
    }

    #[test]
    fn test_no_match_leaves_xml_unchanged() {
        let xml = slide(&text_shape(2, "A", "<a:p><a:r><a:t>Welcome</a:t></a:r></a:p>"));

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "Ed F.").unwrap().unwrap();
        assert_eq!(replaced.count, 0);
        assert_eq!(replaced.xml, xml);

        let replaced = replace_in_shape(&xml, 0, "", "Ed F.").unwrap().unwrap();
        assert_eq!(replaced.count, 0);
    }

    #[test]
    fn test_shape_out_of_range() {
        let xml = slide(&text_shape(2, "A", "<a:p/>"));
        assert!(replace_in_shape(&xml, 1, "x", "y").unwrap().is_none());
    }

    #[test]
    fn test_empty_paragraphs_and_self_closing_text() {
        let xml = slide(&text_shape(
            2,
            "A",
            "<a:p/><a:p><a:r><a:t/></a:r><a:r><a:t>{{NA</a:t></a:r><a:r><a:t>ME}}</a:t></a:r></a:p>",
        ));

        let shapes = list_shapes(&xml).unwrap();
        assert_eq!(shapes[0].text, "\n{{NAME}}");

        let replaced = replace_in_shape(&xml, 0, "{{NAME}}", "Di E.").unwrap().unwrap();
        assert_eq!(replaced.count, 1);
        assert!(replaced.xml.contains("<a:t>Di E.</a:t>"));
        assert_eq!(list_shapes(&replaced.xml).unwrap()[0].text, "\nDi E.");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }
}
