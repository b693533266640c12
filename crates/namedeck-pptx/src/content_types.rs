//! `[Content_Types].xml`: default content types by extension plus
//! per-part overrides.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::constants::NS_CONTENT_TYPES;
use crate::error::Result;
use crate::text::escape_xml;

/// Path of the content types part inside the package
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Parsed content type declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// `(extension, content type)` pairs
    defaults: Vec<(String, String)>,
    /// `(part name, content type)` pairs; part names start with `/`
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse `[Content_Types].xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    let entry = match e.local_name().as_ref() {
                        b"Default" => Some((b"Extension".as_slice(), &mut types.defaults)),
                        b"Override" => Some((b"PartName".as_slice(), &mut types.overrides)),
                        _ => None,
                    };

                    if let Some((key_attr, list)) = entry {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            if attr.key.as_ref() == key_attr {
                                key = value;
                            } else if attr.key.as_ref() == b"ContentType" {
                                content_type = value;
                            }
                        }

                        if let (Some(key), Some(content_type)) = (key, content_type) {
                            list.push((key, content_type));
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type declared for a package part (`ppt/slides/slide1.xml`)
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let part_name = part_name(part);
        if let Some((_, ct)) = self.overrides.iter().find(|(name, _)| *name == part_name) {
            return Some(ct.as_str());
        }

        let extension = part.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, ct)| ct.as_str())
    }

    /// Whether an override exists for `part`
    pub fn has_override(&self, part: &str) -> bool {
        let part_name = part_name(part);
        self.overrides.iter().any(|(name, _)| *name == part_name)
    }

    /// Declare the content type for an extension, unless already declared
    pub fn add_default(&mut self, extension: impl Into<String>, content_type: impl Into<String>) {
        let extension = extension.into();
        if !self
            .defaults
            .iter()
            .any(|(ext, _)| ext.eq_ignore_ascii_case(&extension))
        {
            self.defaults.push((extension, content_type.into()));
        }
    }

    /// Declare (or replace) the content type of a part
    pub fn add_override(&mut self, part: &str, content_type: impl Into<String>) {
        let part_name = part_name(part);
        let content_type = content_type.into();
        match self.overrides.iter_mut().find(|(name, _)| *name == part_name) {
            Some(entry) => entry.1 = content_type,
            None => self.overrides.push((part_name, content_type)),
        }
    }

    /// Drop the override for a part
    pub fn remove_override(&mut self, part: &str) {
        let part_name = part_name(part);
        self.overrides.retain(|(name, _)| *name != part_name);
    }

    /// Serialize to XML
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, NS_CONTENT_TYPES));

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (name, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(name),
                escape_xml(ct)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

/// Package part name for an archive path (leading `/`)
fn part_name(part: &str) -> String {
    if part.starts_with('/') {
        part.to_string()
    } else {
        format!("/{}", part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CT_SLIDE;

    const TYPES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#;

    #[test]
    fn test_parse_and_lookup() {
        let types = ContentTypes::parse(TYPES).unwrap();

        assert_eq!(types.content_type_of("ppt/slides/slide1.xml"), Some(CT_SLIDE));
        assert_eq!(
            types.content_type_of("ppt/slides/_rels/slide1.xml.rels"),
            Some("application/vnd.openxmlformats-package.relationships+xml")
        );
        assert_eq!(types.content_type_of("docProps/thumbnail.jpeg"), None);
        assert!(types.has_override("/ppt/presentation.xml"));
    }

    #[test]
    fn test_add_and_remove_override() {
        let mut types = ContentTypes::parse(TYPES).unwrap();

        types.add_override("ppt/slides/slide2.xml", CT_SLIDE);
        types.add_override("ppt/slides/slide2.xml", CT_SLIDE);
        assert!(types.has_override("ppt/slides/slide2.xml"));

        types.remove_override("ppt/slides/slide1.xml");
        assert!(!types.has_override("ppt/slides/slide1.xml"));

        let reparsed = ContentTypes::parse(types.to_xml().as_bytes()).unwrap();
        assert_eq!(reparsed, types);
        assert_eq!(reparsed.overrides.len(), 2);
    }

    #[test]
    fn test_add_default() {
        let mut types = ContentTypes::default();
        types.add_default("png", "image/png");
        types.add_default("PNG", "image/x-png");

        assert_eq!(types.defaults.len(), 1);
        assert_eq!(types.content_type_of("ppt/media/image1.png"), Some("image/png"));
    }
}
