//! The ZIP container of a presentation.
//!
//! A `.pptx` is a ZIP of XML parts and media. [`PptxArchive`] unpacks every
//! part into memory keyed by its path inside the package, so edits are plain
//! map operations until the package is written out again.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::content_types::CONTENT_TYPES_PATH;
use crate::error::{PptxError, Result};

/// Package parts by path (`ppt/slides/slide1.xml`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PptxArchive {
    parts: BTreeMap<String, Vec<u8>>,
}

impl PptxArchive {
    /// Unpack a `.pptx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_from(File::open(path)?)
    }

    /// Unpack a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read_from(Cursor::new(bytes))
    }

    /// Unpack a package from any seekable reader.
    ///
    /// Directory entries are skipped.
    pub fn read_from<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut parts = BTreeMap::new();

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            if entry.is_dir() {
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            parts.insert(entry.name().to_string(), bytes);
        }

        Ok(Self { parts })
    }

    pub fn part(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(Vec::as_slice)
    }

    /// Contents of an XML part; missing parts and invalid UTF-8 are errors
    pub fn part_xml(&self, path: &str) -> Result<String> {
        let bytes = self.part(path).ok_or_else(|| PptxError::missing_part(path))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| PptxError::invalid(format!("{} is not valid UTF-8", path)))
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// Part paths in sorted order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Add or replace a part
    pub fn put(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.parts.insert(path.into(), bytes);
    }

    /// Add or replace an XML part
    pub fn put_xml(&mut self, path: impl Into<String>, xml: impl Into<String>) {
        self.put(path, xml.into().into_bytes());
    }

    pub fn drop_part(&mut self, path: &str) -> Option<Vec<u8>> {
        self.parts.remove(path)
    }

    /// Write the package to `path`.
    ///
    /// The package goes to a temporary file next to `path` first; an existing
    /// file is only replaced once that write has completed.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        self.write_to(temp.as_file_mut())?;
        if let Ok(existing) = fs::metadata(path) {
            temp.as_file().set_permissions(existing.permissions())?;
        }
        temp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the package; `[Content_Types].xml` always comes first
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let content_types = self.parts.get_key_value(CONTENT_TYPES_PATH);
        let rest = self
            .parts
            .iter()
            .filter(|(path, _)| path.as_str() != CONTENT_TYPES_PATH);

        for (path, bytes) in content_types.into_iter().chain(rest) {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        zip.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_drop_parts() {
        let mut archive = PptxArchive::default();

        archive.put_xml("ppt/slides/slide1.xml", "<p:sld/>");
        assert!(archive.has_part("ppt/slides/slide1.xml"));
        assert_eq!(archive.part_xml("ppt/slides/slide1.xml").unwrap(), "<p:sld/>");

        assert!(archive.drop_part("ppt/slides/slide1.xml").is_some());
        assert!(!archive.has_part("ppt/slides/slide1.xml"));
        assert!(matches!(
            archive.part_xml("ppt/slides/slide1.xml"),
            Err(PptxError::MissingPart { .. })
        ));
    }

    #[test]
    fn test_binary_part_is_not_xml() {
        let mut archive = PptxArchive::default();
        archive.put("ppt/media/image1.png", vec![0x89, 0xff, 0xfe]);

        assert!(matches!(
            archive.part_xml("ppt/media/image1.png"),
            Err(PptxError::InvalidPresentation { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let mut archive = PptxArchive::default();
        archive.put_xml("ppt/presentation.xml", "<p:presentation/>");
        archive.put_xml(CONTENT_TYPES_PATH, "<Types/>");
        archive.put("ppt/media/image1.png", vec![0x89, 0x50, 0x4e, 0x47]);

        let reopened = PptxArchive::from_bytes(&archive.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened, archive);
        assert_eq!(
            reopened.part_names().collect::<Vec<_>>(),
            vec!["[Content_Types].xml", "ppt/media/image1.png", "ppt/presentation.xml"]
        );
    }

    #[test]
    fn test_content_types_written_first() {
        let mut archive = PptxArchive::default();
        archive.put_xml("_rels/.rels", "<Relationships/>");
        archive.put_xml(CONTENT_TYPES_PATH, "<Types/>");

        let bytes = archive.to_bytes().unwrap();
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.by_index(0).unwrap().name(), CONTENT_TYPES_PATH);
    }

    #[test]
    fn test_write_to_file_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        fs::write(&path, b"previous contents").unwrap();

        let mut archive = PptxArchive::default();
        archive.put_xml(CONTENT_TYPES_PATH, "<Types/>");
        archive.write_to_file(&path).unwrap();

        assert_eq!(PptxArchive::open(&path).unwrap(), archive);
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), b"kept").unwrap();

        let mut archive = PptxArchive::default();
        archive.put_xml(CONTENT_TYPES_PATH, "<Types/>");
        assert!(matches!(archive.write_to_file(&path), Err(PptxError::Io(_))));

        assert_eq!(fs::read(path.join("keep.txt")).unwrap(), b"kept");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            PptxArchive::from_bytes(b"plain text"),
            Err(PptxError::Archive(_))
        ));
    }
}
