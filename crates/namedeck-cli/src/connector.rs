//! Local files standing in for the spreadsheet and presentation services.

use namedeck_core::{Connector, Result};
use namedeck_data::{open_spreadsheet, SpreadsheetFile};
use namedeck_pptx::PptxDeck;

/// Opens identifiers as file paths: spreadsheets by extension, presentations
/// as `.pptx`. Presentations are saved in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConnector;

impl Connector for FileConnector {
    type Sheet = SpreadsheetFile;
    type Deck = PptxDeck;

    fn open_spreadsheet(&self, id: &str) -> Result<SpreadsheetFile> {
        Ok(open_spreadsheet(id)?)
    }

    fn open_presentation(&self, id: &str) -> Result<PptxDeck> {
        Ok(PptxDeck::open(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namedeck_core::{DeckError, SlideDeck, Spreadsheet};
    use namedeck_pptx::DeckWriter;

    #[test]
    fn test_open_files() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("names.csv");
        let deck = dir.path().join("deck.pptx");
        std::fs::write(&sheet, "Name\nAda Lovelace\n").unwrap();
        DeckWriter::starter().write_to_file(&deck).unwrap();

        let connector = FileConnector;
        let source = connector.open_spreadsheet(&sheet.display().to_string()).unwrap();
        assert_eq!(source.column_values("Sheet1", "A:A").unwrap().len(), 2);

        let deck = connector.open_presentation(&deck.display().to_string()).unwrap();
        assert_eq!(SlideDeck::slide_count(&deck), 2);
    }

    #[test]
    fn test_missing_files_are_collaborator_errors() {
        let dir = tempfile::tempdir().unwrap();
        let connector = FileConnector;

        let err = connector
            .open_spreadsheet(&dir.path().join("absent.xlsx").display().to_string())
            .unwrap_err();
        assert!(matches!(err, DeckError::Collaborator { service: "Spreadsheet", .. }));

        let err = connector
            .open_presentation(&dir.path().join("absent.pptx").display().to_string())
            .unwrap_err();
        assert!(matches!(err, DeckError::Collaborator { service: "Presentation", .. }));
    }
}
