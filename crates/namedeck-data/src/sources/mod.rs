//! Spreadsheet source implementations.
//!
//! [`open_spreadsheet`] picks the source from the file extension.

pub mod csv;
pub mod excel;

use std::path::Path;

pub use self::csv::{CsvOptions, CsvSource};
pub use self::excel::ExcelSource;

use namedeck_core::{CellValue, Spreadsheet};

use crate::error::{DataError, Result};

/// A spreadsheet file of any supported format
#[derive(Debug)]
pub enum SpreadsheetFile {
    Excel(ExcelSource),
    Csv(CsvSource),
}

/// Open a spreadsheet file, choosing the reader by extension.
///
/// Workbooks: `xlsx`, `xlsm`, `xlsb`, `xls`, `ods`. Delimited text: `csv`,
/// `tsv`.
pub fn open_spreadsheet(path: impl AsRef<Path>) -> Result<SpreadsheetFile> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SpreadsheetFile::Excel(ExcelSource::new(path)?)),
        "csv" => Ok(SpreadsheetFile::Csv(CsvSource::new(path)?)),
        "tsv" => Ok(SpreadsheetFile::Csv(CsvSource::with_options(
            path,
            CsvOptions::tsv(),
        )?)),
        _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
    }
}

impl Spreadsheet for SpreadsheetFile {
    fn sheet_names(&self) -> namedeck_core::Result<Vec<String>> {
        match self {
            SpreadsheetFile::Excel(source) => source.sheet_names(),
            SpreadsheetFile::Csv(source) => source.sheet_names(),
        }
    }

    fn has_sheet(&self, sheet: &str) -> namedeck_core::Result<bool> {
        match self {
            SpreadsheetFile::Excel(source) => source.has_sheet(sheet),
            SpreadsheetFile::Csv(source) => source.has_sheet(sheet),
        }
    }

    fn column_values(&self, sheet: &str, column: &str) -> namedeck_core::Result<Vec<CellValue>> {
        match self {
            SpreadsheetFile::Excel(source) => source.column_values(sheet, column),
            SpreadsheetFile::Csv(source) => source.column_values(sheet, column),
        }
    }
}
