//! Workbook source (XLSX, XLSM, XLSB, XLS, ODS) using calamine.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use namedeck_core::{CellValue, Spreadsheet};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::range::ColumnSpec;

/// Spreadsheet workbook source
#[derive(Debug)]
pub struct ExcelSource {
    /// Path to the workbook
    path: PathBuf,
    /// Sheet names cache
    sheet_names: Vec<String>,
}

impl ExcelSource {
    /// Open a workbook and cache its sheet names
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        let workbook = open_workbook_auto(path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", path.display(), e)))?;
        let sheet_names = workbook.sheet_names().to_vec();
        debug!("Opened {} with sheets {:?}", path.display(), sheet_names);

        Ok(Self {
            path: path.to_path_buf(),
            sheet_names,
        })
    }

    /// Names of all sheets in workbook order
    pub fn list_sheets(&self) -> &[String] {
        &self.sheet_names
    }

    /// Read the cells of one column, top to bottom
    pub fn read_column(&self, sheet: &str, spec: &ColumnSpec) -> Result<Vec<CellValue>> {
        if !self.sheet_names.iter().any(|name| name == sheet) {
            return Err(DataError::SheetNotFound(sheet.to_string()));
        }

        // Re-open workbook for reading (calamine requires this pattern)
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", self.path.display(), e)))?;
        let sheet_range = workbook.worksheet_range(sheet)?;

        Ok(Self::extract_column(&sheet_range, spec))
    }

    /// Convert a calamine cell to a [`CellValue`]
    pub(crate) fn cell_value(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Text(format!("#ERROR: {:?}", e)),
            Data::DateTime(dt) => CellValue::Text(format!("{}", dt)),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    /// Collect one column of a sheet range.
    ///
    /// Calamine ranges start at the first used cell, so leading empty rows
    /// are not materialised; they would be dropped as blanks anyway.
    fn extract_column(sheet_range: &Range<Data>, spec: &ColumnSpec) -> Vec<CellValue> {
        let (Some((start_row, _)), Some((end_row, _))) = (sheet_range.start(), sheet_range.end())
        else {
            return Vec::new();
        };

        let first = spec.first_row.max(start_row);
        let last = spec.last_row.map_or(end_row, |last| last.min(end_row));

        (first..=last)
            .map(|row| {
                sheet_range
                    .get_value((row, spec.column))
                    .map(Self::cell_value)
                    .unwrap_or(CellValue::Empty)
            })
            .collect()
    }
}

impl Spreadsheet for ExcelSource {
    fn sheet_names(&self) -> namedeck_core::Result<Vec<String>> {
        Ok(self.sheet_names.clone())
    }

    fn column_values(&self, sheet: &str, column: &str) -> namedeck_core::Result<Vec<CellValue>> {
        let spec = ColumnSpec::parse(column)?;
        Ok(self.read_column(sheet, &spec)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value() {
        assert_eq!(ExcelSource::cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            ExcelSource::cell_value(&Data::String("Ada Lovelace".to_string())),
            CellValue::from("Ada Lovelace")
        );
        assert_eq!(
            ExcelSource::cell_value(&Data::Int(42)),
            CellValue::Number(42.0)
        );
        assert_eq!(
            ExcelSource::cell_value(&Data::Float(3.5)),
            CellValue::Number(3.5)
        );
        assert_eq!(
            ExcelSource::cell_value(&Data::Bool(true)),
            CellValue::Bool(true)
        );
    }

    #[test]
    fn test_extract_column_bounds() {
        let mut range: Range<Data> = Range::new((0, 0), (4, 1));
        range.set_value((0, 0), Data::String("Name".into()));
        range.set_value((1, 0), Data::String("Ann Lee".into()));
        range.set_value((3, 0), Data::String("Bo Ma".into()));
        range.set_value((4, 1), Data::Int(9));

        let all = ColumnSpec::parse("A:A").unwrap();
        let values = ExcelSource::extract_column(&range, &all);
        assert_eq!(values.len(), 5);
        assert_eq!(values[1], CellValue::from("Ann Lee"));
        assert_eq!(values[2], CellValue::Empty);

        let bounded = ColumnSpec::parse("A2:A3").unwrap();
        let values = ExcelSource::extract_column(&range, &bounded);
        assert_eq!(values, vec![CellValue::from("Ann Lee"), CellValue::Empty]);

        let past_end = ColumnSpec::parse("A4:A99").unwrap();
        let values = ExcelSource::extract_column(&range, &past_end);
        assert_eq!(values, vec![CellValue::from("Bo Ma"), CellValue::Empty]);
    }

    #[test]
    fn test_extract_column_empty_range() {
        let range: Range<Data> = Range::empty();
        let spec = ColumnSpec::parse("A").unwrap();
        assert!(ExcelSource::extract_column(&range, &spec).is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = ExcelSource::new("/nonexistent/names.xlsx").unwrap_err();
        assert!(matches!(err, DataError::FileNotFound(_)));
    }
}
