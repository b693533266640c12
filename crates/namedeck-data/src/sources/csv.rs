//! CSV source.

use std::fs;
use std::path::{Path, PathBuf};

use namedeck_core::{CellValue, Spreadsheet};

use crate::error::{DataError, Result};
use crate::range::ColumnSpec;

/// Options for CSV parsing
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether to trim whitespace from fields
    pub trim: bool,
    /// Whether rows may have different column counts
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: true,
            flexible: true,
        }
    }
}

impl CsvOptions {
    /// Create options for tab-separated values (TSV)
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Create options for semicolon-separated values (common in European locales)
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }
}

/// CSV file source.
///
/// A CSV file has a single unnamed sheet, so every sheet name is accepted.
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Create a new CSV source with custom options
    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            options,
        })
    }

    /// Read all rows.
    ///
    /// Blank lines become empty rows, so row `i` of the result is line `i` of
    /// a spreadsheet opening this file.
    pub fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let data = fs::read(&self.path)?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(false)
            .trim(if self.options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .flexible(self.options.flexible)
            .from_reader(data.as_slice());

        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            let start = csv_reader.position().byte() as usize;
            if !csv_reader.read_record(&mut record)? {
                break;
            }
            rows.extend(std::iter::repeat_with(Vec::new).take(blank_lines_at(&data, start)));
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(rows)
    }

    /// Read the cells of one column, top to bottom.
    ///
    /// Rows shorter than the column yield [`CellValue::Empty`].
    pub fn read_column(&self, spec: &ColumnSpec) -> Result<Vec<CellValue>> {
        let column = spec.column as usize;

        Ok(self
            .read_all()?
            .into_iter()
            .enumerate()
            .filter(|(row, _)| u32::try_from(*row).is_ok_and(|row| spec.contains_row(row)))
            .map(|(_, record)| match record.into_iter().nth(column) {
                Some(field) if !field.is_empty() => CellValue::Text(field),
                _ => CellValue::Empty,
            })
            .collect())
    }

    /// Write a single-column CSV file, one value per row
    pub fn write_column<S: AsRef<str>>(path: impl AsRef<Path>, values: &[S]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_path(path.as_ref())?;
        for value in values {
            writer.write_record([value.as_ref()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Sheet name reported for this file (its stem)
    fn sheet_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string())
    }
}

/// Blank lines the csv reader skips from byte `start` up to the next record
fn blank_lines_at(data: &[u8], mut at: usize) -> usize {
    // `\n` closing the previous record's `\r\n`
    if at > 0 && data[at - 1] == b'\r' && data.get(at) == Some(&b'\n') {
        at += 1;
    }

    let mut count = 0;
    while let Some(&byte) = data.get(at) {
        match byte {
            b'\r' => {
                at += 1;
                if data.get(at) == Some(&b'\n') {
                    at += 1;
                }
            }
            b'\n' => at += 1,
            _ => break,
        }
        count += 1;
    }
    count
}

impl Spreadsheet for CsvSource {
    fn sheet_names(&self) -> namedeck_core::Result<Vec<String>> {
        Ok(vec![self.sheet_name()])
    }

    fn has_sheet(&self, _sheet: &str) -> namedeck_core::Result<bool> {
        Ok(true)
    }

    fn column_values(&self, _sheet: &str, column: &str) -> namedeck_core::Result<Vec<CellValue>> {
        let spec = ColumnSpec::parse(column)?;
        Ok(self.read_column(&spec)?)
    }
}
