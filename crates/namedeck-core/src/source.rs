//! Reading the name column from a spreadsheet.

use tracing::{debug, info};

use crate::error::Result;
use crate::name::CellValue;

/// Spreadsheet backend that can hand out the cells of one column
pub trait Spreadsheet {
    /// Names of all sheets (tabs) in the spreadsheet
    fn sheet_names(&self) -> Result<Vec<String>>;

    /// Check whether a sheet with this name exists
    fn has_sheet(&self, sheet: &str) -> Result<bool> {
        Ok(self.sheet_names()?.iter().any(|name| name == sheet))
    }

    /// All cells of `column` on `sheet`, top to bottom.
    ///
    /// `column` is a designator such as `"A"`, `"A:A"` or `"A2:A40"`.
    /// Implementations return [`crate::DeckError::SheetNotFound`] when the
    /// sheet does not exist.
    fn column_values(&self, sheet: &str, column: &str) -> Result<Vec<CellValue>>;
}

/// Read the list of raw names from `column` of `sheet`.
///
/// Blank and falsy cells are dropped, then the first remaining cell is dropped as the
/// header row. The header is not detected: if the header cell itself is
/// blank, the first real name is the one that goes.
pub fn read_names<S: Spreadsheet + ?Sized>(
    source: &S,
    sheet: &str,
    column: &str,
) -> Result<Vec<CellValue>> {
    let mut names: Vec<CellValue> = source
        .column_values(sheet, column)?
        .into_iter()
        .filter(|value| !value.is_blank())
        .collect();

    if !names.is_empty() {
        let header = names.remove(0);
        debug!("Skipping header cell '{}'", header);
    }

    info!(
        "Read {} names from sheet '{}' column {}",
        names.len(),
        sheet,
        column
    );

    Ok(names)
}
