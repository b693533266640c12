//! Column designators such as `A`, `A:A` or `B2:B40`.

use crate::error::{DataError, Result};

/// A single spreadsheet column, optionally bounded by rows.
///
/// Rows and columns are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column index (A = 0)
    pub column: u32,
    /// First row to read
    pub first_row: u32,
    /// Last row to read (inclusive); `None` reads to the end of the data
    pub last_row: Option<u32>,
}

impl ColumnSpec {
    /// Parse a designator.
    ///
    /// Accepted forms: `"A"`, `"A:A"`, `"A2:A40"`, `"A2:A"` and `"A:A40"`.
    /// Both ends must name the same column.
    pub fn parse(designator: &str) -> Result<Self> {
        let designator = designator.trim();
        let parts: Vec<&str> = designator.split(':').collect();

        let (start, end) = match parts.as_slice() {
            [single] => (*single, *single),
            [start, end] => (*start, *end),
            _ => {
                return Err(DataError::InvalidRange(format!(
                    "Expected format 'A:A' or 'A2:A40', got '{}'",
                    designator
                )))
            }
        };

        let (start_col, start_row) = parse_cell_ref(start)?;
        let (end_col, end_row) = parse_cell_ref(end)?;

        if start_col != end_col {
            return Err(DataError::InvalidRange(format!(
                "'{}' spans more than one column",
                designator
            )));
        }

        let first_row = start_row.unwrap_or(0);
        let last_row = if parts.len() == 1 { None } else { end_row };

        if let Some(last) = last_row {
            if last < first_row {
                return Err(DataError::InvalidRange(format!(
                    "'{}' ends before it starts",
                    designator
                )));
            }
        }

        Ok(Self {
            column: start_col,
            first_row,
            last_row,
        })
    }

    /// Whether the 0-indexed `row` falls inside this column range
    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row && self.last_row.map_or(true, |last| row <= last)
    }
}

/// Parse a cell reference like `"A1"` or a bare column `"A"` into
/// `(column, row)`, both 0-indexed
pub fn parse_cell_ref(cell: &str) -> Result<(u32, Option<u32>)> {
    let cell = cell.trim().to_uppercase();

    if cell.is_empty() {
        return Err(DataError::InvalidRange("Empty cell reference".to_string()));
    }

    let split = cell
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(cell.len());
    let (col_str, row_str) = cell.split_at(split);

    if col_str.is_empty() {
        return Err(DataError::InvalidRange(format!(
            "Missing column letters in '{}'",
            cell
        )));
    }
    if let Some(c) = row_str.chars().find(|c| !c.is_ascii_digit()) {
        return Err(DataError::InvalidRange(format!(
            "Invalid character '{}' in cell reference",
            c
        )));
    }

    let col = column_to_index(col_str)?;

    if row_str.is_empty() {
        return Ok((col, None));
    }

    let row: u32 = row_str
        .parse()
        .map_err(|_| DataError::InvalidRange(format!("Invalid row number '{}'", row_str)))?;

    if row == 0 {
        return Err(DataError::InvalidRange(
            "Row number must be >= 1".to_string(),
        ));
    }

    Ok((col, Some(row - 1)))
}

/// Convert column letters to a 0-indexed number (A=0, B=1, ..., Z=25, AA=26)
pub fn column_to_index(col: &str) -> Result<u32> {
    let mut result: u32 = 0;
    for c in col.chars() {
        if !c.is_ascii_uppercase() {
            return Err(DataError::InvalidRange(format!(
                "Invalid column letter '{}'",
                c
            )));
        }
        let value = c as u32 - 'A' as u32 + 1;
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add(value))
            .ok_or_else(|| DataError::InvalidRange(format!("Column '{}' is too large", col)))?;
    }
    result
        .checked_sub(1)
        .ok_or_else(|| DataError::InvalidRange("Empty column reference".to_string()))
}
