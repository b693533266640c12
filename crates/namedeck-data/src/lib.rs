//! # namedeck-data
//!
//! Spreadsheet sources for namedeck. Reads the name column from workbooks
//! (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) with `calamine` and from
//! delimited text with `csv`, and exposes both through
//! [`namedeck_core::Spreadsheet`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use namedeck_core::read_names;
//! use namedeck_data::open_spreadsheet;
//!
//! let source = open_spreadsheet("names.xlsx")?;
//! let names = read_names(&source, "Sheet1", "A:A")?;
//! ```

pub mod error;
pub mod range;
pub mod sources;

// Re-exports
pub use error::{DataError, Result};
pub use range::ColumnSpec;
pub use sources::{open_spreadsheet, CsvOptions, CsvSource, ExcelSource, SpreadsheetFile};
