//! namedeck-core - one slide per name
//!
//! Core library for namedeck: reads a column of names from a spreadsheet,
//! formats them as `"First L."`, shuffles them, and clones a template slide
//! once per name with the placeholder tokens replaced.
//!
//! The spreadsheet and the presentation are reached only through the
//! [`Spreadsheet`], [`SlideDeck`] and [`Connector`] traits; concrete backends
//! live in `namedeck-data` and `namedeck-pptx`.
//!
//! # Example
//!
//! ```
//! use namedeck_core::{format_display_name, shuffle};
//!
//! let names = vec!["John Smith", "Jane Doe"];
//! let display: Vec<String> = names.iter().map(|n| format_display_name(n)).collect();
//! assert_eq!(display, vec!["John S.", "Jane D."]);
//!
//! let shuffled = shuffle(&display);
//! assert_eq!(shuffled.len(), 2);
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod generator;
pub mod name;
pub mod shuffle;
pub mod source;

// Re-export main types and functions
pub use config::{DeckConfig, CONFIG_FILE_NAME, STANDARD_PLACEHOLDERS};
pub use driver::{
    cleanup, remove_trailing_slides, run, self_test, Connector, RunReport, SelfTestReport,
    SelfTestStep, StepOutcome, StepResult,
};
pub use error::{BoxError, DeckError, Result};
pub use generator::{generate_slide, ShapeText, SlideDeck};
pub use name::{format_display_name, CellValue};
pub use shuffle::{shuffle, shuffle_with};
pub use source::{read_names, Spreadsheet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
