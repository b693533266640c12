//! Run configuration.
//!
//! Every run is driven by an explicit [`DeckConfig`], usually loaded from
//! `namedeck.toml`:
//!
//! ```toml
//! spreadsheet = "names.xlsx"
//! presentation = "deck.pptx"
//! sheet = "Sheet1"
//! column = "A:A"
//! template_slide_index = 1
//! keep_count = 2
//! placeholders = ["{{NAME}}", "{{name}}", "[NAME]", "[name]", "NAME_PLACEHOLDER"]
//! ```
//!
//! All fields are required and unknown fields are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};

/// Placeholder tokens recognised by the stock template
pub const STANDARD_PLACEHOLDERS: [&str; 5] =
    ["{{NAME}}", "{{name}}", "[NAME]", "[name]", "NAME_PLACEHOLDER"];

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "namedeck.toml";

/// Identifiers and constants for one deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeckConfig {
    /// Spreadsheet holding the names
    pub spreadsheet: String,
    /// Presentation holding the template slide
    pub presentation: String,
    /// Sheet tab name
    pub sheet: String,
    /// Name column designator (e.g. `A:A`)
    pub column: String,
    /// 0-based index of the template slide
    pub template_slide_index: usize,
    /// Leading slides preserved by cleanup
    pub keep_count: usize,
    /// Literal tokens replaced with the display name
    pub placeholders: Vec<String>,
}

impl DeckConfig {
    /// Starter configuration written by `namedeck init`
    pub fn starter(spreadsheet: impl Into<String>, presentation: impl Into<String>) -> Self {
        Self {
            spreadsheet: spreadsheet.into(),
            presentation: presentation.into(),
            sheet: "Sheet1".to_string(),
            column: "A:A".to_string(),
            template_slide_index: 1,
            keep_count: 2,
            placeholders: STANDARD_PLACEHOLDERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse and validate a configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// Relative spreadsheet and presentation paths are resolved against the
    /// directory containing the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }

        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that every identifier is present and the placeholder list is usable
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("spreadsheet", &self.spreadsheet),
            ("presentation", &self.presentation),
            ("sheet", &self.sheet),
            ("column", &self.column),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DeckError::config(format!("'{}' must not be empty", field)));
            }
        }

        if self.placeholders.is_empty() {
            return Err(DeckError::config("'placeholders' must list at least one token"));
        }
        if self.placeholders.iter().any(|token| token.is_empty()) {
            return Err(DeckError::config("'placeholders' must not contain empty tokens"));
        }

        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for field in [&mut self.spreadsheet, &mut self.presentation] {
            if Path::new(field.as_str()).is_relative() {
                *field = base.join(field.as_str()).display().to_string();
            }
        }
    }
}
