//! Cell values and display-name formatting.
//!
//! Names arrive from the spreadsheet as [`CellValue`]s. Text cells are turned
//! into short display names (`"Maria Elena Garcia"` becomes `"Maria G."`);
//! every other value passes through untouched.

use std::fmt;

/// A scalar value read from one spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Cell without content
    Empty,
    /// Text cell
    Text(String),
    /// Numeric cell (integers are stored as whole floats)
    Number(f64),
    /// Boolean cell
    Bool(bool),
}

impl CellValue {
    /// True for empty cells, text that is blank after trimming, and falsy
    /// scalars (zero, NaN, `false`)
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Bool(b) => !b,
        }
    }

    /// Format this value as a display name.
    ///
    /// Only non-empty text is reformatted; any other value is returned as is.
    pub fn to_display_name(&self) -> CellValue {
        match self {
            CellValue::Text(s) if !s.is_empty() => CellValue::Text(format_display_name(s)),
            other => other.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.0}", n),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Turn a raw name into `"First L."`.
///
/// Whitespace runs are collapsed and the ends trimmed before splitting into
/// tokens. A single token is returned unchanged. With two or more tokens the
/// result is the first token (leading letter uppercased), a space, the
/// uppercased first character of the last token and a period.
///
/// ```
/// use namedeck_core::format_display_name;
///
/// assert_eq!(format_display_name("Maria Elena Garcia"), "Maria G.");
/// assert_eq!(format_display_name("  Ana   Maria   Lopez  "), "Ana L.");
/// assert_eq!(format_display_name("Madonna"), "Madonna");
/// ```
pub fn format_display_name(raw: &str) -> String {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    match tokens.as_slice() {
        [] => String::new(),
        [single] => (*single).to_string(),
        [first, .., last] => {
            let initial: String = last
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default();
            format!("{} {}.", capitalize(first), initial)
        }
    }
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
