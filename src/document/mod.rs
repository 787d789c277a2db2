//! In-memory report document: named sheets of sparse, 1-based cell grids.
//!
//! Everything the pipeline writes lands here first; `report::xlsx` renders the finished
//! document once, after the formatter has run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub mod style;

pub use style::{CellStyle, Color};

pub type Row = u32;
pub type Col = u16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Stored with its leading `=`.
    Formula(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Character length of the value as displayed, formulas excluded.
    pub fn display_len(&self) -> Option<usize> {
        match self {
            CellValue::Text(s) => Some(s.chars().count()),
            CellValue::Number(v) => Some(format!("{v}").len()),
            CellValue::Formula(_) => None,
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

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: Option<CellValue>,
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.style.is_none()
    }
}

/// Inclusive rectangular range, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub first_row: Row,
    pub first_col: Col,
    pub last_row: Row,
    pub last_col: Col,
}

impl CellRange {
    pub fn new(first_row: Row, first_col: Col, last_row: Row, last_col: Col) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.first_row >= 1
            && self.first_col >= 1
            && self.first_row <= self.last_row
            && self.first_col <= self.last_col
    }

    pub fn to_a1(&self) -> String {
        format!(
            "{}:{}",
            cell_ref(self.first_row, self.first_col),
            cell_ref(self.last_row, self.last_col)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalFormat {
    /// Solid fill when the cell value is greater than `threshold`.
    GreaterThanFill {
        range: CellRange,
        threshold: f64,
        fill: Color,
    },
    /// Two-color scale from the range minimum to its maximum.
    ColorScale {
        range: CellRange,
        min_color: Color,
        max_color: Color,
    },
}

impl ConditionalFormat {
    pub fn range(&self) -> CellRange {
        match self {
            ConditionalFormat::GreaterThanFill { range, .. } => *range,
            ConditionalFormat::ColorScale { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(Row, Col), Cell>,
    conditional_formats: Vec<ConditionalFormat>,
    column_widths: BTreeMap<Col, f64>,
    row_heights: BTreeMap<Row, f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self, row: Row, col: Col) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn value(&self, row: Row, col: Col) -> Option<&CellValue> {
        self.cell(row, col).and_then(|c| c.value.as_ref())
    }

    pub fn text(&self, row: Row, col: Col) -> Option<&str> {
        self.value(row, col).and_then(CellValue::as_text)
    }

    pub fn style(&self, row: Row, col: Col) -> Option<&CellStyle> {
        self.cell(row, col).and_then(|c| c.style.as_ref())
    }

    pub fn set_value(&mut self, row: Row, col: Col, value: impl Into<CellValue>) {
        self.cells.entry((row, col)).or_default().value = Some(value.into());
    }

    /// Replaces the value, clearing it when `value` is `None`.
    pub fn put_value(&mut self, row: Row, col: Col, value: Option<CellValue>) {
        match value {
            Some(v) => self.set_value(row, col, v),
            None => {
                if let Some(cell) = self.cells.get_mut(&(row, col)) {
                    cell.value = None;
                    if cell.is_empty() {
                        self.cells.remove(&(row, col));
                    }
                }
            }
        }
    }

    pub fn set_style(&mut self, row: Row, col: Col, style: CellStyle) {
        self.cells.entry((row, col)).or_default().style = Some(style);
    }

    pub fn cells(&self) -> impl Iterator<Item = ((Row, Col), &Cell)> {
        self.cells.iter().map(|(k, v)| (*k, v))
    }

    /// Last row holding a value or a style; 0 for an empty sheet.
    pub fn max_row(&self) -> Row {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }

    pub fn max_column(&self) -> Col {
        self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0)
    }

    pub fn min_column(&self) -> Col {
        self.cells.keys().map(|(_, c)| *c).min().unwrap_or(0)
    }

    pub fn add_conditional_format(&mut self, format: ConditionalFormat) {
        self.conditional_formats.push(format);
    }

    pub fn conditional_formats(&self) -> &[ConditionalFormat] {
        &self.conditional_formats
    }

    pub fn set_column_width(&mut self, col: Col, width: f64) {
        self.column_widths.insert(col, width);
    }

    #[cfg(test)]
    pub fn column_width(&self, col: Col) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (Col, f64)> + '_ {
        self.column_widths.iter().map(|(c, w)| (*c, *w))
    }

    pub fn set_row_height(&mut self, row: Row, height: f64) {
        self.row_heights.insert(row, height);
    }

    #[cfg(test)]
    pub fn row_height(&self, row: Row) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn row_heights(&self) -> impl Iterator<Item = (Row, f64)> + '_ {
        self.row_heights.iter().map(|(r, h)| (*r, *h))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sheets: Vec<Sheet>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet, or returns the existing one with that name.
    pub fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        let idx = match self.sheets.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }

    #[cfg(test)]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

pub fn column_letter(col: Col) -> String {
    let mut n = col as u32;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn cell_ref(row: Row, col: Col) -> String {
    format!("{}{}", column_letter(col), row)
}

pub const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Makes `raw` a legal xlsx sheet name that does not collide, ignoring case, with any name
/// in `taken`. The chosen name is added to `taken` in lowercase.
pub fn unique_sheet_name(raw: &str, taken: &mut BTreeSet<String>) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base = if cleaned.is_empty() { "Sheet" } else { cleaned };
    let base: String = base.chars().take(MAX_SHEET_NAME_LEN).collect();

    let mut candidate = base.clone();
    let mut suffix = 2usize;
    while taken.contains(&candidate.to_lowercase()) {
        let tail = format!("_{suffix}");
        let keep = MAX_SHEET_NAME_LEN - tail.len();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), tail);
        suffix += 1;
    }
    taken.insert(candidate.to_lowercase());
    candidate
}

#[cfg(test)]
#[path = "../../tests/src_inline/document/mod.rs"]
mod tests;
