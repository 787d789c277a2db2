//! Column widths and row heights. Runs last and never touches cell content.

use crate::document::{Col, Sheet};
use crate::layout::coords::{BLANK_TEMPLATE_COL, DATA_START_COL, SEPARATOR_LAST_COL, channel_col};
use crate::pipeline::stage3_copositivity::CopositivityPlacement;

pub const ANALYSIS_LABEL_WIDTH: f64 = 20.0;
pub const ANALYSIS_WIDTH: f64 = 15.0;
pub const SEPARATOR_WIDTH: f64 = 5.0;
pub const SLICE_WIDTH: f64 = 12.0;
pub const CHANNEL_WIDTH: f64 = 16.0;
pub const TITLE_ROW_HEIGHT: f64 = 20.0;
pub const SUMMARY_SAMPLE_WIDTH: f64 = 75.0;
const MIN_FIT_WIDTH: f64 = 8.43;
const MAX_FIT_WIDTH: f64 = 60.0;

pub fn format_sample_sheet(
    sheet: &mut Sheet,
    n_channels: usize,
    copositivity: Option<&CopositivityPlacement>,
) {
    sheet.set_column_width(1, ANALYSIS_LABEL_WIDTH);
    for col in 2..=SEPARATOR_LAST_COL {
        sheet.set_column_width(col, ANALYSIS_WIDTH);
    }
    sheet.set_column_width(BLANK_TEMPLATE_COL, SEPARATOR_WIDTH);
    sheet.set_column_width(DATA_START_COL, SLICE_WIDTH);
    for index in 0..n_channels {
        sheet.set_column_width(channel_col(index), CHANNEL_WIDTH);
    }
    sheet.set_column_width(channel_col(n_channels), SEPARATOR_WIDTH);
    if let Some(placement) = copositivity {
        sheet.set_column_width(placement.columns.end, SEPARATOR_WIDTH);
    }
    sheet.set_row_height(1, TITLE_ROW_HEIGHT);
}

pub fn format_summary_sheet(sheet: &mut Sheet) {
    sheet.set_column_width(1, SUMMARY_SAMPLE_WIDTH);
    for col in 2..=sheet.max_column() {
        if let Some(width) = fit_width(sheet, col) {
            sheet.set_column_width(col, width);
        }
    }
}

/// Width that fits the longest literal in `col`; formulas are not measured.
pub fn fit_width(sheet: &Sheet, col: Col) -> Option<f64> {
    let longest = sheet
        .cells()
        .filter(|((_, c), _)| *c == col)
        .filter_map(|(_, cell)| cell.value.as_ref().and_then(|v| v.display_len()))
        .max()?;
    Some((longest as f64 * 1.1 + 2.0).clamp(MIN_FIT_WIDTH, MAX_FIT_WIDTH))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_format.rs"]
mod tests;
