use crate::document::{CellRange, Color, ConditionalFormat, Row, Sheet};
use crate::layout::coords::{
    ANALYSIS_LAST_COL, BLANK_TEMPLATE_COL, BODY_MIN_ROWS, DATA_HEADER_ROW, FIRST_DATA_ROW,
    SEPARATOR_LAST_COL, analysis_end_row, channel_block_row, channel_col,
};
use crate::model::Metric;
use crate::pipeline::stage1_merge::MergedSample;
use crate::template::{CopyMode, Template, copy_from_template, repeat_template_row};

/// Fill for "value > 0" in each channel data column, by channel position.
const CHANNEL_PALETTE: [u32; 15] = [
    0xE99BB5, 0xF9DFE5, 0xF2E4E9, 0xFFF2EF, 0xFFEFE7, 0xE1EEF1, 0xB2DFDB, 0xE8F6F3, 0xDDF2F1,
    0xDEF4FB, 0xC2ECFF, 0xD5DBEE, 0xE6E9F1, 0xCFD0D3, 0xEAEBED,
];

pub fn channel_color(index: usize) -> Option<Color> {
    CHANNEL_PALETTE.get(index).map(|rgb| Color(*rgb))
}

/// Stamps the data-region styles and the analysis block onto one sample sheet. Returns
/// the last analysis row.
pub fn run_stage2(
    template: &Template,
    sheet: &mut Sheet,
    sample: &MergedSample,
    metric: Metric,
    append_copositivity: bool,
) -> Row {
    style_data_region(template.sheet(), sheet);
    relabel_channels(sheet, sample);
    parse_analysis_block(template.sheet(), sheet, sample, metric, append_copositivity)
}

fn style_data_region(template: &Sheet, sheet: &mut Sheet) {
    let last_row = sheet.max_row().max(BODY_MIN_ROWS);
    let first_col = sheet.min_column();
    let last_col = sheet.max_column();
    let cols = first_col..=last_col;

    copy_from_template(template, sheet, 1..=2, cols.clone(), cols.clone(), CopyMode::ALL);
    copy_from_template(
        template,
        sheet,
        DATA_HEADER_ROW..=last_row,
        cols.clone(),
        cols.clone(),
        CopyMode::STYLE_ONLY,
    );
    let template_last = template.max_row();
    let beyond_template = template_last + 1..=last_row;
    if !beyond_template.is_empty() {
        repeat_template_row(
            template,
            sheet,
            template_last,
            beyond_template.clone(),
            cols.clone(),
            cols,
            CopyMode::STYLE_ONLY,
        );
    }

    for (index, col) in (first_col + 1..=last_col).enumerate() {
        let Some(fill) = channel_color(index) else {
            continue;
        };
        sheet.add_conditional_format(ConditionalFormat::GreaterThanFill {
            range: CellRange::new(FIRST_DATA_ROW, col, last_row, col),
            threshold: 0.0,
            fill,
        });
    }

    let blank = last_col + 1;
    copy_from_template(
        template,
        sheet,
        1..=last_row,
        BLANK_TEMPLATE_COL..=BLANK_TEMPLATE_COL,
        blank..=blank,
        CopyMode::STYLE_ONLY,
    );
    if !beyond_template.is_empty() {
        repeat_template_row(
            template,
            sheet,
            template_last,
            beyond_template,
            BLANK_TEMPLATE_COL..=BLANK_TEMPLATE_COL,
            blank..=blank,
            CopyMode::STYLE_ONLY,
        );
    }
}

/// The header copy brings the template's canonical ordinals; put back the ordinal each
/// channel was declared with.
fn relabel_channels(sheet: &mut Sheet, sample: &MergedSample) {
    for (index, channel) in sample.channels.iter().enumerate() {
        let col = channel_col(index);
        if sheet.text(DATA_HEADER_ROW, col) == Some(channel.name.as_str()) {
            sheet.set_value(2, col, channel.label.as_str());
        }
    }
}

fn parse_analysis_block(
    template: &Sheet,
    sheet: &mut Sheet,
    sample: &MergedSample,
    metric: Metric,
    append_copositivity: bool,
) -> Row {
    let n = sample.n_channels();
    let end_row = analysis_end_row(metric, n);
    copy_from_template(
        template,
        sheet,
        1..=end_row,
        1..=ANALYSIS_LAST_COL,
        1..=ANALYSIS_LAST_COL,
        CopyMode::ALL,
    );

    for index in 0..n {
        let row = channel_block_row(metric, index);
        let col = channel_col(index);
        let label = sheet.value(2, col).cloned();
        let name = sheet.value(DATA_HEADER_ROW, col).cloned();
        sheet.put_value(row, 1, label);
        sheet.put_value(row, 2, name);
    }

    if !append_copositivity {
        draw_separator(sheet, end_row + 1);
    }
    end_row
}

/// Solid black fill across the analysis columns of `row`, other attributes kept.
pub fn draw_separator(sheet: &mut Sheet, row: Row) {
    for col in 1..=SEPARATOR_LAST_COL {
        let style = sheet.style(row, col).cloned().unwrap_or_default().fill(Color::BLACK);
        sheet.set_style(row, col, style);
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_sheets.rs"]
mod tests;
