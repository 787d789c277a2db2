//! Co-positivity labelling. Template formulas assume the combinations appear in the order
//! `channel_combinations` produces, so every label written here follows that order.

use std::ops::RangeInclusive;

use crate::document::{CellRange, CellValue, Col, Color, ConditionalFormat, Row, Sheet};
use crate::layout::coords::{
    ANALYSIS_LAST_COL, COPOSITIVITY_CHANNELS, FIRST_DATA_ROW, SUMMARY_FIRST_SAMPLE_ROW,
};
use crate::layout::{CoordinateTable, Span, channel_combinations, combination_names};
use crate::model::channel::positions_by_label;
use crate::model::{Channel, Metric};
use crate::pipeline::SampleSheet;
use crate::pipeline::stage1_merge::MergedSample;
use crate::template::builtin::{copositivity_flag_formula, lookup_formula};
use crate::template::{CopyMode, Template, copy_from_template, repeat_template_row};

const SCALE_MIN_COLOR: Color = Color::WHITE;
const SCALE_MAX_COLOR: Color = Color(0xFF5370);

/// Where co-positivity landed on one sample sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopositivityPlacement {
    pub columns: Span<Col>,
    pub rows: Span<Row>,
    pub combinations: usize,
}

/// Whether a sample sheet gets a co-positivity block: the channel count must be one
/// co-positivity is defined for and the coordinate table must cover it.
pub fn copositivity_supported(coords: &CoordinateTable, metric: Metric, n_channels: usize) -> bool {
    COPOSITIVITY_CHANNELS.contains(&n_channels) && coords.supports_copositivity(metric, n_channels)
}

/// Labels as shown in combination names: `C2` for `Channel 2 (C2)`, the label itself when
/// it carries no parenthesised part.
pub fn display_labels(channels: &[Channel]) -> Vec<&str> {
    channels.iter().map(Channel::short_label).collect()
}

pub fn run_stage3_sheet(
    template: &Template,
    sheet: &mut Sheet,
    sample: &MergedSample,
    metric: Metric,
    coords: &CoordinateTable,
    analysis_end: Row,
) -> Option<CopositivityPlacement> {
    let n = sample.n_channels();
    if !copositivity_supported(coords, metric, n) {
        return None;
    }
    let columns = coords.sheet_copositivity(n)?;
    let rows = coords.copositivity_analysis(metric, n)?;

    let last_row = sheet.max_row();
    copy_from_template(
        template.sheet(),
        sheet,
        1..=last_row,
        columns.range(),
        columns.range(),
        CopyMode::ALL,
    );
    let template_last = template.sheet().max_row();
    if last_row > template_last {
        extend_flag_rows(template.sheet(), sheet, n, columns, template_last + 1..=last_row);
    }

    let names = combination_names(&display_labels(&sample.channels));
    for (offset, name) in names.iter().enumerate() {
        sheet.set_value(2, columns.start + 1 + offset as Col, name.as_str());
    }

    if columns.end > columns.start + 1 && last_row >= FIRST_DATA_ROW {
        sheet.add_conditional_format(ConditionalFormat::ColorScale {
            range: CellRange::new(FIRST_DATA_ROW, columns.start + 1, last_row, columns.end - 1),
            min_color: SCALE_MIN_COLOR,
            max_color: SCALE_MAX_COLOR,
        });
    }

    copy_from_template(
        template.sheet(),
        sheet,
        rows.range(),
        1..=ANALYSIS_LAST_COL,
        1..=ANALYSIS_LAST_COL,
        CopyMode::ALL,
    );
    for (offset, name) in names.iter().enumerate() {
        sheet.set_value(analysis_end + 3 + offset as Row, 1, name.as_str());
    }

    Some(CopositivityPlacement {
        columns,
        rows,
        combinations: names.len(),
    })
}

/// Continues the per-slice flag formulas below the last row the template was drawn with.
fn extend_flag_rows(
    template: &Sheet,
    sheet: &mut Sheet,
    n_channels: usize,
    columns: Span<Col>,
    rows: RangeInclusive<Row>,
) {
    crate::debug!(
        "{}: extending co-positivity flags to row {}",
        sheet.name(),
        rows.end()
    );
    repeat_template_row(
        template,
        sheet,
        rows.start() - 1,
        rows.clone(),
        columns.range(),
        columns.range(),
        CopyMode::STYLE_ONLY,
    );
    let positions: Vec<usize> = (0..n_channels).collect();
    for (offset, combo) in channel_combinations(&positions).iter().enumerate() {
        let col = columns.start + 1 + offset as Col;
        if col >= columns.end {
            break;
        }
        for row in rows.clone() {
            sheet.set_value(row, col, CellValue::Formula(copositivity_flag_formula(row, combo)));
        }
    }
}

/// Outcome of the once-per-run summary block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryCopositivity {
    Placed { columns: Span<Col>, labels: usize },
    Skipped(String),
}

/// Copies the summary co-positivity columns sized for the largest sample and labels them
/// with combinations over every channel seen in the run. Each sample row then reads the
/// total of the same combination from that sample's own sheet, or stays blank when the
/// sample lacks one of its channels.
pub fn run_stage3_summary(
    template: &Template,
    summary: &mut Sheet,
    coords: &CoordinateTable,
    max_channels: usize,
    union: &[Channel],
    sheets: &[SampleSheet],
) -> SummaryCopositivity {
    if !COPOSITIVITY_CHANNELS.contains(&max_channels) {
        return SummaryCopositivity::Skipped(format!(
            "co-positivity is not defined for {max_channels} channels"
        ));
    }
    let Some(columns) = coords.summary_copositivity(max_channels) else {
        return SummaryCopositivity::Skipped(format!(
            "no summary co-positivity layout for {max_channels} channels"
        ));
    };
    let last_row = summary.max_row();
    copy_from_template(
        template.sheet(),
        summary,
        1..=last_row,
        columns.range(),
        columns.range(),
        CopyMode::ALL,
    );
    let template_last = template.sheet().max_row();
    if last_row > template_last {
        repeat_template_row(
            template.sheet(),
            summary,
            template_last,
            template_last + 1..=last_row,
            columns.range(),
            columns.range(),
            CopyMode::STYLE_ONLY,
        );
    }

    let names = combination_names(&display_labels(union));
    let capacity = columns.width().saturating_sub(1) as usize;
    if names.len() > capacity {
        crate::warn!(
            "{} channels across samples give {} combinations; the summary block sized for {} \
             channels holds {}",
            union.len(),
            names.len(),
            max_channels,
            capacity
        );
    }
    for (offset, name) in names.iter().take(capacity).enumerate() {
        summary.set_value(1, columns.start + offset as Col, name.as_str());
    }

    let union_positions: Vec<usize> = (0..union.len()).collect();
    let union_combos = channel_combinations(&union_positions);
    for (i, record) in sheets.iter().enumerate() {
        let row = SUMMARY_FIRST_SAMPLE_ROW + i as Row;
        let positions = positions_by_label(union, &record.channels);
        let own: Vec<usize> = (0..record.n_channels).collect();
        let own_combos = channel_combinations(&own);
        for (offset, combo) in union_combos.iter().take(capacity).enumerate() {
            let total_row = record.copositivity.as_ref().and_then(|placement| {
                let mapped = combo
                    .iter()
                    .map(|&u| positions[u])
                    .collect::<Option<Vec<usize>>>()?;
                let idx = own_combos.iter().position(|c| *c == mapped)?;
                (idx < placement.combinations).then(|| placement.rows.start + 2 + idx as Row)
            });
            let value = total_row.map(|r| CellValue::Formula(lookup_formula(row, 'B', r)));
            summary.put_value(row, columns.start + offset as Col, value);
        }
    }

    SummaryCopositivity::Placed {
        columns,
        labels: names.len().min(capacity),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_copositivity.rs"]
mod tests;
