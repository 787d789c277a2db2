use crate::document::{CellValue, Col, Row, Sheet};
use crate::layout::Span;
use crate::layout::coords::{
    SUMMARY_CHANNEL_STRIDE, SUMMARY_FIRST_SAMPLE_ROW, channel_block_row, summary_channel_col,
};
use crate::model::channel::positions_by_label;
use crate::model::{Channel, Metric};
use crate::pipeline::SampleSheet;
use crate::template::builtin::{lookup_formula, summary_measures};
use crate::template::{CopyMode, Template, copy_from_template, repeat_template_row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage4Output {
    /// Channels written to the header legend, in column order.
    pub legend: Vec<String>,
    /// Legend entries left out because they would overwrite co-positivity labels.
    pub dropped: Vec<String>,
}

/// Copies the per-channel summary columns for `max_channels` channels, writes the
/// `label:` / name legend for every channel in `union`, and points each sample row at the
/// analysis block of that channel on the sample's own sheet.
pub fn run_stage4(
    template: &Template,
    summary: &mut Sheet,
    metric: Metric,
    max_channels: usize,
    union: &[Channel],
    sheets: &[SampleSheet],
    copositivity: Option<Span<Col>>,
) -> Stage4Output {
    let last_row = summary.max_row().max(2);
    let template_last = template.sheet().max_row();
    copy_from_template(template.sheet(), summary, 1..=2, 1..=1, 1..=1, CopyMode::ALL);
    let last_col = SUMMARY_CHANNEL_STRIDE * max_channels as Col;
    if last_col >= 2 {
        copy_from_template(
            template.sheet(),
            summary,
            1..=last_row,
            2..=last_col,
            2..=last_col,
            CopyMode::ALL,
        );
        if last_row > template_last {
            repeat_template_row(
                template.sheet(),
                summary,
                template_last,
                template_last + 1..=last_row,
                2..=last_col,
                2..=last_col,
                CopyMode::STYLE_ONLY,
            );
        }
    }

    let mut out = Stage4Output {
        legend: Vec::new(),
        dropped: Vec::new(),
    };
    let mut placed = Vec::with_capacity(union.len());
    for (index, channel) in union.iter().enumerate() {
        let col = summary_channel_col(index);
        let overlaps = copositivity.is_some_and(|span| col + 1 >= span.start && col <= span.end);
        if overlaps {
            crate::warn!(
                "no room for the {} legend on the summary sheet; column {} holds co-positivity",
                channel.name,
                col
            );
            out.dropped.push(channel.name.clone());
            continue;
        }
        if index >= max_channels {
            // Past the copied columns; borrow the first block's look.
            let first = summary_channel_col(0);
            copy_from_template(
                template.sheet(),
                summary,
                1..=last_row.min(template_last),
                first..=first + 2,
                col..=col + 2,
                CopyMode::STYLE_ONLY,
            );
        }
        summary.set_value(1, col, format!("{}:", channel.label));
        summary.set_value(1, col + 1, channel.name.as_str());
        out.legend.push(channel.name.clone());
        placed.push(index);
    }

    write_sample_rows(summary, metric, union, sheets, &placed);
    out
}

/// One row per sample sheet: each measure reads the block of the same channel on that
/// sheet, found by label. Channels the sample does not have stay blank.
fn write_sample_rows(
    summary: &mut Sheet,
    metric: Metric,
    union: &[Channel],
    sheets: &[SampleSheet],
    placed: &[usize],
) {
    let measures = summary_measures(metric);
    for (i, record) in sheets.iter().enumerate() {
        let row = SUMMARY_FIRST_SAMPLE_ROW + i as Row;
        let positions = positions_by_label(union, &record.channels);
        for &index in placed {
            let col = summary_channel_col(index);
            for (k, (_, offset, _)) in measures.iter().enumerate() {
                let value = positions[index].map(|p| {
                    CellValue::Formula(lookup_formula(row, 'D', channel_block_row(metric, p) + offset))
                });
                summary.put_value(row, col + k as Col, value);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_summary.rs"]
mod tests;
