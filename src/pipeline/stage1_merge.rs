use std::collections::{BTreeSet, HashMap};

use crate::document::{CellValue, Document, unique_sheet_name};
use crate::input::{SampleEntry, SampleTables};
use crate::layout::coords::{DATA_HEADER_ROW, DATA_START_COL, FIRST_DATA_ROW, SUMMARY_FIRST_SAMPLE_ROW};
use crate::model::{
    Channel, ChannelOrder, FileIssue, MergedTable, Metric, RawTable, SkippedSample,
    UnknownChannel, parse_measurement,
};

pub const SUMMARY_SHEET: &str = "summary";
pub const SLICE_COLUMN: &str = "Slice";
/// Written in place of missing measurements.
pub const MISSING_VALUE: &str = "NaN";

/// A retained sample: two or more resolved channels.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSample {
    pub sample: String,
    /// Legal, unique sheet name; also the text written to the summary sample column.
    pub sheet_name: String,
    pub table: MergedTable,
    /// Resolved channels in declared order, matching the table columns.
    pub channels: Vec<Channel>,
}

impl MergedSample {
    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stage1Output {
    pub samples: Vec<MergedSample>,
    pub skipped: Vec<SkippedSample>,
    pub file_issues: Vec<FileIssue>,
    pub unknown_channels: Vec<UnknownChannel>,
}

pub fn run_stage1(tables: &SampleTables, order: &ChannelOrder, metric: Metric) -> Stage1Output {
    let mut out = Stage1Output::default();
    let mut taken = BTreeSet::from([SUMMARY_SHEET.to_string()]);

    for entry in tables.iter() {
        let (table, channels) = merge_sample(entry, order, metric, &mut out);
        if channels.len() < 2 {
            let reason = format!(
                "{} resolved channel(s); at least 2 are needed",
                channels.len()
            );
            crate::warn!("skipping sample {}: {}", entry.name, reason);
            out.skipped.push(SkippedSample {
                sample: entry.name.clone(),
                reason,
            });
            continue;
        }
        let sheet_name = unique_sheet_name(&entry.name, &mut taken);
        if sheet_name != entry.name {
            crate::info!("sample {} is written to sheet {}", entry.name, sheet_name);
        }
        out.samples.push(MergedSample {
            sample: entry.name.clone(),
            sheet_name,
            table,
            channels,
        });
    }
    out
}

/// Joins one sample's channel tables on the slice label. Columns follow declared channel
/// order; slices keep the order they were first seen in.
pub fn merge_sample(
    entry: &SampleEntry,
    order: &ChannelOrder,
    metric: Metric,
    out: &mut Stage1Output,
) -> (MergedTable, Vec<Channel>) {
    let mut resolved: Vec<(usize, &Channel, Vec<(String, Option<f64>)>)> = Vec::new();
    for channel_table in &entry.channels {
        let (Some(position), Some(channel)) = (
            order.position(&channel_table.channel),
            order.get(&channel_table.channel),
        ) else {
            out.unknown_channels.push(UnknownChannel {
                file: channel_table.source.clone(),
                channel: channel_table.channel.clone(),
            });
            continue;
        };
        match channel_measurements(&channel_table.table, metric) {
            Some(values) => resolved.push((position, channel, values)),
            None => {
                crate::warn!(
                    "{} has no '{}' column",
                    channel_table.source,
                    metric.column_name()
                );
                out.file_issues.push(FileIssue {
                    file: channel_table.source.clone(),
                    reason: format!("missing measurement column '{}'", metric.column_name()),
                });
            }
        }
    }
    resolved.sort_by_key(|(position, _, _)| *position);

    let mut table = MergedTable {
        channels: resolved.iter().map(|(_, c, _)| c.name.clone()).collect(),
        ..MergedTable::default()
    };
    let n_channels = resolved.len();
    let mut row_of: HashMap<String, usize> = HashMap::new();
    for (col, (_, _, values)) in resolved.iter().enumerate() {
        for (slice, value) in values {
            let row = match row_of.get(slice) {
                Some(&row) => row,
                None => {
                    table.slices.push(slice.clone());
                    table.values.push(vec![None; n_channels]);
                    row_of.insert(slice.clone(), table.slices.len() - 1);
                    table.slices.len() - 1
                }
            };
            table.values[row][col] = *value;
        }
    }

    let channels = resolved.into_iter().map(|(_, c, _)| c.clone()).collect();
    (table, channels)
}

/// Slice-labelled metric values of one raw table, or `None` when the metric column is absent.
pub fn channel_measurements(table: &RawTable, metric: Metric) -> Option<Vec<(String, Option<f64>)>> {
    let values = table.column(metric.column_name())?;
    let generated = || (1..=values.len()).map(|i| format!("Slice_{i}")).collect::<Vec<_>>();
    let slices = match table.column(SLICE_COLUMN) {
        Some(labels) if !labels.iter().any(|l| l.is_empty()) => {
            let distinct: BTreeSet<&str> = labels.iter().copied().collect();
            if distinct.len() == labels.len() {
                labels.iter().map(|l| l.to_string()).collect()
            } else {
                crate::debug!("repeated slice labels; numbering slices instead");
                generated()
            }
        }
        _ => generated(),
    };
    Some(
        slices
            .into_iter()
            .zip(values.iter().map(|v| parse_measurement(v)))
            .collect(),
    )
}

/// Creates the summary sheet first, then one sheet per retained sample holding its merged
/// table, and lists the sheet names down the summary sample column.
pub fn write_stage1(document: &mut Document, samples: &[MergedSample]) {
    document.add_sheet(SUMMARY_SHEET);
    for sample in samples {
        let sheet = document.add_sheet(&sample.sheet_name);
        sheet.set_value(DATA_HEADER_ROW, DATA_START_COL, SLICE_COLUMN);
        for (col, channel) in sample.table.channels.iter().enumerate() {
            sheet.set_value(DATA_HEADER_ROW, DATA_START_COL + 1 + col as u16, channel.as_str());
        }
        for (row, slice) in sample.table.slices.iter().enumerate() {
            let r = FIRST_DATA_ROW + row as u32;
            sheet.set_value(r, DATA_START_COL, slice.as_str());
            for (col, value) in sample.table.values[row].iter().enumerate() {
                let cell = match value {
                    Some(v) => CellValue::Number(*v),
                    None => CellValue::from(MISSING_VALUE),
                };
                sheet.set_value(r, DATA_START_COL + 1 + col as u16, cell);
            }
        }
    }

    if let Some(summary) = document.sheet_mut(SUMMARY_SHEET) {
        for (i, sample) in samples.iter().enumerate() {
            summary.set_value(
                SUMMARY_FIRST_SAMPLE_ROW + i as u32,
                1,
                sample.sheet_name.as_str(),
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_merge.rs"]
mod tests;
