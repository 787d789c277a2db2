//! Merge, then stamp templates, then label co-positivity, then the summary, then format.
//!
//! Every stage mutates the same in-memory document and later stages read what earlier ones
//! wrote, so nothing is flushed between stages. The document is rendered once, by the caller.

use crate::document::{Col, Document, Row};
use crate::input::SampleTables;
use crate::layout::{CoordinateTable, Span};
use crate::model::{Channel, ChannelOrder, Metric, RunNotices};
use crate::template::{TemplateError, TemplateSet};

pub mod stage1_merge;
pub mod stage2_sheets;
pub mod stage3_copositivity;
pub mod stage4_summary;
pub mod stage5_format;

use stage1_merge::{SUMMARY_SHEET, run_stage1, write_stage1};
use stage2_sheets::run_stage2;
use stage3_copositivity::{
    CopositivityPlacement, SummaryCopositivity, copositivity_supported, run_stage3_sheet,
    run_stage3_summary,
};
use stage4_summary::run_stage4;
use stage5_format::{format_sample_sheet, format_summary_sheet};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no files processed")]
    NoSamples,
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("sheet {0} disappeared from the document")]
    MissingSheet(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Merge,
    Sheets,
    Copositivity,
    Summary,
    Format,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Merge => "merge",
            Stage::Sheets => "sheet templates",
            Stage::Copositivity => "co-positivity",
            Stage::Summary => "summary",
            Stage::Format => "format",
        }
    }
}

/// Optional progress callbacks. Nothing in the pipeline depends on them.
pub trait ProgressObserver {
    fn stage_started(&mut self, _stage: Stage, _total: usize) {}
    fn sample_done(&mut self, _stage: Stage, _sample: &str, _done: usize, _total: usize) {}
    fn stage_finished(&mut self, _stage: Stage) {}
}

/// Logs every checkpoint at debug level.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn stage_started(&mut self, stage: Stage, total: usize) {
        crate::debug!("{}: starting [0/{}]", stage.as_str(), total);
    }

    fn sample_done(&mut self, stage: Stage, sample: &str, done: usize, total: usize) {
        crate::debug!("{}: {} [{}/{}]", stage.as_str(), sample, done, total);
    }

    fn stage_finished(&mut self, stage: Stage) {
        crate::debug!("{}: done", stage.as_str());
    }
}

pub struct PipelineInput<'a> {
    pub samples: &'a SampleTables,
    pub channel_order: &'a ChannelOrder,
    pub metric: Metric,
    pub templates: &'a TemplateSet,
    pub coords: &'a CoordinateTable,
}

/// Per-sample record of what was placed where.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSheet {
    pub sample: String,
    pub sheet_name: String,
    pub n_channels: usize,
    /// Resolved channels in sheet column order.
    pub channels: Vec<Channel>,
    pub analysis_end: Row,
    pub copositivity: Option<CopositivityPlacement>,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub document: Document,
    pub sheets: Vec<SampleSheet>,
    pub summary_copositivity: Option<Span<Col>>,
    pub notices: RunNotices,
}

pub fn run_pipeline(
    input: &PipelineInput<'_>,
    observer: &mut dyn ProgressObserver,
) -> Result<PipelineOutput, PipelineError> {
    let metric = input.metric;
    let mut notices = RunNotices::default();

    observer.stage_started(Stage::Merge, input.samples.len());
    let merged = run_stage1(input.samples, input.channel_order, metric);
    notices.skipped_samples = merged.skipped;
    notices.file_issues = merged.file_issues;
    notices.unknown_channels = merged.unknown_channels;
    if merged.samples.is_empty() {
        return Err(PipelineError::NoSamples);
    }
    let samples = merged.samples;
    let mut document = Document::new();
    write_stage1(&mut document, &samples);
    observer.stage_finished(Stage::Merge);

    let total = samples.len();
    let mut sheets = Vec::with_capacity(total);
    observer.stage_started(Stage::Sheets, total);
    for (done, sample) in samples.iter().enumerate() {
        let n = sample.n_channels();
        let template = input.templates.sheet_template(metric, n)?;
        let append_copositivity = copositivity_supported(input.coords, metric, n);
        let sheet = document
            .sheet_mut(&sample.sheet_name)
            .ok_or_else(|| PipelineError::MissingSheet(sample.sheet_name.clone()))?;
        let analysis_end = run_stage2(template, sheet, sample, metric, append_copositivity);
        sheets.push(SampleSheet {
            sample: sample.sample.clone(),
            sheet_name: sample.sheet_name.clone(),
            n_channels: n,
            channels: sample.channels.clone(),
            analysis_end,
            copositivity: None,
        });
        observer.sample_done(Stage::Sheets, &sample.sample, done + 1, total);
    }
    observer.stage_finished(Stage::Sheets);

    observer.stage_started(Stage::Copositivity, total);
    for (done, (sample, record)) in samples.iter().zip(sheets.iter_mut()).enumerate() {
        let template = input.templates.sheet_template(metric, record.n_channels)?;
        let sheet = document
            .sheet_mut(&sample.sheet_name)
            .ok_or_else(|| PipelineError::MissingSheet(sample.sheet_name.clone()))?;
        record.copositivity = run_stage3_sheet(
            template,
            sheet,
            sample,
            metric,
            input.coords,
            record.analysis_end,
        );
        if record.copositivity.is_none() {
            crate::info!(
                "no co-positivity for {} ({} channels)",
                sample.sample,
                record.n_channels
            );
            notices.copositivity_skipped.push(sample.sample.clone());
        }
        observer.sample_done(Stage::Copositivity, &sample.sample, done + 1, total);
    }

    let max_channels = samples.iter().map(|s| s.n_channels()).max().unwrap_or(0);
    let union = input
        .channel_order
        .union_of(samples.iter().map(|s| s.channels.as_slice()));
    let summary_template = input.templates.summary_template(metric, max_channels)?;
    let summary = document
        .sheet_mut(SUMMARY_SHEET)
        .ok_or_else(|| PipelineError::MissingSheet(SUMMARY_SHEET.to_string()))?;
    let summary_copositivity = match run_stage3_summary(
        summary_template,
        summary,
        input.coords,
        max_channels,
        &union,
        &sheets,
    ) {
        SummaryCopositivity::Placed { columns, labels } => {
            crate::debug!("summary co-positivity: {} labels", labels);
            Some(columns)
        }
        SummaryCopositivity::Skipped(reason) => {
            crate::info!("summary co-positivity skipped: {}", reason);
            None
        }
    };
    observer.stage_finished(Stage::Copositivity);

    observer.stage_started(Stage::Summary, 1);
    let legend = run_stage4(
        summary_template,
        summary,
        metric,
        max_channels,
        &union,
        &sheets,
        summary_copositivity,
    );
    crate::debug!("summary legend: {}", legend.legend.join(", "));
    observer.stage_finished(Stage::Summary);

    observer.stage_started(Stage::Format, total + 1);
    format_summary_sheet(summary);
    for (done, record) in sheets.iter().enumerate() {
        let sheet = document
            .sheet_mut(&record.sheet_name)
            .ok_or_else(|| PipelineError::MissingSheet(record.sheet_name.clone()))?;
        format_sample_sheet(sheet, record.n_channels, record.copositivity.as_ref());
        observer.sample_done(Stage::Format, &record.sample, done + 1, total);
    }
    observer.stage_finished(Stage::Format);

    Ok(PipelineOutput {
        document,
        sheets,
        summary_copositivity,
        notices,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
