use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::model::{Metric, RunNotices};

#[derive(Debug, Clone, Serialize)]
pub struct SheetSummary {
    pub sample: String,
    pub sheet: String,
    pub channels: usize,
    pub copositivity: bool,
}

/// Machine-readable account of one run, written next to the workbook.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub experiment: &'a str,
    pub metric: Metric,
    pub input_files: usize,
    pub sheets: Vec<SheetSummary>,
    #[serde(flatten)]
    pub notices: &'a RunNotices,
}

pub fn render_notices(summary: &RunSummary<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

pub fn write_notices(path: &Path, summary: &RunSummary<'_>) -> std::io::Result<()> {
    let json = render_notices(summary)?;
    fs::write(path, json)?;
    crate::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/notices.rs"]
mod tests;
