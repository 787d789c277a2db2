//! Read-only template assets and the engine that stamps them onto report sheets.
//!
//! A template is a single grid plus a versioned header naming its metric, the channel count
//! it was authored for, and the regions it promises to hold. The header is checked against
//! the coordinate table before any sheet is touched, so a template edited out of step with
//! the table fails at startup instead of writing labels into the wrong cells.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::{CellStyle, CellValue, Col, Row, Sheet};
use crate::layout::combos::combination_names;
use crate::layout::{CoordinateTable, Span};
use crate::model::Metric;

pub mod builtin;
pub mod copy;

pub use copy::{CopyMode, copy_from_template, repeat_template_row};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Sheet,
    Summary,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::Sheet => f.write_str("sheet"),
            TemplateKind::Summary => f.write_str("summary"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAnchors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copositivity_columns: Option<Span<Col>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copositivity_rows: Option<Span<Row>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateHeader {
    pub schema_version: u32,
    pub kind: TemplateKind,
    pub metric: Metric,
    /// `None` for the generic template used when no channel-specific one applies.
    #[serde(default)]
    pub channel_count: Option<usize>,
    /// Number of channels the per-channel regions were authored for.
    pub capacity: usize,
    #[serde(default)]
    pub anchors: TemplateAnchors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateKey {
    pub kind: TemplateKind,
    pub metric: Metric,
    pub channel_count: Option<usize>,
}

impl TemplateKey {
    pub fn file_name(&self) -> String {
        match self.channel_count {
            Some(n) => format!("template_{}_{}_{}channels.json", self.kind, self.metric, n),
            None => format!("template_{}_{}.json", self.kind, self.metric),
        }
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.channel_count {
            Some(n) => write!(f, "{} {} ({} channels)", self.metric, self.kind, n),
            None => write!(f, "{} {} (generic)", self.metric, self.kind),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid template asset {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("template asset {origin} uses schema version {found}, expected {expected}")]
    SchemaVersion {
        origin: String,
        found: u32,
        expected: u32,
    },
    #[error("no template asset for {0}")]
    Missing(String),
    #[error("duplicate template asset for {0}")]
    Duplicate(String),
    #[error("no template assets in {0}")]
    Empty(String),
    #[error("template {asset} does not match the coordinate table: {detail}")]
    LayoutMismatch { asset: String, detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    header: TemplateHeader,
    sheet: Sheet,
}

#[derive(Debug, Serialize, Deserialize)]
struct TemplateFile {
    header: TemplateHeader,
    cells: Vec<TemplateCell>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TemplateCell {
    row: Row,
    col: Col,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<CellStyle>,
}

impl Template {
    pub fn new(header: TemplateHeader, sheet: Sheet) -> Self {
        Self { header, sheet }
    }

    pub fn header(&self) -> &TemplateHeader {
        &self.header
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn key(&self) -> TemplateKey {
        TemplateKey {
            kind: self.header.kind,
            metric: self.header.metric,
            channel_count: self.header.channel_count,
        }
    }

    pub fn from_json(json: &str, origin: &str) -> Result<Self, TemplateError> {
        let file: TemplateFile =
            serde_json::from_str(json).map_err(|source| TemplateError::Json {
                origin: origin.to_string(),
                source,
            })?;
        if file.header.schema_version != SCHEMA_VERSION {
            return Err(TemplateError::SchemaVersion {
                origin: origin.to_string(),
                found: file.header.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        let key = TemplateKey {
            kind: file.header.kind,
            metric: file.header.metric,
            channel_count: file.header.channel_count,
        };
        let mut sheet = Sheet::new(key.file_name().trim_end_matches(".json"));
        for cell in file.cells {
            if let Some(value) = cell.value {
                sheet.set_value(cell.row, cell.col, value);
            }
            if let Some(style) = cell.style {
                sheet.set_style(cell.row, cell.col, style);
            }
        }
        Ok(Self::new(file.header, sheet))
    }

    pub fn to_json(&self) -> Result<String, TemplateError> {
        let cells = self
            .sheet
            .cells()
            .map(|((row, col), cell)| TemplateCell {
                row,
                col,
                value: cell.value.clone(),
                style: cell.style.clone(),
            })
            .collect();
        let file = TemplateFile {
            header: self.header.clone(),
            cells,
        };
        serde_json::to_string(&file).map_err(|source| TemplateError::Json {
            origin: self.key().file_name(),
            source,
        })
    }
}

/// Immutable template definitions, shareable between concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<TemplateKey, Arc<Template>>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self, TemplateError> {
        builtin::bundled_templates()
    }

    pub fn insert(&mut self, template: Template) -> Result<(), TemplateError> {
        let key = template.key();
        if self.templates.contains_key(&key) {
            return Err(TemplateError::Duplicate(key.to_string()));
        }
        self.templates.insert(key, Arc::new(template));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn sheet_template(&self, metric: Metric, n_channels: usize) -> Result<&Template, TemplateError> {
        self.select(TemplateKind::Sheet, metric, n_channels)
    }

    pub fn summary_template(
        &self,
        metric: Metric,
        n_channels: usize,
    ) -> Result<&Template, TemplateError> {
        self.select(TemplateKind::Summary, metric, n_channels)
    }

    /// Channel-specific asset when one exists, the generic asset for the metric otherwise.
    fn select(
        &self,
        kind: TemplateKind,
        metric: Metric,
        n_channels: usize,
    ) -> Result<&Template, TemplateError> {
        let specific = TemplateKey {
            kind,
            metric,
            channel_count: Some(n_channels),
        };
        if let Some(template) = self.templates.get(&specific) {
            return Ok(template.as_ref());
        }
        let generic = TemplateKey {
            kind,
            metric,
            channel_count: None,
        };
        self.templates
            .get(&generic)
            .map(|t| t.as_ref())
            .ok_or_else(|| TemplateError::Missing(generic.to_string()))
    }

    /// Loads every `*.json` asset in `dir`, in file-name order.
    pub fn load_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut set = Self::new();
        for path in paths {
            let json = std::fs::read_to_string(&path)?;
            let template = Template::from_json(&json, &path.display().to_string())?;
            crate::debug!("loaded template asset {} as {}", path.display(), template.key());
            set.insert(template)?;
        }
        if set.is_empty() {
            return Err(TemplateError::Empty(dir.display().to_string()));
        }
        Ok(set)
    }

    pub fn export_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, TemplateError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.templates.len());
        for (key, template) in &self.templates {
            let path = dir.join(key.file_name());
            std::fs::write(&path, template.to_json()?)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Fails on the first asset whose declared regions disagree with `coords`, and on any
    /// metric that lacks a generic fallback or a channel-specific asset the table covers.
    pub fn validate(&self, coords: &CoordinateTable) -> Result<(), TemplateError> {
        for metric in Metric::ALL {
            for kind in [TemplateKind::Sheet, TemplateKind::Summary] {
                let generic = TemplateKey {
                    kind,
                    metric,
                    channel_count: None,
                };
                if !self.templates.contains_key(&generic) {
                    return Err(TemplateError::Missing(generic.to_string()));
                }
            }
            for n in coords.supported_channel_counts() {
                if !coords.supports_copositivity(metric, n) {
                    continue;
                }
                for kind in [TemplateKind::Sheet, TemplateKind::Summary] {
                    let key = TemplateKey {
                        kind,
                        metric,
                        channel_count: Some(n),
                    };
                    if !self.templates.contains_key(&key) {
                        return Err(TemplateError::Missing(key.to_string()));
                    }
                }
            }
        }

        for (key, template) in &self.templates {
            validate_template(key, template, coords)?;
        }
        Ok(())
    }
}

fn validate_template(
    key: &TemplateKey,
    template: &Template,
    coords: &CoordinateTable,
) -> Result<(), TemplateError> {
    let mismatch = |detail: String| TemplateError::LayoutMismatch {
        asset: key.to_string(),
        detail,
    };
    let header = template.header();
    let anchors = header.anchors;

    let Some(n) = key.channel_count else {
        if anchors != TemplateAnchors::default() {
            return Err(mismatch(
                "generic templates must not declare co-positivity regions".to_string(),
            ));
        }
        if header.capacity < 2 {
            return Err(mismatch(format!(
                "capacity {} is below two channels",
                header.capacity
            )));
        }
        return Ok(());
    };

    if header.capacity != n {
        return Err(mismatch(format!(
            "capacity {} differs from channel count {}",
            header.capacity, n
        )));
    }

    let canonical: Vec<String> = (1..=n).map(|i| format!("C{i}")).collect();
    let first_combination = combination_names(&canonical)
        .into_iter()
        .next()
        .unwrap_or_default();
    let sheet = template.sheet();

    match key.kind {
        TemplateKind::Sheet => {
            let expected_cols = coords.sheet_copositivity(n);
            if anchors.copositivity_columns != expected_cols {
                return Err(mismatch(format!(
                    "co-positivity columns {:?}, table expects {:?}",
                    anchors.copositivity_columns, expected_cols
                )));
            }
            let expected_rows = coords.copositivity_analysis(key.metric, n);
            if anchors.copositivity_rows != expected_rows {
                return Err(mismatch(format!(
                    "co-positivity analysis rows {:?}, table expects {:?}",
                    anchors.copositivity_rows, expected_rows
                )));
            }
            if let Some(cols) = expected_cols {
                expect_text(sheet, 2, cols.start + 1, &first_combination).map_err(&mismatch)?;
            }
            if let Some(rows) = expected_rows {
                expect_text(sheet, rows.start + 2, 1, &first_combination).map_err(&mismatch)?;
            }
        }
        TemplateKind::Summary => {
            let expected_cols = coords.summary_copositivity(n);
            if anchors.copositivity_columns != expected_cols {
                return Err(mismatch(format!(
                    "co-positivity columns {:?}, table expects {:?}",
                    anchors.copositivity_columns, expected_cols
                )));
            }
            if let Some(cols) = expected_cols {
                expect_text(sheet, 1, cols.start, &first_combination).map_err(&mismatch)?;
            }
        }
    }
    Ok(())
}

fn expect_text(sheet: &Sheet, row: Row, col: Col, expected: &str) -> Result<(), String> {
    match sheet.text(row, col) {
        Some(found) if found == expected => Ok(()),
        found => Err(format!(
            "cell {} holds {:?}, expected {:?}",
            crate::document::cell_ref(row, col),
            found,
            expected
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/template/mod.rs"]
mod tests;
