use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::document::{Col, Row};
use crate::layout::combos::combination_count;
use crate::model::Metric;

/// Header row of the merged channel table on a sample sheet.
pub const DATA_HEADER_ROW: Row = 3;
pub const FIRST_DATA_ROW: Row = 4;
/// Last row of an xlsx worksheet; body ranges in formulas run down to it.
pub const LAST_SHEET_ROW: Row = 1_048_576;
/// Slice label column; channel columns follow it.
pub const DATA_START_COL: Col = 7;
/// Analysis block width, separator column included.
pub const ANALYSIS_LAST_COL: Col = 6;
/// Template column whose style is replicated after the last data column.
pub const BLANK_TEMPLATE_COL: Col = 6;
pub const SEPARATOR_LAST_COL: Col = 5;
pub const BODY_MIN_ROWS: Row = 50;
pub const SUMMARY_FIRST_SAMPLE_ROW: Row = 3;
pub const SUMMARY_CHANNEL_STRIDE: Col = 4;
/// Channel counts for which co-positivity is defined at all.
pub const COPOSITIVITY_CHANNELS: RangeInclusive<usize> = 2..=6;

/// Inclusive span of rows or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span<T> {
    pub start: T,
    pub end: T,
}

impl<T: Copy + Into<u32>> Span<T> {
    pub const fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> u32 {
        (self.end.into() + 1).saturating_sub(self.start.into())
    }

    pub fn range(&self) -> RangeInclusive<T> {
        self.start..=self.end
    }
}

pub fn channel_col(index: usize) -> Col {
    DATA_START_COL + 1 + index as Col
}

pub fn summary_channel_col(index: usize) -> Col {
    2 + SUMMARY_CHANNEL_STRIDE * index as Col
}

/// Header row of a channel's block in the analysis area.
pub fn channel_block_row(metric: Metric, index: usize) -> Row {
    3 + metric.per_channel_rows() * index as Row
}

/// Last row of the analysis block: `2 + perChannelRows(metric) * n`.
pub fn analysis_end_row(metric: Metric, n_channels: usize) -> Row {
    2 + metric.per_channel_rows() * n_channels as Row
}

pub fn analysis_span(metric: Metric, n_channels: usize) -> Span<Row> {
    Span::new(1, analysis_end_row(metric, n_channels))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateKind {
    SheetCopositivity,
    SummaryCopositivity,
    CopositivityAnalysis,
}

impl CoordinateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CoordinateKind::SheetCopositivity => "sheet co-positivity columns",
            CoordinateKind::SummaryCopositivity => "summary co-positivity columns",
            CoordinateKind::CopositivityAnalysis => "co-positivity analysis rows",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{} for {channels} channels: {detail}", .kind.as_str())]
pub struct LayoutError {
    pub kind: CoordinateKind,
    pub channels: usize,
    pub detail: String,
}

/// Static (metric, channel count) lookups into the hand-built templates. A missing entry
/// means the capability is absent for that configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateTable {
    sheet_copositivity: BTreeMap<usize, Span<Col>>,
    summary_copositivity: BTreeMap<usize, Span<Col>>,
    copositivity_analysis: BTreeMap<(Metric, usize), Span<Row>>,
}

impl CoordinateTable {
    pub fn builtin() -> Self {
        let sheet_copositivity = BTreeMap::from([
            (2, Span::new(10, 12)),
            (3, Span::new(11, 16)),
            (4, Span::new(12, 25)),
            (5, Span::new(13, 40)),
        ]);
        let summary_copositivity = BTreeMap::from([
            (2, Span::new(10, 11)),
            (3, Span::new(14, 18)),
            (4, Span::new(18, 29)),
            (5, Span::new(22, 48)),
        ]);
        let copositivity_analysis = BTreeMap::from([
            ((Metric::Count, 2), Span::new(19, 23)),
            ((Metric::Count, 3), Span::new(27, 34)),
            ((Metric::Count, 4), Span::new(35, 49)),
            ((Metric::Count, 5), Span::new(43, 72)),
            ((Metric::Area, 2), Span::new(13, 17)),
            ((Metric::Area, 3), Span::new(18, 25)),
            ((Metric::Area, 4), Span::new(23, 37)),
            ((Metric::Area, 5), Span::new(28, 57)),
        ]);
        Self {
            sheet_copositivity,
            summary_copositivity,
            copositivity_analysis,
        }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self {
            sheet_copositivity: BTreeMap::new(),
            summary_copositivity: BTreeMap::new(),
            copositivity_analysis: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn insert_sheet_copositivity(&mut self, n_channels: usize, span: Span<Col>) {
        self.sheet_copositivity.insert(n_channels, span);
    }

    #[cfg(test)]
    pub fn insert_summary_copositivity(&mut self, n_channels: usize, span: Span<Col>) {
        self.summary_copositivity.insert(n_channels, span);
    }

    #[cfg(test)]
    pub fn insert_copositivity_analysis(
        &mut self,
        metric: Metric,
        n_channels: usize,
        span: Span<Row>,
    ) {
        self.copositivity_analysis.insert((metric, n_channels), span);
    }

    pub fn sheet_copositivity(&self, n_channels: usize) -> Option<Span<Col>> {
        self.sheet_copositivity.get(&n_channels).copied()
    }

    pub fn summary_copositivity(&self, n_channels: usize) -> Option<Span<Col>> {
        self.summary_copositivity.get(&n_channels).copied()
    }

    pub fn copositivity_analysis(&self, metric: Metric, n_channels: usize) -> Option<Span<Row>> {
        self.copositivity_analysis
            .get(&(metric, n_channels))
            .copied()
    }

    /// Uniform lookup across the three tables, widened to `u32`.
    pub fn resolve(
        &self,
        kind: CoordinateKind,
        metric: Metric,
        n_channels: usize,
    ) -> Option<Span<u32>> {
        match kind {
            CoordinateKind::SheetCopositivity => self
                .sheet_copositivity(n_channels)
                .map(|s| Span::new(s.start as u32, s.end as u32)),
            CoordinateKind::SummaryCopositivity => self
                .summary_copositivity(n_channels)
                .map(|s| Span::new(s.start as u32, s.end as u32)),
            CoordinateKind::CopositivityAnalysis => self.copositivity_analysis(metric, n_channels),
        }
    }

    /// Per-sheet co-positivity needs both its column span and its analysis rows.
    pub fn supports_copositivity(&self, metric: Metric, n_channels: usize) -> bool {
        COPOSITIVITY_CHANNELS.contains(&n_channels)
            && [
                CoordinateKind::SheetCopositivity,
                CoordinateKind::CopositivityAnalysis,
            ]
            .into_iter()
            .all(|kind| self.resolve(kind, metric, n_channels).is_some())
    }

    pub fn supported_channel_counts(&self) -> Vec<usize> {
        self.sheet_copositivity.keys().copied().collect()
    }

    /// Cross-checks every entry against the analysis-block formula and the combination
    /// count it has to hold.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (&n, span) in &self.sheet_copositivity {
            let expected_start = DATA_START_COL + n as Col + 1;
            if span.start != expected_start {
                return Err(LayoutError {
                    kind: CoordinateKind::SheetCopositivity,
                    channels: n,
                    detail: format!(
                        "starts at column {} but the blank column after the data is {}",
                        span.start, expected_start
                    ),
                });
            }
            let needed = combination_count(n) as u32 + 2;
            if span.width() < needed {
                return Err(LayoutError {
                    kind: CoordinateKind::SheetCopositivity,
                    channels: n,
                    detail: format!("{} columns cannot hold {} needed", span.width(), needed),
                });
            }
        }

        for (&n, span) in &self.summary_copositivity {
            let expected_start = summary_channel_col(n);
            if span.start != expected_start {
                return Err(LayoutError {
                    kind: CoordinateKind::SummaryCopositivity,
                    channels: n,
                    detail: format!(
                        "starts at column {} but the channel legend ends at column {}",
                        span.start,
                        expected_start - 1
                    ),
                });
            }
            let needed = combination_count(n) as u32 + 1;
            if span.width() < needed {
                return Err(LayoutError {
                    kind: CoordinateKind::SummaryCopositivity,
                    channels: n,
                    detail: format!("{} columns cannot hold {} needed", span.width(), needed),
                });
            }
        }

        for (&(metric, n), span) in &self.copositivity_analysis {
            let expected_start = analysis_end_row(metric, n) + 1;
            if span.start != expected_start {
                return Err(LayoutError {
                    kind: CoordinateKind::CopositivityAnalysis,
                    channels: n,
                    detail: format!(
                        "{metric} block starts at row {} but the analysis block ends at row {}",
                        span.start,
                        expected_start - 1
                    ),
                });
            }
            let expected_end = span.start + combination_count(n) as Row + 3;
            if span.end != expected_end {
                return Err(LayoutError {
                    kind: CoordinateKind::CopositivityAnalysis,
                    channels: n,
                    detail: format!(
                        "{metric} block ends at row {} but its labels need it to end at {}",
                        span.end, expected_end
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/layout/coords.rs"]
mod tests;
