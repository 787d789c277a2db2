//! The bundled template assets.
//!
//! Each asset is drawn on a blank grid the way a designer would lay it out by hand: the
//! analysis block on the left, a grey separator, the image-data region, and for the
//! channel-specific assets the co-positivity columns and rows. The geometry below is the
//! asset's own; `TemplateSet::validate` checks it against the coordinate table.

use crate::document::style::{BorderStyle, HorizontalAlign};
use crate::document::{CellStyle, CellValue, Col, Color, Row, Sheet, cell_ref, column_letter};
use crate::layout::combos::{channel_combinations, combination_name};
use crate::layout::coords::{
    BLANK_TEMPLATE_COL, DATA_HEADER_ROW, DATA_START_COL, FIRST_DATA_ROW, LAST_SHEET_ROW,
    SEPARATOR_LAST_COL, SUMMARY_FIRST_SAMPLE_ROW, channel_block_row, channel_col,
    summary_channel_col,
};
use crate::layout::{CoordinateTable, Span};
use crate::model::channel::ordinal_label;
use crate::model::Metric;

use super::{
    SCHEMA_VERSION, Template, TemplateAnchors, TemplateError, TemplateHeader, TemplateKind,
    TemplateSet,
};

/// Last row carrying template styles and per-row formulas. Sheets that run longer repeat
/// this row.
pub const TEMPLATE_ROWS: Row = 300;
pub const GENERIC_CAPACITY: usize = 15;
pub const SPECIFIC_CHANNEL_COUNTS: std::ops::RangeInclusive<usize> = 2..=5;

const TITLE_FILL: Color = Color(0xBDD7EE);
const HEADER_FILL: Color = Color(0xDDEBF7);
const SEPARATOR_FILL: Color = Color(0xBFBFBF);
const PERCENT_FORMAT: &str = "0.0%";
const MEAN_FORMAT: &str = "0.00";

pub fn bundled_templates() -> Result<TemplateSet, TemplateError> {
    let mut set = TemplateSet::new();
    for metric in Metric::ALL {
        set.insert(sheet_template(metric, None))?;
        set.insert(summary_template(metric, None))?;
        for n in SPECIFIC_CHANNEL_COUNTS {
            set.insert(sheet_template(metric, Some(n)))?;
            set.insert(summary_template(metric, Some(n)))?;
        }
    }
    Ok(set)
}

fn title() -> CellStyle {
    CellStyle::new().bold().font_size(12.0).fill(TITLE_FILL)
}

fn header() -> CellStyle {
    CellStyle::new()
        .bold()
        .fill(HEADER_FILL)
        .border(BorderStyle::Thin)
        .align(HorizontalAlign::Center)
}

fn label() -> CellStyle {
    CellStyle::new().bold().border(BorderStyle::Thin)
}

fn value(format: &str) -> CellStyle {
    CellStyle::new()
        .border(BorderStyle::Thin)
        .number_format(format)
        .align(HorizontalAlign::Center)
}

fn separator() -> CellStyle {
    CellStyle::new().fill(SEPARATOR_FILL)
}

fn rule() -> CellStyle {
    CellStyle::new().fill(Color::BLACK)
}

fn formula(text: String) -> CellValue {
    CellValue::Formula(text)
}

fn canonical_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("C{i}")).collect()
}

/// Absolute body range of a data column down to the last sheet row, e.g. `H$4:H$1048576`.
fn body_range(col: Col) -> String {
    let letter = column_letter(col);
    format!("{letter}${FIRST_DATA_ROW}:{letter}${LAST_SHEET_ROW}")
}

/// One measure row of a per-channel analysis block.
struct Measure {
    name: &'static str,
    format: &'static str,
    formula: fn(&MeasureRefs) -> String,
    per_image: bool,
}

/// Cell references a measure formula can point at.
struct MeasureRefs {
    range: String,
    images: String,
    positive: String,
}

fn count_measures() -> Vec<Measure> {
    vec![
        Measure {
            name: "Images analysed",
            format: "0",
            formula: |r| format!("=COUNT({})", r.range),
            per_image: false,
        },
        Measure {
            name: "Total count",
            format: "0",
            formula: |r| format!("=SUM({})", r.range),
            per_image: true,
        },
        Measure {
            name: "Positive images",
            format: "0",
            formula: |r| format!("=COUNTIF({},\">0\")", r.range),
            per_image: false,
        },
        Measure {
            name: "% positive images",
            format: PERCENT_FORMAT,
            formula: |r| format!("=IF({0}=0,0,{1}/{0})", r.images, r.positive),
            per_image: false,
        },
        Measure {
            name: "Mean count",
            format: MEAN_FORMAT,
            formula: |r| format!("=IF({}=0,0,AVERAGE({}))", r.images, r.range),
            per_image: false,
        },
        Measure {
            name: "Median count",
            format: MEAN_FORMAT,
            formula: |r| format!("=IF({}=0,0,MEDIAN({}))", r.images, r.range),
            per_image: false,
        },
        Measure {
            name: "Max count",
            format: "0",
            formula: |r| format!("=MAX({})", r.range),
            per_image: false,
        },
    ]
}

fn area_measures() -> Vec<Measure> {
    vec![
        Measure {
            name: "Images analysed",
            format: "0",
            formula: |r| format!("=COUNT({})", r.range),
            per_image: false,
        },
        Measure {
            name: "Total area",
            format: MEAN_FORMAT,
            formula: |r| format!("=SUM({})", r.range),
            per_image: true,
        },
        Measure {
            name: "Mean area",
            format: MEAN_FORMAT,
            formula: |r| format!("=IF({}=0,0,AVERAGE({}))", r.images, r.range),
            per_image: false,
        },
        Measure {
            name: "Max area",
            format: MEAN_FORMAT,
            formula: |r| format!("=MAX({})", r.range),
            per_image: false,
        },
    ]
}

fn measures(metric: Metric) -> Vec<Measure> {
    match metric {
        Metric::Count => count_measures(),
        Metric::Area => area_measures(),
    }
}

/// Measures repeated on the summary sheet, as (column title, row offset within the
/// channel block, number format).
pub fn summary_measures(metric: Metric) -> [(&'static str, Row, &'static str); 3] {
    match metric {
        Metric::Count => [
            ("Total count", 2, "0"),
            ("Positive images", 3, "0"),
            ("% positive images", 4, PERCENT_FORMAT),
        ],
        Metric::Area => [
            ("Total area", 2, MEAN_FORMAT),
            ("Mean area", 3, MEAN_FORMAT),
            ("Max area", 4, MEAN_FORMAT),
        ],
    }
}

pub fn sheet_template(metric: Metric, channel_count: Option<usize>) -> Template {
    let capacity = channel_count.unwrap_or(GENERIC_CAPACITY);
    let mut sheet = Sheet::new(format!("sheet_{metric}"));

    put_analysis_block(&mut sheet, metric, capacity);
    for row in 1..=TEMPLATE_ROWS {
        sheet.set_style(row, BLANK_TEMPLATE_COL, separator());
    }
    put_data_region(&mut sheet, metric, capacity);

    let mut anchors = TemplateAnchors::default();
    if let Some(n) = channel_count {
        let coords = CoordinateTable::builtin();
        let spans = coords
            .sheet_copositivity(n)
            .zip(coords.copositivity_analysis(metric, n));
        if let Some((cols, rows)) = spans {
            put_copositivity_columns(&mut sheet, n, cols);
            put_copositivity_rows(&mut sheet, n, cols, rows);
            anchors.copositivity_columns = Some(cols);
            anchors.copositivity_rows = Some(rows);
        }
    }

    Template::new(
        TemplateHeader {
            schema_version: SCHEMA_VERSION,
            kind: TemplateKind::Sheet,
            metric,
            channel_count,
            capacity,
            anchors,
        },
        sheet,
    )
}

fn put_analysis_block(sheet: &mut Sheet, metric: Metric, capacity: usize) {
    sheet.set_value(1, 1, "Analysis");
    for col in 1..=SEPARATOR_LAST_COL {
        sheet.set_style(1, col, title());
    }
    for (col, text) in ["Channel", "Name", "Measure", "Value", "Per image"]
        .into_iter()
        .enumerate()
    {
        sheet.set_value(2, col as Col + 1, text);
        sheet.set_style(2, col as Col + 1, header());
    }

    let measures = measures(metric);
    for index in 0..capacity {
        let base = channel_block_row(metric, index);
        sheet.set_value(base, 1, ordinal_label(index as u32 + 1));
        sheet.set_value(base, 2, format!("C{}", index + 1));
        for col in 1..=SEPARATOR_LAST_COL {
            sheet.set_style(base, col, header());
        }

        let images_row = base + 1;
        let refs = MeasureRefs {
            range: body_range(channel_col(index)),
            images: cell_ref(images_row, 4),
            positive: cell_ref(base + 3, 4),
        };
        for (offset, measure) in measures.iter().enumerate() {
            let row = base + 1 + offset as Row;
            sheet.set_style(row, 1, label());
            sheet.set_style(row, 2, label());
            sheet.set_value(row, 3, measure.name);
            sheet.set_style(row, 3, label());
            sheet.set_value(row, 4, formula((measure.formula)(&refs)));
            sheet.set_style(row, 4, value(measure.format));
            if measure.per_image {
                sheet.set_value(
                    row,
                    5,
                    formula(format!("=IF(D{images_row}=0,0,D{row}/D{images_row})")),
                );
            }
            sheet.set_style(row, 5, value(MEAN_FORMAT));
        }
    }
}

fn put_data_region(sheet: &mut Sheet, metric: Metric, capacity: usize) {
    let last_col = channel_col(capacity - 1);
    sheet.set_value(1, DATA_START_COL, "Image data");
    for col in DATA_START_COL..=last_col {
        sheet.set_style(1, col, title());
        sheet.set_style(2, col, header());
        sheet.set_style(DATA_HEADER_ROW, col, header());
    }
    sheet.set_value(DATA_HEADER_ROW, DATA_START_COL, "Slice");
    for index in 0..capacity {
        let col = channel_col(index);
        sheet.set_value(2, col, ordinal_label(index as u32 + 1));
        sheet.set_value(DATA_HEADER_ROW, col, format!("C{}", index + 1));
    }

    let slice_style = CellStyle::new().border(BorderStyle::Thin);
    let body_style = value(metric.number_format());
    for row in FIRST_DATA_ROW..=TEMPLATE_ROWS {
        sheet.set_style(row, DATA_START_COL, slice_style.clone());
        for index in 0..capacity {
            sheet.set_style(row, channel_col(index), body_style.clone());
        }
    }
}

/// Per-image co-positivity flags, one column per combination, framed by separators.
fn put_copositivity_columns(sheet: &mut Sheet, n: usize, cols: Span<Col>) {
    for row in 1..=TEMPLATE_ROWS {
        sheet.set_style(row, cols.start, separator());
        sheet.set_style(row, cols.end, separator());
    }
    sheet.set_value(1, cols.start + 1, "Co-positivity");
    for col in cols.start + 1..cols.end {
        sheet.set_style(1, col, title());
    }

    let indices: Vec<usize> = (0..n).collect();
    let labels = canonical_labels(n);
    for (j, combo) in channel_combinations(&indices).iter().enumerate() {
        let col = cols.start + 1 + j as Col;
        let names: Vec<&str> = combo.iter().map(|&i| labels[i].as_str()).collect();
        sheet.set_value(2, col, combination_name(&names));
        sheet.set_style(2, col, header());
        sheet.set_value(DATA_HEADER_ROW, col, "Co-positive");
        sheet.set_style(DATA_HEADER_ROW, col, header());

        for row in FIRST_DATA_ROW..=TEMPLATE_ROWS {
            sheet.set_value(row, col, formula(copositivity_flag_formula(row, combo)));
            sheet.set_style(row, col, value("0"));
        }
    }
}

/// 1 when every channel of `combo` (positions on the sheet) is positive on `row`, 0 when
/// one is not, blank when one is missing.
pub fn copositivity_flag_formula(row: Row, combo: &[usize]) -> String {
    let refs: Vec<String> = combo.iter().map(|&i| cell_ref(row, channel_col(i))).collect();
    let tests: Vec<String> = refs.iter().map(|r| format!("{r}>0")).collect();
    format!(
        "=IF(COUNT({})<{},\"\",IF(AND({}),1,0))",
        refs.join(","),
        combo.len(),
        tests.join(",")
    )
}

/// Co-positivity totals below the analysis block, bracketed by black rules.
fn put_copositivity_rows(sheet: &mut Sheet, n: usize, cols: Span<Col>, rows: Span<Row>) {
    let (start, end) = (rows.start, rows.end);
    let indices: Vec<usize> = (0..n).collect();
    let combos = channel_combinations(&indices);

    for col in 1..=SEPARATOR_LAST_COL {
        sheet.set_style(start, col, rule());
        sheet.set_style(end, col, rule());
    }
    for (col, text) in ["Co-positivity", "Co-positive images", "% of images"]
        .into_iter()
        .enumerate()
    {
        sheet.set_value(start + 1, col as Col + 1, text);
    }
    for col in 1..=SEPARATOR_LAST_COL {
        sheet.set_style(start + 1, col, header());
    }

    let labels = canonical_labels(n);
    let first = column_letter(channel_col(0));
    let images = format!("COUNT(${first}${FIRST_DATA_ROW}:${first}${LAST_SHEET_ROW})");
    for (j, combo) in combos.iter().enumerate() {
        let row = start + 2 + j as Row;
        let names: Vec<&str> = combo.iter().map(|&i| labels[i].as_str()).collect();
        sheet.set_value(row, 1, combination_name(&names));
        sheet.set_style(row, 1, label());
        let flag_col = cols.start + 1 + j as Col;
        sheet.set_value(row, 2, formula(format!("=SUM({})", body_range(flag_col))));
        sheet.set_style(row, 2, value("0"));
        sheet.set_value(row, 3, formula(format!("=IF({images}=0,0,B{row}/{images})")));
        sheet.set_style(row, 3, value(PERCENT_FORMAT));
        for col in 4..=SEPARATOR_LAST_COL {
            sheet.set_style(row, col, value("0"));
        }
    }
}

pub fn summary_template(metric: Metric, channel_count: Option<usize>) -> Template {
    let capacity = channel_count.unwrap_or(GENERIC_CAPACITY);
    let mut sheet = Sheet::new(format!("summary_{metric}"));

    sheet.set_value(1, 1, "Sample");
    sheet.set_style(1, 1, title());
    sheet.set_style(2, 1, header());

    let columns = summary_measures(metric);
    for index in 0..capacity {
        let col = summary_channel_col(index);
        let block = channel_block_row(metric, index);
        sheet.set_value(1, col, format!("{}:", ordinal_label(index as u32 + 1)));
        sheet.set_value(1, col + 1, format!("C{}", index + 1));
        for (k, (title_text, offset, format)) in columns.iter().enumerate() {
            let c = col + k as Col;
            sheet.set_style(1, c, header());
            sheet.set_value(2, c, *title_text);
            sheet.set_style(2, c, header());
            for row in SUMMARY_FIRST_SAMPLE_ROW..=TEMPLATE_ROWS {
                sheet.set_value(row, c, formula(lookup_formula(row, 'D', block + offset)));
                sheet.set_style(row, c, value(format));
            }
        }
    }

    let mut anchors = TemplateAnchors::default();
    let coords = CoordinateTable::builtin();
    let spans = channel_count.and_then(|n| {
        let cols = coords.summary_copositivity(n)?;
        let rows = coords.copositivity_analysis(metric, n)?;
        Some((n, cols, rows))
    });
    if let Some((n, cols, rows)) = spans {
        let (start, end) = (cols.start, cols.end);
        let indices: Vec<usize> = (0..n).collect();
        let labels = canonical_labels(n);
        let combos = channel_combinations(&indices);
        let first_total_row = rows.start + 2;
        for (j, combo) in combos.iter().take(cols.width().saturating_sub(1) as usize).enumerate() {
            let col = start + j as Col;
            let names: Vec<&str> = combo.iter().map(|&i| labels[i].as_str()).collect();
            sheet.set_value(1, col, combination_name(&names));
            sheet.set_style(1, col, header());
            sheet.set_value(2, col, "Co-positive images");
            sheet.set_style(2, col, header());
            for row in SUMMARY_FIRST_SAMPLE_ROW..=TEMPLATE_ROWS {
                sheet.set_value(
                    row,
                    col,
                    formula(lookup_formula(row, 'B', first_total_row + j as Row)),
                );
                sheet.set_style(row, col, value("0"));
            }
        }
        for row in 1..=TEMPLATE_ROWS {
            sheet.set_style(row, end, separator());
        }
        anchors.copositivity_columns = Some(cols);
    }

    Template::new(
        TemplateHeader {
            schema_version: SCHEMA_VERSION,
            kind: TemplateKind::Summary,
            metric,
            channel_count,
            capacity,
            anchors,
        },
        sheet,
    )
}

/// Reads a cell of the sample sheet named in column A of `row`; blank for empty rows.
pub fn lookup_formula(row: Row, col: char, target_row: Row) -> String {
    format!(
        "=IF($A{row}=\"\",\"\",IFERROR(INDIRECT(\"'\"&$A{row}&\"'!{col}{target_row}\"),\"\"))"
    )
}

#[cfg(test)]
#[path = "../../tests/src_inline/template/builtin.rs"]
mod tests;
