//! Renders the in-memory document with `rust_xlsxwriter`. Document coordinates are 1-based,
//! the writer's are 0-based.

use std::path::Path;

use rust_xlsxwriter::{
    ConditionalFormat2ColorScale, ConditionalFormatCell, ConditionalFormatCellRule, Format,
    FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet, XlsxError,
};

use crate::document::style::{BorderStyle, HorizontalAlign, VerticalAlign};
use crate::document::{CellStyle, CellValue, Color, ConditionalFormat, Document, Sheet};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("sheet {sheet}: {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: XlsxError,
    },
    #[error("failed to write workbook: {0}")]
    Save(#[from] XlsxError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn color(c: Color) -> rust_xlsxwriter::Color {
    rust_xlsxwriter::Color::RGB(c.rgb())
}

fn border(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Double => FormatBorder::Double,
    }
}

pub fn build_format(style: &CellStyle) -> Format {
    let mut f = Format::new();
    if let Some(font) = &style.font {
        if font.bold {
            f = f.set_bold();
        }
        if font.italic {
            f = f.set_italic();
        }
        if let Some(size) = font.size {
            f = f.set_font_size(size);
        }
        if let Some(c) = font.color {
            f = f.set_font_color(color(c));
        }
    }
    if let Some(fill) = style.fill {
        f = f
            .set_background_color(color(fill))
            .set_pattern(FormatPattern::Solid);
    }
    if let Some(b) = &style.border {
        if let Some(side) = b.top {
            f = f.set_border_top(border(side.style));
            if let Some(c) = side.color {
                f = f.set_border_top_color(color(c));
            }
        }
        if let Some(side) = b.bottom {
            f = f.set_border_bottom(border(side.style));
            if let Some(c) = side.color {
                f = f.set_border_bottom_color(color(c));
            }
        }
        if let Some(side) = b.left {
            f = f.set_border_left(border(side.style));
            if let Some(c) = side.color {
                f = f.set_border_left_color(color(c));
            }
        }
        if let Some(side) = b.right {
            f = f.set_border_right(border(side.style));
            if let Some(c) = side.color {
                f = f.set_border_right_color(color(c));
            }
        }
    }
    if let Some(nf) = &style.number_format {
        f = f.set_num_format(nf);
    }
    if let Some(alignment) = &style.alignment {
        if let Some(h) = alignment.horizontal {
            f = f.set_align(match h {
                HorizontalAlign::Left => FormatAlign::Left,
                HorizontalAlign::Center => FormatAlign::Center,
                HorizontalAlign::Right => FormatAlign::Right,
            });
        }
        if let Some(v) = alignment.vertical {
            f = f.set_align(match v {
                VerticalAlign::Top => FormatAlign::Top,
                VerticalAlign::Center => FormatAlign::VerticalCenter,
                VerticalAlign::Bottom => FormatAlign::Bottom,
            });
        }
        if alignment.wrap {
            f = f.set_text_wrap();
        }
    }
    f
}

fn render_sheet(sheet: &Sheet) -> Result<Worksheet, XlsxError> {
    let mut ws = Worksheet::new();
    ws.set_name(sheet.name())?;

    for ((row, col), cell) in sheet.cells() {
        let (r, c) = (row - 1, col - 1);
        let format = cell
            .style
            .as_ref()
            .map(build_format)
            .unwrap_or_else(Format::new);
        match &cell.value {
            Some(CellValue::Text(text)) => {
                ws.write_string_with_format(r, c, text, &format)?;
            }
            Some(CellValue::Number(value)) => {
                ws.write_number_with_format(r, c, *value, &format)?;
            }
            Some(CellValue::Formula(formula)) => {
                ws.write_formula_with_format(r, c, formula.as_str(), &format)?;
            }
            None => {
                ws.write_blank(r, c, &format)?;
            }
        }
    }

    for rule in sheet.conditional_formats() {
        let range = rule.range();
        if !range.is_valid() {
            crate::warn!("{}: dropping conditional format on {}", sheet.name(), range.to_a1());
            continue;
        }
        let (r1, c1, r2, c2) = (
            range.first_row - 1,
            range.first_col - 1,
            range.last_row - 1,
            range.last_col - 1,
        );
        match rule {
            ConditionalFormat::GreaterThanFill {
                threshold, fill, ..
            } => {
                let format = Format::new()
                    .set_background_color(color(*fill))
                    .set_pattern(FormatPattern::Solid);
                let cf = ConditionalFormatCell::new()
                    .set_rule(ConditionalFormatCellRule::GreaterThan(*threshold))
                    .set_format(format);
                ws.add_conditional_format(r1, c1, r2, c2, &cf)?;
            }
            ConditionalFormat::ColorScale {
                min_color,
                max_color,
                ..
            } => {
                let cf = ConditionalFormat2ColorScale::new()
                    .set_minimum_color(color(*min_color))
                    .set_maximum_color(color(*max_color));
                ws.add_conditional_format(r1, c1, r2, c2, &cf)?;
            }
        }
    }

    for (col, width) in sheet.column_widths() {
        ws.set_column_width(col - 1, width)?;
    }
    for (row, height) in sheet.row_heights() {
        ws.set_row_height(row - 1, height)?;
    }
    Ok(ws)
}

/// Builds a workbook holding every sheet of `document`, in document order.
pub fn render_document(document: &Document) -> Result<Workbook, RenderError> {
    let mut workbook = Workbook::new();
    for sheet in document.sheets() {
        let ws = render_sheet(sheet).map_err(|source| RenderError::Sheet {
            sheet: sheet.name().to_string(),
            source,
        })?;
        workbook.push_worksheet(ws);
    }
    Ok(workbook)
}

/// The whole workbook is rendered before `path` is touched, so a failed render leaves no
/// partial file behind.
pub fn write_xlsx(document: &Document, path: &Path) -> Result<(), RenderError> {
    let bytes = to_bytes(document)?;
    std::fs::write(path, &bytes)?;
    crate::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

pub fn to_bytes(document: &Document) -> Result<Vec<u8>, RenderError> {
    let mut workbook = render_document(document)?;
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/xlsx.rs"]
mod tests;
