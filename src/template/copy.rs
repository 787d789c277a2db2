use std::ops::RangeInclusive;

use crate::document::{Col, Row, Sheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyMode {
    pub value: bool,
    pub style: bool,
}

impl CopyMode {
    pub const ALL: CopyMode = CopyMode {
        value: true,
        style: true,
    };
    /// Presentation only; values already on the destination survive.
    pub const STYLE_ONLY: CopyMode = CopyMode {
        value: false,
        style: true,
    };
}

/// Copies a rectangular region of `template` onto `dest`.
///
/// Rows map one-to-one. When the two column ranges differ, columns are paired up in order
/// and the shorter range bounds the copy; otherwise each column is copied in place. A
/// template cell without presentation attributes never touches the destination style.
pub fn copy_from_template(
    template: &Sheet,
    dest: &mut Sheet,
    rows: RangeInclusive<Row>,
    template_cols: RangeInclusive<Col>,
    dest_cols: RangeInclusive<Col>,
    mode: CopyMode,
) {
    let remap = template_cols != dest_cols;
    for row in rows {
        if remap {
            for (template_col, dest_col) in template_cols.clone().zip(dest_cols.clone()) {
                copy_cell(template, dest, (row, template_col), (row, dest_col), mode);
            }
        } else {
            for col in template_cols.clone() {
                copy_cell(template, dest, (row, col), (row, col), mode);
            }
        }
    }
}

/// Stamps template row `source_row` onto every row of `dest_rows`, pairing columns the way
/// `copy_from_template` does. Used for sheets that run past the rows a template was drawn
/// with.
pub fn repeat_template_row(
    template: &Sheet,
    dest: &mut Sheet,
    source_row: Row,
    dest_rows: RangeInclusive<Row>,
    template_cols: RangeInclusive<Col>,
    dest_cols: RangeInclusive<Col>,
    mode: CopyMode,
) {
    for row in dest_rows {
        for (template_col, dest_col) in template_cols.clone().zip(dest_cols.clone()) {
            copy_cell(template, dest, (source_row, template_col), (row, dest_col), mode);
        }
    }
}

fn copy_cell(
    template: &Sheet,
    dest: &mut Sheet,
    (source_row, source_col): (Row, Col),
    (dest_row, dest_col): (Row, Col),
    mode: CopyMode,
) {
    let source = template.cell(source_row, source_col);
    if mode.value {
        dest.put_value(dest_row, dest_col, source.and_then(|c| c.value.clone()));
    }
    if mode.style {
        if let Some(style) = source.and_then(|c| c.style.as_ref()) {
            if !style.is_empty() {
                dest.set_style(dest_row, dest_col, style.clone());
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/template/copy.rs"]
mod tests;
