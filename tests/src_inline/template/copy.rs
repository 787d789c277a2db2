use super::*;
use crate::document::style::BorderStyle;
use crate::document::{CellStyle, CellValue, Color};

fn template() -> Sheet {
    let mut t = Sheet::new("template");
    t.set_value(1, 1, "Analysis");
    t.set_style(1, 1, CellStyle::new().bold());
    t.set_value(2, 1, CellValue::Formula("=SUM(H4:H300)".to_string()));
    t.set_style(2, 2, CellStyle::new().fill(Color(0xBFBFBF)));
    t.set_value(1, 6, "sep");
    t.set_style(3, 6, CellStyle::new().border(BorderStyle::Thin));
    t
}

#[test]
fn test_copy_in_place_value_and_style() {
    let t = template();
    let mut dest = Sheet::new("dest");
    copy_from_template(&t, &mut dest, 1..=2, 1..=2, 1..=2, CopyMode::ALL);
    assert_eq!(dest.text(1, 1), Some("Analysis"));
    assert!(dest.style(1, 1).unwrap().font.as_ref().unwrap().bold);
    assert_eq!(
        dest.value(2, 1),
        Some(&CellValue::Formula("=SUM(H4:H300)".to_string()))
    );
    assert_eq!(dest.style(2, 2).unwrap().fill, Some(Color(0xBFBFBF)));
}

#[test]
fn test_style_only_keeps_destination_values() {
    let t = template();
    let mut dest = Sheet::new("dest");
    dest.set_value(1, 1, 42.0);
    copy_from_template(&t, &mut dest, 1..=1, 1..=1, 1..=1, CopyMode::STYLE_ONLY);
    assert_eq!(dest.value(1, 1), Some(&CellValue::Number(42.0)));
    assert!(dest.style(1, 1).is_some());
}

#[test]
fn test_value_only_keeps_destination_style() {
    let t = template();
    let mut dest = Sheet::new("dest");
    dest.set_style(1, 1, CellStyle::new().fill(Color::BLACK));
    let values = CopyMode {
        value: true,
        style: false,
    };
    copy_from_template(&t, &mut dest, 1..=1, 1..=1, 1..=1, values);
    assert_eq!(dest.text(1, 1), Some("Analysis"));
    assert_eq!(dest.style(1, 1).unwrap().fill, Some(Color::BLACK));
}

#[test]
fn test_unstyled_template_cell_leaves_style_alone() {
    let t = template();
    let mut dest = Sheet::new("dest");
    let existing = CellStyle::new().fill(Color(0x123456));
    dest.set_style(2, 1, existing.clone());
    dest.set_style(5, 5, existing.clone());
    copy_from_template(&t, &mut dest, 1..=5, 1..=5, 1..=5, CopyMode::STYLE_ONLY);
    assert_eq!(dest.style(2, 1), Some(&existing));
    assert_eq!(dest.style(5, 5), Some(&existing));
}

#[test]
fn test_remapped_columns_pair_in_order() {
    let t = template();
    let mut dest = Sheet::new("dest");
    copy_from_template(&t, &mut dest, 1..=3, 6..=6, 10..=10, CopyMode::STYLE_ONLY);
    assert!(dest.value(1, 10).is_none());
    assert!(dest.style(3, 10).unwrap().border.is_some());
    assert!(dest.cell(3, 6).is_none());
}

#[test]
fn test_remap_bounded_by_shorter_range() {
    let t = template();
    let mut dest = Sheet::new("dest");
    copy_from_template(&t, &mut dest, 1..=1, 1..=6, 20..=21, CopyMode::ALL);
    assert_eq!(dest.text(1, 20), Some("Analysis"));
    assert!(dest.cell(1, 22).is_none());
    assert_eq!(dest.max_column(), 20);
}

#[test]
fn test_value_copy_of_empty_template_cell_clears_destination() {
    let t = template();
    let mut dest = Sheet::new("dest");
    dest.set_value(4, 4, "stale");
    copy_from_template(&t, &mut dest, 4..=4, 4..=4, 4..=4, CopyMode::ALL);
    assert!(dest.value(4, 4).is_none());
}

#[test]
fn test_repeated_row_styles_every_target_row() {
    let t = template();
    let mut dest = Sheet::new("dest");
    dest.set_value(301, 1, 7.0);
    repeat_template_row(&t, &mut dest, 1, 301..=303, 1..=2, 1..=2, CopyMode::STYLE_ONLY);
    for row in 301..=303 {
        assert!(dest.style(row, 1).unwrap().font.as_ref().unwrap().bold);
        assert!(dest.style(row, 2).is_none());
    }
    assert_eq!(dest.value(301, 1), Some(&CellValue::Number(7.0)));
    assert!(dest.value(302, 1).is_none());
}

#[test]
fn test_repeated_row_remaps_columns() {
    let t = template();
    let mut dest = Sheet::new("dest");
    repeat_template_row(&t, &mut dest, 3, 400..=401, 6..=6, 9..=9, CopyMode::STYLE_ONLY);
    assert!(dest.style(400, 9).unwrap().border.is_some());
    assert!(dest.style(401, 9).unwrap().border.is_some());
    assert!(dest.cell(400, 6).is_none());
}
