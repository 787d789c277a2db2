use super::*;
use crate::document::style::BorderStyle;

#[test]
fn test_column_letters() {
    assert_eq!(column_letter(1), "A");
    assert_eq!(column_letter(8), "H");
    assert_eq!(column_letter(26), "Z");
    assert_eq!(column_letter(27), "AA");
    assert_eq!(column_letter(52), "AZ");
    assert_eq!(column_letter(703), "AAA");
    assert_eq!(cell_ref(4, 8), "H4");
}

#[test]
fn test_max_row_counts_styled_cells() {
    let mut sheet = Sheet::new("s");
    assert_eq!(sheet.max_row(), 0);
    sheet.set_value(3, 7, "Slice");
    sheet.set_style(50, 2, CellStyle::new().border(BorderStyle::Thin));
    assert_eq!(sheet.max_row(), 50);
    assert_eq!(sheet.max_column(), 7);
    assert_eq!(sheet.min_column(), 2);
}

#[test]
fn test_put_value_none_clears_value_keeps_style() {
    let mut sheet = Sheet::new("s");
    sheet.set_value(1, 1, "x");
    sheet.set_style(1, 1, CellStyle::new().bold());
    sheet.put_value(1, 1, None);
    assert!(sheet.value(1, 1).is_none());
    assert!(sheet.style(1, 1).is_some());

    sheet.set_value(2, 2, 1.5);
    sheet.put_value(2, 2, None);
    assert!(sheet.cell(2, 2).is_none());
}

#[test]
fn test_add_sheet_is_idempotent_by_name() {
    let mut doc = Document::new();
    doc.add_sheet("summary").set_value(1, 1, "Sample");
    doc.add_sheet("S1");
    doc.add_sheet("summary");
    assert_eq!(doc.sheet_names(), vec!["summary", "S1"]);
    assert_eq!(doc.sheet("summary").unwrap().text(1, 1), Some("Sample"));
}

#[test]
fn test_empty_style_detection() {
    assert!(CellStyle::new().is_empty());
    assert!(!CellStyle::new().fill(Color::BLACK).is_empty());
    let mut style = CellStyle::new();
    style.border = Some(Default::default());
    assert!(style.is_empty());
}

#[test]
fn test_color_serde_hex() {
    let json = serde_json::to_string(&Color(0xFF5370)).unwrap();
    assert_eq!(json, "\"#FF5370\"");
    let back: Color = serde_json::from_str("\"#e99bb5\"").unwrap();
    assert_eq!(back, Color(0xE99BB5));
    assert!(serde_json::from_str::<Color>("\"red\"").is_err());
}

#[test]
fn test_range_a1() {
    let range = CellRange::new(4, 11, 50, 11);
    assert_eq!(range.to_a1(), "K4:K50");
    assert!(range.is_valid());
    assert!(!CellRange::new(5, 1, 4, 1).is_valid());
}

#[test]
fn test_sheet_names_are_sanitised_and_unique() {
    let mut taken = BTreeSet::from(["summary".to_string()]);
    assert_eq!(unique_sheet_name("a/b:c", &mut taken), "a_b_c");
    assert_eq!(unique_sheet_name("Summary", &mut taken), "Summary_2");
    assert_eq!(unique_sheet_name("'quoted'", &mut taken), "quoted");
    assert_eq!(unique_sheet_name("  ", &mut taken), "Sheet");

    let long = "x".repeat(40);
    let first = unique_sheet_name(&long, &mut taken);
    assert_eq!(first.chars().count(), MAX_SHEET_NAME_LEN);
    let second = unique_sheet_name(&long, &mut taken);
    assert_eq!(second.chars().count(), MAX_SHEET_NAME_LEN);
    assert!(second.ends_with("_2"));
}
