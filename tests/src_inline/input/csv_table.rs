use super::*;

#[test]
fn test_parse_headers_and_rows() {
    let data = " ,Slice,Count,Total Area\n1,img_001,12,340.5\n2,img_002,0,0\n";
    let table = parse_raw_table(data.as_bytes(), "S1_GFP.csv").unwrap();
    assert_eq!(table.headers, vec!["", "Slice", "Count", "Total Area"]);
    assert_eq!(table.n_rows(), 2);
    assert_eq!(table.column("Count").unwrap(), vec!["12", "0"]);
    assert_eq!(table.column("Slice").unwrap(), vec!["img_001", "img_002"]);
}

#[test]
fn test_ragged_rows_are_padded() {
    let data = "Slice,Count,Total Area\nimg_001,3\n";
    let table = parse_raw_table(data.as_bytes(), "S1_GFP.csv").unwrap();
    assert_eq!(table.rows[0].len(), 3);
    assert_eq!(table.column("Total Area").unwrap(), vec![""]);
}

#[test]
fn test_byte_order_mark_is_stripped() {
    let data = "\u{feff}Count\n5\n";
    let table = parse_raw_table(data.as_bytes(), "S1_GFP.csv").unwrap();
    assert_eq!(table.column_index("Count"), Some(0));
}

#[test]
fn test_empty_input_is_rejected() {
    let err = parse_raw_table("".as_bytes(), "empty.csv").unwrap_err();
    assert!(err.to_string().contains("empty.csv"));
}
