use super::*;
use crate::document::Sheet;

fn settings_order() -> ChannelOrder {
    ChannelOrder::from_pairs([
        ("C1", "Channel 1 (C1)"),
        ("C2", "Channel 2 (C2)"),
        ("C3", "Channel 3 (C3)"),
    ])
}

fn count_table(values: &[f64]) -> RawTable {
    RawTable::from_column("Count", values)
}

fn tables(entries: &[(&str, &str, RawTable)]) -> SampleTables {
    let mut out = SampleTables::new();
    for (sample, channel, table) in entries {
        out.insert(sample, channel, &format!("{sample}_{channel}.csv"), table.clone())
            .unwrap();
    }
    out
}

/// Reads the data region back the way it was written: slice labels in column G, channel
/// names on the header row.
fn read_back(sheet: &Sheet) -> MergedTable {
    let mut table = MergedTable::default();
    let mut col = DATA_START_COL + 1;
    while let Some(name) = sheet.text(DATA_HEADER_ROW, col) {
        table.channels.push(name.to_string());
        col += 1;
    }
    let mut row = FIRST_DATA_ROW;
    while let Some(slice) = sheet.text(row, DATA_START_COL) {
        table.slices.push(slice.to_string());
        table.values.push(
            (0..table.channels.len())
                .map(|i| {
                    sheet
                        .value(row, DATA_START_COL + 1 + i as u16)
                        .and_then(CellValue::as_number)
                })
                .collect(),
        );
        row += 1;
    }
    table
}

#[test]
fn test_columns_follow_declared_order_and_absent_channels_are_omitted() {
    let input = tables(&[
        ("S1", "C3", count_table(&[3.0, 0.0])),
        ("S1", "C1", count_table(&[1.0, 2.0])),
    ]);
    let out = run_stage1(&input, &settings_order(), Metric::Count);
    assert_eq!(out.samples.len(), 1);
    let sample = &out.samples[0];
    assert_eq!(sample.table.channels, vec!["C1", "C3"]);
    assert_eq!(sample.channels[1].label, "Channel 3 (C3)");
    assert!(out.skipped.is_empty());
    assert!(out.unknown_channels.is_empty());
}

#[test]
fn test_single_channel_sample_is_skipped_not_an_error() {
    let input = tables(&[
        ("lonely", "C2", count_table(&[1.0])),
        ("S1", "C1", count_table(&[1.0])),
        ("S1", "C2", count_table(&[2.0])),
    ]);
    let out = run_stage1(&input, &settings_order(), Metric::Count);
    assert_eq!(out.samples.len(), 1);
    assert_eq!(out.samples[0].sample, "S1");
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].sample, "lonely");
}

#[test]
fn test_unknown_channels_are_reported_and_excluded() {
    let input = tables(&[
        ("S1", "C1", count_table(&[1.0])),
        ("S1", "FITC", count_table(&[5.0])),
        ("S1", "C2", count_table(&[2.0])),
    ]);
    let out = run_stage1(&input, &settings_order(), Metric::Count);
    assert_eq!(out.unknown_channels.len(), 1);
    assert_eq!(out.unknown_channels[0].channel, "FITC");
    assert_eq!(out.unknown_channels[0].file, "S1_FITC.csv");
    assert_eq!(out.samples[0].table.channels, vec!["C1", "C2"]);
}

#[test]
fn test_missing_metric_column_is_a_file_issue() {
    let input = tables(&[
        ("S1", "C1", count_table(&[1.0])),
        ("S1", "C2", count_table(&[2.0])),
        ("S1", "C3", RawTable::from_column("Total Area", &[2.5])),
    ]);
    let out = run_stage1(&input, &settings_order(), Metric::Count);
    assert_eq!(out.file_issues.len(), 1);
    assert_eq!(out.file_issues[0].file, "S1_C3.csv");
    assert_eq!(out.samples[0].n_channels(), 2);

    let area = run_stage1(&input, &settings_order(), Metric::Area);
    assert_eq!(area.file_issues.len(), 2);
    assert!(area.samples.is_empty());
    assert_eq!(area.skipped.len(), 1);
}

#[test]
fn test_slices_are_numbered_and_outer_joined() {
    let input = tables(&[
        ("S1", "C1", count_table(&[1.0, 2.0, 3.0])),
        ("S1", "C2", count_table(&[4.0, 5.0])),
    ]);
    let out = run_stage1(&input, &settings_order(), Metric::Count);
    let table = &out.samples[0].table;
    assert_eq!(table.slices, vec!["Slice_1", "Slice_2", "Slice_3"]);
    assert_eq!(table.get("Slice_2", "C2"), Some(5.0));
    assert_eq!(table.get("Slice_3", "C2"), None);
}

#[test]
fn test_existing_slice_labels_are_used() {
    let with_slices = RawTable::new(
        vec!["Slice".to_string(), "Count".to_string()],
        vec![
            vec!["img_b".to_string(), "7".to_string()],
            vec!["img_a".to_string(), "NaN".to_string()],
        ],
    );
    let values = channel_measurements(&with_slices, Metric::Count).unwrap();
    assert_eq!(
        values,
        vec![("img_b".to_string(), Some(7.0)), ("img_a".to_string(), None)]
    );
}

#[test]
fn test_sheet_names_are_legal_and_unique() {
    let input = tables(&[
        ("summary", "C1", count_table(&[1.0])),
        ("summary", "C2", count_table(&[1.0])),
    ]);
    let out = run_stage1(&input, &settings_order(), Metric::Count);
    assert_eq!(out.samples[0].sheet_name, "summary_2");
}

#[test]
fn test_written_data_region_reads_back() {
    let input = tables(&[
        ("S1", "C2", count_table(&[4.0, 0.0, 6.0])),
        ("S1", "C1", count_table(&[1.0, 2.0])),
        ("S2", "C1", count_table(&[9.0])),
        ("S2", "C3", count_table(&[8.0])),
    ]);
    let out = run_stage1(&input, &settings_order(), Metric::Count);
    let mut document = Document::new();
    write_stage1(&mut document, &out.samples);

    assert_eq!(document.sheet_names(), vec!["summary", "S1", "S2"]);
    let summary = document.sheet("summary").unwrap();
    assert_eq!(summary.text(3, 1), Some("S1"));
    assert_eq!(summary.text(4, 1), Some("S2"));

    let s1 = document.sheet("S1").unwrap();
    assert_eq!(s1.text(3, 7), Some("Slice"));
    assert_eq!(s1.text(6, 8), Some("NaN"));
    assert_eq!(read_back(s1), out.samples[0].table);
    assert_eq!(read_back(document.sheet("S2").unwrap()), out.samples[1].table);
}
