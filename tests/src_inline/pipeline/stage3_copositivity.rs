use super::*;
use crate::document::{CellValue, Document};
use crate::input::SampleTables;
use crate::model::{ChannelOrder, RawTable};
use crate::pipeline::stage1_merge::{SUMMARY_SHEET, run_stage1, write_stage1};
use crate::pipeline::SampleSheet;
use crate::pipeline::stage2_sheets::run_stage2;
use crate::template::builtin::{sheet_template, summary_template};

fn stained_order() -> ChannelOrder {
    ChannelOrder::from_pairs([("C1", "DAPI"), ("C2", "GFP"), ("C3", "RFP")])
}

fn prepared(order: &ChannelOrder, channels: &[&str]) -> (Document, MergedSample) {
    let mut tables = SampleTables::new();
    for channel in channels {
        tables
            .insert(
                "S1",
                channel,
                &format!("S1_{channel}.csv"),
                RawTable::from_column("Count", &[3.0, 0.0, 5.0, 2.0, 1.0]),
            )
            .unwrap();
    }
    let merged = run_stage1(&tables, order, Metric::Count);
    let mut document = Document::new();
    write_stage1(&mut document, &merged.samples);
    let sample = merged.samples.into_iter().next().unwrap();
    (document, sample)
}

#[test]
fn test_display_labels_use_parenthesised_part() {
    let channels = vec![
        Channel::new("C1", "Channel 1 (C1)"),
        Channel::new("C3", "Channel 3 (C3)"),
        Channel::new("C4", "DAPI"),
    ];
    assert_eq!(display_labels(&channels), vec!["C1", "C3", "DAPI"]);
}

#[test]
fn test_supported_channel_counts() {
    let coords = CoordinateTable::builtin();
    assert!(!copositivity_supported(&coords, Metric::Count, 1));
    assert!(copositivity_supported(&coords, Metric::Count, 2));
    assert!(copositivity_supported(&coords, Metric::Area, 5));
    // Inside the defined range but without a layout.
    assert!(!copositivity_supported(&coords, Metric::Count, 6));
    assert!(!copositivity_supported(&coords, Metric::Count, 7));
}

#[test]
fn test_two_channel_sheet_gets_one_combination() {
    let order = stained_order();
    let (mut document, sample) = prepared(&order, &["C1", "C2"]);
    let template = sheet_template(Metric::Count, Some(2));
    let coords = CoordinateTable::builtin();
    let sheet = document.sheet_mut("S1").unwrap();
    let end = run_stage2(&template, sheet, &sample, Metric::Count, true);

    let placement = run_stage3_sheet(&template, sheet, &sample, Metric::Count, &coords, end).unwrap();
    assert_eq!(placement.columns, Span::new(10, 12));
    assert_eq!(placement.rows, Span::new(19, 23));
    assert_eq!(placement.combinations, 1);

    assert_eq!(sheet.text(2, 11), Some("DAPI+GFP"));
    assert_eq!(sheet.text(1, 11), Some("Co-positivity"));
    assert!(matches!(sheet.value(4, 11), Some(CellValue::Formula(_))));
    assert_eq!(sheet.text(20, 1), Some("Co-positivity"));
    assert_eq!(sheet.text(21, 1), Some("DAPI+GFP"));
    assert_eq!(sheet.style(19, 1).unwrap().fill, Some(Color::BLACK));

    let scale = sheet
        .conditional_formats()
        .iter()
        .find(|f| matches!(f, ConditionalFormat::ColorScale { .. }))
        .unwrap();
    assert_eq!(
        *scale,
        ConditionalFormat::ColorScale {
            range: CellRange::new(4, 11, sheet.max_row(), 11),
            min_color: Color::WHITE,
            max_color: Color(0xFF5370),
        }
    );
}

#[test]
fn test_combination_labels_follow_present_channels() {
    let order = ChannelOrder::from_pairs([
        ("C1", "Channel 1 (C1)"),
        ("C2", "Channel 2 (C2)"),
        ("C3", "Channel 3 (C3)"),
    ]);
    let (mut document, sample) = prepared(&order, &["C1", "C3"]);
    let template = sheet_template(Metric::Count, Some(2));
    let coords = CoordinateTable::builtin();
    let sheet = document.sheet_mut("S1").unwrap();
    let end = run_stage2(&template, sheet, &sample, Metric::Count, true);

    run_stage3_sheet(&template, sheet, &sample, Metric::Count, &coords, end).unwrap();
    assert_eq!(sheet.text(2, 11), Some("C1+C3"));
    assert_eq!(sheet.text(21, 1), Some("C1+C3"));
}

#[test]
fn test_three_channel_sheet_lists_combinations_in_order() {
    let order = stained_order();
    let (mut document, sample) = prepared(&order, &["C3", "C1", "C2"]);
    let template = sheet_template(Metric::Count, Some(3));
    let coords = CoordinateTable::builtin();
    let sheet = document.sheet_mut("S1").unwrap();
    let end = run_stage2(&template, sheet, &sample, Metric::Count, true);

    let placement = run_stage3_sheet(&template, sheet, &sample, Metric::Count, &coords, end).unwrap();
    assert_eq!(placement.combinations, 4);
    let row2: Vec<&str> = (12..=15).filter_map(|c| sheet.text(2, c)).collect();
    assert_eq!(row2, vec!["DAPI+GFP", "DAPI+RFP", "GFP+RFP", "DAPI+GFP+RFP"]);
    assert_eq!(sheet.text(end + 6, 1), Some("DAPI+GFP+RFP"));
}

#[test]
fn test_sheet_without_layout_is_left_alone() {
    let order = stained_order();
    let (mut document, sample) = prepared(&order, &["C1", "C2"]);
    let template = sheet_template(Metric::Count, Some(2));
    let sheet = document.sheet_mut("S1").unwrap();
    let end = run_stage2(&template, sheet, &sample, Metric::Count, false);
    let before = sheet.clone();

    let placement =
        run_stage3_sheet(&template, sheet, &sample, Metric::Count, &CoordinateTable::empty(), end);
    assert!(placement.is_none());
    assert_eq!(*sheet, before);
}

#[test]
fn test_summary_labels_cover_the_channel_union() {
    let order = stained_order();
    let (mut document, _) = prepared(&order, &["C1", "C2"]);
    let template = summary_template(Metric::Count, Some(2));
    let coords = CoordinateTable::builtin();
    let summary = document.sheet_mut(SUMMARY_SHEET).unwrap();
    let union = vec![Channel::new("C1", "DAPI"), Channel::new("C2", "GFP")];

    let outcome = run_stage3_summary(&template, summary, &coords, 2, &union, &[]);
    assert_eq!(
        outcome,
        SummaryCopositivity::Placed {
            columns: Span::new(10, 11),
            labels: 1
        }
    );
    assert_eq!(summary.text(1, 10), Some("DAPI+GFP"));
    assert_eq!(summary.text(2, 10), Some("Co-positive images"));
    assert!(matches!(summary.value(3, 10), Some(CellValue::Formula(_))));
}

#[test]
fn test_summary_labels_truncate_to_block_width() {
    let order = stained_order();
    let (mut document, _) = prepared(&order, &["C1", "C2"]);
    let template = summary_template(Metric::Count, Some(2));
    let coords = CoordinateTable::builtin();
    let summary = document.sheet_mut(SUMMARY_SHEET).unwrap();
    let union: Vec<Channel> = order.iter().cloned().collect();

    let outcome = run_stage3_summary(&template, summary, &coords, 2, &union, &[]);
    assert_eq!(
        outcome,
        SummaryCopositivity::Placed {
            columns: Span::new(10, 11),
            labels: 1
        }
    );
    assert_eq!(summary.text(1, 10), Some("DAPI+GFP"));
    assert_ne!(summary.text(1, 11), Some("DAPI+RFP"));
}

#[test]
fn test_summary_skipped_outside_defined_counts() {
    let template = summary_template(Metric::Count, None);
    let coords = CoordinateTable::builtin();
    let mut summary = Sheet::new(SUMMARY_SHEET);

    for n in [1, 6, 7] {
        let outcome = run_stage3_summary(&template, &mut summary, &coords, n, &[], &[]);
        assert!(matches!(outcome, SummaryCopositivity::Skipped(_)), "n = {n}");
    }
    assert_eq!(summary.max_row(), 0);
}

#[test]
fn test_summary_rows_read_matching_combination_totals() {
    let order = stained_order();
    let (mut document, _) = prepared(&order, &["C1", "C3"]);
    let template = summary_template(Metric::Count, Some(3));
    let coords = CoordinateTable::builtin();
    let summary = document.sheet_mut(SUMMARY_SHEET).unwrap();
    let union: Vec<Channel> = order.iter().cloned().collect();
    let record = SampleSheet {
        sample: "S1".to_string(),
        sheet_name: "S1".to_string(),
        n_channels: 2,
        channels: vec![Channel::new("C1", "DAPI"), Channel::new("C3", "RFP")],
        analysis_end: 18,
        copositivity: Some(CopositivityPlacement {
            columns: Span::new(10, 12),
            rows: Span::new(19, 23),
            combinations: 1,
        }),
    };

    run_stage3_summary(&template, summary, &coords, 3, &union, &[record.clone()]);
    assert_eq!(summary.text(1, 15), Some("DAPI+RFP"));
    assert!(summary.value(3, 14).is_none());
    assert!(matches!(summary.value(3, 15), Some(CellValue::Formula(f)) if f.contains("'!B21\"")));
    assert!(summary.value(3, 16).is_none());
    assert!(summary.value(3, 17).is_none());

    // Without a co-positivity block on the sample sheet there is nothing to read.
    let bare = SampleSheet {
        copositivity: None,
        ..record
    };
    run_stage3_summary(&template, summary, &coords, 3, &union, &[bare]);
    assert!(summary.value(3, 15).is_none());
}

#[test]
fn test_long_sheet_flags_reach_the_last_slice() {
    let order = stained_order();
    let values: Vec<f64> = (0..320).map(|i| (i % 2) as f64).collect();
    let mut tables = SampleTables::new();
    for channel in ["C1", "C2"] {
        tables
            .insert("S1", channel, &format!("S1_{channel}.csv"), RawTable::from_column("Count", &values))
            .unwrap();
    }
    let merged = run_stage1(&tables, &order, Metric::Count);
    let mut document = Document::new();
    write_stage1(&mut document, &merged.samples);
    let sample = &merged.samples[0];
    let template = sheet_template(Metric::Count, Some(2));
    let sheet = document.sheet_mut("S1").unwrap();
    let end = run_stage2(&template, sheet, sample, Metric::Count, true);

    run_stage3_sheet(&template, sheet, sample, Metric::Count, &CoordinateTable::builtin(), end).unwrap();
    assert_eq!(sheet.max_row(), 323);
    assert_eq!(
        sheet.value(323, 11),
        Some(&CellValue::Formula(
            "=IF(COUNT(H323,I323)<2,\"\",IF(AND(H323>0,I323>0),1,0))".to_string()
        ))
    );
    assert!(sheet.value(323, 12).is_none());
    assert_eq!(sheet.style(323, 12).unwrap().fill, sheet.style(300, 12).unwrap().fill);
}
