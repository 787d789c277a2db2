use super::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("aura_report_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_settings(dir: &Path) {
    fs::write(
        dir.join(SETTINGS_FILE_NAME),
        "Channel 1: DAPI\nChannel 2: GFP\n",
    )
    .unwrap();
}

#[test]
fn test_load_folder_groups_tables_by_sample() {
    let dir = make_temp_dir();
    write_settings(&dir);
    fs::write(dir.join("S2_GFP.csv"), "Count\n1\n2\n").unwrap();
    fs::write(dir.join("S1_DAPI.csv"), "Count\n3\n").unwrap();
    fs::write(dir.join("S1_GFP.csv"), "Count\n4\n").unwrap();
    fs::write(dir.join(".S1_DAPI.csv"), "junk").unwrap();
    fs::write(dir.join("_summary.csv"), "junk").unwrap();
    fs::write(dir.join("notes.txt"), "junk").unwrap();

    let bundle = load_input_dir(&dir, None).unwrap();
    assert_eq!(bundle.n_csv_files, 3);
    assert_eq!(bundle.channel_order.names(), vec!["DAPI", "GFP"]);
    let names: Vec<&str> = bundle.samples.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["S1", "S2"]);
    assert!(bundle.file_issues.is_empty());
}

#[test]
fn test_bad_file_names_are_file_issues() {
    let dir = make_temp_dir();
    write_settings(&dir);
    fs::write(dir.join("nounderscore.csv"), "Count\n1\n").unwrap();
    fs::write(dir.join("S1_DAPI.csv"), "Count\n1\n").unwrap();

    let bundle = load_input_dir(&dir, None).unwrap();
    assert_eq!(bundle.samples.len(), 1);
    assert_eq!(bundle.file_issues.len(), 1);
    assert_eq!(bundle.file_issues[0].file, "nounderscore.csv");
}

#[test]
fn test_missing_settings_is_fatal() {
    let dir = make_temp_dir();
    fs::write(dir.join("S1_DAPI.csv"), "Count\n1\n").unwrap();
    let err = load_input_dir(&dir, None).unwrap_err();
    assert!(matches!(err, InputError::MissingInput(_)));
}

#[test]
fn test_settings_path_override() {
    let dir = make_temp_dir();
    let other = make_temp_dir();
    let settings = other.join("custom.txt");
    fs::write(&settings, "Channel 1: Cy5\n").unwrap();
    let bundle = load_input_dir(&dir, Some(&settings)).unwrap();
    assert_eq!(bundle.settings_path, settings);
    assert_eq!(bundle.channel_order.names(), vec!["Cy5"]);
    assert!(bundle.samples.is_empty());
}
