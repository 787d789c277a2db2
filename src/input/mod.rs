use std::path::{Path, PathBuf};

pub mod csv_table;
pub mod samples;
pub mod settings;

use csv_table::read_raw_table;
use samples::parse_table_name;
use settings::{SETTINGS_FILE_NAME, read_settings};

pub use samples::{SampleEntry, SampleTables};

use crate::model::{ChannelOrder, FileIssue};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Everything read from an input folder, before merging.
#[derive(Debug, Clone)]
pub struct InputBundle {
    pub input_dir: PathBuf,
    pub settings_path: PathBuf,
    pub channel_order: ChannelOrder,
    pub samples: SampleTables,
    /// Files that could not be used; the rest of the run continues without them.
    pub file_issues: Vec<FileIssue>,
    pub n_csv_files: usize,
}

pub fn load_input_dir(
    input_dir: &Path,
    settings_path: Option<&Path>,
) -> Result<InputBundle, InputError> {
    if !input_dir.is_dir() {
        return Err(InputError::MissingInput(format!(
            "input folder {} does not exist",
            input_dir.display()
        )));
    }
    let settings_path = settings_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input_dir.join(SETTINGS_FILE_NAME));
    if !settings_path.is_file() {
        return Err(InputError::MissingInput(format!(
            "settings file {} not found",
            settings_path.display()
        )));
    }
    let channel_order = read_settings(&settings_path)?;
    crate::info!(
        "settings declare {} channels: {}",
        channel_order.len(),
        channel_order.names().join(" | ")
    );

    let csv_files = list_csv_files(input_dir)?;
    crate::info!(
        "discovered {} measurement tables in {}",
        csv_files.len(),
        input_dir.display()
    );

    let mut samples = SampleTables::new();
    let mut file_issues = Vec::new();
    for path in &csv_files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some((sample, channel)) = parse_table_name(&file_name) else {
            file_issues.push(FileIssue {
                file: file_name,
                reason: "file name does not match <sample>_<channel>.csv".to_string(),
            });
            continue;
        };
        let table = match read_raw_table(path) {
            Ok(table) => table,
            Err(err) => {
                file_issues.push(FileIssue {
                    file: file_name,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        if let Err(dup) = samples.insert(&sample, &channel, &file_name, table) {
            file_issues.push(FileIssue {
                file: file_name,
                reason: dup.to_string(),
            });
        }
    }

    for issue in &file_issues {
        crate::warn!("skipping {}: {}", issue.file, issue.reason);
    }
    if samples.is_empty() {
        crate::warn!("no usable measurement tables in {}", input_dir.display());
    }

    Ok(InputBundle {
        input_dir: input_dir.to_path_buf(),
        settings_path,
        channel_order,
        samples,
        file_issues,
        n_csv_files: csv_files.len(),
    })
}

/// `*.csv` files directly under `dir`, hidden and `_`-prefixed names excluded, sorted by name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name.starts_with('_') || !name.ends_with(".csv") {
            continue;
        }
        out.push(entry.path());
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/mod.rs"]
mod tests;
