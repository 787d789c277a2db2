use std::path::Path;

use crate::input::InputError;
use crate::model::RawTable;

/// Reads a measurement table exported by the imaging macro. Ragged rows are accepted and
/// padded with empty cells.
pub fn read_raw_table(path: &Path) -> Result<RawTable, InputError> {
    let file = std::fs::File::open(path)?;
    parse_raw_table(file, &path.display().to_string())
}

pub fn parse_raw_table<R: std::io::Read>(reader: R, origin: &str) -> Result<RawTable, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let csv_err = |source: csv::Error| InputError::Csv {
        file: origin.to_string(),
        source,
    };
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(InputError::Parse(format!("{origin} has no header row")));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(csv_err)?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len().max(row.len()), String::new());
        rows.push(row);
    }
    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/csv_table.rs"]
mod tests;
