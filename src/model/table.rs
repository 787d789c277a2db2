/// One channel's measurements for one sample, as read from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    #[cfg(test)]
    pub fn from_column(header: &str, values: &[f64]) -> Self {
        Self {
            headers: vec![header.to_string()],
            rows: values.iter().map(|v| vec![v.to_string()]).collect(),
        }
    }

    #[cfg(test)]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(|s| s.trim()).unwrap_or(""))
                .collect(),
        )
    }
}

pub fn parse_measurement(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_nan() { None } else { Some(value) }
}

/// Per-sample table: one row per image slice, one column per resolved channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    pub slices: Vec<String>,
    pub channels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[cfg(test)]
impl MergedTable {
    pub fn get(&self, slice: &str, channel: &str) -> Option<f64> {
        let row = self.slices.iter().position(|s| s == slice)?;
        let col = self.channels.iter().position(|c| c == channel)?;
        self.values[row][col]
    }
}
