use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Count,
    Area,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Count, Metric::Area];

    /// Measurement column read from each raw channel table.
    pub fn column_name(self) -> &'static str {
        match self {
            Metric::Count => "Count",
            Metric::Area => "Total Area",
        }
    }

    /// Height of one channel's block in the analysis area of a sample sheet.
    pub fn per_channel_rows(self) -> u32 {
        match self {
            Metric::Count => 8,
            Metric::Area => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Count => "count",
            Metric::Area => "area",
        }
    }

    pub fn number_format(self) -> &'static str {
        match self {
            Metric::Count => "0",
            Metric::Area => "0.00",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
