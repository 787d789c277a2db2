use std::sync::OnceLock;

use regex::Regex;

use crate::model::RawTable;

fn table_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)_(.+)\.csv$").expect("valid file name regex"))
}

/// Splits `<sample>_<channel>.csv` at its last underscore.
pub fn parse_table_name(file_name: &str) -> Option<(String, String)> {
    let caps = table_name_re().captures(file_name)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTable {
    pub channel: String,
    /// File the table came from, for notices.
    pub source: String,
    pub table: RawTable,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleEntry {
    pub name: String,
    pub channels: Vec<ChannelTable>,
}

impl SampleEntry {
    pub fn channel(&self, name: &str) -> Option<&ChannelTable> {
        self.channels.iter().find(|c| c.channel == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("channel {channel} is already present for sample {sample} (from {existing})")]
pub struct DuplicateChannel {
    pub sample: String,
    pub channel: String,
    pub existing: String,
}

/// Raw tables grouped by sample, in the order samples were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTables {
    samples: Vec<SampleEntry>,
}

impl SampleTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        sample: &str,
        channel: &str,
        source: &str,
        table: RawTable,
    ) -> Result<(), DuplicateChannel> {
        let idx = match self.samples.iter().position(|s| s.name == sample) {
            Some(idx) => idx,
            None => {
                self.samples.push(SampleEntry {
                    name: sample.to_string(),
                    channels: Vec::new(),
                });
                self.samples.len() - 1
            }
        };
        let entry = &mut self.samples[idx];
        if let Some(existing) = entry.channel(channel) {
            return Err(DuplicateChannel {
                sample: sample.to_string(),
                channel: channel.to_string(),
                existing: existing.source.clone(),
            });
        }
        entry.channels.push(ChannelTable {
            channel: channel.to_string(),
            source: source.to_string(),
            table,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleEntry> {
        self.samples.iter()
    }

    #[cfg(test)]
    pub fn get(&self, sample: &str) -> Option<&SampleEntry> {
        self.samples.iter().find(|s| s.name == sample)
    }

    pub fn n_tables(&self) -> usize {
        self.samples.iter().map(|s| s.channels.len()).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/samples.rs"]
mod tests;
