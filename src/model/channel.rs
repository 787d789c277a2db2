use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub name: String,
    pub label: String,
}

impl Channel {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    pub fn short_label(&self) -> &str {
        short_label(&self.label)
    }
}

pub fn ordinal_label(ordinal: u32) -> String {
    format!("Channel {ordinal} (C{ordinal})")
}

/// `"Channel 2 (C2)"` gives `"C2"`; a label without a parenthesised part is used whole.
pub fn short_label(label: &str) -> &str {
    if let Some(open) = label.find('(') {
        let rest = &label[open + 1..];
        if let Some(close) = rest.find(')') {
            let inner = rest[..close].trim();
            if !inner.is_empty() {
                return inner;
            }
        }
    }
    label.trim()
}

/// For each channel of `union`, its position in `channels` matched by ordinal label.
pub fn positions_by_label(union: &[Channel], channels: &[Channel]) -> Vec<Option<usize>> {
    union
        .iter()
        .map(|u| channels.iter().position(|c| c.label == u.label))
        .collect()
}

/// Fixed channel-name to ordinal-label mapping for a run, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOrder {
    channels: Vec<Channel>,
}

impl ChannelOrder {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_pairs<I, N, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, L)>,
        N: Into<String>,
        L: Into<String>,
    {
        let mut order = Self::new();
        for (name, label) in pairs {
            order.declare(name, label);
        }
        order
    }

    /// Re-declaring a name keeps its position and replaces its label.
    pub fn declare(&mut self, name: impl Into<String>, label: impl Into<String>) {
        let name = name.into();
        let label = label.into();
        if let Some(existing) = self.channels.iter_mut().find(|c| c.name == name) {
            existing.label = label;
            return;
        }
        self.channels.push(Channel { name, label });
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// Channels seen in any of `sets`, deduplicated by ordinal label, in declared order.
    pub fn union_of<'a, I>(&self, sets: I) -> Vec<Channel>
    where
        I: IntoIterator<Item = &'a [Channel]>,
    {
        let mut seen_labels = BTreeSet::new();
        for set in sets {
            for channel in set {
                seen_labels.insert(channel.label.as_str());
            }
        }
        let mut emitted = BTreeSet::new();
        let mut out = Vec::new();
        for channel in &self.channels {
            if seen_labels.contains(channel.label.as_str()) && emitted.insert(channel.label.clone())
            {
                out.push(channel.clone());
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/channel.rs"]
mod tests;
