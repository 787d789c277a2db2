use serde::Serialize;

/// An input file that could not be used at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIssue {
    pub file: String,
    pub reason: String,
}

/// A sample excluded from the report because it resolved fewer than two channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSample {
    pub sample: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownChannel {
    pub file: String,
    pub channel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunNotices {
    pub skipped_samples: Vec<SkippedSample>,
    pub file_issues: Vec<FileIssue>,
    pub unknown_channels: Vec<UnknownChannel>,
    pub copositivity_skipped: Vec<String>,
}

impl RunNotices {
    pub fn is_empty(&self) -> bool {
        self.skipped_samples.is_empty()
            && self.file_issues.is_empty()
            && self.unknown_channels.is_empty()
            && self.copositivity_skipped.is_empty()
    }

    /// All unknown-channel notices folded into one message, with the declared channels.
    pub fn unknown_channel_message(&self, declared: &[&str]) -> Option<String> {
        if self.unknown_channels.is_empty() {
            return None;
        }
        let mut out = String::new();
        for notice in &self.unknown_channels {
            out.push_str(&format!(
                "found unknown channel [{}] in file: {}\n",
                notice.channel, notice.file
            ));
        }
        out.push_str(&format!(
            "settings declare the following channels: {}",
            declared.join(" | ")
        ));
        Some(out)
    }
}
