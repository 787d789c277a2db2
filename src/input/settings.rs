use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::input::InputError;
use crate::model::ChannelOrder;
use crate::model::channel::ordinal_label;

pub const SETTINGS_FILE_NAME: &str = "Analysis_Settings.txt";

fn channel_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Channel (\d+): (.+)$").expect("valid channel regex"))
}

/// Reads `Channel <n>: <name>` declarations in file order. Other lines are ignored.
pub fn parse_settings(text: &str) -> ChannelOrder {
    let mut order = ChannelOrder::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if !line.starts_with("Channel") {
            continue;
        }
        let Some(caps) = channel_line_re().captures(line) else {
            crate::debug!("ignoring settings line: {}", line);
            continue;
        };
        let Ok(ordinal) = caps[1].parse::<u32>() else {
            crate::warn!("channel number out of range in settings line: {}", line);
            continue;
        };
        let name = caps[2].trim();
        if name.is_empty() {
            continue;
        }
        order.declare(name, ordinal_label(ordinal));
    }
    order
}

pub fn read_settings(path: &Path) -> Result<ChannelOrder, InputError> {
    let bytes = std::fs::read(path)?;
    let order = parse_settings(&String::from_utf8_lossy(&bytes));
    if order.is_empty() {
        return Err(InputError::Settings(format!(
            "{} declares no channels",
            path.display()
        )));
    }
    Ok(order)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/settings.rs"]
mod tests;
