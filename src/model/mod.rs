pub mod channel;
pub mod metric;
pub mod notices;
pub mod table;

pub use channel::{Channel, ChannelOrder};
pub use metric::Metric;
pub use notices::{FileIssue, RunNotices, SkippedSample, UnknownChannel};
pub use table::{MergedTable, RawTable, parse_measurement};
