pub mod combos;
pub mod coords;

pub use combos::{channel_combinations, combination_names};
pub use coords::{CoordinateTable, Span};
