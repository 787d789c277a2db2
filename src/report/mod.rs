//! Everything written to the output directory.

use std::path::{Path, PathBuf};

pub mod notices;
pub mod xlsx;

pub use notices::{RunSummary, SheetSummary, write_notices};
pub use xlsx::write_xlsx;

pub const NOTICES_SUFFIX: &str = "_notices.json";

/// `<out>/<name>.xlsx` and `<out>/<name>_notices.json`.
pub fn output_paths(out_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        out_dir.join(format!("{name}.xlsx")),
        out_dir.join(format!("{name}{NOTICES_SUFFIX}")),
    )
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
