//! Output generation for one press run.
//!
//! # Submodules
//!
//! - [`pdf`]: the printed paper, an A4 PDF with one frame per column
//! - [`text`]: the same paper as plain text, columns side by side
//! - [`json`]: a JSON copy of the placement plan for inspection
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── morning_press_20261016_071500.pdf
//! ├── morning_press_20261016_071500.txt
//! ├── morning_press_20261016_071500.json
//! └── cache/
//!     └── 2026-10-16.json
//! ```

pub mod json;
pub mod pdf;
pub mod text;

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Path of the printable paper for a run started at `at`.
pub fn paper_path(output_dir: &Path, at: NaiveDateTime) -> PathBuf {
    output_dir.join(format!("morning_press_{}.pdf", at.format("%Y%m%d_%H%M%S")))
}
