//! Plain-text copy of the paper, written next to the PDF.
//!
//! Each page is a masthead, the columns drawn side by side, and a footer
//! with the page number. Pages are separated by a form feed, so the copy
//! still prints one sheet per page.
//!
//! ```text
//!                  Morning Press - 2026-10-16
//!                       Morning edition
//! ==========================================================
//! Rust 2026 roadmap        | Weather in Morges
//! ------------------------ | ------------------------
//! The Rust project has     | 9.4°C, Overcast
//! ...
//! ----------------------------------------------------------
//!                         Page 1 of 1
//! ```
//!
//! Blocks are wrapped with the same [`wrap_text`] the document model
//! measured them with, so a column never prints more lines than the layout
//! engine accounted for.

use crate::error::RenderError;
use crate::models::{Block, Column, Edition, Page, PlacementPlan};
use crate::utils::{upcase, wrap_text};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const GUTTER: &str = " | ";
const PAGE_BREAK: char = '\x0c';

/// Render `plan` and write it to `output_path`.
#[instrument(level = "info", skip(plan, edition), fields(pages = plan.pages.len(), path = %output_path.display()))]
pub async fn render(
    plan: &PlacementPlan,
    edition: &Edition,
    column_width: usize,
    output_path: &Path,
) -> Result<PathBuf, RenderError> {
    let text = render_to_string(plan, edition, column_width);
    fs::write(output_path, text)
        .await
        .map_err(|source| RenderError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;
    info!("Wrote printable paper");
    Ok(output_path.to_path_buf())
}

/// The whole paper as text.
pub fn render_to_string(plan: &PlacementPlan, edition: &Edition, column_width: usize) -> String {
    let page_count = plan.pages.len();
    let omitted = plan.overflow.len();
    plan.pages
        .iter()
        .map(|page| {
            let columns = page.columns.len().max(1);
            let total_width = columns * column_width + (columns - 1) * GUTTER.len();
            let mut out = masthead(edition, total_width);
            if page.is_empty() {
                out.push(center("Nothing to print on this page", total_width));
            } else {
                out.extend(page_body(page, column_width));
            }
            out.push("-".repeat(total_width));
            out.push(center(
                &format!("Page {} of {}", page.index + 1, page_count),
                total_width,
            ));
            if omitted > 0 && page.index + 1 == page_count {
                out.push(center(&format!("{omitted} items omitted"), total_width));
            }
            out.join("\n") + "\n"
        })
        .join(&PAGE_BREAK.to_string())
}

fn masthead(edition: &Edition, width: usize) -> Vec<String> {
    vec![
        center(&format!("Morning Press - {}", edition.local_date), width),
        center(&format!("{} edition", upcase(&edition.time_of_day)), width),
        "=".repeat(width),
    ]
}

/// Rows of the page: every column's lines zipped side by side.
fn page_body(page: &Page, width: usize) -> Vec<String> {
    let columns: Vec<Vec<String>> = page.columns.iter().map(|c| column_lines(c, width)).collect();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    (0..rows)
        .map(|row| {
            columns
                .iter()
                .map(|lines| {
                    let cell = lines.get(row).map(String::as_str).unwrap_or("");
                    format!("{cell:<width$}")
                })
                .join(GUTTER)
                .trim_end()
                .to_string()
        })
        .collect()
}

fn column_lines(column: &Column, width: usize) -> Vec<String> {
    column
        .blocks
        .iter()
        .flat_map(|block| block_lines(block, width))
        .collect()
}

/// A block as printed: heading, rule, body. Exactly `estimated_height` lines.
pub fn block_lines(block: &Block, width: usize) -> Vec<String> {
    let mut lines = wrap_text(&block.heading, width);
    if !lines.is_empty() {
        lines.push("-".repeat(width));
    }
    lines.extend(wrap_text(&block.body, width));
    lines
}

fn center(text: &str, width: usize) -> String {
    format!("{text:^width$}").trim_end().to_string()
}
