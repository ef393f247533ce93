//! A4 PDF paper, set in Times.
//!
//! Every page carries a centered headline, one text frame per column and a
//! footer. Frames are sized from the layout geometry: `column_capacity`
//! rows fill the frame height and `column_width` characters must fit the
//! frame width, so the font shrinks rather than letting text spill into
//! the gutter.
//!
//! ```text
//! +-----------------------------------------------+
//! |          Morning Press - 2026-10-16           |
//! |               Morning edition                 |
//! |  +-----------+   +-----------+   +-----------+  |
//! |  | frame 0   |   | frame 1   |   | frame 2   |  |
//! |  +-----------+   +-----------+   +-----------+  |
//! |                 Page 1 of 2                   |
//! +-----------------------------------------------+
//! ```

use crate::error::RenderError;
use crate::models::{Block, Edition, Page, PlacementPlan};
use crate::utils::{upcase, wrap_text};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const GUTTER_MM: f32 = 6.0;
/// Headline and edition line above the frames.
const HEADER_MM: f32 = 22.0;
/// Footer lines below the frames.
const FOOTER_MM: f32 = 10.0;

const BODY_PT: f32 = 10.0;
const LEADING_RATIO: f32 = 1.3;
const HEADLINE_PT: f32 = 18.0;
const NOTE_PT: f32 = 9.0;
const MM_PER_PT: f32 = 0.352_778;
/// Average Times glyph width as a share of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

/// Where the columns of a page are drawn. Lengths in millimetres, measured
/// from the bottom-left corner as PDF does.
#[derive(Debug, Clone, PartialEq)]
pub struct Frames {
    /// Left edge of each column frame.
    pub lefts: Vec<f32>,
    pub width: f32,
    /// Top edge shared by all frames.
    pub top: f32,
    /// Distance between baselines.
    pub leading: f32,
    /// Body size in points.
    pub font_size: f32,
}

impl Frames {
    pub fn new(columns: usize, column_capacity: u32, column_width: usize) -> Self {
        let columns = columns.max(1);
        let n = columns as f32;
        let width = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM - GUTTER_MM * (n - 1.0)) / n;
        let top = PAGE_HEIGHT_MM - MARGIN_MM - HEADER_MM;
        let bottom = MARGIN_MM + FOOTER_MM;
        let leading = (top - bottom) / column_capacity.max(1) as f32;

        let by_height = leading / MM_PER_PT / LEADING_RATIO;
        let by_width = width / (column_width.max(1) as f32 * AVG_GLYPH_EM * MM_PER_PT);
        let font_size = BODY_PT.min(by_height).min(by_width);

        Self {
            lefts: (0..columns)
                .map(|i| MARGIN_MM + i as f32 * (width + GUTTER_MM))
                .collect(),
            width,
            top,
            leading,
            font_size,
        }
    }

    /// Baseline of the zero-based `row` of a column.
    pub fn baseline(&self, row: u32) -> f32 {
        self.top - (row as f32 + 1.0) * self.leading
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Render `plan` as a PDF and write it to `output_path`.
#[instrument(level = "info", skip(plan, edition), fields(pages = plan.pages.len(), path = %output_path.display()))]
pub async fn render(
    plan: &PlacementPlan,
    edition: &Edition,
    column_width: usize,
    output_path: &Path,
) -> Result<PathBuf, RenderError> {
    let bytes = render_to_bytes(plan, edition, column_width)?;
    fs::write(output_path, &bytes)
        .await
        .map_err(|source| RenderError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;
    info!(bytes = bytes.len(), "Wrote PDF paper");
    Ok(output_path.to_path_buf())
}

/// The whole paper as PDF bytes.
pub fn render_to_bytes(
    plan: &PlacementPlan,
    edition: &Edition,
    column_width: usize,
) -> Result<Vec<u8>, RenderError> {
    let title = format!("Morning Press - {}", edition.local_date);
    let (doc, first_page, first_layer) = PdfDocument::new(
        title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Text",
    );
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::TimesRoman)?,
        bold: doc.add_builtin_font(BuiltinFont::TimesBold)?,
        italic: doc.add_builtin_font(BuiltinFont::TimesItalic)?,
    };

    let page_count = plan.pages.len();
    for page in &plan.pages {
        let layer = if page.index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Text");
            doc.get_page(p).get_layer(l)
        };

        draw_masthead(&layer, &fonts, &title, edition);
        if page.is_empty() {
            centered(&layer, &fonts.italic, "Nothing to print on this page", BODY_PT, PAGE_HEIGHT_MM / 2.0);
        } else {
            draw_columns(&layer, &fonts, page, column_width);
        }

        centered(
            &layer,
            &fonts.italic,
            &format!("Page {} of {}", page.index + 1, page_count),
            NOTE_PT,
            MARGIN_MM,
        );
        if !plan.overflow.is_empty() && page.index + 1 == page_count {
            centered(
                &layer,
                &fonts.italic,
                &format!("{} items omitted", plan.overflow.len()),
                NOTE_PT,
                MARGIN_MM + 4.5,
            );
        }
    }

    Ok(doc.save_to_bytes()?)
}

fn draw_masthead(layer: &PdfLayerReference, fonts: &Fonts, title: &str, edition: &Edition) {
    let headline_y = PAGE_HEIGHT_MM - MARGIN_MM - HEADLINE_PT * MM_PER_PT;
    centered(layer, &fonts.bold, title, HEADLINE_PT, headline_y);
    centered(
        layer,
        &fonts.italic,
        &format!("{} edition", upcase(&edition.time_of_day)),
        BODY_PT,
        headline_y - 8.0,
    );
}

fn draw_columns(layer: &PdfLayerReference, fonts: &Fonts, page: &Page, column_width: usize) {
    let capacity = page.columns.first().map(|c| c.capacity).unwrap_or(1);
    let frames = Frames::new(page.columns.len(), capacity, column_width);
    debug!(page = page.index, font_size = frames.font_size, leading = frames.leading, "Drawing columns");

    for (column, left) in page.columns.iter().zip(&frames.lefts) {
        let mut row = 0;
        for block in &column.blocks {
            row = draw_block(layer, fonts, &frames, *left, row, block, column_width);
        }
    }
}

/// Draw `block` from `row` down and return the row after it. Uses exactly
/// the rows the text paper uses: heading, a blank rule row, body.
fn draw_block(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    frames: &Frames,
    left: f32,
    mut row: u32,
    block: &Block,
    column_width: usize,
) -> u32 {
    let heading = wrap_text(&block.heading, column_width);
    for line in &heading {
        layer.use_text(line.as_str(), frames.font_size, Mm(left), Mm(frames.baseline(row)), &fonts.bold);
        row += 1;
    }
    if !heading.is_empty() {
        row += 1;
    }
    for line in wrap_text(&block.body, column_width) {
        if !line.is_empty() {
            layer.use_text(line, frames.font_size, Mm(left), Mm(frames.baseline(row)), &fonts.regular);
        }
        row += 1;
    }
    row
}

fn centered(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, size: f32, y: f32) {
    let width = text.chars().count() as f32 * AVG_GLYPH_EM * size * MM_PER_PT;
    let x = ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM);
    layer.use_text(text, size, Mm(x), Mm(y), font);
}
