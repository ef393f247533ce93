//! Layout engine: flows blocks into columns across a bounded number of pages.
//!
//! Placement is greedy, deterministic and single-pass:
//!
//! 1. Blocks are placed in the order given. The document model already put
//!    weather and quote first, then news by tier.
//! 2. A block taller than a column is cut down first (see
//!    [`Block::truncated_to`]).
//! 3. On the current page the block goes to the column with the most room
//!    left. Ties go to the lowest column index, which keeps the columns of a
//!    page level.
//! 4. If no column on the current page has room, the engine moves to the
//!    next page. Earlier pages are never revisited.
//! 5. With no page left the block is dropped into the plan's overflow list.
//!    Later, smaller blocks may still fit on the last page.
//!
//! The search state is an explicit [`LayoutState`] and the decisions are
//! plain functions over it, so the engine is testable without any I/O.

use crate::error::ConfigError;
use crate::models::{Block, Overflow, OverflowReason, Page, PlacementPlan};
use tracing::{debug, info, instrument};

/// Page geometry for one layout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSettings {
    pub page_count: usize,
    pub columns_per_page: usize,
    /// Lines available in each column.
    pub column_capacity: u32,
}

impl LayoutSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_count == 0 {
            return Err(ConfigError::PageCount(self.page_count));
        }
        if self.columns_per_page == 0 {
            return Err(ConfigError::ColumnCount(self.columns_per_page));
        }
        if self.column_capacity == 0 {
            return Err(ConfigError::ColumnCapacity(self.column_capacity));
        }
        Ok(())
    }

    pub fn total_capacity(&self) -> u64 {
        self.page_count as u64 * self.columns_per_page as u64 * self.column_capacity as u64
    }
}

/// Cursor over the page being filled and the lines used in each of its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutState {
    pub page: usize,
    pub used: Vec<u32>,
}

impl LayoutState {
    pub fn new(columns_per_page: usize) -> Self {
        Self {
            page: 0,
            used: vec![0; columns_per_page],
        }
    }

    /// Move to the next page and clear the column trackers.
    /// Returns `false` when `page_count` pages are already in use.
    pub fn advance_page(&mut self, page_count: usize) -> bool {
        if self.page + 1 >= page_count {
            return false;
        }
        self.page += 1;
        self.used.iter_mut().for_each(|u| *u = 0);
        true
    }
}

/// Column on the current page with the most room that can take `need`
/// lines. Ties go to the lowest index.
pub fn best_fit(used: &[u32], capacity: u32, need: u32) -> Option<usize> {
    used.iter()
        .enumerate()
        .filter(|&(_, &u)| capacity.saturating_sub(u) >= need)
        .min_by_key(|&(i, &u)| (u, i))
        .map(|(i, _)| i)
}

/// Find a `(page, column)` slot for `need` lines, advancing pages as
/// required, and book the lines. `None` once the last page is full for it.
pub fn claim_slot(
    state: &mut LayoutState,
    settings: &LayoutSettings,
    need: u32,
) -> Option<(usize, usize)> {
    loop {
        if let Some(column) = best_fit(&state.used, settings.column_capacity, need) {
            state.used[column] += need;
            return Some((state.page, column));
        }
        if !state.advance_page(settings.page_count) {
            return None;
        }
    }
}

/// Lay `blocks` out over at most `page_count` pages of `columns_per_page`
/// columns holding `column_capacity` lines each.
///
/// The plan always holds exactly `page_count` pages, empty ones included.
/// Every input block ends up either in one column or in `overflow`.
///
/// # Errors
///
/// [`ConfigError`] if any dimension is zero. No partial plan is produced.
#[instrument(level = "info", skip_all, fields(blocks = blocks.len(), page_count = page_count, columns_per_page = columns_per_page, column_capacity = column_capacity))]
pub fn layout(
    blocks: &[Block],
    page_count: usize,
    columns_per_page: usize,
    column_capacity: u32,
) -> Result<PlacementPlan, ConfigError> {
    let settings = LayoutSettings {
        page_count,
        columns_per_page,
        column_capacity,
    };
    settings.validate()?;

    let mut pages: Vec<Page> = (0..page_count)
        .map(|p| Page::new(p, columns_per_page, column_capacity))
        .collect();
    let mut overflow = Vec::new();
    let mut state = LayoutState::new(columns_per_page);

    for block in blocks {
        let block = block.truncated_to(column_capacity);
        if block.truncated {
            debug!(heading = %block.heading, kind = %block.kind, "Truncated oversized block");
        }

        match claim_slot(&mut state, &settings, block.estimated_height) {
            Some((page, column)) => {
                let col = &mut pages[page].columns[column];
                col.used_height += block.estimated_height;
                debug!(
                    page,
                    column,
                    height = block.estimated_height,
                    remaining = col.remaining(),
                    "Placed block"
                );
                col.blocks.push(block);
            }
            None => {
                debug!(heading = %block.heading, height = block.estimated_height, "No room left; dropping block");
                overflow.push(Overflow {
                    block,
                    reason: OverflowReason::NoCapacity,
                });
            }
        }
    }

    let plan = PlacementPlan { pages, overflow };
    info!(
        total_capacity = settings.total_capacity(),
        placed = plan.placed_count(),
        omitted = plan.overflow.len(),
        "Layout complete"
    );
    Ok(plan)
}
