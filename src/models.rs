//! Data models shared by the press pipeline.
//!
//! - [`ContentItem`]: one fetched piece of content, tagged by [`ContentKind`]
//! - [`Block`]: a sized, prioritised rendering unit built from an item
//! - [`Column`], [`Page`], [`PlacementPlan`]: the layout engine's output
//! - [`Edition`]: date and time metadata printed on the masthead
//!
//! Items are serialised into the daily cache, plans are serialised next to
//! the rendered document, so everything here derives serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an item came from, with the payload specific to that source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentKind {
    /// A discussion-site story with condensed top comments.
    Discussion { comments: Option<String> },
    /// A regional news headline from an RSS outlet.
    RegionalNews { outlet: String },
    /// The current conditions for the configured city.
    Weather {
        city: String,
        temperature_c: f64,
        condition: String,
    },
    /// The quote of the day.
    Quote { author: String },
}

impl ContentKind {
    /// Identifies the source an item belongs to, for per-source limits.
    ///
    /// Regional outlets are distinct sources even though they share a kind.
    pub fn source_label(&self) -> String {
        match self {
            ContentKind::Discussion { .. } => "hacker-news".to_string(),
            ContentKind::RegionalNews { outlet } => outlet.clone(),
            ContentKind::Weather { .. } => "weather".to_string(),
            ContentKind::Quote { .. } => "quote".to_string(),
        }
    }
}

/// A raw item produced by a fetcher, possibly condensed by the summarizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
    pub origin_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    pub fn new(kind: ContentKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            origin_url: None,
            published_at: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.origin_url = Some(url.into());
        self
    }

    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }
}

/// Rendering flavour of a block. Mirrors [`ContentKind`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Discussion,
    RegionalNews,
    Weather,
    Quote,
}

impl BlockKind {
    /// Placement tier. Lower is more important.
    pub fn tier(self) -> u8 {
        match self {
            BlockKind::Discussion => 0,
            BlockKind::RegionalNews => 1,
            BlockKind::Weather => 2,
            BlockKind::Quote => 3,
        }
    }

    /// Weather and quote appear exactly once per paper and are placed first.
    pub fn is_mandatory(self) -> bool {
        match self {
            BlockKind::Weather | BlockKind::Quote => true,
            BlockKind::Discussion | BlockKind::RegionalNews => false,
        }
    }
}

impl From<&ContentKind> for BlockKind {
    fn from(kind: &ContentKind) -> Self {
        match kind {
            ContentKind::Discussion { .. } => BlockKind::Discussion,
            ContentKind::RegionalNews { .. } => BlockKind::RegionalNews,
            ContentKind::Weather { .. } => BlockKind::Weather,
            ContentKind::Quote { .. } => BlockKind::Quote,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BlockKind::Discussion => "discussion",
            BlockKind::RegionalNews => "regional news",
            BlockKind::Weather => "weather",
            BlockKind::Quote => "quote",
        };
        f.write_str(label)
    }
}

/// A unit of content sized for placement.
///
/// Heights are counted in printed lines at `wrap_width` characters.
/// `estimated_height` always equals `heading_height` plus the wrapped body
/// line count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub heading: String,
    pub body: String,
    pub heading_height: u32,
    pub estimated_height: u32,
    pub priority: u8,
    pub wrap_width: usize,
    pub language: String,
    /// Set when the layout engine cut the block to fit a column.
    #[serde(default)]
    pub truncated: bool,
}

impl Block {
    /// Key that orders blocks for placement: mandatory blocks first, then by
    /// tier. Sorting on it must be stable to keep fetch order inside a tier.
    pub fn placement_rank(&self) -> (bool, u8) {
        (!self.kind.is_mandatory(), self.priority)
    }
}

/// A vertical region of a page with a fixed line capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub index: usize,
    pub blocks: Vec<Block>,
    pub used_height: u32,
    pub capacity: u32,
}

impl Column {
    pub fn new(index: usize, capacity: u32) -> Self {
        Self {
            index,
            blocks: Vec::new(),
            used_height: 0,
            capacity,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.used_height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub columns: Vec<Column>,
}

impl Page {
    pub fn new(index: usize, columns_per_page: usize, capacity: u32) -> Self {
        Self {
            index,
            columns: (0..columns_per_page)
                .map(|c| Column::new(c, capacity))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|c| c.blocks.is_empty())
    }
}

/// Why a block did not make it onto the paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowReason {
    /// Every column of the last allowed page was too full.
    NoCapacity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overflow {
    pub block: Block,
    pub reason: OverflowReason,
}

/// The layout engine's output: pages of columns of blocks, plus whatever
/// could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementPlan {
    pub pages: Vec<Page>,
    pub overflow: Vec<Overflow>,
}

impl PlacementPlan {
    pub fn placed_blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages
            .iter()
            .flat_map(|p| p.columns.iter())
            .flat_map(|c| c.blocks.iter())
    }

    pub fn placed_count(&self) -> usize {
        self.placed_blocks().count()
    }
}

/// Masthead metadata for one run.
///
/// The `time_of_day` field categorizes editions as:
/// - `"morning"`: 00:00 - 08:00
/// - `"afternoon"`: 08:00 - 16:00
/// - `"evening"`: 16:00 - 24:00
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edition {
    /// `YYYY-MM-DD`, also the cache key.
    pub local_date: String,
    pub local_time: String,
    pub time_of_day: String,
    pub language: String,
}
