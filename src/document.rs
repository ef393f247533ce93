//! Document model: turns fetched items into sized, prioritised blocks.
//!
//! Heights are measured with [`wrap_text`] at the column width, the same
//! wrapping the renderer uses, so the layout engine's capacity checks match
//! what ends up on paper.

use crate::error::ContentError;
use crate::models::{Block, BlockKind, ContentItem, ContentKind};
use crate::utils::{clip_chars, wrap_text};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Appended to the last line of a block that was cut to fit a column.
pub const TRUNCATION_MARKER: &str = "[...]";

/// Lines taken by a heading: its wrapped lines plus the rule underneath.
/// An empty heading takes none.
pub fn heading_height(heading: &str, width: usize) -> u32 {
    let lines = wrap_text(heading, width).len() as u32;
    if lines == 0 { 0 } else { lines + 1 }
}

pub fn body_height(body: &str, width: usize) -> u32 {
    wrap_text(body, width).len() as u32
}

impl Block {
    /// Build a block from its parts, measuring it at `wrap_width`.
    pub fn new(
        kind: BlockKind,
        heading: impl Into<String>,
        body: impl Into<String>,
        wrap_width: usize,
        language: impl Into<String>,
    ) -> Self {
        let heading = heading.into();
        let body = body.into();
        let heading_height = heading_height(&heading, wrap_width);
        let estimated_height = heading_height + body_height(&body, wrap_width);
        let priority = kind.tier();
        Self {
            kind,
            heading,
            body,
            heading_height,
            estimated_height,
            priority,
            wrap_width,
            language: language.into(),
            truncated: false,
        }
    }

    /// Build the block for one item.
    ///
    /// # Errors
    ///
    /// [`ContentError::Empty`] if a news or quote item has neither title nor
    /// body.
    pub fn from_item(
        item: &ContentItem,
        target_language: &str,
        column_width: usize,
    ) -> Result<Self, ContentError> {
        let title = item.title.trim();
        let body = item.body.trim();
        // A weather reading carries its content in the payload.
        let has_payload = matches!(item.kind, ContentKind::Weather { .. });
        if title.is_empty() && body.is_empty() && !has_payload {
            return Err(ContentError::Empty {
                source_label: item.kind.source_label(),
            });
        }

        let (heading, text) = match &item.kind {
            ContentKind::Discussion { comments } => {
                let text = match comments.as_deref().map(str::trim) {
                    Some(c) if !c.is_empty() && body.is_empty() => format!("Discussion Analysis: {c}"),
                    Some(c) if !c.is_empty() => format!("{body}\n\nDiscussion Analysis: {c}"),
                    _ => body.to_string(),
                };
                (title.to_string(), text)
            }
            ContentKind::RegionalNews { outlet } => {
                let text = if body.is_empty() {
                    format!("({outlet})")
                } else {
                    format!("({outlet}) {body}")
                };
                (title.to_string(), text)
            }
            ContentKind::Weather {
                city,
                temperature_c,
                condition,
            } => {
                let heading = if title.is_empty() {
                    format!("Weather in {city}")
                } else {
                    title.to_string()
                };
                let mut text = format!("{temperature_c:.1}°C, {condition}");
                if !body.is_empty() {
                    text.push('\n');
                    text.push_str(body);
                }
                (heading, text)
            }
            ContentKind::Quote { author } => {
                let text = if author.trim().is_empty() {
                    format!("\"{body}\"")
                } else {
                    format!("\"{body}\"\n-- {}", author.trim())
                };
                (title.to_string(), text)
            }
        };

        Ok(Block::new(
            BlockKind::from(&item.kind),
            heading,
            text,
            column_width,
            target_language,
        ))
    }

    /// Return a copy cut down to at most `max_height` lines.
    ///
    /// The body keeps as many wrapped lines as fit under the heading and the
    /// last kept line ends with [`TRUNCATION_MARKER`]. When the heading alone
    /// does not fit, the body is dropped and the heading itself is cut.
    /// Blocks that already fit are returned unchanged.
    pub fn truncated_to(&self, max_height: u32) -> Block {
        if self.estimated_height <= max_height {
            return self.clone();
        }
        let width = self.wrap_width;
        let mut block = self.clone();
        block.truncated = true;

        if self.heading_height >= max_height {
            let keep = max_height.saturating_sub(1) as usize;
            block.body = String::new();
            if keep == 0 {
                block.heading = String::new();
                block.body = clip_chars(TRUNCATION_MARKER, width).to_string();
            } else {
                block.heading = mark_lines(wrap_text(&self.heading, width), keep, width);
            }
        } else {
            let budget = (max_height - self.heading_height) as usize;
            block.body = mark_lines(wrap_text(&self.body, width), budget, width);
        }

        block.heading_height = heading_height(&block.heading, width);
        block.estimated_height = block.heading_height + body_height(&block.body, width);
        block
    }
}

/// Keep the first `keep` lines and mark the last one as cut.
fn mark_lines(mut lines: Vec<String>, keep: usize, width: usize) -> String {
    lines.truncate(keep);
    match lines.pop() {
        Some(last) => lines.push(with_marker(&last, width)),
        None => lines.push(clip_chars(TRUNCATION_MARKER, width).to_string()),
    }
    lines.join("\n")
}

/// Append the marker to a wrapped line, dropping trailing words until the
/// result fits in `width` characters.
fn with_marker(line: &str, width: usize) -> String {
    let marker_len = TRUNCATION_MARKER.chars().count();
    if width <= marker_len + 1 {
        return clip_chars(TRUNCATION_MARKER, width).to_string();
    }
    let room = width - marker_len - 1;
    let mut words: Vec<&str> = line.split_whitespace().collect();
    while !words.is_empty() {
        let joined = words.join(" ");
        let len = joined.chars().count();
        if len <= room {
            return format!("{joined} {TRUNCATION_MARKER}");
        }
        if words.len() == 1 {
            return format!("{} {TRUNCATION_MARKER}", clip_chars(&joined, room));
        }
        words.pop();
    }
    TRUNCATION_MARKER.to_string()
}

/// Turn fetched items into blocks in placement order.
///
/// - Each source keeps a stable prefix of at most `max_items_per_source`
///   items; weather and quote keep at most one.
/// - Items with neither title nor body are logged and skipped.
/// - Output order: weather, quote, then discussion and regional news by
///   tier, fetch order preserved inside each tier.
#[instrument(level = "info", skip_all, fields(items = items.len(), target_language = %target_language, max_items_per_source = max_items_per_source, column_width = column_width))]
pub fn build_blocks(
    items: &[ContentItem],
    target_language: &str,
    max_items_per_source: usize,
    column_width: usize,
) -> Vec<Block> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut blocks = Vec::with_capacity(items.len());

    for item in items {
        let label = item.kind.source_label();
        let limit = if BlockKind::from(&item.kind).is_mandatory() {
            1
        } else {
            max_items_per_source
        };
        let count = seen.entry(label.clone()).or_insert(0);
        if *count >= limit {
            debug!(source = %label, title = %item.title, "Over per-source limit; skipping item");
            continue;
        }
        *count += 1;

        match Block::from_item(item, target_language, column_width) {
            Ok(block) => blocks.push(block),
            Err(e) => warn!(error = %e, source = %label, "Dropping malformed item"),
        }
    }

    blocks.sort_by_key(Block::placement_rank);
    info!(blocks = blocks.len(), "Built document blocks");
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::capture_logs;

    fn news(title: &str) -> ContentItem {
        ContentItem::new(ContentKind::Discussion { comments: None }, title, "Story body")
    }

    fn regional(outlet: &str, title: &str) -> ContentItem {
        ContentItem::new(
            ContentKind::RegionalNews {
                outlet: outlet.to_string(),
            },
            title,
            "Le corps de l'article",
        )
    }

    fn weather() -> ContentItem {
        ContentItem::new(
            ContentKind::Weather {
                city: "Morges".to_string(),
                temperature_c: 11.04,
                condition: "Partly cloudy".to_string(),
            },
            "",
            "",
        )
    }

    fn quote() -> ContentItem {
        ContentItem::new(
            ContentKind::Quote {
                author: "Marcus Aurelius".to_string(),
            },
            "Quote of the Day",
            "The impediment to action advances action.",
        )
    }

    #[test]
    fn test_heights_follow_wrapping() {
        let block = Block::new(
            BlockKind::Discussion,
            "Short heading",
            "one two three four five six",
            10,
            "en",
        );
        // "Short" / "heading" + rule
        assert_eq!(block.heading_height, 3);
        // "one two" / "three four" / "five six"
        assert_eq!(block.estimated_height, 6);
        assert_eq!(block.priority, 0);
    }

    #[test]
    fn test_empty_item_is_content_error() {
        let item = ContentItem::new(ContentKind::Discussion { comments: None }, "  ", "");
        assert_eq!(
            Block::from_item(&item, "en", 30),
            Err(ContentError::Empty {
                source_label: "hacker-news".to_string()
            })
        );
    }

    #[test]
    fn test_weather_block_composes_reading() {
        let block = Block::from_item(&weather(), "fr", 40).unwrap();
        assert_eq!(block.kind, BlockKind::Weather);
        assert_eq!(block.heading, "Weather in Morges");
        assert_eq!(block.body, "11.0°C, Partly cloudy");
        assert_eq!(block.priority, 2);
        assert_eq!(block.language, "fr");
    }

    #[test]
    fn test_payload_only_weather_is_kept() {
        let blocks = build_blocks(&[news("hn1"), weather()], "en", 5, 30);
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Weather, BlockKind::Discussion]);
        assert_eq!(blocks[0].heading, "Weather in Morges");
    }

    #[test]
    fn test_build_blocks_span_records_arguments() {
        let logs = capture_logs(|| {
            build_blocks(&[news("hn1")], "fr", 4, 30);
        });
        assert!(logs.contains("target_language=fr"), "{logs}");
        assert!(logs.contains("max_items_per_source=4"), "{logs}");
        assert!(logs.contains("column_width=30"), "{logs}");
    }

    #[test]
    fn test_quote_block_attributes_author() {
        let block = Block::from_item(&quote(), "en", 60).unwrap();
        assert_eq!(
            block.body,
            "\"The impediment to action advances action.\"\n-- Marcus Aurelius"
        );
        assert_eq!(block.priority, 3);
    }

    #[test]
    fn test_discussion_block_appends_comments() {
        let item = ContentItem::new(
            ContentKind::Discussion {
                comments: Some("Readers disagree.".to_string()),
            },
            "Show HN",
            "A new tool.",
        );
        let block = Block::from_item(&item, "en", 60).unwrap();
        assert_eq!(block.body, "A new tool.\n\nDiscussion Analysis: Readers disagree.");
    }

    #[test]
    fn test_build_blocks_orders_mandatory_then_tiers() {
        let items = vec![
            regional("RTS", "r1"),
            news("hn1"),
            quote(),
            regional("Le Temps", "t1"),
            weather(),
            news("hn2"),
        ];
        let blocks = build_blocks(&items, "en", 5, 30);
        let order: Vec<(BlockKind, &str)> =
            blocks.iter().map(|b| (b.kind, b.heading.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (BlockKind::Weather, "Weather in Morges"),
                (BlockKind::Quote, "Quote of the Day"),
                (BlockKind::Discussion, "hn1"),
                (BlockKind::Discussion, "hn2"),
                (BlockKind::RegionalNews, "r1"),
                (BlockKind::RegionalNews, "t1"),
            ]
        );
    }

    #[test]
    fn test_build_blocks_limits_each_source() {
        let items = vec![
            news("hn1"),
            news("hn2"),
            news("hn3"),
            regional("RTS", "r1"),
            regional("RTS", "r2"),
            regional("RTS", "r3"),
            regional("Le Temps", "t1"),
            weather(),
            weather(),
            quote(),
            quote(),
        ];
        let blocks = build_blocks(&items, "en", 2, 30);
        let headings: Vec<&str> = blocks.iter().map(|b| b.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec!["Weather in Morges", "Quote of the Day", "hn1", "hn2", "r1", "r2", "t1"]
        );
    }

    #[test]
    fn test_build_blocks_skips_malformed_items() {
        let items = vec![
            news("hn1"),
            ContentItem::new(ContentKind::Discussion { comments: None }, "", ""),
            news("hn2"),
        ];
        let blocks = build_blocks(&items, "en", 5, 30);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].heading, "hn2");
    }

    #[test]
    fn test_build_blocks_is_idempotent() {
        let items = vec![news("hn1"), weather(), regional("RTS", "r1"), quote()];
        assert_eq!(
            build_blocks(&items, "de", 3, 25),
            build_blocks(&items, "de", 3, 25)
        );
    }

    #[test]
    fn test_truncated_to_cuts_body_and_marks_it() {
        let body = vec!["line"; 40].join("\n");
        let block = Block::new(BlockKind::Discussion, "Heading", body, 20, "en");
        assert_eq!(block.estimated_height, 42);

        let cut = block.truncated_to(10);
        assert!(cut.truncated);
        assert_eq!(cut.heading, "Heading");
        assert_eq!(cut.estimated_height, 10);
        let lines = wrap_text(&cut.body, 20);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines.last().unwrap(), "line [...]");
    }

    #[test]
    fn test_truncated_to_leaves_fitting_blocks_alone() {
        let block = Block::new(BlockKind::Quote, "Q", "short", 20, "en");
        assert_eq!(block.truncated_to(10), block);
    }

    #[test]
    fn test_truncated_to_cuts_tall_heading() {
        let heading = "word ".repeat(30);
        let block = Block::new(BlockKind::Discussion, heading, "body", 10, "en");
        let cut = block.truncated_to(4);
        assert!(cut.body.is_empty());
        assert_eq!(cut.estimated_height, 4);
        assert!(cut.heading.ends_with(TRUNCATION_MARKER));

        let tiny = block.truncated_to(1);
        assert_eq!(tiny.estimated_height, 1);
        assert_eq!(tiny.body, TRUNCATION_MARKER);
    }

    #[test]
    fn test_with_marker_fits_width() {
        assert_eq!(with_marker("alpha beta gamma", 16), "alpha beta [...]");
        assert_eq!(with_marker("abcdefghijkl", 10), "abcd [...]");
        assert_eq!(with_marker("abc", 4), "[...");
    }
}
