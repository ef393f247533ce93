//! Utility functions for edition naming, text shaping, and file system checks.
//!
//! - Time classification for the edition label on the masthead
//! - Greedy word wrapping, shared by height estimation and rendering so both
//!   agree on line counts
//! - HTML stripping and whitespace cleanup for fetched text
//! - Output directory validation

use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};
use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Classify a wall-clock time into morning, afternoon, or evening.
///
/// - **Morning**: 00:00 - 08:00
/// - **Afternoon**: 08:00 - 16:00
/// - **Evening**: 16:00 - 24:00
pub fn edition_for(time: NaiveTime) -> &'static str {
    match time.hour() {
        0..=7 => "morning",
        8..=15 => "afternoon",
        _ => "evening",
    }
}

/// Cut `s` to at most `max` characters without splitting a code point.
pub fn clip_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Returns the original string if it has at most `max` characters, otherwise
/// the first `max` characters followed by `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let clipped = clip_chars(s, max);
    if clipped.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", clipped, s.len() - clipped.len())
    }
}

/// Capitalize the first character of a string.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Collapse every run of whitespace (newlines included) into one space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Extract the readable text of an HTML fragment.
///
/// Entities are decoded and whitespace is collapsed, so
/// `"<p>Fish &amp; chips</p>"` becomes `"Fish & chips"`.
pub fn strip_html(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    let mut text = String::new();
    for node in html.root_element().descendants() {
        match node.value() {
            Node::Text(t) => {
                let after_block = node
                    .prev_sibling()
                    .and_then(|s| s.value().as_element())
                    .is_some_and(|e| is_block_element(e.name()));
                if after_block {
                    text.push(' ');
                }
                text.push_str(t);
            }
            // Block elements start a new run of words; inline ones do not.
            Node::Element(e) if is_block_element(e.name()) => text.push(' '),
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

fn is_block_element(name: &str) -> bool {
    matches!(
        name,
        "p" | "br" | "div" | "li" | "ul" | "ol" | "pre" | "blockquote" | "tr" | "td"
            | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

/// Greedy word wrap at `width` characters.
///
/// Each input line is a paragraph and wraps on its own; a blank input line
/// yields a blank output line. Words longer than `width` are hard-split.
/// Leading and trailing blank lines are dropped.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.trim().lines() {
        let mut words = paragraph.split_whitespace().peekable();
        if words.peek().is_none() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0usize;
        for word in words {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }

            let word_len = chars.len();
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars);
            current_len += word_len;
        }
        if current_len > 0 {
            lines.push(current);
        }
    }
    lines
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let scratch_path = path.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}
