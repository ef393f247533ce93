//! Hacker News top stories.
//!
//! Story ids come from `topstories.json`; each story is then read from
//! `item/{id}.json`. For stories that link to an external page the page's
//! paragraph text is scraped so the summarizer has something to condense.
//! The first few top-level comments are fetched and stripped of HTML.
//!
//! A story or comment that fails to load is logged and skipped; only a
//! failure to read the top story list fails the source.

use crate::config::HackerNewsConfig;
use crate::error::FetchError;
use crate::models::{ContentItem, ContentKind};
use crate::scrapers::{get_json, get_text};
use crate::utils::{clip_chars, collapse_whitespace, strip_html};
use chrono::DateTime;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));

const DISCUSSION_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    title: Option<String>,
    url: Option<String>,
    text: Option<String>,
    #[serde(default)]
    kids: Vec<u64>,
    time: Option<i64>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

/// Fetch up to `limit` top stories.
#[instrument(level = "info", skip(client, config))]
pub async fn fetch(
    client: &Client,
    config: &HackerNewsConfig,
    limit: usize,
) -> Result<Vec<ContentItem>, FetchError> {
    let ids: Vec<u64> = get_json(client, &format!("{}/topstories.json", config.base_url)).await?;
    info!(count = ids.len(), "Indexed Hacker News top stories");

    let stories: Vec<ContentItem> = stream::iter(ids.into_iter().take(limit))
        .then(|id| async move {
            match fetch_story(client, config, id).await {
                Ok(story) => story,
                Err(e) => {
                    warn!(id, error = %e, "Hacker News story fetch failed");
                    None
                }
            }
        })
        .filter_map(|story| async move { story })
        .collect()
        .await;

    info!(count = stories.len(), "Fetched Hacker News stories");
    Ok(stories)
}

async fn fetch_story(
    client: &Client,
    config: &HackerNewsConfig,
    id: u64,
) -> Result<Option<ContentItem>, FetchError> {
    let story: HnItem = get_json(client, &item_url(config, id)).await?;
    if story.deleted || story.dead {
        debug!(id, "Skipping removed story");
        return Ok(None);
    }

    let title = story.title.clone().unwrap_or_else(|| "No Title".to_string());
    let url = story
        .url
        .clone()
        .unwrap_or_else(|| format!("{DISCUSSION_URL}{}", story.id));

    let body = if url.starts_with(DISCUSSION_URL) {
        story.text.as_deref().map(strip_html).unwrap_or_default()
    } else {
        match get_text(client, &url).await {
            Ok(html) => article_text(&html, config.article_chars),
            Err(e) => {
                warn!(%url, error = %e, "Could not fetch linked article");
                String::new()
            }
        }
    };

    let comments = fetch_comments(client, config, &story.kids).await;
    let mut item = ContentItem::new(
        ContentKind::Discussion {
            comments: (!comments.is_empty()).then(|| comments.join("\n")),
        },
        title,
        body,
    )
    .with_url(url);
    if let Some(at) = story.time.and_then(|t| DateTime::from_timestamp(t, 0)) {
        item = item.with_published_at(at);
    }
    Ok(Some(item))
}

async fn fetch_comments(client: &Client, config: &HackerNewsConfig, kids: &[u64]) -> Vec<String> {
    let mut comments = Vec::new();
    for &kid in kids.iter().take(config.comments_per_story) {
        match get_json::<HnItem>(client, &item_url(config, kid)).await {
            Ok(comment) => {
                if let Some(text) = comment.text.filter(|_| !comment.deleted && !comment.dead) {
                    comments.push(strip_html(&text));
                }
            }
            Err(e) => warn!(id = kid, error = %e, "Could not fetch comment"),
        }
    }
    comments
}

fn item_url(config: &HackerNewsConfig, id: u64) -> String {
    format!("{}/item/{}.json", config.base_url, id)
}

/// Readable text of an article page: its paragraphs, or the whole document
/// when it has none, clipped to `max_chars`.
fn article_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|p| !p.is_empty())
        .collect();
    let text = if paragraphs.is_empty() {
        collapse_whitespace(&document.root_element().text().collect::<Vec<_>>().join(" "))
    } else {
        paragraphs.join("\n")
    };
    clip_chars(&text, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: String) -> HackerNewsConfig {
        HackerNewsConfig {
            base_url,
            comments_per_story: 2,
            article_chars: 4000,
        }
    }

    #[test]
    fn test_article_text_prefers_paragraphs() {
        let html = "<html><head><title>T</title></head><body><nav>Menu</nav>\
                    <p>First   paragraph.</p><p></p><p>Second <b>one</b>.</p></body></html>";
        assert_eq!(article_text(html, 4000), "First paragraph.\nSecond one.");
        assert_eq!(article_text(html, 5), "First");
    }

    #[test]
    fn test_article_text_without_paragraphs() {
        let html = "<html><body><div>Just a div</div></body></html>";
        assert_eq!(article_text(html, 4000), "Just a div");
    }

    #[tokio::test]
    async fn test_fetch_builds_discussion_items() {
        let mut server = mockito::Server::new_async().await;
        let _top = server
            .mock("GET", "/topstories.json")
            .with_body("[1, 2, 3]")
            .create_async()
            .await;
        let _story = server
            .mock("GET", "/item/1.json")
            .with_body(
                r#"{"id": 1, "title": "Ask HN: Rust?", "text": "<p>Why &amp; how</p>",
                    "kids": [10, 11, 12], "time": 1700000000}"#,
            )
            .create_async()
            .await;
        let _c1 = server
            .mock("GET", "/item/10.json")
            .with_body(r#"{"id": 10, "text": "Great <i>question</i>"}"#)
            .create_async()
            .await;
        let _c2 = server
            .mock("GET", "/item/11.json")
            .with_body(r#"{"id": 11, "deleted": true}"#)
            .create_async()
            .await;
        let third = server
            .mock("GET", "/item/12.json")
            .expect(0)
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/item/2.json")
            .with_status(500)
            .create_async()
            .await;

        let client = Client::new();
        let items = fetch(&client, &config(server.url()), 2).await.unwrap();
        third.assert_async().await;

        assert_eq!(items.len(), 1);
        let story = &items[0];
        assert_eq!(story.title, "Ask HN: Rust?");
        assert_eq!(story.body, "Why & how");
        assert_eq!(
            story.origin_url.as_deref(),
            Some("https://news.ycombinator.com/item?id=1")
        );
        assert_eq!(
            story.kind,
            ContentKind::Discussion {
                comments: Some("Great question".to_string())
            }
        );
        assert_eq!(story.published_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_fetch_fails_without_story_list() {
        let mut server = mockito::Server::new_async().await;
        let _top = server
            .mock("GET", "/topstories.json")
            .with_status(503)
            .create_async()
            .await;

        let client = Client::new();
        let err = fetch(&client, &config(server.url()), 5).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
