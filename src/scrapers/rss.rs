//! RSS 2.0 headlines for the regional outlets (RTS, Le Temps).
//!
//! The feed is decoded with quick-xml's serde support; only the `<item>`
//! fields the paper prints are kept. Descriptions often carry HTML and are
//! reduced to plain text.

use crate::config::FeedConfig;
use crate::error::FetchError;
use crate::models::{ContentItem, ContentKind};
use crate::scrapers::get_text;
use crate::utils::{collapse_whitespace, strip_html};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Fetch the first `limit` items of `feed`.
#[instrument(level = "info", skip(client, feed), fields(outlet = %feed.outlet))]
pub async fn fetch(
    client: &Client,
    feed: &FeedConfig,
    limit: usize,
) -> Result<Vec<ContentItem>, FetchError> {
    let xml = get_text(client, &feed.url).await?;
    let items = parse_feed(&xml, &feed.outlet, limit).map_err(|reason| FetchError::Parse {
        url: feed.url.clone(),
        reason,
    })?;
    info!(count = items.len(), "Fetched feed headlines");
    Ok(items)
}

/// Parse an RSS document into at most `limit` regional news items.
pub fn parse_feed(xml: &str, outlet: &str, limit: usize) -> Result<Vec<ContentItem>, String> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| e.to_string())?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .take(limit)
        .map(|entry| {
            let title = entry.title.as_deref().map(collapse_whitespace).unwrap_or_default();
            let body = entry.description.as_deref().map(strip_html).unwrap_or_default();
            let mut item = ContentItem::new(
                ContentKind::RegionalNews {
                    outlet: outlet.to_string(),
                },
                title,
                body,
            );
            if let Some(link) = entry.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()) {
                item = item.with_url(link);
            }
            if let Some(at) = entry.pub_date.as_deref().and_then(parse_pub_date) {
                item = item.with_published_at(at);
            }
            item
        })
        .collect())
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
