//! Quote of the day from a ZenQuotes-style endpoint: `[{"q": ..., "a": ...}]`.

use crate::config::QuoteConfig;
use crate::error::FetchError;
use crate::models::{ContentItem, ContentKind};
use crate::scrapers::get_json;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct ZenQuote {
    q: String,
    a: String,
}

#[instrument(level = "info", skip_all)]
pub async fn fetch(client: &Client, config: &QuoteConfig) -> Result<ContentItem, FetchError> {
    let quotes: Vec<ZenQuote> = get_json(client, &config.url).await?;
    let quote = quotes
        .into_iter()
        .find(|q| !q.q.trim().is_empty())
        .ok_or_else(|| FetchError::Parse {
            url: config.url.clone(),
            reason: "no quote in response".to_string(),
        })?;

    info!(author = %quote.a, "Fetched quote of the day");
    Ok(ContentItem::new(
        ContentKind::Quote {
            author: quote.a.trim().to_string(),
        },
        "Quote of the Day",
        quote.q.trim(),
    ))
}
