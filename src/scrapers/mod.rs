//! Content fetchers for every source on the paper.
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Hacker News | [`hackernews`] | Firebase JSON API, linked article scraped |
//! | RTS, Le Temps | [`rss`] | RSS 2.0 feed |
//! | Weather | [`weather`] | Open-Meteo current conditions |
//! | Quote of the day | [`quotes`] | ZenQuotes-style JSON |
//!
//! Each module exposes one `fetch` function. [`fetch`] dispatches on a
//! [`Source`] and always returns a list, so the pipeline can treat every
//! source the same way.

pub mod hackernews;
pub mod quotes;
pub mod rss;
pub mod weather;

use crate::config::{FeedConfig, HackerNewsConfig, QuoteConfig, SourcesConfig, WeatherConfig};
use crate::error::FetchError;
use crate::models::ContentItem;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

/// One configured content source.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    HackerNews(&'a HackerNewsConfig),
    Feed(&'a FeedConfig),
    Weather(&'a WeatherConfig),
    Quote(&'a QuoteConfig),
}

impl Source<'_> {
    /// Same label as [`ContentKind::source_label`](crate::models::ContentKind::source_label)
    /// for the items this source produces.
    pub fn label(&self) -> String {
        match self {
            Source::HackerNews(_) => "hacker-news".to_string(),
            Source::Feed(feed) => feed.outlet.clone(),
            Source::Weather(_) => "weather".to_string(),
            Source::Quote(_) => "quote".to_string(),
        }
    }
}

/// Every configured source, news first.
pub fn sources(config: &SourcesConfig) -> Vec<Source<'_>> {
    let mut all = vec![Source::HackerNews(&config.hacker_news)];
    all.extend(config.feeds.iter().map(Source::Feed));
    all.push(Source::Weather(&config.weather));
    all.push(Source::Quote(&config.quote));
    all
}

/// Fetch up to `max_items` items from `source`.
pub async fn fetch(
    client: &Client,
    source: Source<'_>,
    max_items: usize,
) -> Result<Vec<ContentItem>, FetchError> {
    match source {
        Source::HackerNews(config) => hackernews::fetch(client, config, max_items).await,
        Source::Feed(feed) => rss::fetch(client, feed, max_items).await,
        Source::Weather(config) => weather::fetch(client, config).await.map(|w| vec![w]),
        Source::Quote(config) => quotes::fetch(client, config).await.map(|q| vec![q]),
    }
}

/// Shared client for every fetcher and the summarizer.
pub fn http_client(timeout_secs: u64) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("morning_press/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::Client)
}

/// GET `url` and return the body, failing on non-success status.
#[instrument(level = "debug", skip(client))]
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: e,
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: e,
    })
}

/// GET `url` and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, FetchError> {
    let body = get_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
