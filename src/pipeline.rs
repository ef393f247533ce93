//! One press run, start to finish.
//!
//! 1. Validate the configuration; bad geometry stops the run here.
//! 2. Gather items: today's cache with `--use-cache`, otherwise every source
//!    fetched concurrently. A source that fails falls back to its items in
//!    today's cache, or ends the run when there are none.
//! 3. Summarize fresh news items through a bounded, order-preserving stream.
//!    Comment threads get a discussion analysis instead. A failed summary
//!    keeps the raw text.
//! 4. Save the day's cache, build blocks, lay them out.
//! 5. Render the PDF paper, its plain-text copy and the JSON plan, then
//!    optionally print the PDF.

use crate::api::{Summarizer, Task, summarize_or_raw};
use crate::cache::ContentCache;
use crate::config::PressConfig;
use crate::document::build_blocks;
use crate::error::{FetchError, PressError, RenderError};
use crate::layout::layout;
use crate::models::{ContentItem, ContentKind, Edition};
use crate::outputs::{json, paper_path, pdf, text};
use crate::printer;
use crate::scrapers::{self, Source};
use crate::utils::{edition_for, ensure_writable_dir};
use chrono::{DateTime, Local};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The PDF sent to the printer.
    pub paper: PathBuf,
    pub text: PathBuf,
    pub plan_json: PathBuf,
    pub placed: usize,
    pub omitted: usize,
    pub printed: bool,
}

/// Items gathered for one source, and whether they still need summarizing.
#[derive(Debug)]
struct Gathered {
    items: Vec<ContentItem>,
    fresh: bool,
}

pub fn edition_at(now: DateTime<Local>, language: &str) -> Edition {
    Edition {
        local_date: now.date_naive().to_string(),
        local_time: now.format("%H:%M:%S").to_string(),
        time_of_day: edition_for(now.time()).to_string(),
        language: language.to_string(),
    }
}

#[instrument(level = "info", skip(config), fields(language = %config.language, pages = config.layout.pages))]
pub async fn run(config: &PressConfig, use_cache: bool, print: bool) -> Result<RunReport, PressError> {
    config.validate()?;

    let now = Local::now();
    let edition = edition_at(now, &config.language);
    let cache = ContentCache::new(&config.cache_dir);
    let cached = match cache.load(&edition.local_date).await {
        Ok(cached) => cached,
        Err(e) => {
            warn!(error = %e, "Could not read today's cache; continuing without it");
            None
        }
    };

    let items = match cached {
        Some(items) if use_cache => {
            info!(count = items.len(), "Using cached content");
            items
        }
        cached => {
            if use_cache {
                info!("No cached content for today; fetching");
            }
            let client = scrapers::http_client(config.http_timeout_secs)?;
            let gathered = gather(&client, config, cached.as_deref()).await?;
            let summarizer =
                Summarizer::from_config(&config.summarizer, config.summarizer_key(), client.clone());
            let items = summarize_all(&summarizer, config, gathered).await;
            cache.save(&edition.local_date, &items).await?;
            items
        }
    };

    let blocks = build_blocks(
        &items,
        &config.language,
        config.max_items_per_source,
        config.layout.column_width,
    );
    let settings = config.layout_settings();
    let plan = layout(
        &blocks,
        settings.page_count,
        settings.columns_per_page,
        settings.column_capacity,
    )?;
    if !plan.overflow.is_empty() {
        info!("{} items omitted", plan.overflow.len());
    }

    ensure_writable_dir(&config.output_dir)
        .await
        .map_err(|source| RenderError::Io {
            path: config.output_dir.clone(),
            source,
        })?;
    let paper = paper_path(&config.output_dir, now.naive_local());
    let column_width = config.layout.column_width;
    pdf::render(&plan, &edition, column_width, &paper).await?;
    let text = text::render(&plan, &edition, column_width, &paper.with_extension("txt")).await?;
    let plan_json = json::write_plan(&plan, &edition, &paper.with_extension("json")).await?;

    if print {
        printer::print(&paper, config.printer_name.as_deref()).await?;
    }

    Ok(RunReport {
        paper,
        text,
        plan_json,
        placed: plan.placed_count(),
        omitted: plan.overflow.len(),
        printed: print,
    })
}

/// Fetch every source concurrently, in configuration order.
async fn gather(
    client: &Client,
    config: &PressConfig,
    cached: Option<&[ContentItem]>,
) -> Result<Vec<Gathered>, FetchError> {
    let sources = scrapers::sources(&config.sources);
    let results = join_all(
        sources
            .iter()
            .map(|source| scrapers::fetch(client, *source, config.max_items_per_source)),
    )
    .await;

    sources
        .iter()
        .zip(results)
        .map(|(source, result)| match result {
            Ok(items) => {
                info!(source = %source.label(), count = items.len(), "Fetched source");
                Ok(Gathered { items, fresh: true })
            }
            Err(e) => recover_from_cache(source, e, cached),
        })
        .collect()
}

fn recover_from_cache(
    source: &Source<'_>,
    error: FetchError,
    cached: Option<&[ContentItem]>,
) -> Result<Gathered, FetchError> {
    let label = source.label();
    let items: Vec<ContentItem> = cached
        .unwrap_or_default()
        .iter()
        .filter(|item| item.kind.source_label() == label)
        .cloned()
        .collect();
    if items.is_empty() {
        return Err(error);
    }
    warn!(source = %label, error = %error, count = items.len(), "Fetch failed; using today's cached items");
    Ok(Gathered {
        items,
        fresh: false,
    })
}

/// Summarize fresh news items, keeping input order.
async fn summarize_all(
    summarizer: &Summarizer,
    config: &PressConfig,
    gathered: Vec<Gathered>,
) -> Vec<ContentItem> {
    let queue = gathered
        .into_iter()
        .flat_map(|g| g.items.into_iter().map(move |item| (item, g.fresh)));

    stream::iter(queue)
        .map(|(item, fresh)| async move {
            if fresh {
                summarize_item(summarizer, config, item).await
            } else {
                item
            }
        })
        .buffered(config.summarizer.concurrency.max(1))
        .collect()
        .await
}

async fn summarize_item(summarizer: &Summarizer, config: &PressConfig, mut item: ContentItem) -> ContentItem {
    let language = config.language.as_str();
    if let ContentKind::Discussion { comments: Some(raw) } = &item.kind {
        let analysis =
            summarize_or_raw(summarizer, Task::Discussion, raw, &config.summarizer, language).await;
        item.kind = ContentKind::Discussion {
            comments: Some(analysis),
        };
    }
    // Weather and quote are printed as fetched.
    if matches!(
        item.kind,
        ContentKind::Discussion { .. } | ContentKind::RegionalNews { .. }
    ) {
        item.body =
            summarize_or_raw(summarizer, Task::Article, &item.body, &config.summarizer, language).await;
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::error::ConfigError;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};

    const FEED: &str = r#"<rss version="2.0"><channel><title>RTS</title>
        <item><title>Lausanne inaugure un tram</title><description>Le M3 roule.</description></item>
        <item><title>Genève vote</title><description>Résultats ce soir.</description></item>
        </channel></rss>"#;

    fn config_for(server_url: &str, root: &std::path::Path) -> PressConfig {
        let mut config = PressConfig::default();
        config.output_dir = root.join("out");
        config.cache_dir = root.join("cache");
        config.max_items_per_source = 2;
        config.summarizer.enabled = false;
        config.sources.hacker_news.base_url = server_url.to_string();
        config.sources.feeds = vec![FeedConfig {
            outlet: "RTS".to_string(),
            url: format!("{server_url}/rss"),
        }];
        config.sources.weather.base_url = format!("{server_url}/v1/forecast");
        config.sources.quote.url = format!("{server_url}/api/today");
        config
    }

    /// Hacker News, weather and the RTS feed. The feed answers with
    /// `feed_status`; anything but 200 makes it fail.
    async fn mock_news(server: &mut Server, feed_status: usize) -> Vec<mockito::Mock> {
        let feed = server.mock("GET", "/rss").with_status(feed_status);
        let feed = if feed_status == 200 { feed.with_body(FEED) } else { feed };
        vec![
            server
                .mock("GET", "/topstories.json")
                .with_body("[1]")
                .create_async()
                .await,
            server
                .mock("GET", "/item/1.json")
                .with_body(r#"{"id": 1, "title": "Ask HN: Printers in 2026?", "text": "Do you still print?", "kids": [10]}"#)
                .create_async()
                .await,
            server
                .mock("GET", "/item/10.json")
                .with_body(r#"{"id": 10, "text": "Laser printers never die."}"#)
                .create_async()
                .await,
            feed.create_async().await,
            server
                .mock("GET", "/v1/forecast")
                .match_query(Matcher::Any)
                .with_body(r#"{"current": {"temperature_2m": 11.0, "weather_code": 2}}"#)
                .create_async()
                .await,
        ]
    }

    async fn mock_quote(server: &mut Server) -> mockito::Mock {
        server
            .mock("GET", "/api/today")
            .with_body(r#"[{"q": "Well begun is half done.", "a": "Aristotle"}]"#)
            .create_async()
            .await
    }

    /// A chat endpoint answering `reply` to prompts matching `prompt`.
    async fn mock_chat(server: &mut Server, prompt: &str, reply: &str, calls: usize) -> mockito::Mock {
        server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Regex(prompt.to_string()))
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": reply}}]
                })
                .to_string(),
            )
            .expect(calls)
            .create_async()
            .await
    }

    fn with_summarizer(mut config: PressConfig, server_url: &str) -> PressConfig {
        config.summarizer.enabled = true;
        config.summarizer.api_key = Some("sk-test".to_string());
        config.summarizer.base_url = format!("{server_url}/chat");
        config
    }

    async fn cached_today(config: &PressConfig) -> Vec<ContentItem> {
        let today = Local::now().date_naive().to_string();
        ContentCache::new(&config.cache_dir)
            .load(&today)
            .await
            .unwrap()
            .unwrap()
    }

    fn find<'a>(items: &'a [ContentItem], title: &str) -> &'a ContentItem {
        items.iter().find(|i| i.title == title).unwrap()
    }

    #[test]
    fn test_edition_at() {
        let now = Local.with_ymd_and_hms(2026, 10, 16, 7, 15, 0).unwrap();
        let edition = edition_at(now, "fr");
        assert_eq!(edition.local_date, "2026-10-16");
        assert_eq!(edition.local_time, "07:15:00");
        assert_eq!(edition.time_of_day, "morning");
        assert_eq!(edition.language, "fr");
    }

    #[tokio::test]
    async fn test_invalid_geometry_stops_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for("http://127.0.0.1:9", dir.path());
        config.layout.pages = 0;
        let err = run(&config, false, false).await.unwrap_err();
        assert!(matches!(err, PressError::Config(ConfigError::PageCount(0))));
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_full_run_writes_paper_and_cache() {
        let mut server = Server::new_async().await;
        let _news = mock_news(&mut server, 200).await;
        let _quote = mock_quote(&mut server).await;
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&server.url(), dir.path());

        let report = run(&config, false, false).await.unwrap();

        assert_eq!(report.placed, 5);
        assert_eq!(report.omitted, 0);
        assert!(!report.printed);
        assert_eq!(report.paper.extension().unwrap(), "pdf");
        assert!(std::fs::read(&report.paper).unwrap().starts_with(b"%PDF"));
        let paper = std::fs::read_to_string(&report.text).unwrap();
        assert!(paper.contains("Weather in Morges"));
        assert!(paper.contains("Aristotle"));
        assert!(paper.contains("Lausanne inaugure un tram"));
        assert!(paper.contains("Discussion Analysis:"));
        assert!(report.plan_json.exists());

        let items = cached_today(&config).await;
        assert_eq!(items.len(), 5);
        assert_eq!(
            find(&items, "Ask HN: Printers in 2026?").kind,
            ContentKind::Discussion {
                comments: Some("Laser printers never die.".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_summarizer_condenses_news_and_analyzes_comments() {
        let mut server = Server::new_async().await;
        let _news = mock_news(&mut server, 200).await;
        let _quote = mock_quote(&mut server).await;
        // One story body and two feed items.
        let articles = mock_chat(&mut server, "Summarize this news article", "Condensed.", 3).await;
        let discussion = mock_chat(&mut server, "Analyze these top comments", "Readers still print.", 1).await;
        let dir = tempfile::tempdir().unwrap();
        let config = with_summarizer(config_for(&server.url(), dir.path()), &server.url());

        let report = run(&config, false, false).await.unwrap();
        articles.assert_async().await;
        discussion.assert_async().await;
        assert_eq!(report.placed, 5);

        let items = cached_today(&config).await;
        let story = find(&items, "Ask HN: Printers in 2026?");
        assert_eq!(story.body, "Condensed.");
        assert_eq!(
            story.kind,
            ContentKind::Discussion {
                comments: Some("Readers still print.".to_string())
            }
        );
        assert_eq!(find(&items, "Lausanne inaugure un tram").body, "Condensed.");
        assert_eq!(find(&items, "Genève vote").body, "Condensed.");

        // Weather and quote print as fetched.
        assert_eq!(find(&items, "Weather in Morges").body, "");
        let quote = items
            .iter()
            .find(|i| matches!(i.kind, ContentKind::Quote { .. }))
            .unwrap();
        assert_eq!(quote.body, "Well begun is half done.");
    }

    #[tokio::test]
    async fn test_cached_fallback_items_are_not_summarized_again() {
        let mut server = Server::new_async().await;
        let _news = mock_news(&mut server, 503).await;
        let _quote = mock_quote(&mut server).await;
        // Only the fresh story body; the feed comes from the cache.
        let articles = mock_chat(&mut server, "Summarize this news article", "Condensed.", 1).await;
        let discussion = mock_chat(&mut server, "Analyze these top comments", "Readers still print.", 1).await;
        let dir = tempfile::tempdir().unwrap();
        let config = with_summarizer(config_for(&server.url(), dir.path()), &server.url());

        let today = Local::now().date_naive().to_string();
        let earlier = ContentItem::new(
            ContentKind::RegionalNews {
                outlet: "RTS".to_string(),
            },
            "Cached headline",
            "Already condensed this morning.",
        );
        ContentCache::new(&config.cache_dir)
            .save(&today, &[earlier])
            .await
            .unwrap();

        run(&config, false, false).await.unwrap();
        articles.assert_async().await;
        discussion.assert_async().await;

        let items = cached_today(&config).await;
        assert_eq!(
            find(&items, "Cached headline").body,
            "Already condensed this morning."
        );
        assert_eq!(find(&items, "Ask HN: Printers in 2026?").body, "Condensed.");
    }

    #[tokio::test]
    async fn test_failed_source_falls_back_to_cache() {
        let mut server = Server::new_async().await;
        let _news = mock_news(&mut server, 200).await;
        let _quote = server
            .mock("GET", "/api/today")
            .with_status(503)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&server.url(), dir.path());

        let today = Local::now().date_naive().to_string();
        let yesterday_quote = ContentItem::new(
            ContentKind::Quote {
                author: "Seneca".to_string(),
            },
            "Quote of the Day",
            "Luck is what happens when preparation meets opportunity.",
        );
        ContentCache::new(&config.cache_dir)
            .save(&today, &[yesterday_quote])
            .await
            .unwrap();

        let report = run(&config, false, false).await.unwrap();
        let paper = std::fs::read_to_string(&report.text).unwrap();
        assert!(paper.contains("Seneca"));
        assert_eq!(report.placed, 5);
    }

    #[tokio::test]
    async fn test_failed_source_without_cache_is_fatal() {
        let mut server = Server::new_async().await;
        let _news = mock_news(&mut server, 200).await;
        let _quote = server
            .mock("GET", "/api/today")
            .with_status(503)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&server.url(), dir.path());

        let err = run(&config, false, false).await.unwrap_err();
        assert!(matches!(err, PressError::Fetch(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_use_cache_skips_network() {
        let mut server = Server::new_async().await;
        let untouched = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&server.url(), dir.path());

        let today = Local::now().date_naive().to_string();
        let items = vec![
            ContentItem::new(
                ContentKind::RegionalNews {
                    outlet: "RTS".to_string(),
                },
                "Cached headline",
                "From this morning.",
            ),
            ContentItem::new(
                ContentKind::Quote {
                    author: "Seneca".to_string(),
                },
                "Quote of the Day",
                "Begin at once to live.",
            ),
        ];
        ContentCache::new(&config.cache_dir)
            .save(&today, &items)
            .await
            .unwrap();

        let report = run(&config, true, false).await.unwrap();
        untouched.assert_async().await;
        assert_eq!(report.placed, 2);
        let paper = std::fs::read_to_string(&report.text).unwrap();
        assert!(paper.contains("Cached headline"));
    }
}
