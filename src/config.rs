//! Run configuration.
//!
//! Everything the pipeline needs (sources, API settings, printer, page
//! geometry) lives in one [`PressConfig`] that is passed down explicitly.
//! It is read from an optional YAML file where every field has a default,
//! then the command line overrides individual values.
//!
//! ```yaml
//! language: fr
//! printer_name: EPSON_XP
//! max_items_per_source: 4
//! layout:
//!   pages: 2
//!   columns: 3
//!   column_width: 32
//!   column_capacity: 70
//! sources:
//!   weather:
//!     city: Morges
//!     latitude: 46.5167
//!     longitude: 6.4833
//! ```

use crate::error::ConfigError;
use crate::layout::LayoutSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Narrowest column the renderer can draw a truncation marker in.
pub const MIN_COLUMN_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressConfig {
    /// Language tag the summarizer writes in, e.g. `"en"` or `"fr"`.
    pub language: String,
    /// `lpr -P` destination; the system default printer when unset.
    pub printer_name: Option<String>,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub max_items_per_source: usize,
    pub http_timeout_secs: u64,
    pub layout: LayoutConfig,
    pub sources: SourcesConfig,
    pub summarizer: SummarizerConfig,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            printer_name: None,
            output_dir: PathBuf::from("press"),
            cache_dir: PathBuf::from("press/cache"),
            max_items_per_source: 5,
            http_timeout_secs: 10,
            layout: LayoutConfig::default(),
            sources: SourcesConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

/// Page geometry in characters and lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub pages: usize,
    pub columns: usize,
    /// Characters per column line.
    pub column_width: usize,
    /// Lines per column.
    pub column_capacity: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pages: 1,
            columns: 3,
            column_width: 30,
            column_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub hacker_news: HackerNewsConfig,
    pub feeds: Vec<FeedConfig>,
    pub weather: WeatherConfig,
    pub quote: QuoteConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            hacker_news: HackerNewsConfig::default(),
            feeds: vec![
                FeedConfig {
                    outlet: "RTS".to_string(),
                    url: "https://www.rts.ch/info/rss".to_string(),
                },
                FeedConfig {
                    outlet: "Le Temps".to_string(),
                    url: "https://www.letemps.ch/articles.rss".to_string(),
                },
            ],
            weather: WeatherConfig::default(),
            quote: QuoteConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    /// Firebase API root, without trailing slash.
    pub base_url: String,
    pub comments_per_story: usize,
    /// Characters of linked article text handed to the summarizer.
    pub article_chars: usize,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            comments_per_story: 3,
            article_chars: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub outlet: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Open-Meteo forecast endpoint.
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            city: "Morges".to_string(),
            latitude: 46.5167,
            longitude: 6.4833,
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub url: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            url: "https://zenquotes.io/api/today".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub enabled: bool,
    /// Usually supplied through `OPENAI_API_KEY` rather than the file.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// OpenAI-compatible chat completions endpoint.
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub creativity: f32,
    /// Requests in flight at once.
    pub concurrency: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            max_output_tokens: 150,
            creativity: 0.7,
            concurrency: 4,
        }
    }
}

impl PressConfig {
    /// Read a YAML config file. Missing fields take their defaults.
    #[instrument(level = "info", fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: PressConfig =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        info!("Loaded configuration");
        Ok(config)
    }

    /// Defaults, or the given file when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            page_count: self.layout.pages,
            columns_per_page: self.layout.columns,
            column_capacity: self.layout.column_capacity,
        }
    }

    /// Reject geometry the layout engine or renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout_settings().validate()?;
        if self.layout.column_width < MIN_COLUMN_WIDTH {
            return Err(ConfigError::ColumnWidth {
                min: MIN_COLUMN_WIDTH,
                got: self.layout.column_width,
            });
        }
        Ok(())
    }

    /// The summarizer only runs when enabled and given a key.
    pub fn summarizer_key(&self) -> Option<&str> {
        if !self.summarizer.enabled {
            return None;
        }
        self.summarizer
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}
