//! Command-line interface definitions for Morning Press.
//!
//! Flags override the matching [`PressConfig`] values; everything else comes
//! from the optional YAML config file or its defaults.

use crate::config::PressConfig;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Morning Press application.
///
/// # Examples
///
/// ```sh
/// # Fetch everything fresh and write the paper to ./press
/// morning_press
///
/// # Reuse today's cached content, two pages, and send it to the printer
/// morning_press --use-cache --pages 2 --print
///
/// # Three articles per source, summarised in French
/// morning_press --articles 3 --language fr
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Reuse today's cached content instead of fetching it again
    #[arg(long)]
    pub use_cache: bool,

    /// Send the rendered paper to the printer
    #[arg(long)]
    pub print: bool,

    /// Maximum articles per news source
    #[arg(short, long, value_name = "N")]
    pub articles: Option<usize>,

    /// Maximum number of pages
    #[arg(short, long, value_name = "N")]
    pub pages: Option<usize>,

    /// Columns per page
    #[arg(long, value_name = "N")]
    pub columns: Option<usize>,

    /// Language tag for summaries, e.g. "en" or "fr"
    #[arg(short, long)]
    pub language: Option<String>,

    /// Directory the paper is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Printer name passed to lpr
    #[arg(long, env = "MORNING_PRESS_PRINTER")]
    pub printer: Option<String>,

    /// OpenAI API key used for summaries
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
}

impl Cli {
    /// Layer the flags that were given on top of `config`.
    pub fn apply_to(&self, config: &mut PressConfig) {
        if let Some(n) = self.articles {
            config.max_items_per_source = n;
        }
        if let Some(n) = self.pages {
            config.layout.pages = n;
        }
        if let Some(n) = self.columns {
            config.layout.columns = n;
        }
        if let Some(lang) = &self.language {
            config.language = lang.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(printer) = &self.printer {
            config.printer_name = Some(printer.clone());
        }
        if let Some(key) = &self.openai_api_key {
            config.summarizer.api_key = Some(key.clone());
        }
    }
}
