//! # Morning Press
//!
//! Gathers the morning's reading (Hacker News discussions, regional
//! headlines from RTS and Le Temps, the local weather and a quote of the
//! day), condenses it through an OpenAI-compatible chat API, and lays it out
//! as a multi-column paper ready for the printer.
//!
//! ## Usage
//!
//! ```sh
//! morning_press --pages 2 --language fr --print
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: every source concurrently, with today's cache as fallback
//! 2. **Summarizing**: news bodies and discussion threads, a few at a time
//! 3. **Layout**: sized blocks flowed into columns over a fixed page budget
//! 4. **Output**: an A4 PDF paper with a plain-text copy and its JSON plan,
//!    then optionally `lpr`

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cache;
mod cli;
mod config;
mod document;
mod error;
mod layout;
mod models;
mod outputs;
mod pipeline;
mod printer;
mod scrapers;
#[cfg(test)]
mod test_helpers;
mod utils;

use cli::Cli;
use config::PressConfig;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("morning_press starting up");

    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let args = Cli::parse();
    debug!(?args.config, args.use_cache, args.print, "Parsed CLI arguments");

    let mut config = PressConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    let report = match pipeline::run(&config, args.use_cache, args.print).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Press run failed");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        paper = %report.paper.display(),
        text = %report.text.display(),
        placed = report.placed,
        omitted = report.omitted,
        printed = report.printed,
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
