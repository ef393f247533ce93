//! Error types for each stage of the press run.
//!
//! Every boundary gets its own error so callers can decide what is
//! recoverable: a failed summary falls back to raw text, a failed fetch falls
//! back to the day's cache, but a bad page count stops the run before layout.
//! [`PressError`] gathers them for the pipeline entry point.

use std::path::PathBuf;
use thiserror::Error;

/// Structurally invalid configuration. Always fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page count must be positive, got {0}")]
    PageCount(usize),

    #[error("columns per page must be positive, got {0}")]
    ColumnCount(usize),

    #[error("column capacity must be positive, got {0}")]
    ColumnCapacity(u32),

    #[error("column width must be at least {min} characters, got {got}")]
    ColumnWidth { min: usize, got: usize },

    #[error("could not read config file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("invalid config file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// A content item that cannot become a block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("{source_label} item has neither title nor body")]
    Empty { source_label: String },
}

/// A content source could not be fetched or parsed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not parse response from {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// The summarization service failed.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarizer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("summarizer returned no choices")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode placement plan: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("could not build PDF: {0}")]
    Pdf(#[from] printpdf::Error),
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("document not found: {0}")]
    MissingFile(PathBuf),

    #[error("could not launch lpr: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("lpr exited with {0}")]
    Failed(std::process::ExitStatus),
}

/// Any failure that ends a press run.
#[derive(Debug, Error)]
pub enum PressError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Print(#[from] PrintError),
}
