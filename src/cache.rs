//! Day-keyed cache of fetched and summarized items.
//!
//! One JSON file per local date under the cache directory. A later run on
//! the same day can skip the network with `--use-cache`, and a source that
//! fails to fetch falls back to its items from this file.

use crate::error::CacheError;
use crate::models::ContentItem;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ContentCache {
    dir: PathBuf,
}

impl ContentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, date_key: &str) -> PathBuf {
        self.dir.join(format!("{date_key}.json"))
    }

    /// Items cached for `date_key`.
    ///
    /// A missing file is `Ok(None)`. So is a file that no longer parses, which
    /// is logged and then treated as absent.
    #[instrument(level = "info", skip(self))]
    pub async fn load(&self, date_key: &str) -> Result<Option<Vec<ContentItem>>, CacheError> {
        let path = self.path_for(date_key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No cache for today");
                return Ok(None);
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        match serde_json::from_str::<Vec<ContentItem>>(&raw) {
            Ok(items) => {
                info!(path = %path.display(), count = items.len(), "Loaded cached items");
                Ok(Some(items))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt cache file");
                Ok(None)
            }
        }
    }

    /// Replace the cache for `date_key` with `items`.
    #[instrument(level = "info", skip(self, items), fields(count = items.len()))]
    pub async fn save(&self, date_key: &str, items: &[ContentItem]) -> Result<PathBuf, CacheError> {
        let json = serde_json::to_string_pretty(items)?;
        create_dir(&self.dir).await?;
        let path = self.path_for(date_key);
        fs::write(&path, json)
            .await
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "Saved cache");
        Ok(path)
    }
}

async fn create_dir(dir: &Path) -> Result<(), CacheError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })
}
