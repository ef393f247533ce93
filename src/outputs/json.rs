//! JSON copy of the placement plan.
//!
//! Written next to the printable paper with the same stem, so a run's
//! `morning_press_20261016_071500.pdf` gets a
//! `morning_press_20261016_071500.json` holding the edition metadata, every
//! placed block with its page and column, and the overflow list.

use crate::error::RenderError;
use crate::models::{Edition, PlacementPlan};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
struct PlanFile<'a> {
    edition: &'a Edition,
    placed: usize,
    omitted: usize,
    plan: &'a PlacementPlan,
}

/// Write the plan as pretty JSON to `output_path`.
#[instrument(level = "info", skip_all, fields(path = %output_path.display()))]
pub async fn write_plan(
    plan: &PlacementPlan,
    edition: &Edition,
    output_path: &Path,
) -> Result<PathBuf, RenderError> {
    let json = serde_json::to_string_pretty(&PlanFile {
        edition,
        placed: plan.placed_count(),
        omitted: plan.overflow.len(),
        plan,
    })?;

    fs::write(output_path, json)
        .await
        .map_err(|source| RenderError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;
    info!("Wrote placement plan JSON");
    Ok(output_path.to_path_buf())
}
