// src/process/mod.rs

pub mod header;
pub mod normalize;
pub mod stats;
pub mod utils;

pub use header::{reconstruct_headers, HeaderDescriptor};
pub use normalize::{normalize_rows, Normalized, Tally};
pub use stats::RunSummary;

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::config::{Layout, RunConfig};
use crate::grid::{self, CellGrid};
use crate::sink;

/// One flattened (locality × column) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub locality: String,
    pub year: Option<i32>,
    pub sex: Option<String>,
    pub age_band: Option<String>,
    pub disability_type: Option<String>,
    pub rate: f64,
}

/// Header reconstruction followed by row normalization, on an in-memory grid.
pub fn normalize_grid(grid: &CellGrid, layout: &Layout) -> Normalized {
    let headers = reconstruct_headers(grid, layout);
    normalize_rows(grid, layout, &headers)
}

/// Load → normalize → write every sink. Any sink error aborts the run.
#[tracing::instrument(level = "info", skip(cfg), fields(input = %cfg.input.display()))]
pub fn run_pipeline(cfg: &RunConfig) -> Result<RunSummary> {
    let start = Instant::now();
    cfg.validate().context("invalid configuration")?;

    let grid = grid::load_grid(&cfg.input, cfg.sheet.as_deref())
        .with_context(|| format!("loading {}", cfg.input.display()))?;

    let Normalized { records, tally } = normalize_grid(&grid, &cfg.layout);
    let summary = RunSummary::from_records(&records, tally);

    sink::write_all(cfg, &records, &summary)?;

    summary.log();
    info!(elapsed = ?start.elapsed(), "completed");
    Ok(summary)
}
