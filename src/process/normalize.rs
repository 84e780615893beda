// src/process/normalize.rs

use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use super::header::HeaderDescriptor;
use super::utils::{cell_to_rate, parse_year};
use super::NormalizedRecord;
use crate::config::Layout;
use crate::grid::{Cell, CellGrid};

/// Counters for everything the normalizer skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub rows_seen: usize,
    pub rows_blank_locality: usize,
    pub cells_blank: usize,
    pub cells_malformed: usize,
}

#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    pub tally: Tally,
}

/// Flatten every data row into one record per numeric cell.
///
/// Rows with a blank locality are skipped; blank and unparsable cells are
/// skipped and counted. Output order is row-major, column-minor.
#[instrument(level = "info", skip_all, fields(rows = grid.height(), cols = grid.width()))]
pub fn normalize_rows(
    grid: &CellGrid,
    layout: &Layout,
    headers: &[HeaderDescriptor],
) -> Normalized {
    let years: Vec<Option<i32>> = headers
        .iter()
        .map(|h| h.year.as_deref().and_then(parse_year))
        .collect();

    let mut out = Normalized::default();

    for (row_idx, cells) in grid.rows_from(layout.data_start_row) {
        out.tally.rows_seen += 1;

        let Some(locality) = grid.get(row_idx, layout.locality_column).as_label() else {
            trace!(row = row_idx, "blank locality, skipping row");
            out.tally.rows_blank_locality += 1;
            continue;
        };

        for (col_idx, cell) in cells.iter().enumerate() {
            if !layout.is_value_cell(row_idx, col_idx) {
                continue;
            }
            if cell.is_blank() {
                out.tally.cells_blank += 1;
                continue;
            }
            let Some(rate) = cell_to_rate(cell) else {
                debug!(row = row_idx, col = col_idx, raw = %cell, "unparsable cell");
                out.tally.cells_malformed += 1;
                continue;
            };

            let header = headers.get(col_idx).cloned().unwrap_or_default();
            out.records.push(NormalizedRecord {
                locality: locality.clone(),
                year: years.get(col_idx).copied().flatten(),
                sex: header.sex,
                age_band: header.age_band,
                disability_type: header.disability_type,
                rate,
            });
        }
    }

    info!(
        records = out.records.len(),
        rows = out.tally.rows_seen,
        blank_rows = out.tally.rows_blank_locality,
        "normalized rows"
    );
    if out.tally.cells_malformed > 0 {
        warn!(
            malformed = out.tally.cells_malformed,
            "cells with non-numeric values were skipped"
        );
    }
    out
}

/// Non-blank cell that does not parse as a rate.
pub fn is_malformed(cell: &Cell) -> bool {
    !cell.is_blank() && cell_to_rate(cell).is_none()
}
