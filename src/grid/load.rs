// src/grid/load.rs

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{Cell, CellGrid};

#[derive(Debug, Error)]
pub enum GridError {
    #[error("failed to open workbook {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("workbook {0:?} has no sheets")]
    NoSheets(PathBuf),
    #[error("sheet `{sheet}` not found in {path:?} (available: {available:?})")]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },
    #[error("failed to read sheet `{sheet}`: {source}")]
    Read {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

/// Map a calamine value onto our cell model.
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
    }
}

/// Place a calamine range on absolute sheet coordinates.
///
/// calamine trims leading empty rows/columns, but the layout row indices
/// refer to the sheet as a whole, so the range's start offset is restored.
pub fn grid_from_range(range: &Range<Data>) -> CellGrid {
    let (row_off, col_off) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_off];
    for src in range.rows() {
        let mut row = vec![Cell::Empty; col_off];
        row.extend(src.iter().map(to_cell));
        rows.push(row);
    }
    CellGrid::from_rows(rows)
}

/// List the sheet names of a workbook, in workbook order.
pub fn sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>, GridError> {
    let path = path.as_ref();
    let workbook = open_workbook_auto(path).map_err(|source| GridError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(workbook.sheet_names())
}

/// Load one worksheet (the first one when `sheet` is `None`) into memory.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_grid<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<CellGrid, GridError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path).map_err(|source| GridError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let available = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => {
            if !available.iter().any(|s| s == name) {
                return Err(GridError::MissingSheet {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                    available,
                });
            }
            name.to_string()
        }
        None => available
            .first()
            .cloned()
            .ok_or_else(|| GridError::NoSheets(path.to_path_buf()))?,
    };
    debug!(sheet = %sheet_name, sheets = available.len(), "reading worksheet");

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|source| GridError::Read {
            sheet: sheet_name.clone(),
            source,
        })?;

    let grid = grid_from_range(&range);
    info!(
        sheet = %sheet_name,
        rows = grid.height(),
        cols = grid.width(),
        "loaded grid"
    );
    Ok(grid)
}
