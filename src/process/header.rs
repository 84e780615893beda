// src/process/header.rs

use tracing::{debug, instrument};

use crate::config::Layout;
use crate::grid::CellGrid;

/// Category labels resolved for one grid column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDescriptor {
    pub year: Option<String>,
    pub sex: Option<String>,
    pub age_band: Option<String>,
    pub disability_type: Option<String>,
}

/// Last non-empty label seen in each carried category row.
#[derive(Debug, Clone, Default)]
struct Carry {
    year: Option<String>,
    sex: Option<String>,
    age: Option<String>,
}

impl Carry {
    fn step(slot: &mut Option<String>, seen: Option<String>) {
        if seen.is_some() {
            *slot = seen;
        }
    }
}

/// Resolve one descriptor per grid column, left to right.
///
/// Year, sex and age carry forward until the next explicit value;
/// disability only takes the label in its own column.
#[instrument(level = "debug", skip_all, fields(cols = grid.width()))]
pub fn reconstruct_headers(grid: &CellGrid, layout: &Layout) -> Vec<HeaderDescriptor> {
    let label_at =
        |row: Option<usize>, col: usize| row.and_then(|r| grid.get(r, col).as_label());

    let headers: Vec<HeaderDescriptor> = (0..grid.width())
        .scan(Carry::default(), |carry, col| {
            Carry::step(&mut carry.year, label_at(layout.year_row, col));
            Carry::step(&mut carry.sex, label_at(layout.sex_row, col));
            Carry::step(&mut carry.age, label_at(layout.age_row, col));

            Some(HeaderDescriptor {
                year: carry.year.clone(),
                sex: carry.sex.clone(),
                age_band: carry.age.clone(),
                disability_type: label_at(layout.disability_row, col),
            })
        })
        .collect();

    debug!(headers = headers.len(), "reconstructed headers");
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn layout() -> Layout {
        Layout {
            year_row: Some(0),
            sex_row: Some(1),
            age_row: Some(2),
            disability_row: Some(3),
            data_start_row: 4,
            locality_column: 0,
        }
    }

    #[test]
    fn test_carry_forward_until_next_value() {
        let e = Cell::Empty;
        let grid = CellGrid::from_rows(vec![
            vec![e.clone(), Cell::Number(2010.0), e.clone(), e.clone(), Cell::Number(2022.0), e.clone()],
            vec![e.clone(), t("Homens"), e.clone(), t("Mulheres"), e.clone(), e.clone()],
            vec![e.clone(), t("6 a 14 anos"), e.clone(), e.clone(), e.clone(), e.clone()],
            vec![e.clone(), t("Visual"), e.clone(), t("Auditiva"), e.clone(), e.clone()],
        ]);

        let headers = reconstruct_headers(&grid, &layout());
        assert_eq!(headers.len(), 6);

        let years: Vec<_> = headers.iter().map(|h| h.year.as_deref()).collect();
        assert_eq!(
            years,
            vec![None, Some("2010"), Some("2010"), Some("2010"), Some("2022"), Some("2022")]
        );

        let sexes: Vec<_> = headers.iter().map(|h| h.sex.as_deref()).collect();
        assert_eq!(
            sexes,
            vec![None, Some("Homens"), Some("Homens"), Some("Mulheres"), Some("Mulheres"), Some("Mulheres")]
        );

        assert!(headers[1..]
            .iter()
            .all(|h| h.age_band.as_deref() == Some("6 a 14 anos")));
    }

    #[test]
    fn test_disability_does_not_carry() {
        let e = Cell::Empty;
        let grid = CellGrid::from_rows(vec![
            vec![e.clone(); 4],
            vec![e.clone(); 4],
            vec![e.clone(); 4],
            vec![e.clone(), t("Visual"), e.clone(), t("Auditiva")],
        ]);

        let defs: Vec<_> = reconstruct_headers(&grid, &layout())
            .into_iter()
            .map(|h| h.disability_type)
            .collect();
        assert_eq!(
            defs,
            vec![None, Some("Visual".into()), None, Some("Auditiva".into())]
        );
    }

    #[test]
    fn test_missing_category_rows_yield_absent_labels() {
        let grid = CellGrid::from_rows(vec![vec![t("Brasil"), Cell::Number(1.0)]]);
        let layout = Layout {
            year_row: None,
            sex_row: Some(40),
            age_row: None,
            disability_row: None,
            data_start_row: 0,
            locality_column: 0,
        };

        let headers = reconstruct_headers(&grid, &layout);
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|h| *h == HeaderDescriptor::default()));
    }

    #[test]
    fn test_blank_text_does_not_reset_carry() {
        let grid = CellGrid::from_rows(vec![vec![
            Cell::Empty,
            t("2010"),
            t("   "),
            Cell::Empty,
        ]]);
        let layout = Layout {
            year_row: Some(0),
            sex_row: None,
            age_row: None,
            disability_row: None,
            data_start_row: 1,
            locality_column: 0,
        };

        let headers = reconstruct_headers(&grid, &layout);
        assert_eq!(headers[2].year.as_deref(), Some("2010"));
        assert_eq!(headers[3].year.as_deref(), Some("2010"));
    }
}
