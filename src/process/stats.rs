// src/process/stats.rs

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use super::normalize::Tally;
use super::NormalizedRecord;

/// What one run produced, for the end-of-run log and the optional JSON file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total_records: usize,
    pub localities: usize,
    pub years: BTreeSet<i32>,
    pub sexes: BTreeSet<String>,
    pub age_bands: BTreeSet<String>,
    pub disability_types: BTreeSet<String>,
    pub records_per_locality: BTreeMap<String, usize>,
    pub tally: Tally,
}

impl RunSummary {
    pub fn from_records(records: &[NormalizedRecord], tally: Tally) -> Self {
        let mut summary = RunSummary {
            total_records: records.len(),
            tally,
            ..Default::default()
        };

        for rec in records {
            *summary
                .records_per_locality
                .entry(rec.locality.clone())
                .or_default() += 1;
            if let Some(y) = rec.year {
                summary.years.insert(y);
            }
            if let Some(s) = &rec.sex {
                summary.sexes.insert(s.clone());
            }
            if let Some(a) = &rec.age_band {
                summary.age_bands.insert(a.clone());
            }
            if let Some(d) = &rec.disability_type {
                summary.disability_types.insert(d.clone());
            }
        }
        summary.localities = summary.records_per_locality.len();
        summary
    }

    pub fn log(&self) {
        info!(
            total = self.total_records,
            localities = self.localities,
            years = ?self.years,
            "run summary"
        );
        info!(sexes = ?self.sexes, age_bands = ?self.age_bands, "categories");
        info!(disability_types = ?self.disability_types, "categories");
        info!(
            blank_rows = self.tally.rows_blank_locality,
            blank_cells = self.tally.cells_blank,
            malformed_cells = self.tally.cells_malformed,
            "skipped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(loc: &str, year: Option<i32>, sex: Option<&str>) -> NormalizedRecord {
        NormalizedRecord {
            locality: loc.to_string(),
            year,
            sex: sex.map(str::to_string),
            age_band: None,
            disability_type: None,
            rate: 1.0,
        }
    }

    #[test]
    fn test_distinct_values_sorted() {
        let records = vec![
            rec("Sul", Some(2022), Some("Mulheres")),
            rec("Brasil", Some(2010), Some("Homens")),
            rec("Brasil", None, None),
        ];
        let s = RunSummary::from_records(&records, Tally::default());

        assert_eq!(s.total_records, 3);
        assert_eq!(s.localities, 2);
        assert_eq!(s.years.iter().copied().collect::<Vec<_>>(), vec![2010, 2022]);
        assert_eq!(
            s.sexes.iter().cloned().collect::<Vec<_>>(),
            vec!["Homens".to_string(), "Mulheres".to_string()]
        );
        assert_eq!(s.records_per_locality["Brasil"], 2);
        assert!(s.age_bands.is_empty());
    }
}
