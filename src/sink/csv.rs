use anyhow::Result;
use std::io::Write;

use crate::process::NormalizedRecord;

pub const CSV_HEADER: [&str; 6] = [
    "locality",
    "year",
    "sex",
    "age_band",
    "disability_type",
    "rate",
];

/// Write the header plus one row per record; absent fields are empty cells.
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(out: W, records: &[NormalizedRecord]) -> Result<usize> {
    // header written by hand so an empty run still gets one
    let mut wtr = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows_and_nulls() {
        let records = vec![
            NormalizedRecord {
                locality: "Rondônia, RO".to_string(),
                year: Some(2010),
                sex: Some("Homens".to_string()),
                age_band: None,
                disability_type: Some("Visual".to_string()),
                rate: 12.5,
            },
            NormalizedRecord {
                locality: "Brasil".to_string(),
                year: None,
                sex: None,
                age_band: None,
                disability_type: None,
                rate: 8.0,
            },
        ];

        let mut buf = Vec::new();
        let n = write_csv(&mut buf, &records).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "locality,year,sex,age_band,disability_type,rate");
        assert_eq!(lines[1], "\"Rondônia, RO\",2010,Homens,,Visual,12.5");
        assert_eq!(lines[2], "Brasil,,,,,8.0");
    }

    #[test]
    fn test_empty_run_still_has_header() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "locality,year,sex,age_band,disability_type,rate\n"
        );
    }
}
